use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::region::Region;

/// A `major.minor` version as written by users.
///
/// Components are compared as text, the same way the upstream catalog names
/// them, so `1.02` and `1.2` are different versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MinorVersion {
    pub major: String,
    pub minor: String,
}

/// A `major.minor.patch` release as listed by the version catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullVersion {
    pub major: String,
    pub minor: String,
    pub patch: String,
}

impl FullVersion {
    pub fn minor(&self) -> MinorVersion {
        MinorVersion {
            major: self.major.clone(),
            minor: self.minor.clone(),
        }
    }

    pub fn matches(&self, minor: &MinorVersion) -> bool {
        self.major == minor.major && self.minor == minor.minor
    }
}

impl FromStr for MinorVersion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_components::<2>(s) {
            Some([major, minor]) => Ok(Self { major, minor }),
            None => Err(ModelError::MalformedMinorVersion(s.to_string())),
        }
    }
}

impl FromStr for FullVersion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_components::<3>(s) {
            Some([major, minor, patch]) => Ok(Self {
                major,
                minor,
                patch,
            }),
            None => Err(ModelError::MalformedFullVersion(s.to_string())),
        }
    }
}

fn split_components<const N: usize>(s: &str) -> Option<[String; N]> {
    let parts: Vec<String> = s.split('.').map(str::to_string).collect();
    if parts.iter().any(String::is_empty) {
        return None;
    }
    parts.try_into().ok()
}

impl fmt::Display for MinorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for FullVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One entry of the regional version catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub region: Region,
    #[serde(default)]
    pub available_cnis: Vec<String>,
}

impl Version {
    pub fn new(region: Region, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: format!("Kubernetes {name}"),
            name,
            region,
            available_cnis: vec!["cilium".into(), "calico".into()],
        }
    }
}
