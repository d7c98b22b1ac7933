use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A region such as `fr-par` or `nl-ams`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a region-scoped resource, rendered as `<region>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionalId {
    pub region: Region,
    pub id: String,
}

impl RegionalId {
    pub fn new(region: Region, id: impl Into<String>) -> Self {
        Self {
            region,
            id: id.into(),
        }
    }
}

impl FromStr for RegionalId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [region, id] if !region.is_empty() && !id.is_empty() => {
                Ok(Self::new(Region::new(*region), *id))
            }
            _ => Err(ModelError::InvalidRegionalId(s.to_string())),
        }
    }
}

impl fmt::Display for RegionalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_regional_id() {
        let id: RegionalId = "fr-par/11111111-2222-3333-4444-555555555555"
            .parse()
            .unwrap();
        assert_eq!(id.region.as_str(), "fr-par");
        assert_eq!(id.id, "11111111-2222-3333-4444-555555555555");
        assert_eq!(
            id.to_string(),
            "fr-par/11111111-2222-3333-4444-555555555555"
        );
    }

    #[test]
    fn rejects_bad_regional_ids() {
        for raw in ["", "fr-par", "fr-par/", "/abc", "fr-par/a/b"] {
            assert_eq!(
                raw.parse::<RegionalId>(),
                Err(ModelError::InvalidRegionalId(raw.to_string())),
                "{raw}"
            );
        }
    }
}
