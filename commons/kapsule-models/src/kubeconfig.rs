use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The subset of a kubeconfig document the API hands back for a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: KubeconfigCluster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KubeconfigCluster {
    #[serde(rename = "certificate-authority-data", default)]
    pub certificate_authority_data: String,
    #[serde(default)]
    pub server: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NamedContext {
    pub name: String,
    pub context: KubeconfigContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KubeconfigContext {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NamedUser {
    pub name: String,
    pub user: KubeconfigUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KubeconfigUser {
    #[serde(default)]
    pub token: String,
}

impl Kubeconfig {
    pub fn from_yaml(content: &str) -> Result<Self, ModelError> {
        serde_yaml::from_str(content)
            .map_err(|e| ModelError::InvalidKubeconfig(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, ModelError> {
        serde_yaml::to_string(self)
            .map_err(|e| ModelError::InvalidKubeconfig(e.to_string()))
    }

    /// Server URL of the first cluster entry.
    pub fn server(&self) -> Option<&str> {
        self.clusters.first().map(|c| c.cluster.server.as_str())
    }

    pub fn token(&self) -> Option<&str> {
        self.users.first().map(|u| u.user.token.as_str())
    }
}
