#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("minor version should be like x.y not {0}")]
    MalformedMinorVersion(String),

    #[error("upstream version {0} is not correctly formatted")]
    MalformedFullVersion(String),

    #[error("can't parse regional id: {0}")]
    InvalidRegionalId(String),

    #[error("invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),
}
