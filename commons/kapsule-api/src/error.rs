#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("request failed with status {status}: {message}")]
    Response { status: u16, message: String },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Whether the remote side reported the resource as absent (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NotFound { .. } => true,
            ApiError::Response { status, .. } => *status == 404,
            _ => false,
        }
    }
}
