use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EpdError {
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown parser '{id}'. Registered: {registered}")]
    UnknownParser { id: String, registered: String },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
