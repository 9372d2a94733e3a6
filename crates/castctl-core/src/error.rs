use thiserror::Error;

#[derive(Debug, Error)]
pub enum CastError {
    #[error("not initialized: run 'castctl init'")]
    NotInitialized,

    #[error("invalid run time '{0}': expected H:MM:SS")]
    InvalidRunTime(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid schedule kind '{0}': expected start, broadcast or pause")]
    InvalidScheduleKind(String),

    #[error("no stop entry scheduled for '{0}'")]
    OrgNotScheduled(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CastError>;
