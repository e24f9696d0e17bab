use std::io;

/// Custom error type for salthook operations
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("salt-call failed to start: {0}")]
    SaltSpawnFailed(#[from] io::Error),

    #[error("salt-call returned unusable output: {0}")]
    SaltOutputInvalid(String),
}

/// Helper type for Results that use HookError
pub type Result<T> = std::result::Result<T, HookError>;
