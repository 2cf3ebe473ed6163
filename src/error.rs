use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Invalid PEM tag `{real}`, expect `{expect}`")]
    InvalidPemTag { expect: String, real: String },

    #[error("The key field `{0}` is truncated")]
    TruncatedField(&'static str),

    #[error("{0} trailing bytes after the key fields")]
    TrailingBytes(usize),

    #[error("The key field `{0}` must not be zero")]
    ZeroField(&'static str),

    #[error("Invalid signature file: {0}")]
    InvalidSignatureFile(String),

    #[error("The path {0} already exists, use `--force` to overwrite it")]
    PathExist(String),

    #[error("{0}")]
    NotSupport(String),

    #[error("{0}")]
    ConfigFailed(String),

    #[error("No message to process, use `-f` or `--pipe`")]
    NoMessage,
}
