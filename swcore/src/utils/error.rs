use swinstr::types::primary::PrimaryType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShrinkWrapError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed function: {0}")]
    Ir(#[from] swinstr::utils::Error),

    #[error("Cannot compare `{operand}` of type `{ty}` against a floating-point bound")]
    UnsupportedArgumentType { operand: String, ty: PrimaryType },

    #[error("Failed to parse shrink-wrap configuration '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },

    #[error("Failed to serialize shrink-wrap configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type ShrinkWrapResult<T> = Result<T, ShrinkWrapError>;
