use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Invalid pixel buffer: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },
    #[error("Invalid atlas: {0}")]
    InvalidAtlas(String),
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
