use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrailError>;

#[derive(Error, Debug)]
pub enum TrailError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0} {1}")]
    Storage(String, String),
    #[error("Decoding error: {0}")]
    Decode(String),
    #[error("Encoding error: {0}")]
    Encode(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<serde_json::Error> for TrailError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
