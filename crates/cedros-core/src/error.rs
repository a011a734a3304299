use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parallax layer {id}: {reason}")]
    InvalidLayer { id: String, reason: String },

    #[error("Invalid carousel: {0}")]
    InvalidCarousel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
