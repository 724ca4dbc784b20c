use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoothError {
    #[error("Failed to load font {path}: {reason}")]
    FontLoad { path: PathBuf, reason: String },
    #[error("Unknown font family: {0}")]
    UnknownFont(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("QR encode error: {0}")]
    Qr(#[from] qrcode::types::QrError),
    #[error("Printer error: {0}")]
    Printer(String),
    #[error("Camera error: {0}")]
    Camera(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Expected {expected} photos, got {got}")]
    PhotoCount { expected: usize, got: usize },
    #[error("No caption configured")]
    NoCaption,
}

pub type Result<T> = std::result::Result<T, BoothError>;
