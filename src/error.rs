// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeline parse error: {0}")]
    Parse(String),

    #[error("Timeline is empty")]
    EmptyTimeline,

    #[error("Frame 0 must start with a blit at (0, 0) defining the canvas")]
    NoCanvas,

    #[error("Frame {frame}, blit {blit}: {reason}")]
    InvalidBlit {
        frame: usize,
        blit: usize,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Encoder error: {0}")]
    Encode(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnimError>;
