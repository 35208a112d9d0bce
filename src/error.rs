use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures at the edges of the crate: loading options and matching
/// selectors. Segmentation and playback themselves never fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse options: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}
