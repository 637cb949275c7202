// One error type for the crate. Every variant states *where* things went wrong.
// The glitch pipeline itself only ever produces `InvalidInput`; the rest
// come from the file/window glue around it.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Zero-sized buffer, or a pixel vector that doesn't match width*height.
    #[error("invalid input buffer: {width}x{height} with {len} pixels")]
    InvalidInput { width: usize, height: usize, len: usize },

    /// Decoding or encoding an image file failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A parameter file could not be parsed.
    #[error("invalid parameter file: {0}")]
    Params(#[from] serde_json::Error),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// Creating or updating the preview window failed.
    #[error("window error: {0}")]
    Window(String),
}
