//! Fingerprint Image Model
//!
//! Immutable description of a raw 8-bit grayscale fingerprint image as
//! produced by an external decoder. Quality feature modules only ever
//! borrow it.

pub mod image_data;

pub use image_data::{FingerprintImage, ImageGeometry, DEFAULT_PPI, DEFAULT_WHITE_THRESHOLD};

use thiserror::Error;

/// Image construction and decoding errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Crop region {x},{y} {width}x{height} exceeds image bounds")]
    CropOutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("Image is empty after removing the white frame")]
    Empty,

    #[error("Decoding failed: {0}")]
    Decode(#[from] image::ImageError),
}
