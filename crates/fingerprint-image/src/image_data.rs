//! Raw fingerprint image and geometry helpers

use crate::ImageError;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Resolution most fingerprint scanners deliver (pixels per inch)
pub const DEFAULT_PPI: u16 = 500;

/// Mean row/column intensity at which a border line counts as white
pub const DEFAULT_WHITE_THRESHOLD: u8 = 250;

/// Width, height and resolution of an image, without its pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
    pub ppi: u16,
}

/// Raw 8-bit grayscale fingerprint image
///
/// Pixels are stored row-major, one byte per pixel, `0` is black. The
/// buffer is never mutated after construction; every transformation
/// returns a new image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    ppi: u16,
}

impl FingerprintImage {
    /// Create an image from a raw row-major buffer
    pub fn new(data: Vec<u8>, width: u32, height: u32, ppi: u16) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }

        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            ppi,
        })
    }

    /// Create an image where every pixel has the same value
    pub fn uniform(width: u32, height: u32, value: u8, ppi: u16) -> Result<Self, ImageError> {
        let len = width as usize * height as usize;
        Self::new(vec![value; len], width, height, ppi)
    }

    /// Wrap an already decoded grayscale image
    pub fn from_gray_image(gray: GrayImage, ppi: u16) -> Result<Self, ImageError> {
        let (width, height) = gray.dimensions();
        Self::new(gray.into_raw(), width, height, ppi)
    }

    /// Decode an image file and convert it to 8-bit grayscale
    pub fn open(path: impl AsRef<Path>, ppi: u16) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let decoded = image::open(path)?;
        debug!(
            "Decoded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Self::from_gray_image(decoded.to_luma8(), ppi)
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resolution in pixels per inch
    pub fn ppi(&self) -> u16 {
        self.ppi
    }

    pub fn geometry(&self) -> ImageGeometry {
        ImageGeometry {
            width: self.width,
            height: self.height,
            ppi: self.ppi,
        }
    }

    /// Whole pixel buffer, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Get pixel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// One row of pixels
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(&self.data[start..start + self.width as usize])
    }

    /// Copy a rectangular region into a new image
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Result<FingerprintImage, ImageError> {
        let fits = x.checked_add(w).is_some_and(|r| r <= self.width)
            && y.checked_add(h).is_some_and(|b| b <= self.height);
        if !fits || w == 0 || h == 0 {
            return Err(ImageError::CropOutOfBounds {
                x,
                y,
                width: w,
                height: h,
            });
        }

        let mut cropped = Vec::with_capacity(w as usize * h as usize);
        for row in y..(y + h) {
            let start = row as usize * self.width as usize + x as usize;
            cropped.extend_from_slice(&self.data[start..start + w as usize]);
        }

        Self::new(cropped, w, h, self.ppi)
    }

    /// Remove near-white rows and columns surrounding the fingerprint
    ///
    /// A border row or column is dropped while its mean intensity is at or
    /// above `threshold`. Interior white lines are kept.
    pub fn remove_white_frame(&self, threshold: u8) -> Result<FingerprintImage, ImageError> {
        let limit = threshold as f64;
        let row_mean = |y: u32| -> f64 {
            let row = &self.data[y as usize * self.width as usize..][..self.width as usize];
            row.iter().map(|&p| p as f64).sum::<f64>() / self.width as f64
        };

        let top = (0..self.height).find(|&y| row_mean(y) < limit);
        let Some(top) = top else {
            return Err(ImageError::Empty);
        };
        // A row below `limit` exists, so the reverse search always succeeds
        let bottom = (top..self.height).rev().find(|&y| row_mean(y) < limit).unwrap_or(top);

        let rows = bottom - top + 1;
        let col_mean = |x: u32| -> f64 {
            let sum: f64 = (top..=bottom)
                .map(|y| self.data[y as usize * self.width as usize + x as usize] as f64)
                .sum();
            sum / rows as f64
        };

        let Some(left) = (0..self.width).find(|&x| col_mean(x) < limit) else {
            return Err(ImageError::Empty);
        };
        let right = (left..self.width).rev().find(|&x| col_mean(x) < limit).unwrap_or(left);

        debug!(
            "White frame removed: {}x{} -> {}x{}",
            self.width,
            self.height,
            right - left + 1,
            rows
        );
        self.crop(left, top, right - left + 1, rows)
    }
}
