//! Borrowed and owned grayscale frames.

use crate::geometry::PixelPoint;

#[derive(thiserror::Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ImageViewError {
    #[error("grayscale buffer length mismatch (expected {expected} bytes, got {got})")]
    BufferLength { expected: usize, got: usize },
    #[error("grayscale dimensions overflow (width={width}, height={height})")]
    Dimensions { width: usize, height: usize },
}

/// Borrowed 8-bit frame, row-major, `width * height` bytes.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

impl<'a> GrayImageView<'a> {
    /// Wrap a row-major buffer, checking its length against the dimensions.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageViewError> {
        let expected = width
            .checked_mul(height)
            .ok_or(ImageViewError::Dimensions { width, height })?;
        if data.len() != expected {
            return Err(ImageViewError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Intensity at `(x, y)`, `None` outside the frame.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width + x as usize).copied()
    }

    #[inline]
    pub fn pixel_at(&self, p: PixelPoint) -> Option<u8> {
        self.pixel(p.x, p.y)
    }
}

#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Constant-valued frame.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Overwrite `(x, y)`; out-of-frame writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }
}
