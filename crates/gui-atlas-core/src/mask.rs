use crate::error::{AtlasError, Result};

/// Binary opacity mask: a pixel is opaque when its source alpha is non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl PixelMask {
    /// Builds the mask from tightly packed RGBA8 bytes.
    ///
    /// Fails with `InvalidBuffer` when `pixels.len() != width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(AtlasError::InvalidDimensions { width, height })?;
        if pixels.len() != expected {
            return Err(AtlasError::InvalidBuffer {
                expected,
                actual: pixels.len(),
            });
        }
        let bits = pixels.chunks_exact(4).map(|px| px[3] > 0).collect();
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Builds the mask from a decoded image.
    #[cfg(feature = "image")]
    pub fn from_image(image: &image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let bits = image.pixels().map(|p| p[3] > 0).collect();
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns false for coordinates outside the mask.
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[self.index(x, y)]
    }

    pub fn opaque_count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    pub(crate) fn bits(&self) -> &[bool] {
        &self.bits
    }
}
