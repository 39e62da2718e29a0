//! Decoded tile images and their opacity classification.

use crate::core::bounds::PixelRect;
use crate::traits::{RenderTarget, TileDrawable};
use crate::Result;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Opacity class of a drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opacity {
    /// Every pixel has full alpha
    Opaque,
    /// Some pixels are partially transparent
    Translucent,
    /// Every pixel has zero alpha
    Transparent,
    Unknown,
}

impl Opacity {
    /// Combined opacity of two drawables painted on top of each other.
    ///
    /// Unknown wins, then translucent; opaque only results when both are.
    pub fn resolve(self, other: Opacity) -> Opacity {
        use Opacity::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Unknown, _) | (_, Unknown) => Unknown,
            (Translucent, _) | (_, Translucent) => Translucent,
            (Transparent, _) | (_, Transparent) => Transparent,
            _ => Opaque,
        }
    }

    /// Classifies an image by scanning its alpha channel.
    pub fn of_image(image: &RgbaImage) -> Opacity {
        let mut any_opaque = false;
        let mut any_clear = false;
        for pixel in image.pixels() {
            match pixel[3] {
                255 => any_opaque = true,
                0 => any_clear = true,
                _ => return Opacity::Translucent,
            }
            if any_opaque && any_clear {
                return Opacity::Translucent;
            }
        }
        match (any_opaque, any_clear) {
            (true, false) => Opacity::Opaque,
            (false, true) => Opacity::Transparent,
            _ => Opacity::Unknown,
        }
    }
}

/// Shared, immutable tile bitmap.
#[derive(Debug, Clone)]
pub struct TileImage {
    image: Arc<RgbaImage>,
    opacity: Opacity,
}

impl TileImage {
    pub fn new(image: RgbaImage) -> Self {
        let opacity = Opacity::of_image(&image);
        Self {
            image: Arc::new(image),
            opacity,
        }
    }

    /// Single-color tile, mostly useful for tests and placeholders.
    pub fn solid(size: u32, color: [u8; 4]) -> Self {
        Self::new(RgbaImage::from_pixel(size, size, image::Rgba(color)))
    }

    /// Decodes an encoded tile (PNG) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::new(image.to_rgba8()))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether both handles point to the same bitmap.
    pub fn ptr_eq(&self, other: &TileImage) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl From<RgbaImage> for TileImage {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}

impl TileDrawable for TileImage {
    fn draw(&self, target: &mut dyn RenderTarget, bounds: PixelRect, alpha: u8) -> Result<()> {
        target.draw_image(&self.image, bounds, alpha)
    }

    fn opacity(&self) -> Opacity {
        self.opacity
    }
}
