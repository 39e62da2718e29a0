//! Neutral placeholder drawn when neither the tile nor a fallback is available.

use crate::core::constants::{LOADING_BACKGROUND_COLOR, LOADING_GRID_DIVISIONS, LOADING_LINE_COLOR};
use crate::rendering::canvas::try_alloc_image;
use crate::rendering::image::TileImage;
use image::Rgba;
use serde::{Deserialize, Serialize};

/// Colors of the loading placeholder. A fully transparent background turns
/// the placeholder off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingTileConfig {
    pub background: [u8; 4],
    pub line: [u8; 4],
}

impl Default for LoadingTileConfig {
    fn default() -> Self {
        Self {
            background: LOADING_BACKGROUND_COLOR,
            line: LOADING_LINE_COLOR,
        }
    }
}

impl LoadingTileConfig {
    pub fn is_enabled(&self) -> bool {
        self.background[3] != 0
    }

    /// Renders a `tile_size` square: background fill crossed by grid lines
    /// every `tile_size / 16` pixels. `None` when disabled or out of memory.
    pub fn render(&self, tile_size: u32) -> Option<TileImage> {
        if !self.is_enabled() || tile_size == 0 {
            return None;
        }

        let mut image = try_alloc_image(tile_size, tile_size)?;
        for pixel in image.pixels_mut() {
            *pixel = Rgba(self.background);
        }

        let step = (tile_size / LOADING_GRID_DIVISIONS).max(1) as usize;
        for offset in (0..tile_size).step_by(step) {
            for along in 0..tile_size {
                image.put_pixel(along, offset, Rgba(self.line));
                image.put_pixel(offset, along, Rgba(self.line));
            }
        }
        Some(TileImage::new(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::image::Opacity;
    use crate::traits::TileDrawable;

    #[test]
    fn test_grid_lines() {
        let tile = LoadingTileConfig::default().render(256).unwrap();
        let image = tile.image();
        assert_eq!(image.get_pixel(0, 5).0, LOADING_LINE_COLOR);
        assert_eq!(image.get_pixel(16, 5).0, LOADING_LINE_COLOR);
        assert_eq!(image.get_pixel(5, 32).0, LOADING_LINE_COLOR);
        assert_eq!(image.get_pixel(5, 5).0, LOADING_BACKGROUND_COLOR);
        assert_eq!(image.get_pixel(255, 255).0, LOADING_BACKGROUND_COLOR);
        assert_eq!(tile.opacity(), Opacity::Opaque);
    }

    #[test]
    fn test_transparent_background_disables() {
        let config = LoadingTileConfig {
            background: [0, 0, 0, 0],
            ..Default::default()
        };
        assert!(!config.is_enabled());
        assert!(config.render(256).is_none());
    }

    #[test]
    fn test_tiny_tiles_still_render() {
        let tile = LoadingTileConfig::default().render(8).unwrap();
        // step clamps to one pixel, so every pixel is a line
        assert!(tile.image().pixels().all(|pixel| pixel.0 == LOADING_LINE_COLOR));
    }
}
