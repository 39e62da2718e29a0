//! Cuts a large image into a zoomable tile pyramid on disk.
//!
//! The deepest level holds the image at full resolution; each level above it
//! halves the resolution until the whole image fits in a single tile. Tiles
//! are written as `dest/z/x/y.png` and partial edge tiles are padded with
//! transparency so every tile is a full square.

use crate::core::geo::TileAddress;
use crate::{MapError, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Geometry of the pyramid built from a `width` x `height` image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidMetrics {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    /// Tile columns at full resolution
    pub x_tile_count: u32,
    /// Tile rows at full resolution
    pub y_tile_count: u32,
    pub max_tile_count: u32,
    /// Deepest zoom level; level 0 fits in one tile
    pub zoom_levels: u32,
    /// Transparent padding added on the right of the last column
    pub pad_width: u32,
    /// Transparent padding added below the last row
    pub pad_height: u32,
}

impl PyramidMetrics {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::GeometryInvariant(format!(
                "cannot slice an empty {}x{} image",
                width, height
            )));
        }
        if !tile_size.is_power_of_two() {
            return Err(MapError::GeometryInvariant(format!(
                "tile size {} is not a power of two",
                tile_size
            )));
        }

        let x_tile_count = width.div_ceil(tile_size);
        let y_tile_count = height.div_ceil(tile_size);
        let max_tile_count = x_tile_count.max(y_tile_count);
        Ok(Self {
            width,
            height,
            tile_size,
            x_tile_count,
            y_tile_count,
            max_tile_count,
            zoom_levels: max_tile_count.next_power_of_two().trailing_zeros(),
            pad_width: x_tile_count * tile_size - width,
            pad_height: y_tile_count * tile_size - height,
        })
    }

    /// Downscale factor of a level relative to the full-resolution image.
    pub fn level_scale(&self, level: u32) -> u32 {
        1 << (self.zoom_levels - level.min(self.zoom_levels))
    }

    /// Image size at a level, rounded up so no source pixel is lost.
    pub fn level_size(&self, level: u32) -> (u32, u32) {
        let scale = self.level_scale(level);
        (self.width.div_ceil(scale), self.height.div_ceil(scale))
    }

    /// Tile columns and rows at a level.
    pub fn level_tile_counts(&self, level: u32) -> (u32, u32) {
        let (width, height) = self.level_size(level);
        (width.div_ceil(self.tile_size), height.div_ceil(self.tile_size))
    }

    /// Scales the image down to `level` and cuts it into full-size tiles in
    /// column-major order.
    pub fn slice_level(&self, image: &RgbaImage, level: u32) -> Vec<(TileAddress, RgbaImage)> {
        let (width, height) = self.level_size(level);
        let scaled = if (width, height) == image.dimensions() {
            image.clone()
        } else {
            imageops::resize(image, width, height, FilterType::Triangle)
        };

        let (columns, rows) = self.level_tile_counts(level);
        let size = self.tile_size;
        let mut tiles = Vec::with_capacity((columns * rows) as usize);
        for x in 0..columns {
            for y in 0..rows {
                let tile_width = size.min(width - x * size);
                let tile_height = size.min(height - y * size);
                let piece = imageops::crop_imm(&scaled, x * size, y * size, tile_width, tile_height).to_image();

                let mut tile = RgbaImage::new(size, size);
                imageops::replace(&mut tile, &piece, 0, 0);
                tiles.push((TileAddress::new(level, x as i32, y as i32), tile));
            }
        }
        tiles
    }
}

/// Writes every level of the pyramid under `dest` and returns the metrics
/// together with the number of tiles written.
pub fn write_pyramid(image: &RgbaImage, tile_size: u32, dest: &Path) -> Result<(PyramidMetrics, usize)> {
    let metrics = PyramidMetrics::new(image.width(), image.height(), tile_size)?;
    #[cfg(feature = "debug")]
    log::info!(
        "slicing {}x{} image into {} levels of {}px tiles",
        metrics.width,
        metrics.height,
        metrics.zoom_levels + 1,
        tile_size
    );

    let mut written = 0;
    for level in 0..=metrics.zoom_levels {
        for (address, tile) in metrics.slice_level(image, level) {
            let column_dir = dest.join(address.zoom.to_string()).join(address.x.to_string());
            fs::create_dir_all(&column_dir)?;
            tile.save(column_dir.join(format!("{}.png", address.y)))?;
            written += 1;
        }
        #[cfg(feature = "debug")]
        log::debug!("level {} done, {} tiles so far", level, written);
    }
    Ok((metrics, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::source::TileSource;
    use image::Rgba;

    #[test]
    fn test_metrics() {
        let metrics = PyramidMetrics::new(5000, 3000, 256).unwrap();
        assert_eq!(metrics.x_tile_count, 20);
        assert_eq!(metrics.y_tile_count, 12);
        assert_eq!(metrics.max_tile_count, 20);
        assert_eq!(metrics.zoom_levels, 5);
        assert_eq!(metrics.pad_width, 120);
        assert_eq!(metrics.pad_height, 72);
        assert_eq!(metrics.level_tile_counts(5), (20, 12));
        assert_eq!(metrics.level_tile_counts(0), (1, 1));
    }

    #[test]
    fn test_single_tile_image_has_one_level() {
        let metrics = PyramidMetrics::new(200, 100, 256).unwrap();
        assert_eq!(metrics.zoom_levels, 0);
        assert_eq!(metrics.level_size(0), (200, 100));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            PyramidMetrics::new(0, 10, 256),
            Err(MapError::GeometryInvariant(_))
        ));
        assert!(matches!(
            PyramidMetrics::new(10, 10, 100),
            Err(MapError::GeometryInvariant(_))
        ));
    }

    #[test]
    fn test_edge_tiles_are_padded() {
        let image = RgbaImage::from_pixel(20, 12, Rgba([9, 8, 7, 255]));
        let metrics = PyramidMetrics::new(20, 12, 8).unwrap();
        let tiles = metrics.slice_level(&image, metrics.zoom_levels);
        assert_eq!(tiles.len(), 3 * 2);

        let (address, corner) = tiles.last().unwrap();
        assert_eq!(*address, TileAddress::new(2, 2, 1));
        assert_eq!(corner.dimensions(), (8, 8));
        assert_eq!(corner.get_pixel(3, 3).0, [9, 8, 7, 255]);
        assert_eq!(corner.get_pixel(4, 3).0[3], 0);
        assert_eq!(corner.get_pixel(3, 4).0[3], 0);
    }

    #[test]
    fn test_levels_match_tile_source_geometry() {
        let metrics = PyramidMetrics::new(5000, 3000, 256).unwrap();
        let source = TileSource::for_pyramid("poster", &metrics, "file:///tiles/").unwrap();
        for level in 0..=metrics.zoom_levels {
            let (columns, rows) = metrics.level_tile_counts(level);
            assert_eq!(source.tile_count_x(level), columns as i32, "level {}", level);
            assert_eq!(source.tile_count_y(level), rows as i32, "level {}", level);
        }
    }

    #[test]
    fn test_write_pyramid_layout() {
        let dest = std::env::temp_dir().join(format!("slipmap-pyramid-{}", std::process::id()));
        let image = RgbaImage::from_pixel(24, 10, Rgba([1, 2, 3, 255]));
        let (metrics, written) = write_pyramid(&image, 8, &dest).unwrap();

        // levels 0..=2: 1x1, 2x1, 3x2
        assert_eq!(metrics.zoom_levels, 2);
        assert_eq!(written, 1 + 2 + 6);
        assert!(dest.join("2/2/1.png").is_file());
        assert!(dest.join("0/0/0.png").is_file());

        let tile = image::open(dest.join("1/1/0.png")).unwrap().to_rgba8();
        assert_eq!(tile.dimensions(), (8, 8));
        fs::remove_dir_all(&dest).unwrap();
    }
}
