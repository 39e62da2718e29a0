//! Per-zoom coordinate transform between world, zoom and viewport space.
//!
//! A [`Projection`] depends only on the zoom level and the tile source
//! geometry, so it is built once per zoom change and shared read-only by the
//! draw path and the animator.

use crate::core::bounds::{PixelRect, ViewportRect};
use crate::core::geo::{floor_div, TileAddress, ViewportCoord, WorldCoord, ZoomCoord};
use crate::tiles::source::TileSource;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    zoom_level: u32,
    max_zoom: u32,
    tile_size: u32,
    zoom_width: i32,
    zoom_height: i32,
    tile_count_x: i32,
    tile_count_y: i32,
    half_world_width: i32,
    half_world_height: i32,
}

impl Projection {
    /// The zoom level must already be clamped to the source bounds; anything
    /// else is reported as [`crate::MapError::ZoomOutOfBounds`].
    pub fn new(source: &TileSource, zoom_level: u32) -> Result<Self> {
        source.check_zoom(zoom_level)?;

        let zoom_width = source.zoom_width(zoom_level);
        let zoom_height = source.zoom_height(zoom_level);
        Ok(Self {
            zoom_level,
            max_zoom: source.max_zoom(),
            tile_size: source.tile_size_pixels(),
            zoom_width,
            zoom_height,
            tile_count_x: source.tile_count_x(zoom_level),
            tile_count_y: source.tile_count_y(zoom_level),
            half_world_width: zoom_width / 2,
            half_world_height: zoom_height / 2,
        })
    }

    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    pub fn tile_size_pixels(&self) -> u32 {
        self.tile_size
    }

    /// Number of bits separating world space from this zoom's pixel space.
    pub fn zoom_shift(&self) -> u32 {
        self.max_zoom - self.zoom_level
    }

    pub fn tile_count_x(&self) -> i32 {
        self.tile_count_x
    }

    pub fn tile_count_y(&self) -> i32 {
        self.tile_count_y
    }

    /// World width in pixels at this zoom level.
    pub fn zoom_width(&self) -> i32 {
        self.zoom_width
    }

    pub fn zoom_height(&self) -> i32 {
        self.zoom_height
    }

    pub fn half_world_width(&self) -> i32 {
        self.half_world_width
    }

    pub fn half_world_height(&self) -> i32 {
        self.half_world_height
    }

    /// Arithmetic right shift: floors toward negative infinity so coordinates
    /// left of / above the world origin stay on the correct tile.
    pub fn to_zoom_space(&self, world: WorldCoord) -> ZoomCoord {
        let shift = self.zoom_shift();
        ZoomCoord::new(world.x >> shift, world.y >> shift)
    }

    /// Inverse of [`Self::to_zoom_space`] at pixel granularity of this zoom:
    /// the sub-pixel bits dropped on the way down are not recovered.
    pub fn to_world_space(&self, zoom: ZoomCoord) -> WorldCoord {
        let shift = self.zoom_shift();
        WorldCoord::new(zoom.x << shift, zoom.y << shift)
    }

    pub fn to_viewport(&self, world: WorldCoord) -> ViewportCoord {
        let zoom = self.to_zoom_space(world);
        ViewportCoord::new(
            zoom.x - self.half_world_width,
            zoom.y - self.half_world_height,
        )
    }

    pub fn from_viewport(&self, viewport: ViewportCoord) -> WorldCoord {
        self.to_world_space(ZoomCoord::new(
            viewport.x + self.half_world_width,
            viewport.y + self.half_world_height,
        ))
    }

    /// Scroll offset of a view centered on `center`, in the centered frame.
    pub fn scroll_offset(&self, center: WorldCoord) -> ViewportCoord {
        self.to_viewport(center)
    }

    /// World position of a screen pixel given as an offset from the visual
    /// center of a view centered on `center`.
    pub fn screen_to_world(&self, offset_from_center: ViewportCoord, center: WorldCoord) -> WorldCoord {
        self.from_viewport(offset_from_center + self.scroll_offset(center))
    }

    /// Zoom-space rectangle of a `width` x `height` viewport centered on
    /// `center` (already offset by half the world size).
    pub fn viewport_rect(&self, center: WorldCoord, width: u32, height: u32) -> ViewportRect {
        let zoom = self.to_zoom_space(center);
        PixelRect::from_center_and_size(zoom.x, zoom.y, width, height)
    }

    /// Zoom-space pixel rectangle of an (unwrapped) tile column/row.
    pub fn tile_rect(&self, column: i32, row: i32) -> PixelRect {
        let size = self.tile_size as i32;
        PixelRect::from_origin_size(column * size, row * size, size, size)
    }

    /// Tile containing a world position at this zoom level (not wrapped).
    pub fn tile_at(&self, world: WorldCoord) -> TileAddress {
        let zoom = self.to_zoom_space(world);
        let size = self.tile_size as i32;
        TileAddress::new(self.zoom_level, floor_div(zoom.x, size), floor_div(zoom.y, size))
    }
}
