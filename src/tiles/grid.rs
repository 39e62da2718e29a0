//! Enumeration of the tiles covering a viewport.

use crate::core::bounds::ViewportRect;
use crate::core::geo::{floor_div, floor_mod, TileAddress};
use crate::core::projection::Projection;

/// One cell of the grid: the address to look up plus the unwrapped
/// column/row that decides where on screen the tile is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTile {
    pub address: TileAddress,
    pub column: i32,
    pub row: i32,
}

/// Tile columns/rows intersecting a viewport rectangle at one zoom level.
///
/// The range starts one tile before the first tile touching the viewport so
/// that a partially scrolled-in tile on the leading edge is never missed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    zoom_level: u32,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    tile_count_x: i32,
    tile_count_y: i32,
    wrap: bool,
}

impl TileGrid {
    pub fn new(projection: &Projection, viewport: &ViewportRect, wrap: bool) -> Self {
        let size = projection.tile_size_pixels() as i32;

        // right/bottom are exclusive, the last covered pixel is one before
        Self {
            zoom_level: projection.zoom_level(),
            left: floor_div(viewport.left, size) - 1,
            top: floor_div(viewport.top, size) - 1,
            right: floor_div(viewport.right - 1, size),
            bottom: floor_div(viewport.bottom - 1, size),
            tile_count_x: projection.tile_count_x(),
            tile_count_y: projection.tile_count_y(),
            wrap,
        }
    }

    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    /// Inclusive unwrapped column range.
    pub fn columns(&self) -> (i32, i32) {
        (self.left, self.right)
    }

    /// Inclusive unwrapped row range.
    pub fn rows(&self) -> (i32, i32) {
        (self.top, self.bottom)
    }

    pub fn column_count(&self) -> usize {
        (self.right - self.left + 1).max(0) as usize
    }

    pub fn row_count(&self) -> usize {
        (self.bottom - self.top + 1).max(0) as usize
    }

    /// Number of cells in the grid, handed to the cache so it can hold at
    /// least one frame's worth of tiles.
    pub fn capacity_hint(&self) -> usize {
        self.column_count() * self.row_count()
    }

    /// Wraps or rejects an unwrapped column/row.
    pub fn resolve(&self, column: i32, row: i32) -> Option<TileAddress> {
        if self.wrap {
            return Some(TileAddress::new(
                self.zoom_level,
                floor_mod(column, self.tile_count_x),
                floor_mod(row, self.tile_count_y),
            ));
        }
        let address = TileAddress::new(self.zoom_level, column, row);
        address
            .is_within(self.tile_count_x, self.tile_count_y)
            .then_some(address)
    }

    /// Row-major iteration over every cell that resolves to a tile.
    pub fn iter(&self) -> impl Iterator<Item = GridTile> + '_ {
        (self.top..=self.bottom).flat_map(move |row| {
            (self.left..=self.right).filter_map(move |column| {
                self.resolve(column, row).map(|address| GridTile {
                    address,
                    column,
                    row,
                })
            })
        })
    }

    /// Cells dropped because they fall outside the world in clamped mode.
    pub fn skipped(&self) -> usize {
        self.capacity_hint() - self.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounds::PixelRect;
    use crate::core::geo::WorldCoord;
    use crate::tiles::source::TileSource;
    use fxhash::FxHashSet;

    fn projection(zoom: u32) -> Projection {
        Projection::new(&TileSource::mapnik(), zoom).unwrap()
    }

    #[test]
    fn test_single_tile_viewport_includes_leading_pad() {
        let projection = projection(10);
        let grid = TileGrid::new(&projection, &PixelRect::new(512, 512, 768, 768), true);
        assert_eq!(grid.columns(), (1, 2));
        assert_eq!(grid.rows(), (1, 2));
        assert_eq!(grid.capacity_hint(), 4);
        assert_eq!(grid.iter().count(), 4);
    }

    #[test]
    fn test_centered_viewport_covers_center_tile() {
        let projection = projection(10);
        let center = WorldCoord::new(1 << 25, 1 << 25);
        let rect = projection.viewport_rect(center, 512, 512);
        let grid = TileGrid::new(&projection, &rect, true);

        let addresses: Vec<TileAddress> = grid.iter().map(|tile| tile.address).collect();
        let unique: FxHashSet<TileAddress> = addresses.iter().copied().collect();
        assert_eq!(addresses.len(), 9);
        assert_eq!(unique.len(), 9);
        assert!(unique.contains(&TileAddress::new(10, 512, 512)));
        assert!(unique.contains(&TileAddress::new(10, 510, 510)));
    }

    #[test]
    fn test_iteration_is_row_major() {
        let projection = projection(4);
        let grid = TileGrid::new(&projection, &PixelRect::new(256, 256, 768, 512), false);
        let cells: Vec<(i32, i32)> = grid.iter().map(|tile| (tile.column, tile.row)).collect();
        assert_eq!(cells.first(), Some(&(0, 0)));
        assert_eq!(cells[1], (1, 0));
        assert!(cells.windows(2).all(|pair| pair[0].1 <= pair[1].1));
    }

    #[test]
    fn test_wrapped_addresses_stay_in_range() {
        let projection = projection(2);
        let grid = TileGrid::new(&projection, &PixelRect::new(-700, -300, 1400, 900), true);
        for tile in grid.iter() {
            assert!(tile.address.is_within(4, 4), "{}", tile.address);
        }
        let wrapped = grid.resolve(-1, -5).unwrap();
        assert_eq!((wrapped.x, wrapped.y), (3, 3));
        assert_eq!(grid.skipped(), 0);
    }

    #[test]
    fn test_clamped_mode_skips_outside_tiles() {
        let projection = projection(1);
        let grid = TileGrid::new(&projection, &PixelRect::new(-100, -100, 612, 612), false);
        let addresses: Vec<TileAddress> = grid.iter().map(|tile| tile.address).collect();
        assert_eq!(addresses.len(), 4);
        assert!(addresses
            .iter()
            .all(|address| address.is_within(2, 2) && address.zoom == 1));
        assert_eq!(grid.skipped(), grid.capacity_hint() - 4);
    }

    #[test]
    fn test_zoom_zero_wraps_to_single_tile() {
        let projection = projection(0);
        let grid = TileGrid::new(&projection, &PixelRect::new(-256, -256, 512, 512), true);
        assert!(grid
            .iter()
            .all(|tile| tile.address == TileAddress::new(0, 0, 0)));
    }
}
