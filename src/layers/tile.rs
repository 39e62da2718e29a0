use crate::{
    core::{bounds::ViewportRect, geo::TileAddress, view::ViewState},
    layers::loading::LoadingTileConfig,
    rendering::image::TileImage,
    tiles::{
        cache::{CachedTile, TileCache},
        fallback::FallbackCompositor,
        grid::TileGrid,
    },
    traits::{RenderTarget, TileDrawable},
    Result,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tile sizes are powers of two that fit an `i32`, one slot per exponent.
const TILE_SIZE_SHIFTS: usize = 32;

/// What one frame ended up drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawStats {
    /// Tiles the grid asked for after wrapping/skipping
    pub requested: usize,
    pub genuine: usize,
    pub composite: usize,
    pub loading: usize,
    /// Nothing drawable at all, not even a loading tile
    pub blank: usize,
    /// Cells dropped outside the world in clamped mode
    pub skipped: usize,
}

/// Raster layer painting the tiles of the view's current source.
///
/// Each tile is looked up in the cache, then synthesized by the fallback
/// compositor, then replaced by the loading placeholder, in that order.
/// Source, zoom bounds and wrap mode all come from the [`ViewState`] being
/// drawn, so a source swap or wrap toggle on the view applies to the next
/// frame.
pub struct TilesLayer {
    cache: Arc<dyn TileCache>,
    alpha: u8,
    loading: LoadingTileConfig,
    /// Loading placeholders, built lazily per tile size
    loading_tiles: [OnceCell<Option<TileImage>>; TILE_SIZE_SHIFTS],
}

impl TilesLayer {
    pub fn new(cache: Arc<dyn TileCache>) -> Self {
        Self {
            cache,
            alpha: u8::MAX,
            loading: LoadingTileConfig::default(),
            loading_tiles: std::array::from_fn(|_| OnceCell::new()),
        }
    }

    pub fn with_loading_colors(mut self, loading: LoadingTileConfig) -> Self {
        self.set_loading_colors(loading);
        self
    }

    pub fn cache(&self) -> &Arc<dyn TileCache> {
        &self.cache
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }

    pub fn loading_colors(&self) -> LoadingTileConfig {
        self.loading
    }

    /// The placeholders are rebuilt lazily on the next draw.
    pub fn set_loading_colors(&mut self, loading: LoadingTileConfig) {
        self.loading = loading;
        self.loading_tiles = std::array::from_fn(|_| OnceCell::new());
    }

    fn loading_tile(&self, tile_size: u32) -> Option<&TileImage> {
        self.loading_tiles
            .get(tile_size.trailing_zeros() as usize)?
            .get_or_init(|| self.loading.render(tile_size))
            .as_ref()
    }

    /// Draws a whole view onto a target of the target's own size.
    pub fn draw_view(&self, target: &mut dyn RenderTarget, state: &ViewState) -> Result<DrawStats> {
        let (width, height) = target.size();
        let viewport = state.viewport_rect(width, height);
        self.draw(target, state, &viewport)
    }

    /// Draws every tile intersecting `viewport` (zoom space), translated so
    /// the viewport's top-left corner lands on the target origin.
    pub fn draw(
        &self,
        target: &mut dyn RenderTarget,
        state: &ViewState,
        viewport: &ViewportRect,
    ) -> Result<DrawStats> {
        let projection = &state.projection;
        let compositor = FallbackCompositor::for_source(&state.source);
        let grid = TileGrid::new(projection, viewport, state.wrap);
        let capacity = grid.capacity_hint();
        #[cfg(feature = "debug")]
        log::debug!(
            "zoom {}: {}x{} tile grid, capacity hint {}",
            grid.zoom_level(),
            grid.column_count(),
            grid.row_count(),
            capacity
        );
        self.cache.ensure_capacity(capacity);

        let mut stats = DrawStats::default();
        for tile in grid.iter() {
            stats.requested += 1;
            let dest = projection
                .tile_rect(tile.column, tile.row)
                .offset(-viewport.left, -viewport.top);

            target.save();
            target.clip_rect(dest);
            let drawn = self.draw_tile(
                target,
                &compositor,
                &tile.address,
                dest,
                projection.tile_size_pixels(),
                &mut stats,
            );
            target.restore();
            drawn?;
        }
        stats.skipped = capacity - stats.requested;
        Ok(stats)
    }

    fn draw_tile(
        &self,
        target: &mut dyn RenderTarget,
        compositor: &FallbackCompositor,
        address: &TileAddress,
        dest: ViewportRect,
        tile_size: u32,
        stats: &mut DrawStats,
    ) -> Result<()> {
        if let Some(tile) = self.cache.get(address) {
            match tile {
                CachedTile::Genuine(_) => stats.genuine += 1,
                CachedTile::Composite(_) => stats.composite += 1,
            }
            return tile.draw(target, dest, self.alpha);
        }

        if let Some(composite) = compositor.compose(address, self.cache.as_ref()) {
            stats.composite += 1;
            return composite.draw(target, dest, self.alpha);
        }

        match self.loading_tile(tile_size) {
            Some(loading) => {
                stats.loading += 1;
                loading.draw(target, dest, self.alpha)
            }
            None => {
                stats.blank += 1;
                Ok(())
            }
        }
    }
}
