//! Shared view state: world center, zoom level and the pending zoom target.
//!
//! All fields live in one [`ViewState`] value behind a `parking_lot::RwLock`.
//! Writers replace or mutate it under the write lock, readers clone it under
//! the read lock, so a frame never sees a center from one update paired with
//! a zoom from another. The wrap flag lives there too: it decides both how
//! the center is normalized and how the tile grid treats out-of-range cells.

use crate::core::bounds::ViewportRect;
use crate::core::config::MapConfig;
use crate::core::geo::WorldCoord;
use crate::core::projection::Projection;
use crate::tiles::source::TileSource;
use crate::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// Consistent snapshot of everything a draw cycle needs.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub source: Arc<TileSource>,
    pub center: WorldCoord,
    pub zoom_level: u32,
    /// Target of a running discrete zoom animation
    pub zoom_animation: Option<u32>,
    pub projection: Arc<Projection>,
    /// Wrap the world horizontally and vertically instead of clamping
    pub wrap: bool,
}

impl ViewState {
    fn new(source: Arc<TileSource>, zoom_level: u32, wrap: bool) -> Result<Self> {
        let zoom_level = source.clamp_zoom(zoom_level);
        let projection = Arc::new(Projection::new(&source, zoom_level)?);
        Ok(Self {
            center: WorldCoord::new(source.world_width() / 2, source.world_height() / 2),
            source,
            zoom_level,
            zoom_animation: None,
            projection,
            wrap,
        })
    }

    pub fn is_animating(&self) -> bool {
        self.zoom_animation.is_some()
    }

    /// The zoom level, or the pending target when `pending` and a zoom
    /// animation is running.
    pub fn zoom_level(&self, pending: bool) -> u32 {
        match self.zoom_animation {
            Some(target) if pending => target,
            _ => self.zoom_level,
        }
    }

    pub fn viewport_rect(&self, width: u32, height: u32) -> ViewportRect {
        self.projection.viewport_rect(self.center, width, height)
    }

    /// Clamps and applies a zoom level; the projection is only rebuilt when
    /// the level actually changes.
    fn apply_zoom(&mut self, zoom_level: u32) -> Result<u32> {
        let zoom_level = self.source.clamp_zoom(zoom_level);
        if zoom_level != self.zoom_level {
            self.projection = Arc::new(Projection::new(&self.source, zoom_level)?);
            #[cfg(feature = "debug")]
            log::debug!("zoom {} -> {}, projection rebuilt", self.zoom_level, zoom_level);
            self.zoom_level = zoom_level;
        }
        Ok(zoom_level)
    }

    /// Reduces modulo the world size when wrapping, clamps into the world
    /// otherwise. Takes `i64` so callers can add offsets without overflowing.
    fn normalize_center(&self, x: i64, y: i64) -> WorldCoord {
        let width = self.source.world_width() as i64;
        let height = self.source.world_height() as i64;
        let (x, y) = if self.wrap {
            (x.rem_euclid(width), y.rem_euclid(height))
        } else {
            (x.clamp(0, width - 1), y.clamp(0, height - 1))
        };
        // both results lie in [0, world), and world sizes fit i32
        WorldCoord::new(x as i32, y as i32)
    }

    fn offset_center(&mut self, dx: i64, dy: i64) -> WorldCoord {
        let x = (self.center.x as i64).saturating_add(dx);
        let y = (self.center.y as i64).saturating_add(dy);
        self.center = self.normalize_center(x, y);
        self.center
    }
}

/// The map view entity: single owner of the current center and zoom level.
#[derive(Debug)]
pub struct MapView {
    state: RwLock<ViewState>,
}

impl MapView {
    /// Starts at the source's minimum zoom, centered on the world.
    pub fn new(source: Arc<TileSource>, config: &MapConfig) -> Result<Self> {
        let zoom_level = source.min_zoom();
        Ok(Self {
            state: RwLock::new(ViewState::new(source, zoom_level, config.wrap_map)?),
        })
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.read().clone()
    }

    pub fn tile_source(&self) -> Arc<TileSource> {
        self.state.read().source.clone()
    }

    pub fn projection(&self) -> Arc<Projection> {
        self.state.read().projection.clone()
    }

    pub fn wrap(&self) -> bool {
        self.state.read().wrap
    }

    /// Switches between wrapped and clamped world; the center is
    /// re-normalized under the new rule.
    pub fn set_wrap(&self, wrap: bool) {
        let mut state = self.state.write();
        state.wrap = wrap;
        let center = state.center;
        state.center = state.normalize_center(center.x as i64, center.y as i64);
    }

    /// Where `center` would end up if it were applied to this view.
    pub fn normalize(&self, center: WorldCoord) -> WorldCoord {
        self.state.read().normalize_center(center.x as i64, center.y as i64)
    }

    pub fn map_center(&self) -> WorldCoord {
        self.state.read().center
    }

    /// Moves the center; wrapped modulo the world size in wrap mode, clamped
    /// into the world otherwise. Returns the applied center.
    pub fn set_map_center(&self, center: WorldCoord) -> WorldCoord {
        let mut state = self.state.write();
        state.center = state.normalize_center(center.x as i64, center.y as i64);
        state.center
    }

    /// Moves the center by a world-space distance under a single write lock.
    pub fn move_by(&self, dx: i64, dy: i64) -> WorldCoord {
        self.state.write().offset_center(dx, dy)
    }

    /// Scrolls by a distance in current-zoom pixels.
    pub fn scroll_by(&self, dx: i32, dy: i32) -> WorldCoord {
        let mut state = self.state.write();
        // shift is read under the same lock so it matches the zoom in effect
        let shift = state.projection.zoom_shift();
        state.offset_center((dx as i64) << shift, (dy as i64) << shift)
    }

    pub fn zoom_level(&self, pending: bool) -> u32 {
        self.state.read().zoom_level(pending)
    }

    /// Clamps to the source bounds and returns the level actually applied.
    pub fn set_zoom_level(&self, zoom_level: u32) -> Result<u32> {
        self.state.write().apply_zoom(zoom_level)
    }

    pub fn can_zoom_in(&self) -> bool {
        let state = self.state.read();
        state.zoom_level(true) < state.source.max_zoom()
    }

    pub fn can_zoom_out(&self) -> bool {
        let state = self.state.read();
        state.zoom_level(true) > state.source.min_zoom()
    }

    pub fn is_animating(&self) -> bool {
        self.state.read().is_animating()
    }

    /// Starts a discrete zoom-in animation. Refused while one is running or at
    /// the maximum zoom.
    pub fn zoom_in(&self) -> bool {
        self.start_zoom_animation(|zoom, (_, max)| (zoom < max).then(|| zoom + 1))
    }

    pub fn zoom_out(&self) -> bool {
        self.start_zoom_animation(|zoom, (min, _)| (zoom > min).then(|| zoom - 1))
    }

    fn start_zoom_animation<F>(&self, target: F) -> bool
    where
        F: FnOnce(u32, (u32, u32)) -> Option<u32>,
    {
        let mut state = self.state.write();
        if state.is_animating() {
            return false;
        }
        match target(state.zoom_level, state.source.zoom_bounds()) {
            Some(zoom) => {
                #[cfg(feature = "debug")]
                log::debug!("zoom animation {} -> {} started", state.zoom_level, zoom);
                state.zoom_animation = Some(zoom);
                true
            }
            None => false,
        }
    }

    /// Applies the pending zoom target and clears the animation flag in one
    /// step. Returns the new level, or `None` when nothing was pending.
    pub fn finish_zoom_animation(&self) -> Result<Option<u32>> {
        let mut state = self.state.write();
        match state.zoom_animation.take() {
            Some(target) => state.apply_zoom(target).map(Some),
            None => Ok(None),
        }
    }

    /// Swaps the tile source; zoom and center are re-clamped to the new
    /// geometry and any pending zoom animation is dropped.
    pub fn set_tile_source(&self, source: Arc<TileSource>) -> Result<()> {
        let mut state = self.state.write();
        let zoom_level = source.clamp_zoom(state.zoom_level);
        let projection = Arc::new(Projection::new(&source, zoom_level)?);
        #[cfg(feature = "debug")]
        log::info!("tile source {} -> {}", state.source.name(), source.name());

        state.source = source;
        state.zoom_level = zoom_level;
        state.zoom_animation = None;
        state.projection = projection;
        let center = state.center;
        state.center = state.normalize_center(center.x as i64, center.y as i64);
        Ok(())
    }

    pub fn viewport_rect(&self, width: u32, height: u32) -> ViewportRect {
        self.state.read().viewport_rect(width, height)
    }
}
