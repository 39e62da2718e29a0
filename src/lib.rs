//! # slipmap
//!
//! Tiled "slippy map" engine core: the coordinate system that maps between
//! world, per-zoom and viewport space, tile grid enumeration with wraparound,
//! tile source addressing, multi-resolution fallback compositing for tiles
//! missing from the cache, and threaded pan/zoom animation.
//!
//! Fetching, decoding and evicting tiles are left to collaborators that
//! implement [`tiles::cache::TileCache`].

pub mod animation;
pub mod core;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::{PixelRect, ViewportRect},
    config::{AnimationConfig, AnimationProfile, MapConfig},
    geo::{TileAddress, ViewportCoord, WorldCoord, ZoomCoord},
    projection::Projection,
    view::{MapView, ViewState},
};

pub use tiles::{
    cache::{CachedTile, MemoryTileCache, TileCache},
    fallback::{CompositeTile, FallbackCompositor},
    grid::{GridTile, TileGrid},
    pyramid::{write_pyramid, PyramidMetrics},
    source::{MirrorPolicy, TileSource, TileSourceBuilder},
};

pub use layers::{
    loading::LoadingTileConfig,
    tile::{DrawStats, TilesLayer},
};

pub use rendering::{
    canvas::Canvas,
    context::{DrawCommand, RenderContext},
    image::{Opacity, TileImage},
};

pub use animation::{
    controller::MapController,
    interpolation::{AnimationType, PanCurve},
    runner::{AnimationState, PanAnimation},
};

pub use traits::{RenderTarget, TileDrawable};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A zoom level outside the active tile source's bounds. Callers are
    /// expected to clamp before addressing; this is a programming error.
    #[error("zoom level {zoom} outside tile source bounds [{min}, {max}]")]
    ZoomOutOfBounds { zoom: u32, min: u32, max: u32 },

    /// A tile column/row outside the grid of its zoom level.
    #[error("tile {0} is outside the tile grid")]
    OutOfGrid(TileAddress),

    /// Tile geometry that cannot render correctly (non power-of-two tile size,
    /// tile counts that disagree with the declared world size, ...).
    #[error("Geometry invariant violated: {0}")]
    GeometryInvariant(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Animation error: {0}")]
    Animation(String),
}

/// Error type alias for convenience
pub type Error = MapError;
