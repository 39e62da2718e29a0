//! Prelude module for common slipmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use slipmap::prelude::*;`

pub use crate::core::{
    bounds::{PixelRect, ViewportRect},
    config::{AnimationConfig, AnimationProfile, MapConfig},
    geo::{TileAddress, ViewportCoord, WorldCoord, ZoomCoord},
    projection::Projection,
    view::{MapView, ViewState},
};

pub use crate::tiles::{
    cache::{CachedTile, MemoryTileCache, TileCache},
    fallback::{CompositeTile, FallbackCompositor},
    grid::{GridTile, TileGrid},
    pyramid::{write_pyramid, PyramidMetrics},
    source::{MirrorPolicy, TileSource},
};

pub use crate::layers::{
    loading::LoadingTileConfig,
    tile::{DrawStats, TilesLayer},
};

pub use crate::rendering::{
    canvas::Canvas,
    context::{DrawCommand, RenderContext},
    image::{Opacity, TileImage},
};

pub use crate::animation::{
    controller::MapController,
    interpolation::{AnimationType, PanCurve},
    runner::{AnimationState, PanAnimation},
};

pub use crate::traits::{RenderTarget, TileDrawable};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
