pub mod cache;
pub mod fallback;
pub mod grid;
pub mod pyramid;
pub mod source;

// Re-exports for convenience
pub use cache::{CachedTile, MemoryTileCache, TileCache};
pub use fallback::{CompositeSource, CompositeTile, FallbackCompositor};
pub use grid::{GridTile, TileGrid};
pub use pyramid::{write_pyramid, PyramidMetrics};
pub use source::{MirrorPolicy, TileSource, TileSourceBuilder};
