//! Engine-wide defaults for tile geometry, animations and the loading tile.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Default zoom range of the bundled OpenStreetMap preset.
pub const DEFAULT_MIN_ZOOM: u32 = 0;
pub const DEFAULT_MAX_ZOOM: u32 = 18;

/// Animation step counts.
pub const ANIMATION_SMOOTHNESS_LOW: u32 = 4;
pub const ANIMATION_SMOOTHNESS_DEFAULT: u32 = 10;
pub const ANIMATION_SMOOTHNESS_HIGH: u32 = 20;

/// Animation durations in milliseconds.
pub const ANIMATION_DURATION_SHORT: u64 = 250;
pub const ANIMATION_DURATION_DEFAULT: u64 = 500;
pub const ANIMATION_DURATION_LONG: u64 = 2000;

/// Loading tile colors (RGBA).
pub const LOADING_BACKGROUND_COLOR: [u8; 4] = [216, 208, 208, 255];
pub const LOADING_LINE_COLOR: [u8; 4] = [200, 192, 192, 255];

/// The loading tile draws a grid of this many cells per side.
pub const LOADING_GRID_DIVISIONS: u32 = 16;

/// Default capacity of the in-memory tile cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;
