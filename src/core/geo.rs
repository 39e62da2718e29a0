use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Mathematical modulo: the result is always in `[0, modulus)` for a positive
/// modulus, unlike `%` which keeps the sign of the dividend.
#[inline]
pub fn floor_mod(value: i32, modulus: i32) -> i32 {
    value.rem_euclid(modulus)
}

/// Floor division for a positive divisor.
#[inline]
pub fn floor_div(value: i32, divisor: i32) -> i32 {
    value.div_euclid(divisor)
}

/// Identifies a tile by zoom level and grid column/row.
///
/// Outside of enumeration the coordinates satisfy `0 <= x < tile_count_x(zoom)`
/// (same for `y`); the tile grid enumerator may hold unwrapped values transiently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileAddress {
    pub zoom: u32,
    pub x: i32,
    pub y: i32,
}

impl TileAddress {
    pub fn new(zoom: u32, x: i32, y: i32) -> Self {
        Self { zoom, x, y }
    }

    /// The tile one level up that contains this one.
    pub fn parent(&self) -> Option<TileAddress> {
        if self.zoom == 0 {
            None
        } else {
            Some(TileAddress::new(self.zoom - 1, self.x >> 1, self.y >> 1))
        }
    }

    /// The four tiles one level down, in NW, NE, SW, SE order.
    pub fn children(&self) -> [TileAddress; 4] {
        let zoom = self.zoom + 1;
        let x = self.x << 1;
        let y = self.y << 1;
        [
            TileAddress::new(zoom, x, y),
            TileAddress::new(zoom, x + 1, y),
            TileAddress::new(zoom, x, y + 1),
            TileAddress::new(zoom, x + 1, y + 1),
        ]
    }

    /// Position of this tile inside its parent: `(x & 1, y & 1)`.
    pub fn quadrant(&self) -> (i32, i32) {
        (self.x & 1, self.y & 1)
    }

    /// Checks the address against a tile grid of the given dimensions.
    pub fn is_within(&self, tile_count_x: i32, tile_count_y: i32) -> bool {
        0 <= self.x && self.x < tile_count_x && 0 <= self.y && self.y < tile_count_y
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

macro_rules! pixel_coord {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            pub x: i32,
            pub y: i32,
        }

        impl $name {
            pub const fn new(x: i32, y: i32) -> Self {
                Self { x, y }
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self::new(self.x + rhs.x, self.y + rhs.y)
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self::new(self.x - rhs.x, self.y - rhs.y)
            }
        }
    };
}

pixel_coord!(
    /// Absolute pixel position at the maximum zoom level of the tile source.
    /// Its meaning never changes when the current zoom changes.
    WorldCoord
);

pixel_coord!(
    /// Pixel position at the current zoom level.
    ZoomCoord
);

pixel_coord!(
    /// Pixel position in the centered frame: zoom-space position minus half the
    /// world size at the current zoom.
    ViewportCoord
);
