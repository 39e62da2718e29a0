use crate::core::constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, TILE_SIZE};
use crate::core::geo::TileAddress;
use crate::tiles::pyramid::PyramidMetrics;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deepest zoom the integer coordinate model supports (world pixels must fit in `i32`).
const MAX_SUPPORTED_ZOOM: u32 = 30;

/// How a mirror base URL is picked for each request.
///
/// Every mirror is expected to serve identical content, so any policy yields
/// cache-equivalent results for the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MirrorPolicy {
    /// Always the first base URL.
    Fixed,
    /// Cycle through the mirrors request by request.
    RoundRobin,
    /// `(x + y) mod mirrors`, so one address always lands on the same mirror.
    #[default]
    ByAddress,
}

/// XYZ tile source: maps a [`TileAddress`] to `base + zoom/x/y + extension`
/// and describes the tile grid geometry at every zoom level.
///
/// Immutable after construction apart from the round-robin cursor; share it
/// behind an `Arc`.
#[derive(Debug)]
pub struct TileSource {
    name: String,
    min_zoom: u32,
    max_zoom: u32,
    tile_size: u32,
    image_extension: String,
    base_urls: Vec<String>,
    world_width: i32,
    world_height: i32,
    mirror_policy: MirrorPolicy,
    next_mirror: AtomicUsize,
}

impl TileSource {
    pub fn builder(name: impl Into<String>) -> TileSourceBuilder {
        TileSourceBuilder::new(name)
    }

    /// Standard OpenStreetMap raster tiles, zoom 0-18, 256px, a/b/c mirrors.
    pub fn mapnik() -> Self {
        TileSource::builder("Mapnik")
            .zoom_range(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
            .tile_size(TILE_SIZE)
            .image_extension(".png")
            .base_urls([
                "https://a.tile.openstreetmap.org/",
                "https://b.tile.openstreetmap.org/",
                "https://c.tile.openstreetmap.org/",
            ])
            .build()
            .expect("mapnik preset geometry is valid")
    }

    /// Source matching a pyramid produced by [`crate::tiles::pyramid::write_pyramid`]:
    /// the world is the source image at full resolution on the deepest level.
    pub fn for_pyramid(
        name: impl Into<String>,
        metrics: &PyramidMetrics,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        TileSource::builder(name)
            .zoom_range(0, metrics.zoom_levels)
            .tile_size(metrics.tile_size)
            .image_extension(".png")
            .base_url(base_url)
            .world_size(metrics.width as i32, metrics.height as i32)
            .mirror_policy(MirrorPolicy::Fixed)
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_zoom(&self) -> u32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// `(min_zoom, max_zoom)`, both inclusive.
    pub fn zoom_bounds(&self) -> (u32, u32) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn clamp_zoom(&self, zoom: u32) -> u32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn tile_size_pixels(&self) -> u32 {
        self.tile_size
    }

    /// log2 of the tile size.
    pub fn tile_size_shift(&self) -> u32 {
        self.tile_size.trailing_zeros()
    }

    pub fn image_extension(&self) -> &str {
        &self.image_extension
    }

    pub fn base_urls(&self) -> &[String] {
        &self.base_urls
    }

    pub fn mirror_policy(&self) -> MirrorPolicy {
        self.mirror_policy
    }

    /// World width in pixels at the maximum zoom level.
    pub fn world_width(&self) -> i32 {
        self.world_width
    }

    /// World height in pixels at the maximum zoom level.
    pub fn world_height(&self) -> i32 {
        self.world_height
    }

    pub fn zoom_width(&self, zoom: u32) -> i32 {
        scaled_extent(self.world_width, self.max_zoom - zoom.min(self.max_zoom))
    }

    pub fn zoom_height(&self, zoom: u32) -> i32 {
        scaled_extent(self.world_height, self.max_zoom - zoom.min(self.max_zoom))
    }

    pub fn tile_count_x(&self, zoom: u32) -> i32 {
        tile_count(self.zoom_width(zoom), self.tile_size)
    }

    pub fn tile_count_y(&self, zoom: u32) -> i32 {
        tile_count(self.zoom_height(zoom), self.tile_size)
    }

    pub fn check_zoom(&self, zoom: u32) -> Result<()> {
        if zoom < self.min_zoom || zoom > self.max_zoom {
            return Err(MapError::ZoomOutOfBounds {
                zoom,
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        Ok(())
    }

    /// Rejects addresses outside the zoom bounds or the tile grid. Callers are
    /// expected to filter before asking; nothing is clamped here.
    pub fn check_address(&self, address: &TileAddress) -> Result<()> {
        self.check_zoom(address.zoom)?;
        if !address.is_within(
            self.tile_count_x(address.zoom),
            self.tile_count_y(address.zoom),
        ) {
            return Err(MapError::OutOfGrid(*address));
        }
        Ok(())
    }

    /// Build the URL for the requested `address`.
    pub fn url_for(&self, address: &TileAddress) -> Result<String> {
        self.check_address(address)?;
        Ok(format!(
            "{}{}/{}/{}{}",
            self.choose_base_url(address),
            address.zoom,
            address.x,
            address.y,
            self.image_extension
        ))
    }

    fn choose_base_url(&self, address: &TileAddress) -> &str {
        let count = self.base_urls.len();
        let index = match self.mirror_policy {
            MirrorPolicy::Fixed => 0,
            MirrorPolicy::RoundRobin => self.next_mirror.fetch_add(1, Ordering::Relaxed) % count,
            MirrorPolicy::ByAddress => (address.x + address.y).rem_euclid(count as i32) as usize,
        };
        &self.base_urls[index]
    }
}

impl Clone for TileSource {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            tile_size: self.tile_size,
            image_extension: self.image_extension.clone(),
            base_urls: self.base_urls.clone(),
            world_width: self.world_width,
            world_height: self.world_height,
            mirror_policy: self.mirror_policy,
            next_mirror: AtomicUsize::new(self.next_mirror.load(Ordering::Relaxed)),
        }
    }
}

impl Default for TileSource {
    fn default() -> Self {
        Self::mapnik()
    }
}

/// `ceil(extent / 2^shift)`: the extent of the world after `shift` zoom-outs.
fn scaled_extent(extent: i32, shift: u32) -> i32 {
    ((extent - 1) >> shift) + 1
}

fn tile_count(extent: i32, tile_size: u32) -> i32 {
    let tile_size = tile_size as i32;
    (extent + tile_size - 1) / tile_size
}

/// Builder for [`TileSource`]; `build` validates the geometry.
#[derive(Debug, Clone)]
pub struct TileSourceBuilder {
    name: String,
    min_zoom: u32,
    max_zoom: u32,
    tile_size: u32,
    image_extension: String,
    base_urls: Vec<String>,
    world_size: Option<(i32, i32)>,
    mirror_policy: MirrorPolicy,
}

impl TileSourceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            tile_size: TILE_SIZE,
            image_extension: ".png".to_string(),
            base_urls: Vec::new(),
            world_size: None,
            mirror_policy: MirrorPolicy::default(),
        }
    }

    pub fn zoom_range(mut self, min_zoom: u32, max_zoom: u32) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn image_extension(mut self, extension: impl Into<String>) -> Self {
        self.image_extension = extension.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_urls.push(url.into());
        self
    }

    pub fn base_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_urls.extend(urls.into_iter().map(Into::into));
        self
    }

    /// World size in pixels at the maximum zoom. Defaults to `tile_size << max_zoom`.
    pub fn world_size(mut self, width: i32, height: i32) -> Self {
        self.world_size = Some((width, height));
        self
    }

    pub fn mirror_policy(mut self, policy: MirrorPolicy) -> Self {
        self.mirror_policy = policy;
        self
    }

    pub fn build(self) -> Result<TileSource> {
        if self.tile_size == 0 || !self.tile_size.is_power_of_two() {
            return Err(MapError::GeometryInvariant(format!(
                "tile size must be a power of two, got {}",
                self.tile_size
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(MapError::GeometryInvariant(format!(
                "min zoom {} exceeds max zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(MapError::GeometryInvariant(format!(
                "max zoom {} exceeds supported maximum {}",
                self.max_zoom, MAX_SUPPORTED_ZOOM
            )));
        }
        if self.base_urls.is_empty() {
            return Err(MapError::GeometryInvariant(format!(
                "tile source {} has no base URL",
                self.name
            )));
        }

        let (world_width, world_height) = match self.world_size {
            Some(size) => size,
            None => {
                let extent = (self.tile_size as u64) << self.max_zoom;
                if extent > i32::MAX as u64 {
                    return Err(MapError::GeometryInvariant(format!(
                        "world of {} px does not fit the coordinate range",
                        extent
                    )));
                }
                (extent as i32, extent as i32)
            }
        };
        if world_width <= 0 || world_height <= 0 {
            return Err(MapError::GeometryInvariant(format!(
                "world size must be positive, got {}x{}",
                world_width, world_height
            )));
        }

        // Every zoom level must fit in a 2^z grid so parent/child addressing holds.
        for zoom in self.min_zoom..=self.max_zoom {
            let shift = self.max_zoom - zoom;
            let columns = tile_count(scaled_extent(world_width, shift), self.tile_size) as u64;
            let rows = tile_count(scaled_extent(world_height, shift), self.tile_size) as u64;
            let limit = 1u64 << zoom;
            if columns > limit || rows > limit {
                return Err(MapError::GeometryInvariant(format!(
                    "zoom {} needs {}x{} tiles but the grid holds at most {}x{}",
                    zoom, columns, rows, limit, limit
                )));
            }
        }

        Ok(TileSource {
            name: self.name,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            tile_size: self.tile_size,
            image_extension: self.image_extension,
            base_urls: self.base_urls,
            world_width,
            world_height,
            mirror_policy: self.mirror_policy,
            next_mirror: AtomicUsize::new(0),
        })
    }
}
