use crate::core::bounds::PixelRect;
use crate::core::config::MapConfig;
use crate::core::constants::DEFAULT_CACHE_CAPACITY;
use crate::core::geo::TileAddress;
use crate::rendering::image::{Opacity, TileImage};
use crate::tiles::fallback::CompositeTile;
use crate::traits::{RenderTarget, TileDrawable};
use crate::Result;
use fxhash::FxBuildHasher;
use lru::LruCache;
use parking_lot::Mutex;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// A drawable held by a tile cache.
///
/// Composites are marked so the fallback compositor never builds a
/// substitute out of another substitute.
#[derive(Debug, Clone)]
pub enum CachedTile {
    Genuine(TileImage),
    Composite(CompositeTile),
}

impl CachedTile {
    pub fn is_composite(&self) -> bool {
        matches!(self, CachedTile::Composite(_))
    }

    /// The decoded image when this is a genuine tile.
    pub fn genuine(&self) -> Option<&TileImage> {
        match self {
            CachedTile::Genuine(image) => Some(image),
            CachedTile::Composite(_) => None,
        }
    }
}

impl From<TileImage> for CachedTile {
    fn from(image: TileImage) -> Self {
        CachedTile::Genuine(image)
    }
}

impl From<CompositeTile> for CachedTile {
    fn from(tile: CompositeTile) -> Self {
        CachedTile::Composite(tile)
    }
}

impl TileDrawable for CachedTile {
    fn draw(&self, target: &mut dyn RenderTarget, bounds: PixelRect, alpha: u8) -> Result<()> {
        match self {
            CachedTile::Genuine(image) => image.draw(target, bounds, alpha),
            CachedTile::Composite(tile) => tile.draw(target, bounds, alpha),
        }
    }

    fn opacity(&self) -> Opacity {
        match self {
            CachedTile::Genuine(image) => image.opacity(),
            CachedTile::Composite(tile) => tile.opacity(),
        }
    }
}

/// Tile lookup contract implemented by whatever fetches and stores tiles.
///
/// A miss is `None`, never an error. Implementations are shared between the
/// draw path and loader threads, hence `Send + Sync`.
pub trait TileCache: Send + Sync {
    fn has(&self, address: &TileAddress) -> bool;

    fn get(&self, address: &TileAddress) -> Option<CachedTile>;

    /// Hint that at least `capacity` tiles are needed for the current frame.
    fn ensure_capacity(&self, capacity: usize);
}

/// In-memory tile cache using LRU eviction
#[derive(Clone)]
pub struct MemoryTileCache {
    cache: Arc<Mutex<LruCache<TileAddress, CachedTile, FxBuildHasher>>>,
}

impl MemoryTileCache {
    /// Create a new tile cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::with_hasher(
                capacity,
                FxBuildHasher::default(),
            ))),
        }
    }

    /// Sized by [`MapConfig::cache_capacity`].
    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.cache_capacity)
    }

    pub fn insert(&self, address: TileAddress, tile: impl Into<CachedTile>) {
        self.cache.lock().put(address, tile.into());
    }

    pub fn insert_image(&self, address: TileAddress, image: image::RgbaImage) {
        self.insert(address, TileImage::new(image));
    }

    pub fn remove(&self, address: &TileAddress) -> Option<CachedTile> {
        self.cache.lock().pop(address)
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }
}

impl fmt::Debug for MemoryTileCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("MemoryTileCache")
            .field("len", &cache.len())
            .field("capacity", &cache.cap())
            .finish()
    }
}

impl Default for MemoryTileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl TileCache for MemoryTileCache {
    fn has(&self, address: &TileAddress) -> bool {
        self.cache.lock().contains(address)
    }

    fn get(&self, address: &TileAddress) -> Option<CachedTile> {
        self.cache.lock().get(address).cloned()
    }

    fn ensure_capacity(&self, capacity: usize) {
        let mut cache = self.cache.lock();
        if capacity > cache.cap().get() {
            if let Some(capacity) = NonZeroUsize::new(capacity) {
                #[cfg(feature = "debug")]
                log::debug!("growing tile cache from {} to {}", cache.cap(), capacity);
                cache.resize(capacity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(color: u8) -> TileImage {
        TileImage::solid(4, [color, color, color, 255])
    }

    #[test]
    fn test_tile_cache_basic_operations() {
        let cache = MemoryTileCache::new(2);
        let first = TileAddress::new(3, 1, 2);
        let second = TileAddress::new(6, 4, 5);

        assert!(cache.is_empty());

        cache.insert(first, tile(1));
        assert_eq!(cache.len(), 1);
        assert!(cache.has(&first));
        assert!(!cache.has(&second));
        assert!(!cache.get(&first).unwrap().is_composite());
        assert!(cache.get(&second).is_none());

        cache.insert(second, tile(2));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = MemoryTileCache::new(2);
        let a = TileAddress::new(1, 0, 0);
        let b = TileAddress::new(1, 1, 0);
        let c = TileAddress::new(1, 0, 1);

        cache.insert(a, tile(1));
        cache.insert(b, tile(2));
        // touch a so b becomes the eviction candidate
        assert!(cache.get(&a).is_some());
        cache.insert(c, tile(3));

        assert!(cache.has(&a));
        assert!(!cache.has(&b));
        assert!(cache.has(&c));
    }

    #[test]
    fn test_ensure_capacity_only_grows() {
        let cache = MemoryTileCache::new(4);
        cache.ensure_capacity(2);
        assert_eq!(cache.capacity(), 4);
        cache.ensure_capacity(36);
        assert_eq!(cache.capacity(), 36);
    }

    #[test]
    fn test_capacity_from_config() {
        let config = MapConfig::from_json(r#"{ "cache_capacity": 48 }"#).unwrap();
        assert_eq!(MemoryTileCache::from_config(&config).capacity(), 48);
        assert_eq!(MemoryTileCache::from_config(&MapConfig::default()).capacity(), DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = MemoryTileCache::new(8);
        let shared = cache.clone();
        cache.insert_image(TileAddress::new(0, 0, 0), image::RgbaImage::new(2, 2));
        assert_eq!(shared.len(), 1);
        assert!(shared.remove(&TileAddress::new(0, 0, 0)).is_some());
        assert!(cache.is_empty());
    }
}
