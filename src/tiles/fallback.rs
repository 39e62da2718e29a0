//! Multi-resolution substitutes for tiles missing from the cache.
//!
//! A missing tile is approximated from its four children one zoom level down
//! (downscaled into quadrants) or, failing that, from its parent one level up
//! (upscaled 2x and clipped to the matching quadrant). Only genuine tiles are
//! used as sources: a composite is never composited again, so quality
//! degrades by at most one level.

use crate::core::bounds::PixelRect;
use crate::core::geo::TileAddress;
use crate::rendering::canvas::Canvas;
use crate::rendering::image::{Opacity, TileImage};
use crate::tiles::cache::TileCache;
use crate::tiles::source::TileSource;
use crate::traits::{RenderTarget, TileDrawable};
use crate::Result;
use image::RgbaImage;

/// Where a composite takes its pixels from.
#[derive(Debug, Clone)]
pub enum CompositeSource {
    /// NW, NE, SW, SE children one zoom level down
    Children(Box<[TileImage; 4]>),
    /// The containing tile one zoom level up
    Parent(TileImage),
}

/// Substitute drawable for a tile that is not in the cache.
#[derive(Debug, Clone)]
pub struct CompositeTile {
    address: TileAddress,
    source: CompositeSource,
}

impl CompositeTile {
    pub fn from_children(address: TileAddress, children: [TileImage; 4]) -> Self {
        Self {
            address,
            source: CompositeSource::Children(Box::new(children)),
        }
    }

    pub fn from_parent(address: TileAddress, parent: TileImage) -> Self {
        Self {
            address,
            source: CompositeSource::Parent(parent),
        }
    }

    /// The tile this composite stands in for.
    pub fn address(&self) -> TileAddress {
        self.address
    }

    pub fn source(&self) -> &CompositeSource {
        &self.source
    }

    pub fn is_from_children(&self) -> bool {
        matches!(self.source, CompositeSource::Children(_))
    }

    /// Paints the composite into a fresh `tile_size` square bitmap, or `None`
    /// if the bitmap cannot be allocated.
    pub fn rasterize(&self, tile_size: u32) -> Option<RgbaImage> {
        let mut canvas = Canvas::try_new(tile_size, tile_size)?;
        let bounds = PixelRect::from_origin_size(0, 0, tile_size as i32, tile_size as i32);
        self.draw(&mut canvas, bounds, u8::MAX).ok()?;
        Some(canvas.into_image())
    }
}

impl TileDrawable for CompositeTile {
    fn draw(&self, target: &mut dyn RenderTarget, bounds: PixelRect, alpha: u8) -> Result<()> {
        match &self.source {
            CompositeSource::Parent(parent) => {
                let width = bounds.width();
                let height = bounds.height();
                let (x_off, y_off) = self.address.quadrant();
                // parent covers twice the area, shifted so our quadrant lands on bounds
                let enlarged = PixelRect::from_origin_size(
                    bounds.left - x_off * width,
                    bounds.top - y_off * height,
                    width * 2,
                    height * 2,
                );
                target.save();
                target.clip_rect(bounds);
                let drawn = parent.draw(target, enlarged, alpha);
                target.restore();
                drawn
            }
            CompositeSource::Children(children) => {
                let mid_x = bounds.left + bounds.width() / 2;
                let mid_y = bounds.top + bounds.height() / 2;
                let quadrants = [
                    PixelRect::new(bounds.left, bounds.top, mid_x, mid_y),
                    PixelRect::new(mid_x, bounds.top, bounds.right, mid_y),
                    PixelRect::new(bounds.left, mid_y, mid_x, bounds.bottom),
                    PixelRect::new(mid_x, mid_y, bounds.right, bounds.bottom),
                ];
                for (child, quadrant) in children.iter().zip(quadrants) {
                    child.draw(target, quadrant, alpha)?;
                }
                Ok(())
            }
        }
    }

    fn opacity(&self) -> Opacity {
        match &self.source {
            CompositeSource::Parent(parent) => parent.opacity(),
            CompositeSource::Children(children) => children
                .iter()
                .fold(Opacity::Opaque, |opacity, child| opacity.resolve(child.opacity())),
        }
    }
}

/// Builds [`CompositeTile`]s from whatever the cache currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackCompositor {
    min_zoom: u32,
    max_zoom: u32,
}

impl FallbackCompositor {
    pub fn new(min_zoom: u32, max_zoom: u32) -> Self {
        Self { min_zoom, max_zoom }
    }

    pub fn for_source(source: &TileSource) -> Self {
        let (min_zoom, max_zoom) = source.zoom_bounds();
        Self::new(min_zoom, max_zoom)
    }

    /// Children are preferred over the parent since they carry more detail.
    /// Returns `None` when neither complete set of genuine sources is cached.
    pub fn compose(&self, address: &TileAddress, cache: &dyn TileCache) -> Option<CompositeTile> {
        if let Some(composite) = self.from_children(address, cache) {
            #[cfg(feature = "debug")]
            log::trace!("composited {} from children", address);
            return Some(composite);
        }

        let composite = self.from_parent(address, cache);
        #[cfg(feature = "debug")]
        if composite.is_some() {
            log::trace!("composited {} from parent", address);
        }
        composite
    }

    fn from_children(&self, address: &TileAddress, cache: &dyn TileCache) -> Option<CompositeTile> {
        if address.zoom >= self.max_zoom {
            return None;
        }

        let [nw, ne, sw, se] = address.children();
        let genuine = |child: &TileAddress| cache.get(child)?.genuine().cloned();
        let children = [genuine(&nw)?, genuine(&ne)?, genuine(&sw)?, genuine(&se)?];
        Some(CompositeTile::from_children(*address, children))
    }

    fn from_parent(&self, address: &TileAddress, cache: &dyn TileCache) -> Option<CompositeTile> {
        if address.zoom <= self.min_zoom {
            return None;
        }

        let parent = address.parent()?;
        let image = cache.get(&parent)?.genuine().cloned()?;
        Some(CompositeTile::from_parent(*address, image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::context::{DrawCommand, RenderContext};
    use crate::tiles::cache::MemoryTileCache;
    use image::Rgba;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const YELLOW: [u8; 4] = [255, 255, 0, 255];

    /// 8x8 tile with a distinct color per 4x4 quadrant
    fn quartered_tile() -> TileImage {
        let mut image = RgbaImage::new(8, 8);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgba(match (x < 4, y < 4) {
                (true, true) => RED,
                (false, true) => GREEN,
                (true, false) => BLUE,
                (false, false) => YELLOW,
            });
        }
        TileImage::new(image)
    }

    fn assert_solid(image: &RgbaImage, color: [u8; 4]) {
        for (x, y, pixel) in image.enumerate_pixels() {
            assert_eq!(pixel.0, color, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn test_parent_quadrant_is_upscaled_exactly() {
        let parent_address = TileAddress::new(3, 2, 5);
        let expected = [RED, GREEN, BLUE, YELLOW];
        for (child, color) in parent_address.children().iter().zip(expected) {
            let composite = CompositeTile::from_parent(*child, quartered_tile());
            let raster = composite.rasterize(8).unwrap();
            assert_solid(&raster, color);
        }
    }

    #[test]
    fn test_children_fill_quadrants() {
        let children = [RED, GREEN, BLUE, YELLOW].map(|color| TileImage::solid(8, color));
        let composite = CompositeTile::from_children(TileAddress::new(2, 1, 1), children);
        let raster = composite.rasterize(8).unwrap();
        assert_eq!(raster, *quartered_tile().image());
    }

    #[test]
    fn test_parent_draw_is_clipped_to_bounds() {
        let composite = CompositeTile::from_parent(TileAddress::new(4, 3, 2), quartered_tile());
        let mut context = RenderContext::new(512, 512);
        let bounds = PixelRect::new(256, 256, 512, 512);
        composite.draw(&mut context, bounds, 255).unwrap();

        assert!(context.is_balanced());
        let image = context.images().next().unwrap();
        assert_eq!(
            *image,
            DrawCommand::Image {
                dest: PixelRect::new(0, 256, 512, 768),
                clip: bounds,
                alpha: 255,
                width: 8,
                height: 8,
            }
        );
    }

    #[test]
    fn test_children_preferred_over_parent() {
        let cache = MemoryTileCache::new(16);
        let address = TileAddress::new(5, 10, 12);
        cache.insert(address.parent().unwrap(), TileImage::solid(8, RED));
        for child in address.children() {
            cache.insert(child, TileImage::solid(8, GREEN));
        }

        let compositor = FallbackCompositor::new(0, 18);
        let composite = compositor.compose(&address, &cache).unwrap();
        assert!(composite.is_from_children());
        assert_eq!(composite.address(), address);
    }

    #[test]
    fn test_incomplete_children_fall_back_to_parent() {
        let cache = MemoryTileCache::new(16);
        let address = TileAddress::new(5, 10, 12);
        cache.insert(address.parent().unwrap(), TileImage::solid(8, RED));
        for child in address.children().iter().take(3) {
            cache.insert(*child, TileImage::solid(8, GREEN));
        }

        let composite = FallbackCompositor::new(0, 18).compose(&address, &cache).unwrap();
        assert!(!composite.is_from_children());
    }

    #[test]
    fn test_composites_are_never_sources() {
        let cache = MemoryTileCache::new(16);
        let address = TileAddress::new(5, 10, 12);
        let parent = address.parent().unwrap();
        let substitute = CompositeTile::from_parent(parent, TileImage::solid(8, RED));
        cache.insert(parent, substitute.clone());
        for child in address.children() {
            cache.insert(child, substitute.clone());
        }

        assert!(FallbackCompositor::new(0, 18).compose(&address, &cache).is_none());
    }

    #[test]
    fn test_zoom_bounds_limit_sources() {
        let cache = MemoryTileCache::new(16);
        let root = TileAddress::new(0, 0, 0);
        let compositor = FallbackCompositor::new(0, 1);
        assert!(compositor.compose(&root, &cache).is_none());

        let leaf = TileAddress::new(1, 1, 0);
        for child in leaf.children() {
            cache.insert(child, TileImage::solid(8, GREEN));
        }
        // children at zoom 2 exceed max zoom 1
        assert!(compositor.compose(&leaf, &cache).is_none());
        cache.insert(root, TileImage::solid(8, RED));
        assert!(compositor.compose(&leaf, &cache).is_some());
    }

    #[test]
    fn test_opacity_follows_sources() {
        let clear = TileImage::solid(8, [0, 0, 0, 0]);
        let solid = TileImage::solid(8, RED);
        let address = TileAddress::new(3, 0, 0);

        let all_opaque = CompositeTile::from_children(address, [
            solid.clone(),
            solid.clone(),
            solid.clone(),
            solid.clone(),
        ]);
        assert_eq!(all_opaque.opacity(), Opacity::Opaque);

        let mixed = CompositeTile::from_children(address, [
            solid.clone(),
            clear.clone(),
            solid.clone(),
            solid.clone(),
        ]);
        assert_ne!(mixed.opacity(), Opacity::Opaque);

        assert_eq!(CompositeTile::from_parent(address, clear).opacity(), Opacity::Transparent);
    }
}
