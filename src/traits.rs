//! Shared trait abstractions for the draw path.
//!
//! The tile layer and the fallback compositor only ever talk to a
//! [`RenderTarget`], so the same code paints into an in-memory [`Canvas`],
//! records into a [`RenderContext`] for inspection, or feeds a host toolkit.
//!
//! [`Canvas`]: crate::rendering::canvas::Canvas
//! [`RenderContext`]: crate::rendering::context::RenderContext

use crate::core::bounds::PixelRect;
use crate::rendering::image::Opacity;
use crate::Result;
use image::RgbaImage;

/// Minimal 2D drawing surface with a clip stack.
pub trait RenderTarget {
    /// Push the current clip onto the stack
    fn save(&mut self);

    /// Pop the clip pushed by the matching [`RenderTarget::save`]
    fn restore(&mut self);

    /// Intersect the current clip with `rect`
    fn clip_rect(&mut self, rect: PixelRect);

    /// Draw `image` scaled to `dest`, multiplied by `alpha`, honouring the clip
    fn draw_image(&mut self, image: &RgbaImage, dest: PixelRect, alpha: u8) -> Result<()>;

    /// Size of the surface in pixels
    fn size(&self) -> (u32, u32);
}

/// Anything the tile layer can paint into a tile slot.
pub trait TileDrawable {
    fn draw(&self, target: &mut dyn RenderTarget, bounds: PixelRect, alpha: u8) -> Result<()>;

    fn opacity(&self) -> Opacity;
}
