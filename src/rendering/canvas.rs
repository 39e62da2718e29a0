//! In-memory raster render target.

use crate::core::bounds::PixelRect;
use crate::traits::RenderTarget;
use crate::Result;
use image::{Pixel, Rgba, RgbaImage};

/// Allocates a `width` x `height` RGBA buffer, returning `None` instead of
/// aborting when the allocation cannot be satisfied.
pub fn try_alloc_image(width: u32, height: u32) -> Option<RgbaImage> {
    let len = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)?;
    let mut buffer: Vec<u8> = Vec::new();
    if buffer.try_reserve_exact(len).is_err() {
        #[cfg(feature = "debug")]
        log::error!("out of memory allocating a {}x{} image", width, height);
        return None;
    }
    buffer.resize(len, 0);
    RgbaImage::from_raw(width, height, buffer)
}

/// Scales a pixel's own alpha by the layer `alpha`.
fn fade(mut pixel: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    if alpha != u8::MAX {
        pixel[3] = (pixel[3] as u32 * alpha as u32 / 255) as u8;
    }
    pixel
}

/// `image::RgbaImage`-backed drawing surface with a clip stack and
/// nearest-neighbour scaling.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
    clip: PixelRect,
    clip_stack: Vec<PixelRect>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    /// Like [`Canvas::new`] but reports allocation failure as `None`.
    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        try_alloc_image(width, height).map(Self::from_image)
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        let clip = PixelRect::from_origin_size(0, 0, pixels.width() as i32, pixels.height() as i32);
        Self {
            pixels,
            clip,
            clip_stack: Vec::new(),
        }
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba(color);
        }
    }

    /// Fills `rect` (clipped) with a solid color, replacing what was there.
    pub fn fill_rect(&mut self, rect: PixelRect, color: [u8; 4]) {
        let area = rect.intersect(&self.clip);
        for y in area.top..area.bottom {
            for x in area.left..area.right {
                self.pixels.put_pixel(x as u32, y as u32, Rgba(color));
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn current_clip(&self) -> PixelRect {
        self.clip
    }

    /// Depth of the save stack; zero when every save has been restored.
    pub fn save_depth(&self) -> usize {
        self.clip_stack.len()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}

impl RenderTarget for Canvas {
    fn save(&mut self) {
        self.clip_stack.push(self.clip);
    }

    fn restore(&mut self) {
        if let Some(clip) = self.clip_stack.pop() {
            self.clip = clip;
        }
    }

    fn clip_rect(&mut self, rect: PixelRect) {
        self.clip = self.clip.intersect(&rect);
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: PixelRect, alpha: u8) -> Result<()> {
        if dest.is_empty() || image.width() == 0 || image.height() == 0 || alpha == 0 {
            return Ok(());
        }

        let area = dest.intersect(&self.clip);
        let dest_width = dest.width() as i64;
        let dest_height = dest.height() as i64;
        let src_width = image.width() as i64;
        let src_height = image.height() as i64;

        for y in area.top..area.bottom {
            let src_y = ((y - dest.top) as i64 * src_height / dest_height) as u32;
            for x in area.left..area.right {
                let src_x = ((x - dest.left) as i64 * src_width / dest_width) as u32;
                let src = fade(*image.get_pixel(src_x, src_y), alpha);
                let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
                match src[3] {
                    0 => {}
                    // opaque pixels are copied so colors stay exact
                    u8::MAX => *dst = src,
                    _ => dst.blend(&src),
                }
            }
        }
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}
