use crate::core::bounds::PixelRect;
use crate::traits::RenderTarget;
use crate::Result;
use image::RgbaImage;

/// Commands that can be issued to the render context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    Save,
    Restore,
    Clip(PixelRect),
    Image {
        /// Destination rectangle in target pixels
        dest: PixelRect,
        /// Clip in effect when the image was drawn
        clip: PixelRect,
        alpha: u8,
        /// Source bitmap dimensions
        width: u32,
        height: u32,
    },
}

/// Recording render target: keeps the drawing queue instead of rasterizing,
/// so draw order and clip discipline can be inspected.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    /// Drawing primitives queue
    pub drawing_queue: Vec<DrawCommand>,
    clip: PixelRect,
    clip_stack: Vec<PixelRect>,
}

impl RenderContext {
    /// Create a new render context
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            clip: PixelRect::from_origin_size(0, 0, width as i32, height as i32),
            clip_stack: Vec::new(),
        }
    }

    /// Begin a frame
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
        self.clip_stack.clear();
        self.clip = PixelRect::from_origin_size(0, 0, self.width as i32, self.height as i32);
    }

    /// Image draws in submission order
    pub fn images(&self) -> impl Iterator<Item = &DrawCommand> {
        self.drawing_queue
            .iter()
            .filter(|command| matches!(command, DrawCommand::Image { .. }))
    }

    /// Whether every save was matched by a restore, never popping an empty stack.
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0i32;
        for command in &self.drawing_queue {
            match command {
                DrawCommand::Save => depth += 1,
                DrawCommand::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl RenderTarget for RenderContext {
    fn save(&mut self) {
        self.clip_stack.push(self.clip);
        self.drawing_queue.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(clip) = self.clip_stack.pop() {
            self.clip = clip;
        }
        self.drawing_queue.push(DrawCommand::Restore);
    }

    fn clip_rect(&mut self, rect: PixelRect) {
        self.clip = self.clip.intersect(&rect);
        self.drawing_queue.push(DrawCommand::Clip(rect));
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: PixelRect, alpha: u8) -> Result<()> {
        self.drawing_queue.push(DrawCommand::Image {
            dest,
            clip: self.clip,
            alpha,
            width: image.width(),
            height: image.height(),
        });
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_clip_in_effect() {
        let mut context = RenderContext::new(100, 100);
        let image = RgbaImage::new(4, 4);

        context.save();
        context.clip_rect(PixelRect::new(10, 10, 50, 50));
        context.draw_image(&image, PixelRect::new(0, 0, 80, 80), 200).unwrap();
        context.restore();
        context.draw_image(&image, PixelRect::new(0, 0, 4, 4), 255).unwrap();

        let clips: Vec<PixelRect> = context
            .images()
            .map(|command| match command {
                DrawCommand::Image { clip, .. } => *clip,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(clips, vec![PixelRect::new(10, 10, 50, 50), PixelRect::new(0, 0, 100, 100)]);
        assert!(context.is_balanced());
    }

    #[test]
    fn test_unbalanced_queue_is_detected() {
        let mut context = RenderContext::new(10, 10);
        context.save();
        assert!(!context.is_balanced());
        context.restore();
        context.restore();
        assert!(!context.is_balanced());

        context.begin_frame();
        assert!(context.drawing_queue.is_empty());
        assert!(context.is_balanced());
    }
}
