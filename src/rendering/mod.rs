pub mod canvas;
pub mod context;
pub mod image;

// Re-export main types
pub use canvas::Canvas;
pub use context::{DrawCommand, RenderContext};
pub use self::image::{Opacity, TileImage};
