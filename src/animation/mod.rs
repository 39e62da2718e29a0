pub mod controller;
pub mod interpolation;
pub mod runner;

// Re-export commonly used types for convenience
pub use controller::MapController;
pub use interpolation::{AnimationType, PanCurve};
pub use runner::{AnimationState, PanAnimation};
