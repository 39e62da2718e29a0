pub mod loading;
pub mod tile;

pub use loading::LoadingTileConfig;
pub use tile::{DrawStats, TilesLayer};
