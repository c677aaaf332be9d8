pub mod extension;
pub mod scene_loader;

pub use extension::*;
pub use scene_loader::*;
