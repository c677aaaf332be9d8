//! Temporal state engine for tiled 3D city models.
//!
//! Given a simulation time and a tile's temporal batch table (feature
//! lifespans plus the transactions linking features), the engine decides
//! which style label each feature is drawn with and pushes those labels to a
//! [`StyleRegistry`].

pub mod batch_table;
pub mod cache;
pub mod config;
pub mod cull;
pub mod error;
pub mod events;
pub mod model;
pub mod provider;
pub mod style;
pub mod tiles_manager;
pub mod transaction;

pub use batch_table::*;
pub use cache::*;
pub use config::*;
pub use cull::*;
pub use error::*;
pub use events::*;
pub use model::*;
pub use provider::*;
pub use style::*;
pub use tiles_manager::*;
pub use transaction::*;
