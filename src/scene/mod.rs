//! Scene content: the instance grid and the assets it is drawn with.

/// Asset loading: mesh text records and material images.
pub mod assets;
/// Instance transforms and their fixed rotation axes.
pub mod instances;

pub use assets::SceneAssets;
pub use instances::{InstanceGrid, MAX_INSTANCES};
