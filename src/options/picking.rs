use serde::{Deserialize, Serialize};

/// Where the per-fragment instance identifier is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickingMode {
    /// A dedicated `R8Uint` color attachment next to color and depth.
    #[default]
    Attachment,
    /// The stencil aspect of the depth/stencil attachment.
    Stencil,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
/// Picking pipeline selection.
pub struct PickingOptions {
    /// Identifier storage strategy.
    pub mode: PickingMode,
}
