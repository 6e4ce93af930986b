use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// View gizmo overlay parameters.
pub struct OverlayOptions {
    /// Draw and enable the view gizmo.
    pub gizmo: bool,
    /// Side of the square gizmo region in window coordinates, anchored at
    /// the top-left corner.
    pub gizmo_size: f32,
    /// Orbit angle in radians per window unit of drag.
    pub sensitivity: f32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            gizmo: true,
            gizmo_size: 64.0,
            sensitivity: 0.02,
        }
    }
}
