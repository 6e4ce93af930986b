use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Hover outline appearance.
pub struct HighlightOptions {
    /// Uniform scale applied to the hovered instance's model matrix.
    pub scale: f32,
    /// Linear RGBA outline color.
    pub color: [f32; 4],
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            scale: 1.05,
            color: [1.0, 0.55, 0.1, 1.0],
        }
    }
}
