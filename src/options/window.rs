use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Initial window parameters for the viewer.
pub struct WindowOptions {
    /// Title prefix; the viewer appends the current frame rate.
    pub title: String,
    /// Initial inner width in logical pixels.
    pub width: u32,
    /// Initial inner height in logical pixels.
    pub height: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Mouse picking".to_owned(),
            width: 640,
            height: 640,
        }
    }
}
