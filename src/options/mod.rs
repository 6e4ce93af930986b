//! Centralized runtime options with TOML file support.
//!
//! Window, camera, picking, scene, highlight, overlay and keybinding
//! settings are consolidated here. Every section uses `#[serde(default)]`
//! so partial TOML files only need to name what they override.

mod camera;
mod highlight;
mod keybindings;
mod overlay;
mod picking;
mod scene;
mod window;

use std::path::Path;

pub use camera::CameraOptions;
pub use highlight::HighlightOptions;
pub use keybindings::KeybindingOptions;
pub use overlay::OverlayOptions;
pub use picking::{PickingMode, PickingOptions};
pub use scene::SceneOptions;
use serde::{Deserialize, Serialize};
pub use window::WindowOptions;

use crate::error::PickerError;

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Viewer window parameters.
    pub window: WindowOptions,
    /// Fly-camera parameters.
    pub camera: CameraOptions,
    /// Picking strategy.
    pub picking: PickingOptions,
    /// Instance grid and asset locations.
    pub scene: SceneOptions,
    /// Hover outline.
    pub highlight: HighlightOptions,
    /// View gizmo overlay.
    pub overlay: OverlayOptions,
    /// Keyboard binding options.
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Parse options from a TOML string. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::OptionsParse`] on malformed TOML or values
    /// that fail [`Options::validate`].
    pub fn from_toml(content: &str) -> Result<Self, PickerError> {
        let mut options: Self = toml::from_str(content)
            .map_err(|e| PickerError::OptionsParse(e.to_string()))?;
        options.keybindings.rebuild_reverse_map();
        options.validate()?;
        Ok(options)
    }

    /// Check the sections whose values the engine cannot recover from.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::OptionsParse`] for an unusable camera
    /// section and [`PickerError::InstanceLimit`] for an oversized grid.
    pub fn validate(&self) -> Result<(), PickerError> {
        self.camera.validate()?;
        self.scene.validate()
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Io`] if the file cannot be read, otherwise
    /// see [`Options::from_toml`].
    pub fn load(path: &Path) -> Result<Self, PickerError> {
        let content = std::fs::read_to_string(path).map_err(PickerError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::OptionsParse`] if serialization fails and
    /// [`PickerError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), PickerError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PickerError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PickerError::Io)?;
        }
        std::fs::write(path, content).map_err(PickerError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MoveDirection;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[camera]
fovy = 60.0

[picking]
mode = "stencil"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.camera.fovy, 60.0);
        assert_eq!(opts.picking.mode, PickingMode::Stencil);
        // Everything else should be default
        assert_eq!(opts.camera.fovy_max, 150.0);
        assert_eq!(opts.scene.grid_size, 5);
        assert_eq!(opts.window.title, "Mouse picking");
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        let lookup = |key| opts.keybindings.lookup(key);
        assert_eq!(lookup("KeyW"), Some(MoveDirection::Forward));
        assert_eq!(lookup("KeyD"), Some(MoveDirection::Right));
        assert_eq!(lookup("KeyZ"), None);
    }

    #[test]
    fn loaded_keybindings_are_searchable() {
        let toml_str = r#"
[keybindings.bindings]
forward = "ArrowUp"
back = "ArrowDown"
left = "ArrowLeft"
right = "ArrowRight"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(
            opts.keybindings.lookup("ArrowUp"),
            Some(MoveDirection::Forward)
        );
        assert_eq!(opts.keybindings.lookup("KeyW"), None);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("[camera\nfovy = ").unwrap_err();
        assert!(matches!(err, PickerError::OptionsParse(_)));
    }

    #[test]
    fn inverted_fov_range_is_an_options_error() {
        let toml_str = r#"
[camera]
fovy_min = 90.0
fovy_max = 30.0
"#;
        let err = Options::from_toml(toml_str).unwrap_err();
        assert!(matches!(err, PickerError::OptionsParse(_)));
    }

    #[test]
    fn oversized_grid_is_rejected_on_load() {
        let err = Options::from_toml("[scene]\ngrid_size = 3000000\n")
            .unwrap_err();
        assert!(matches!(err, PickerError::InstanceLimit { .. }));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!(
            "picker-options-{}",
            std::process::id()
        ));
        let path = dir.join("options.toml");
        let mut opts = Options::default();
        opts.scene.rotation_seed = Some(7);
        opts.highlight.scale = 1.1;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
