use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PickerError;
use crate::scene::MAX_INSTANCES;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Instance grid layout and asset locations.
pub struct SceneOptions {
    /// Instances per grid axis; the grid holds `grid_size³` instances.
    pub grid_size: usize,
    /// Distance between neighbouring grid positions.
    pub spacing: f32,
    /// Seed for the random rotation axes. `None` seeds from OS entropy.
    pub rotation_seed: Option<u64>,
    /// Directory that the asset paths below are relative to.
    pub assets_dir: PathBuf,
    /// Mesh text file (one `px py pz nx ny nz u v` record per vertex).
    pub mesh: PathBuf,
    /// Diffuse map image.
    pub diffuse_map: PathBuf,
    /// Specular map image.
    pub specular_map: PathBuf,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            grid_size: 5,
            spacing: 1.0,
            rotation_seed: None,
            assets_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("assets"),
            mesh: PathBuf::from("models/cube.txt"),
            diffuse_map: PathBuf::from("textures/container2.png"),
            specular_map: PathBuf::from("textures/container2_specular.png"),
        }
    }
}

impl SceneOptions {
    /// Total number of instances in the grid, `None` if `grid_size³`
    /// overflows.
    #[must_use]
    pub fn instance_count(&self) -> Option<usize> {
        self.grid_size.checked_pow(3)
    }

    /// Check that the grid fits below the "no object" identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::InstanceLimit`] for an oversized grid.
    pub fn validate(&self) -> Result<(), PickerError> {
        match self.instance_count() {
            Some(count) if count < MAX_INSTANCES => Ok(()),
            count => Err(PickerError::InstanceLimit {
                count: count.unwrap_or(usize::MAX),
                max: MAX_INSTANCES - 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_fits() {
        let options = SceneOptions::default();
        assert_eq!(options.instance_count(), Some(125));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn overflowing_grid_is_rejected() {
        let options = SceneOptions {
            grid_size: 3_000_000,
            ..SceneOptions::default()
        };
        assert_eq!(options.instance_count(), None);
        assert!(matches!(
            options.validate(),
            Err(PickerError::InstanceLimit { .. })
        ));
    }
}
