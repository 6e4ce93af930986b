use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::PickerError;
use crate::gpu::vertex::InstanceModel;
use crate::options::SceneOptions;
use crate::picking::NO_HOVER;

/// Exclusive upper bound on the instance count: the identifier range must
/// stay below the "no object" sentinel.
pub const MAX_INSTANCES: usize = NO_HOVER as usize;

/// A fixed set of instances on a cubic grid, each spinning about its own
/// random unit axis.
///
/// Instance `ix * n² + iy * n + iz` sits at grid cell `(ix, iy, iz)`.
/// Axes are drawn once at construction and never change; only the model
/// matrices are updated every frame.
pub struct InstanceGrid {
    models: Vec<Mat4>,
    axes: Vec<Vec3>,
}

impl InstanceGrid {
    /// Build a `grid_size³` grid centred on the origin with `spacing`
    /// between neighbours. `seed` makes the rotation axes reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::InstanceLimit`] if the grid would not fit
    /// below the sentinel identifier.
    pub fn new(
        grid_size: usize,
        spacing: f32,
        seed: Option<u64>,
    ) -> Result<Self, PickerError> {
        let count = match grid_size.checked_pow(3) {
            Some(count) if count < MAX_INSTANCES => count,
            count => {
                return Err(PickerError::InstanceLimit {
                    count: count.unwrap_or(usize::MAX),
                    max: MAX_INSTANCES - 1,
                });
            }
        };

        let half = (grid_size as f32 - 1.0) / 2.0;
        let coordinate = |i: usize| (i as f32 - half) * spacing;
        let mut models = Vec::with_capacity(count);
        for ix in 0..grid_size {
            for iy in 0..grid_size {
                for iz in 0..grid_size {
                    let offset = Vec3::new(
                        coordinate(ix),
                        coordinate(iy),
                        coordinate(iz),
                    );
                    models.push(Mat4::from_translation(offset));
                }
            }
        }

        let mut rng =
            seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let axes = (0..count).map(|_| random_unit_vector(&mut rng)).collect();

        log::info!("instance grid: {grid_size}³ = {count} instances");
        Ok(Self { models, axes })
    }

    /// Build the grid described by the scene options.
    ///
    /// # Errors
    ///
    /// See [`InstanceGrid::new`].
    pub fn from_options(options: &SceneOptions) -> Result<Self, PickerError> {
        Self::new(options.grid_size, options.spacing, options.rotation_seed)
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the grid has no instances.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Current model matrices, indexed by instance.
    pub fn models(&self) -> &[Mat4] {
        &self.models
    }

    /// Rotation axes, indexed by instance.
    pub fn axes(&self) -> &[Vec3] {
        &self.axes
    }

    /// Rotate every instance in place by `dt` radians about its own axis.
    pub fn rotate(&mut self, dt: f32) {
        if dt == 0.0 {
            return;
        }
        for (model, axis) in self.models.iter_mut().zip(&self.axes) {
            *model *= Mat4::from_axis_angle(*axis, dt);
        }
    }

    /// Model matrices in vertex-buffer layout.
    pub fn instance_models(&self) -> Vec<InstanceModel> {
        self.models.iter().copied().map(InstanceModel::from).collect()
    }
}

// Rejection sampling inside the unit ball gives a uniform direction.
fn random_unit_vector(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        let length_squared = v.length_squared();
        if length_squared > 1e-6 && length_squared <= 1.0 {
            return v / length_squared.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_spans_minus_two_to_two() {
        let grid = InstanceGrid::new(5, 1.0, Some(1)).unwrap();
        assert_eq!(grid.len(), 125);
        let position = |i: usize| grid.models()[i].w_axis.truncate();
        assert_eq!(position(0), Vec3::splat(-2.0));
        assert_eq!(position(124), Vec3::splat(2.0));
        // ix * 25 + iy * 5 + iz
        assert_eq!(position(25 + 10 + 3), Vec3::new(-1.0, 0.0, 1.0));
    }

    #[test]
    fn axes_are_unit_length() {
        let grid = InstanceGrid::new(5, 1.0, Some(42)).unwrap();
        assert_eq!(grid.axes().len(), grid.len());
        for axis in grid.axes() {
            assert!((axis.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn seeded_axes_are_reproducible() {
        let a = InstanceGrid::new(3, 1.0, Some(9)).unwrap();
        let b = InstanceGrid::new(3, 1.0, Some(9)).unwrap();
        assert_eq!(a.axes(), b.axes());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        // 7³ = 343 > 254
        let err = InstanceGrid::new(7, 1.0, Some(0)).err().unwrap();
        assert!(matches!(
            err,
            PickerError::InstanceLimit { count: 343, max: 254 }
        ));
        assert!(InstanceGrid::new(6, 1.0, Some(0)).is_ok());
    }

    #[test]
    fn overflowing_grid_size_is_an_instance_limit() {
        let err = InstanceGrid::new(3_000_000, 1.0, Some(1)).err().unwrap();
        assert!(matches!(
            err,
            PickerError::InstanceLimit { count: usize::MAX, max: 254 }
        ));
    }

    #[test]
    fn rotation_keeps_position_and_spins_about_axis() {
        let mut grid = InstanceGrid::new(2, 2.0, Some(3)).unwrap();
        let before = grid.models().to_vec();
        grid.rotate(0.25);
        let models = grid.models().iter().zip(&before);
        for ((model, old), axis) in models.zip(grid.axes()) {
            assert_eq!(model.w_axis, old.w_axis);
            // The axis is the fixed point of the rotation.
            let moved = model.transform_vector3(*axis);
            assert!(moved.abs_diff_eq(old.transform_vector3(*axis), 1e-5));
            assert!(!model.abs_diff_eq(*old, 1e-4));
        }
    }

    #[test]
    fn zero_dt_leaves_models_untouched() {
        let mut grid = InstanceGrid::new(2, 1.0, Some(3)).unwrap();
        let before = grid.models().to_vec();
        grid.rotate(0.0);
        assert_eq!(grid.models(), before.as_slice());
    }
}
