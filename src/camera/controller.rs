use glam::{Mat4, Vec3};

use super::core::ViewUniform;
use crate::dirty::{clean_all, Dirty};
use crate::input::MoveDirection;
use crate::options::CameraOptions;

/// What a call to [`FlyCamera::resolve`] recomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveReport {
    /// The projection was rebuilt from a changed fov or aspect.
    pub projection_rebuilt: bool,
    /// New view uniform, present when the view or projection changed and
    /// the GPU copy must be refreshed.
    pub uniform: Option<ViewUniform>,
}

/// Keyboard-driven fly camera with lazily derived transforms.
///
/// Input handlers write the dirty inputs (`view`, `fov`, `aspect`); the
/// once-per-frame [`resolve`](Self::resolve) turns them into the
/// projection and then the [`ViewUniform`], each at most once.
pub struct FlyCamera {
    view: Dirty<Mat4>,
    fov: Dirty<f32>,
    aspect: Dirty<f32>,
    projection: Dirty<Mat4>,

    velocity: Option<Vec3>,
    active: Option<MoveDirection>,

    fov_range: (f32, f32),
    speed: f32,
    distance: f32,
    znear: f32,
    zfar: f32,
}

impl FlyCamera {
    /// Place the eye `options.distance` along the (1, 1, 1) diagonal,
    /// looking at the origin.
    ///
    /// `options` should have passed [`CameraOptions::validate`]; an
    /// inverted or NaN fov range does not panic but pins the fov to
    /// whichever bound is a number.
    #[must_use]
    pub fn new(options: &CameraOptions, aspect: f32) -> Self {
        let eye = options.distance * Vec3::ONE.normalize();
        let fov_range = (options.fovy_min, options.fovy_max);
        Self {
            view: Dirty::new(Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)),
            fov: Dirty::new(clamp_fov(options.fovy, fov_range)),
            aspect: Dirty::new(aspect),
            projection: Dirty::new(Mat4::IDENTITY),
            velocity: None,
            active: None,
            fov_range,
            speed: options.speed,
            distance: options.distance,
            znear: options.znear,
            zfar: options.zfar,
        }
    }

    /// Start moving along `direction`, replacing any previous movement.
    ///
    /// The direction is resolved against the camera basis at press time.
    pub fn press(&mut self, direction: MoveDirection) {
        let inv_view = self.view.get().inverse();
        let front = -inv_view.z_axis.truncate();
        let right = inv_view.x_axis.truncate();
        let (f, r) = direction.basis_weights();
        self.velocity = Some(self.speed * (f * front + r * right));
        self.active = Some(direction);
    }

    /// Stop moving if `direction` is the one currently held.
    pub fn release(&mut self, direction: MoveDirection) {
        if self.active == Some(direction) {
            self.velocity = None;
            self.active = None;
        }
    }

    /// Current velocity in world units per second.
    pub fn velocity(&self) -> Option<Vec3> {
        self.velocity
    }

    /// Translate the eye by `velocity * dt`.
    pub fn integrate(&mut self, dt: f32) {
        let Some(velocity) = self.velocity else {
            return;
        };
        self.view.modify(|view| {
            let mut inv_view = view.inverse();
            inv_view.w_axis += (velocity * dt).extend(0.0);
            *view = inv_view.inverse();
        });
    }

    /// Widen or narrow the field of view by `delta` degrees, clamped to
    /// the configured range.
    pub fn scroll(&mut self, delta: f32) {
        self.set_fov(*self.fov.get() + delta);
    }

    /// Set the field of view in degrees, clamped to the configured range.
    pub fn set_fov(&mut self, degrees: f32) {
        self.fov.set(clamp_fov(degrees, self.fov_range));
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        *self.fov.get()
    }

    /// Update the aspect ratio for a new framebuffer size. Returns `false`
    /// and leaves the camera untouched for a zero-sized framebuffer.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!(
                "ignoring degenerate framebuffer size {width}x{height}"
            );
            return false;
        }
        self.aspect.set(width as f32 / height as f32);
        true
    }

    /// Width over height of the framebuffer.
    pub fn aspect(&self) -> f32 {
        *self.aspect.get()
    }

    /// World-to-camera transform.
    pub fn view(&self) -> Mat4 {
        *self.view.get()
    }

    /// Projection as of the last [`resolve`](Self::resolve).
    pub fn projection(&self) -> Mat4 {
        *self.projection.get()
    }

    /// Orbit radius handed to the view gizmo.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Whether an input changed since the last [`resolve`](Self::resolve).
    pub fn needs_resolve(&self) -> bool {
        self.view.is_dirty()
            || self.fov.is_dirty()
            || self.aspect.is_dirty()
            || self.projection.is_dirty()
    }

    /// Store a view produced by an external manipulator. Only a matrix
    /// that differs from the current view marks it dirty.
    pub fn apply_manipulated_view(&mut self, view: Mat4) -> bool {
        if view == *self.view.get() {
            return false;
        }
        self.view.set(view);
        true
    }

    /// Run the two dependency resolutions in order: (fov, aspect) →
    /// projection, then (view, projection) → view uniform.
    pub fn resolve(&mut self) -> ResolveReport {
        let (znear, zfar) = (self.znear, self.zfar);
        let projection =
            clean_all((&mut self.fov, &mut self.aspect), |(fov, aspect)| {
                Mat4::perspective_rh(fov.to_radians(), *aspect, znear, zfar)
            });
        let projection_rebuilt = projection.is_some();
        if let Some(projection) = projection {
            self.projection.set(projection);
        }

        let uniform = clean_all(
            (&mut self.view, &mut self.projection),
            |(view, projection)| ViewUniform::new(*view, *projection),
        );

        ResolveReport {
            projection_rebuilt,
            uniform,
        }
    }
}

// `f32::clamp` panics on an inverted or NaN range.
fn clamp_fov(degrees: f32, (min, max): (f32, f32)) -> f32 {
    degrees.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> FlyCamera {
        let mut camera = FlyCamera::new(&CameraOptions::default(), 1.0);
        let _ = camera.resolve();
        camera
    }

    #[test]
    fn first_resolve_builds_everything() {
        let mut camera = FlyCamera::new(&CameraOptions::default(), 1.0);
        let report = camera.resolve();
        assert!(report.projection_rebuilt);
        assert!(report.uniform.is_some());
        let eye = 10.0 * Vec3::ONE.normalize();
        assert!(report.uniform.unwrap().view_pos.abs_diff_eq(eye, 1e-4));
    }

    #[test]
    fn steady_state_resolve_is_a_no_op() {
        let mut camera = camera();
        let report = camera.resolve();
        assert!(!report.projection_rebuilt);
        assert!(report.uniform.is_none());
    }

    #[test]
    fn fov_change_recomputes_projection_exactly_once() {
        let mut camera = camera();
        camera.set_fov(60.0);

        let report = camera.resolve();
        assert!(report.projection_rebuilt);
        assert!(report.uniform.is_some());
        let expected =
            Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.01, 100.0);
        assert!(camera.projection().abs_diff_eq(expected, 1e-6));

        let report = camera.resolve();
        assert!(!report.projection_rebuilt);
        assert!(report.uniform.is_none());
    }

    #[test]
    fn simultaneous_fov_and_aspect_changes_share_one_rebuild() {
        let mut camera = camera();
        camera.set_fov(30.0);
        assert!(camera.resize(1600, 900));
        let report = camera.resolve();
        assert!(report.projection_rebuilt);
        let aspect = 1600.0 / 900.0;
        let expected =
            Mat4::perspective_rh(30f32.to_radians(), aspect, 0.01, 100.0);
        assert!(camera.projection().abs_diff_eq(expected, 1e-6));
        assert!(!camera.resolve().projection_rebuilt);
    }

    #[test]
    fn resize_while_moving_keeps_velocity() {
        let mut camera = camera();
        camera.press(MoveDirection::Forward);
        let velocity = camera.velocity();
        assert!(velocity.is_some());

        assert!(camera.resize(800, 600));
        assert_eq!(camera.velocity(), velocity);

        let report = camera.resolve();
        assert!(report.projection_rebuilt);
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_resize_is_rejected() {
        let mut camera = camera();
        assert!(!camera.resize(800, 0));
        assert!(!camera.resize(0, 600));
        assert_eq!(camera.aspect(), 1.0);
        assert!(!camera.resolve().projection_rebuilt);
    }

    #[test]
    fn forward_moves_towards_the_origin() {
        let mut camera = camera();
        camera.press(MoveDirection::Forward);
        let velocity = camera.velocity().unwrap();
        assert!((velocity.length() - 2.0).abs() < 1e-5);
        assert!(velocity.normalize().abs_diff_eq(-Vec3::ONE.normalize(), 1e-5));

        camera.integrate(0.5);
        let uniform = camera.resolve().uniform.unwrap();
        let expected = (10.0 - 1.0) * Vec3::ONE.normalize();
        assert!(uniform.view_pos.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn release_only_stops_the_active_direction() {
        let mut camera = camera();
        camera.press(MoveDirection::Left);
        camera.press(MoveDirection::Right);
        camera.release(MoveDirection::Left);
        assert!(camera.velocity().is_some());
        camera.release(MoveDirection::Right);
        assert!(camera.velocity().is_none());
    }

    #[test]
    fn integrate_without_velocity_leaves_view_clean() {
        let mut camera = camera();
        camera.integrate(1.0);
        assert!(camera.resolve().uniform.is_none());
    }

    #[test]
    fn inverted_fov_range_does_not_panic() {
        let options = CameraOptions {
            fovy_min: 90.0,
            fovy_max: 30.0,
            ..CameraOptions::default()
        };
        let mut camera = FlyCamera::new(&options, 1.0);
        camera.scroll(5.0);
        assert!(camera.fov().is_finite());
        let options = CameraOptions {
            fovy_max: f32::NAN,
            ..CameraOptions::default()
        };
        let mut camera = FlyCamera::new(&options, 1.0);
        camera.scroll(-100.0);
        assert_eq!(camera.fov(), 15.0);
    }

    #[test]
    fn scroll_is_clamped() {
        let mut camera = camera();
        camera.scroll(-100.0);
        assert_eq!(camera.fov(), 15.0);
        camera.scroll(1000.0);
        assert_eq!(camera.fov(), 150.0);
        camera.scroll(-10.0);
        assert_eq!(camera.fov(), 140.0);
    }

    #[test]
    fn moving_and_manipulated_frame_resolves_once() {
        let mut camera = camera();
        camera.press(MoveDirection::Forward);

        // One frame: movement, resolve, then a manipulator turns the view.
        camera.integrate(0.016);
        assert!(camera.resolve().uniform.is_some());
        let turned = camera.view() * Mat4::from_rotation_y(0.1);
        assert!(camera.apply_manipulated_view(turned));
        assert!(camera.needs_resolve());

        // The turn is picked up by the next frame's single resolution.
        camera.integrate(0.016);
        let report = camera.resolve();
        assert!(report.uniform.is_some());
        assert!(!report.projection_rebuilt);
        assert!(!camera.needs_resolve());
        assert!(camera.resolve().uniform.is_none());
    }

    #[test]
    fn identical_manipulated_view_is_not_a_change() {
        let mut camera = camera();
        assert!(!camera.apply_manipulated_view(camera.view()));
        assert!(camera.resolve().uniform.is_none());

        let turned = camera.view() * Mat4::from_rotation_y(0.1);
        assert!(camera.apply_manipulated_view(turned));
        let report = camera.resolve();
        assert!(!report.projection_rebuilt);
        assert!(report.uniform.is_some());
    }
}
