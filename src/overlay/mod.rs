//! UI overlays drawn on top of the scene.
//!
//! An [`Overlay`] sees every input event before the engine does and can
//! claim it, and may rewrite the camera view once per frame (a view
//! manipulation gizmo). The built-in overlay is the [`ViewGizmo`].

/// Axis-triad view gizmo.
pub mod gizmo;

pub use gizmo::{GizmoState, ViewGizmo};
use glam::Mat4;

use crate::gpu::render_context::RenderContext;
use crate::input::InputEvent;

/// A UI layer composited over the scene.
///
/// Per frame the engine calls [`begin_frame`](Self::begin_frame), then
/// [`view_manipulate`](Self::view_manipulate), and finally
/// [`render`](Self::render) after the scene and highlight passes.
pub trait Overlay {
    /// Offer an input event. Returns `true` if the overlay consumed it, in
    /// which case the engine does not act on it.
    fn handle_event(&mut self, event: &InputEvent) -> bool;

    /// Whether the overlay currently captures the pointer (hovered or
    /// dragging). Scroll and cursor picking are suppressed while it does.
    fn wants_pointer(&self) -> bool;

    /// Start a new UI frame.
    fn begin_frame(&mut self, dt: f32);

    /// Apply any pending manipulation to `view`. `distance` is the orbit
    /// radius in front of the eye. Leaves `view` bit-identical when there
    /// is nothing to apply.
    fn view_manipulate(&mut self, view: &mut Mat4, distance: f32);

    /// Draw the overlay over `target`. `pixels_per_point` converts window
    /// coordinates to framebuffer pixels.
    fn render(
        &mut self,
        context: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        pixels_per_point: f32,
    );
}
