use encase::ShaderType;
use glam::{Mat3, Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use super::Overlay;
use crate::error::PickerError;
use crate::gpu::pipeline_helpers::uniform_buffer;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::vertex::{BufferLayout, VertexPc};
use crate::input::{InputEvent, MouseButton};
use crate::options::OverlayOptions;

/// Pointer state of the gizmo, independent of the GPU.
///
/// The gizmo occupies a `size`×`size` square at the top-left corner of the
/// window. A left-button drag that starts inside it orbits the view.
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoState {
    size: f32,
    sensitivity: f32,
    cursor: Option<Vec2>,
    dragging: bool,
    pending: Vec2,
}

impl GizmoState {
    /// A gizmo of `size` window units turning `sensitivity` radians per
    /// unit of drag.
    #[must_use]
    pub fn new(size: f32, sensitivity: f32) -> Self {
        Self {
            size,
            sensitivity,
            cursor: None,
            dragging: false,
            pending: Vec2::ZERO,
        }
    }

    /// Side of the gizmo square in window coordinates.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Whether `(x, y)` lies inside the gizmo square.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..self.size).contains(&x) && (0.0..self.size).contains(&y)
    }

    /// Whether the cursor is over the gizmo.
    pub fn hovered(&self) -> bool {
        self.cursor.is_some_and(|c| self.contains(c.x, c.y))
    }

    /// Whether a drag is in progress.
    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// See [`Overlay::handle_event`].
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::CursorMoved { x, y } => {
                let position = Vec2::new(x, y);
                if self.dragging {
                    if let Some(previous) = self.cursor {
                        self.pending += position - previous;
                    }
                }
                self.cursor = Some(position);
                self.dragging || self.hovered()
            }
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            } if self.hovered() => {
                self.dragging = true;
                true
            }
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: false,
            } if self.dragging => {
                self.dragging = false;
                true
            }
            InputEvent::MouseButton { .. } | InputEvent::Scroll { .. } => {
                self.wants_pointer()
            }
            InputEvent::KeyChanged { .. }
            | InputEvent::FramebufferResized { .. }
            | InputEvent::WindowResized { .. } => false,
        }
    }

    /// See [`Overlay::wants_pointer`].
    pub fn wants_pointer(&self) -> bool {
        self.dragging || self.hovered()
    }

    /// Orbit `view` by the drag accumulated since the last call.
    ///
    /// Horizontal drag turns about world +Y, vertical drag about the
    /// camera's right axis, both around the point `distance` in front of
    /// the eye.
    pub fn view_manipulate(&mut self, view: &mut Mat4, distance: f32) {
        let delta = std::mem::take(&mut self.pending);
        if delta == Vec2::ZERO {
            return;
        }
        let camera = view.inverse();
        let eye = camera.w_axis.truncate();
        let front = -camera.z_axis.truncate().normalize();
        let right = camera.x_axis.truncate().normalize();
        let pivot = eye + front * distance;

        let yaw = Mat4::from_rotation_y(-delta.x * self.sensitivity);
        let pitch = Mat4::from_axis_angle(right, -delta.y * self.sensitivity);
        let orbit = Mat4::from_translation(pivot)
            * yaw
            * pitch
            * Mat4::from_translation(-pivot);
        *view = (orbit * camera).inverse();
    }
}

/// Clip transform of the triad: the view's rotation, shrunk to fit the
/// gizmo viewport.
#[must_use]
pub fn triad_transform(view: Mat4) -> Mat4 {
    Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, -2.0, 2.0)
        * Mat4::from_scale(Vec3::splat(0.8))
        * Mat4::from_mat3(Mat3::from_mat4(view))
}

#[derive(Debug, Clone, Copy, ShaderType)]
struct GizmoUniform {
    transform: Mat4,
}

const X_COLOR: [f32; 3] = [0.9, 0.2, 0.2];
const Y_COLOR: [f32; 3] = [0.2, 0.9, 0.2];
const Z_COLOR: [f32; 3] = [0.2, 0.4, 0.95];

const TRIAD: [VertexPc; 6] = [
    VertexPc {
        position: [0.0, 0.0, 0.0],
        color: X_COLOR,
    },
    VertexPc {
        position: [1.0, 0.0, 0.0],
        color: X_COLOR,
    },
    VertexPc {
        position: [0.0, 0.0, 0.0],
        color: Y_COLOR,
    },
    VertexPc {
        position: [0.0, 1.0, 0.0],
        color: Y_COLOR,
    },
    VertexPc {
        position: [0.0, 0.0, 0.0],
        color: Z_COLOR,
    },
    VertexPc {
        position: [0.0, 0.0, 1.0],
        color: Z_COLOR,
    },
];

/// Built-in overlay: an X/Y/Z axis triad in the top-left corner that
/// mirrors the camera orientation and orbits it when dragged.
pub struct ViewGizmo {
    state: GizmoState,
    view: Mat4,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    gizmo_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ViewGizmo {
    /// Build the triad pipeline for `color_format` targets.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Shader`] if the gizmo shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        color_format: wgpu::TextureFormat,
        options: &OverlayOptions,
    ) -> Result<Self, PickerError> {
        let shader = composer.compose(device, Shader::Gizmo)?;

        let gizmo_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Gizmo Uniform Buffer"),
            size: GizmoUniform::min_size().get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Gizmo Bind Group Layout"),
                entries: &[uniform_buffer(0)],
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Gizmo Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: gizmo_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Gizmo Pipeline Layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });
        let vertex = BufferLayout::of::<VertexPc>();
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Gizmo Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex.as_wgpu()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Gizmo Vertex Buffer"),
                contents: bytemuck::cast_slice(&TRIAD),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Ok(Self {
            state: GizmoState::new(options.gizmo_size, options.sensitivity),
            view: Mat4::IDENTITY,
            pipeline,
            vertex_buffer,
            gizmo_buffer,
            bind_group,
        })
    }

    /// Pointer state.
    pub fn state(&self) -> &GizmoState {
        &self.state
    }
}

impl Overlay for ViewGizmo {
    fn handle_event(&mut self, event: &InputEvent) -> bool {
        self.state.handle_event(event)
    }

    fn wants_pointer(&self) -> bool {
        self.state.wants_pointer()
    }

    fn begin_frame(&mut self, _dt: f32) {}

    fn view_manipulate(&mut self, view: &mut Mat4, distance: f32) {
        self.state.view_manipulate(view, distance);
        self.view = *view;
    }

    fn render(
        &mut self,
        context: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        pixels_per_point: f32,
    ) {
        let side = (self.state.size() * pixels_per_point).round() as u32;
        let side = side.min(context.width()).min(context.height());
        if side == 0 {
            return;
        }

        let mut bytes = encase::UniformBuffer::new(Vec::<u8>::new());
        if let Err(e) = bytes.write(&GizmoUniform {
            transform: triad_transform(self.view),
        }) {
            log::error!("failed to encode gizmo uniform: {e}");
            return;
        }
        context
            .queue
            .write_buffer(&self.gizmo_buffer, 0, &bytes.into_inner());

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Gizmo Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_viewport(0.0, 0.0, side as f32, side as f32, 0.0, 1.0);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..TRIAD.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(pressed: bool) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        }
    }

    fn cursor(x: f32, y: f32) -> InputEvent {
        InputEvent::CursorMoved { x, y }
    }

    fn default_view() -> Mat4 {
        Mat4::look_at_rh(10.0 * Vec3::ONE.normalize(), Vec3::ZERO, Vec3::Y)
    }

    #[test]
    fn region_is_the_top_left_square() {
        let state = GizmoState::new(64.0, 0.01);
        assert!(state.contains(0.0, 0.0));
        assert!(state.contains(63.9, 10.0));
        assert!(!state.contains(64.0, 10.0));
        assert!(!state.contains(10.0, -1.0));
    }

    #[test]
    fn hovering_captures_the_pointer() {
        let mut state = GizmoState::new(64.0, 0.01);
        assert!(!state.handle_event(&cursor(200.0, 200.0)));
        assert!(!state.wants_pointer());
        assert!(state.handle_event(&cursor(10.0, 10.0)));
        assert!(state.wants_pointer());
        assert!(state.handle_event(&InputEvent::Scroll { delta: 1.0 }));
        assert!(!state.handle_event(&InputEvent::KeyChanged {
            key: "KeyW".to_owned(),
            pressed: true,
        }));
    }

    #[test]
    fn press_outside_does_not_start_a_drag() {
        let mut state = GizmoState::new(64.0, 0.01);
        let _ = state.handle_event(&cursor(300.0, 300.0));
        assert!(!state.handle_event(&press(true)));
        assert!(!state.dragging());
    }

    #[test]
    fn drag_continues_outside_the_region() {
        let mut state = GizmoState::new(64.0, 0.01);
        let _ = state.handle_event(&cursor(32.0, 32.0));
        assert!(state.handle_event(&press(true)));
        assert!(state.handle_event(&cursor(200.0, 32.0)));
        assert!(state.wants_pointer());
        assert!(state.handle_event(&press(false)));
        assert!(!state.wants_pointer());
    }

    #[test]
    fn no_drag_leaves_view_identical() {
        let mut state = GizmoState::new(64.0, 0.01);
        let mut view = default_view();
        state.view_manipulate(&mut view, 10.0);
        assert_eq!(view, default_view());
    }

    #[test]
    fn drag_orbits_about_the_pivot() {
        let mut state = GizmoState::new(64.0, 0.01);
        let _ = state.handle_event(&cursor(32.0, 32.0));
        let _ = state.handle_event(&press(true));
        let _ = state.handle_event(&cursor(52.0, 40.0));

        let mut view = default_view();
        state.view_manipulate(&mut view, 10.0);
        assert_ne!(view, default_view());

        // The eye keeps its distance from the pivot (the origin here).
        let eye = view.inverse().w_axis.truncate();
        assert!((eye.length() - 10.0).abs() < 1e-3);
        // The pivot stays straight ahead.
        let pivot_in_view = view.transform_point3(Vec3::ZERO);
        assert!(pivot_in_view.truncate().length() < 1e-3);
        assert!((pivot_in_view.z + 10.0).abs() < 1e-3);

        // The drag is consumed.
        let after = view;
        state.view_manipulate(&mut view, 10.0);
        assert_eq!(view, after);
    }

    #[test]
    fn triad_follows_view_rotation_only() {
        let view = default_view();
        let moved = Mat4::from_translation(Vec3::new(3.0, -1.0, 2.0)) * view;
        assert_eq!(triad_transform(view), triad_transform(moved));
    }
}
