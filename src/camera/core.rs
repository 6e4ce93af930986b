use encase::ShaderType;
use glam::{Mat4, Vec3};

use crate::gpu::pipeline_helpers::uniform_buffer;

/// The per-frame uniform shared by every scene and outline shader: the
/// composed projection-view matrix and the eye position for specular
/// lighting.
#[derive(Debug, Clone, Copy, PartialEq, ShaderType)]
pub struct ViewUniform {
    /// `projection * view`.
    pub projection_view: Mat4,
    /// Camera world-space position.
    pub view_pos: Vec3,
}

impl ViewUniform {
    /// Compose the uniform from a view and a projection matrix.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            projection_view: projection * view,
            view_pos: view.inverse().w_axis.truncate(),
        }
    }
}

impl Default for ViewUniform {
    fn default() -> Self {
        Self {
            projection_view: Mat4::IDENTITY,
            view_pos: Vec3::ZERO,
        }
    }
}

/// GPU uniform buffer holding the [`ViewUniform`], its layout and bind
/// group (`@group(0)` in every scene shader).
pub struct CameraBinding {
    buffer: wgpu::Buffer,
    /// Bind group layout for the view uniform.
    pub layout: wgpu::BindGroupLayout,
    /// Bind group referencing the view uniform buffer.
    pub bind_group: wgpu::BindGroup,
    uploads: u64,
}

impl CameraBinding {
    /// Allocate the uniform buffer and its bind group.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("View Uniform Buffer"),
            size: ViewUniform::min_size().get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("View Bind Group Layout"),
                entries: &[uniform_buffer(0)],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("View Bind Group"),
        });

        Self {
            buffer,
            layout,
            bind_group,
            uploads: 0,
        }
    }

    /// How many times a view uniform has been written since creation.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Write `uniform` into the GPU buffer.
    pub fn upload(&mut self, queue: &wgpu::Queue, uniform: &ViewUniform) {
        let mut bytes = encase::UniformBuffer::new(Vec::<u8>::new());
        if let Err(e) = bytes.write(uniform) {
            log::error!("failed to encode view uniform: {e}");
            return;
        }
        queue.write_buffer(&self.buffer, 0, &bytes.into_inner());
        self.uploads += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_pos_is_the_eye() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let uniform = ViewUniform::new(view, Mat4::IDENTITY);
        assert!(uniform.view_pos.abs_diff_eq(eye, 1e-5));
    }

    #[test]
    fn uniform_size_matches_wgsl_layout() {
        // mat4x4<f32> (64) + vec3<f32> (12) rounded up to 16-byte alignment.
        assert_eq!(ViewUniform::min_size().get(), 80);
    }
}
