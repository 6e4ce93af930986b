//! Hover outline: which instance to outline, its enlarged model matrix and
//! the two outline pipelines.
//!
//! The outline is the hovered instance drawn again at a slightly larger
//! scale with depth testing off, minus the instance's own footprint. With
//! the attachment strategy the footprint is found by comparing the
//! identifier texel in the fragment shader; with the stencil strategy the
//! stencil test rejects it.

use encase::ShaderType;
use glam::{Mat4, Vec3, Vec4};

use crate::error::PickerError;
use crate::gpu::mesh::GpuMesh;
use crate::gpu::pipeline_helpers::uniform_buffer;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::vertex::{BufferLayout, VertexPnt};
use crate::options::HighlightOptions;
use crate::picking::{PickResult, SceneLayouts, DEPTH_STENCIL_FORMAT};

/// Uniform consumed by both outline shaders (`@group(1)`).
#[derive(Debug, Clone, Copy, PartialEq, ShaderType)]
pub struct OutlineUniform {
    /// Enlarged model matrix of the hovered instance.
    pub model: Mat4,
    /// Linear RGBA outline color.
    pub color: Vec4,
    /// Hovered instance index.
    pub instance_id: u32,
}

/// The instance to outline, or `None` when the pick result does not name
/// one of `instance_count` instances.
#[must_use]
pub fn highlight_target(
    hovered: PickResult,
    instance_count: usize,
) -> Option<usize> {
    hovered.index().filter(|&i| i < instance_count)
}

/// `model` uniformly enlarged by `scale` about its own origin.
#[must_use]
pub fn outline_model(model: Mat4, scale: f32) -> Mat4 {
    model * Mat4::from_scale(Vec3::splat(scale))
}

/// Outline parameters plus the GPU uniform they are written to.
pub struct Highlight {
    scale: f32,
    color: Vec4,
    buffer: wgpu::Buffer,
    /// Bind group layout for the outline uniform.
    pub layout: wgpu::BindGroupLayout,
    /// Bind group referencing the outline uniform.
    pub bind_group: wgpu::BindGroup,
}

impl Highlight {
    /// Allocate the outline uniform.
    pub fn new(device: &wgpu::Device, options: &HighlightOptions) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Outline Uniform Buffer"),
            size: OutlineUniform::min_size().get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Outline Bind Group Layout"),
                entries: &[uniform_buffer(0)],
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Outline Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            scale: options.scale,
            color: Vec4::from_array(options.color),
            buffer,
            layout,
            bind_group,
        }
    }

    /// The uniform for outlining `hovered`, or `None` when nothing valid is
    /// hovered.
    #[must_use]
    pub fn uniform(
        &self,
        hovered: PickResult,
        models: &[Mat4],
    ) -> Option<OutlineUniform> {
        let index = highlight_target(hovered, models.len())?;
        Some(OutlineUniform {
            model: outline_model(models[index], self.scale),
            color: self.color,
            instance_id: index as u32,
        })
    }

    /// Upload the outline uniform for `hovered`. Returns the instance index
    /// to outline, or `None` (and uploads nothing) when no draw is needed.
    pub fn prepare(
        &self,
        queue: &wgpu::Queue,
        hovered: PickResult,
        models: &[Mat4],
    ) -> Option<u32> {
        let uniform = self.uniform(hovered, models)?;
        let mut bytes = encase::UniformBuffer::new(Vec::<u8>::new());
        if let Err(e) = bytes.write(&uniform) {
            log::error!("failed to encode outline uniform: {e}");
            return None;
        }
        queue.write_buffer(&self.buffer, 0, &bytes.into_inner());
        Some(uniform.instance_id)
    }
}

fn outline_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    color_format: wgpu::TextureFormat,
    depth_stencil: Option<wgpu::DepthStencilState>,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Pipeline Layout")),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    let vertex = BufferLayout::of::<VertexPnt>();
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} Pipeline")),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex.as_wgpu()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Outline pipeline for the attachment strategy: no depth or stencil
/// state; the identifier texture is bound at `@group(2)`.
///
/// # Errors
///
/// Returns [`PickerError::Shader`] if the outline shader fails to compose.
pub fn attachment_outline_pipeline(
    device: &wgpu::Device,
    composer: &mut ShaderComposer,
    layouts: &SceneLayouts<'_>,
    identifier_layout: &wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, PickerError> {
    let shader = composer.compose(device, Shader::OutlineAttachment)?;
    Ok(outline_pipeline(
        device,
        "Attachment Outline",
        &shader,
        &[layouts.camera, layouts.outline, identifier_layout],
        color_format,
        None,
    ))
}

/// Outline pipeline for the stencil strategy: depth test off and depth
/// writes disabled, stencil `NotEqual` against the reference (the hovered
/// index) with a zero write mask so the identifier buffer is preserved.
///
/// # Errors
///
/// Returns [`PickerError::Shader`] if the outline shader fails to compose.
pub fn stencil_outline_pipeline(
    device: &wgpu::Device,
    composer: &mut ShaderComposer,
    layouts: &SceneLayouts<'_>,
    color_format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, PickerError> {
    let shader = composer.compose(device, Shader::OutlineStencil)?;
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::NotEqual,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Keep,
    };
    let depth_stencil = wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Always,
        stencil: wgpu::StencilState {
            front: face,
            back: face,
            read_mask: 0xFF,
            write_mask: 0x00,
        },
        bias: wgpu::DepthBiasState::default(),
    };
    Ok(outline_pipeline(
        device,
        "Stencil Outline",
        &shader,
        &[layouts.camera, layouts.outline],
        color_format,
        Some(depth_stencil),
    ))
}

/// Draw the enlarged hovered instance. The caller binds the outline
/// pipeline and, for the attachment strategy, the identifier texture.
pub fn draw_outline(
    pass: &mut wgpu::RenderPass<'_>,
    camera: &wgpu::BindGroup,
    outline: &wgpu::BindGroup,
    mesh: &GpuMesh,
) {
    pass.set_bind_group(0, camera, &[]);
    pass.set_bind_group(1, outline, &[]);
    pass.set_vertex_buffer(0, mesh.buffer().slice(..));
    pass.draw(0..mesh.vertex_count(), 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picking::NO_HOVER;

    #[test]
    fn sentinel_never_highlights() {
        assert_eq!(highlight_target(PickResult::NONE, 125), None);
        let sentinel = PickResult::from_raw(NO_HOVER, 125);
        assert_eq!(highlight_target(sentinel, 125), None);
    }

    #[test]
    fn valid_index_highlights() {
        let target =
            |raw| highlight_target(PickResult::from_raw(raw, 125), 125);
        assert_eq!(target(0), Some(0));
        assert_eq!(target(124), Some(124));
    }

    #[test]
    fn index_beyond_current_models_never_highlights() {
        let hovered = PickResult::from_raw(100, 125);
        assert_eq!(highlight_target(hovered, 50), None);
    }

    #[test]
    fn outline_scales_about_the_instance_origin() {
        let model = Mat4::from_translation(Vec3::new(2.0, 0.0, -1.0));
        let scaled = outline_model(model, 1.05);
        assert_eq!(scaled.w_axis, model.w_axis);
        let corner = scaled.transform_point3(Vec3::splat(0.5));
        let expected = Vec3::new(2.0, 0.0, -1.0) + Vec3::splat(0.525);
        assert!(corner.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn outline_uniform_matches_wgsl_layout() {
        // mat4x4 (64) + vec4 (16) + u32 (4), rounded up to 16.
        assert_eq!(OutlineUniform::min_size().get(), 96);
    }
}
