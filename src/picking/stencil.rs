use super::{
    bind_scene, scene_pipeline, PickingStrategy, SceneDraw, SceneLayouts,
    TexelReadback, DEPTH_STENCIL_FORMAT, NO_HOVER,
};
use crate::error::PickerError;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::RenderTarget;
use crate::highlight::{draw_outline, stencil_outline_pipeline};
use crate::options::PickingMode;

/// Picking through the stencil buffer.
///
/// The scene renders straight into the frame with a `Depth24PlusStencil8`
/// attachment whose stencil is cleared to [`NO_HOVER`]. Each instance is
/// drawn on its own with the stencil reference set to its index and a
/// `Replace` pass operation, so every visible fragment leaves its instance
/// index behind. The outline pass then tests `NotEqual` against the
/// hovered index without writing.
pub struct StencilPicking {
    scene_pipeline: wgpu::RenderPipeline,
    outline_pipeline: wgpu::RenderPipeline,
    depth_stencil: RenderTarget,
    readback: TexelReadback,
    rendered: bool,
}

impl StencilPicking {
    /// Build pipelines and a `width`×`height` depth/stencil target.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Shader`] if a shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        layouts: &SceneLayouts<'_>,
        color_format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Result<Self, PickerError> {
        let shader = composer.compose(device, Shader::SceneStencil)?;
        let write_index = wgpu::StencilFaceState {
            compare: wgpu::CompareFunction::Always,
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op: wgpu::StencilOperation::Replace,
        };
        let scene_pipeline = scene_pipeline(
            device,
            "Scene Stencil",
            &shader,
            layouts,
            &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            wgpu::DepthStencilState {
                format: DEPTH_STENCIL_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState {
                    front: write_index,
                    back: write_index,
                    read_mask: 0xFF,
                    write_mask: 0xFF,
                },
                bias: wgpu::DepthBiasState::default(),
            },
        );
        let outline_pipeline =
            stencil_outline_pipeline(device, composer, layouts, color_format)?;

        Ok(Self {
            scene_pipeline,
            outline_pipeline,
            depth_stencil: Self::create_depth_stencil(device, size),
            readback: TexelReadback::new(device, "Stencil Staging Buffer"),
            rendered: false,
        })
    }

    fn create_depth_stencil(
        device: &wgpu::Device,
        size: (u32, u32),
    ) -> RenderTarget {
        RenderTarget::new(
            device,
            "Scene Depth Stencil Target",
            size,
            DEPTH_STENCIL_FORMAT,
            wgpu::TextureUsages::COPY_SRC,
        )
    }
}

impl PickingStrategy for StencilPicking {
    fn mode(&self) -> PickingMode {
        PickingMode::Stencil
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (width, height) == self.size() || width == 0 || height == 0 {
            return;
        }
        self.depth_stencil =
            Self::create_depth_stencil(device, (width, height));
        self.rendered = false;
    }

    fn size(&self) -> (u32, u32) {
        self.depth_stencil.size()
    }

    fn encode_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &SceneDraw<'_>,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Stencil Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(scene.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_stencil.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(u32::from(NO_HOVER)),
                        store: wgpu::StoreOp::Store,
                    }),
                },
            ),
            ..Default::default()
        });
        pass.set_pipeline(&self.scene_pipeline);
        bind_scene(&mut pass, scene);
        let vertex_count = scene.mesh.vertex_count();
        for instance in 0..scene.instances.count() {
            pass.set_stencil_reference(instance);
            pass.draw(0..vertex_count, instance..instance + 1);
        }
        drop(pass);

        self.rendered = true;
    }

    fn encode_highlight(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &SceneDraw<'_>,
        hovered: u32,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Stencil Outline Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_stencil.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                },
            ),
            ..Default::default()
        });
        pass.set_pipeline(&self.outline_pipeline);
        pass.set_stencil_reference(hovered);
        draw_outline(&mut pass, scene.camera, scene.outline, scene.mesh);
    }

    fn has_rendered(&self) -> bool {
        self.rendered
    }

    fn read_identifier(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texel: (u32, u32),
    ) -> Result<u8, PickerError> {
        if !self.rendered {
            return Err(PickerError::Readback(
                "no frame rendered into the stencil buffer yet".to_owned(),
            ));
        }
        self.readback.read_u8(
            device,
            queue,
            &self.depth_stencil.texture,
            wgpu::TextureAspect::StencilOnly,
            texel,
        )
    }
}
