use super::{
    bind_scene, scene_pipeline, PickingStrategy, SceneDraw, SceneLayouts,
    TexelReadback, DEPTH_FORMAT, IDENTIFIER_FORMAT, NO_HOVER,
};
use crate::error::PickerError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, texture_2d_unfilterable, uint_texture_2d,
};
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::RenderTarget;
use crate::highlight::{attachment_outline_pipeline, draw_outline};
use crate::options::PickingMode;

/// Offscreen attachments recreated on every resize, plus the bind groups
/// that sample them.
struct Targets {
    color: RenderTarget,
    identifier: RenderTarget,
    depth: RenderTarget,
    blit_bind_group: wgpu::BindGroup,
    identifier_bind_group: wgpu::BindGroup,
}

/// Picking with a dedicated `R8Uint` identifier attachment.
///
/// One pass renders color, identifier and depth offscreen; the color
/// target is then copied to the frame. The outline shader reads the
/// identifier texture to discard the hovered instance's own footprint.
pub struct AttachmentPicking {
    scene_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    outline_pipeline: wgpu::RenderPipeline,
    blit_layout: wgpu::BindGroupLayout,
    identifier_layout: wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
    targets: Targets,
    readback: TexelReadback,
    rendered: bool,
}

impl AttachmentPicking {
    /// Build pipelines and `width`×`height` targets. `color_format` is the
    /// format of the frame the scene is presented to.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Shader`] if a shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        layouts: &SceneLayouts<'_>,
        color_format: wgpu::TextureFormat,
        (width, height): (u32, u32),
    ) -> Result<Self, PickerError> {
        let scene_shader = composer.compose(device, Shader::SceneAttachment)?;
        let scene_pipeline = scene_pipeline(
            device,
            "Scene Attachment",
            &scene_shader,
            layouts,
            &[
                Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                }),
                Some(wgpu::ColorTargetState {
                    format: IDENTIFIER_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                }),
            ],
            wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            },
        );

        let blit_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Blit Bind Group Layout"),
                entries: &[texture_2d_unfilterable(0)],
            });
        let blit_shader = composer.compose(device, Shader::Blit)?;
        let blit_pipeline = create_screen_space_pipeline(
            device,
            "Blit",
            &blit_shader,
            color_format,
            None,
            &[&blit_layout],
        );

        let identifier_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Identifier Bind Group Layout"),
                entries: &[uint_texture_2d(0)],
            });
        let outline_pipeline = attachment_outline_pipeline(
            device,
            composer,
            layouts,
            &identifier_layout,
            color_format,
        )?;

        let targets = Self::create_targets(
            device,
            &blit_layout,
            &identifier_layout,
            color_format,
            (width, height),
        );

        Ok(Self {
            scene_pipeline,
            blit_pipeline,
            outline_pipeline,
            blit_layout,
            identifier_layout,
            color_format,
            targets,
            readback: TexelReadback::new(device, "Identifier Staging Buffer"),
            rendered: false,
        })
    }

    fn create_targets(
        device: &wgpu::Device,
        blit_layout: &wgpu::BindGroupLayout,
        identifier_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Targets {
        let color = RenderTarget::new(
            device,
            "Scene Color Target",
            size,
            color_format,
            wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let identifier = RenderTarget::new(
            device,
            "Instance Identifier Target",
            size,
            IDENTIFIER_FORMAT,
            wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        );
        let depth = RenderTarget::new(
            device,
            "Scene Depth Target",
            size,
            DEPTH_FORMAT,
            wgpu::TextureUsages::empty(),
        );
        let blit_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Blit Bind Group"),
                layout: blit_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color.view),
                }],
            });
        let identifier_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Identifier Bind Group"),
                layout: identifier_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        &identifier.view,
                    ),
                }],
            });
        Targets {
            color,
            identifier,
            depth,
            blit_bind_group,
            identifier_bind_group,
        }
    }
}

impl PickingStrategy for AttachmentPicking {
    fn mode(&self) -> PickingMode {
        PickingMode::Attachment
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (width, height) == self.size() || width == 0 || height == 0 {
            return;
        }
        self.targets = Self::create_targets(
            device,
            &self.blit_layout,
            &self.identifier_layout,
            self.color_format,
            (width, height),
        );
        self.rendered = false;
    }

    fn size(&self) -> (u32, u32) {
        self.targets.color.size()
    }

    fn encode_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &SceneDraw<'_>,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Attachment Pass"),
            color_attachments: &[
                Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
                Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.identifier.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(NO_HOVER),
                            g: 0.0,
                            b: 0.0,
                            a: 0.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
            ],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });
        pass.set_pipeline(&self.scene_pipeline);
        bind_scene(&mut pass, scene);
        pass.draw(0..scene.mesh.vertex_count(), 0..scene.instances.count());
        drop(pass);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(scene.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_pipeline(&self.blit_pipeline);
        pass.set_bind_group(0, &self.targets.blit_bind_group, &[]);
        pass.draw(0..3, 0..1);
        drop(pass);

        self.rendered = true;
    }

    fn encode_highlight(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &SceneDraw<'_>,
        _hovered: u32,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Attachment Outline Pass"),
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
        pass.set_pipeline(&self.outline_pipeline);
        pass.set_bind_group(2, &self.targets.identifier_bind_group, &[]);
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
                "no frame rendered into the identifier target yet".to_owned(),
            ));
        }
        self.readback.read_u8(
            device,
            queue,
            &self.targets.identifier.texture,
            wgpu::TextureAspect::All,
            texel,
        )
    }
}
