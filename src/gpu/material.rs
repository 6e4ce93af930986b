//! Diffuse + specular material bind group.

use super::pipeline_helpers::{filtering_sampler, repeat_sampler, texture_2d};
use super::texture::MaterialTexture;

/// The two material maps and the bind group exposing them to the scene
/// shaders (group 1).
pub struct Material {
    _diffuse: MaterialTexture,
    _specular: MaterialTexture,
    _sampler: wgpu::Sampler,
    /// Bind group for `@group(1)`.
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    /// Layout shared by every pipeline that samples the material.
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[texture_2d(0), texture_2d(1), filtering_sampler(2)],
        })
    }

    /// Upload both maps and build the bind group.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        diffuse: &image::RgbaImage,
        specular: &image::RgbaImage,
    ) -> Self {
        let diffuse = MaterialTexture::from_image(
            device,
            queue,
            "Diffuse Map",
            diffuse,
            true,
        );
        let specular = MaterialTexture::from_image(
            device,
            queue,
            "Specular Map",
            specular,
            false,
        );
        let sampler = repeat_sampler(device, "Material Sampler");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(
                        &specular.view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        Self {
            _diffuse: diffuse,
            _specular: specular,
            _sampler: sampler,
            bind_group,
        }
    }
}
