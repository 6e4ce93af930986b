use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::PickerError;

/// Every WGSL entry shader the renderer builds pipelines from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shader {
    /// Instanced lit cubes writing color plus the instance identifier.
    SceneAttachment,
    /// Instanced lit cubes writing color only (identifier lives in stencil).
    SceneStencil,
    /// Enlarged hovered instance; discards its own identifier footprint.
    OutlineAttachment,
    /// Enlarged hovered instance; masking is done by the stencil test.
    OutlineStencil,
    /// Full-screen copy of the offscreen color target.
    Blit,
    /// Axis triad drawn by the view gizmo overlay.
    Gizmo,
}

impl Shader {
    fn source(self) -> (&'static str, &'static str) {
        match self {
            Self::SceneAttachment => (
                include_str!("../../assets/shaders/scene_attachment.wgsl"),
                "scene_attachment.wgsl",
            ),
            Self::SceneStencil => (
                include_str!("../../assets/shaders/scene_stencil.wgsl"),
                "scene_stencil.wgsl",
            ),
            Self::OutlineAttachment => (
                include_str!("../../assets/shaders/outline_attachment.wgsl"),
                "outline_attachment.wgsl",
            ),
            Self::OutlineStencil => (
                include_str!("../../assets/shaders/outline_stencil.wgsl"),
                "outline_stencil.wgsl",
            ),
            Self::Blit => {
                (include_str!("../../assets/shaders/blit.wgsl"), "blit.wgsl")
            }
            Self::Gizmo => {
                (include_str!("../../assets/shaders/gizmo.wgsl"), "gizmo.wgsl")
            }
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::SceneAttachment => "Scene Attachment Shader",
            Self::SceneStencil => "Scene Stencil Shader",
            Self::OutlineAttachment => "Outline Attachment Shader",
            Self::OutlineStencil => "Outline Stencil Shader",
            Self::Blit => "Blit Shader",
            Self::Gizmo => "Gizmo Shader",
        }
    }

    /// All shaders, for exhaustive composition checks.
    pub const ALL: [Self; 6] = [
        Self::SceneAttachment,
        Self::SceneStencil,
        Self::OutlineAttachment,
        Self::OutlineStencil,
        Self::Blit,
        Self::Gizmo,
    ];
}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads all shared WGSL modules at construction time. Consuming shaders
/// use `#import picker::module_name` to pull in shared code. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition: (source, file_path)
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

impl ShaderComposer {
    /// Build a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, PickerError> {
        let mut composer = Composer::default();

        // Register shared modules in dependency order.
        let modules: &[ModuleDef] = &[
            ModuleDef {
                source: include_str!(
                    "../../assets/shaders/modules/camera.wgsl"
                ),
                file_path: "modules/camera.wgsl",
            },
            ModuleDef {
                source: include_str!(
                    "../../assets/shaders/modules/instance.wgsl"
                ),
                file_path: "modules/instance.wgsl",
            },
            ModuleDef {
                source: include_str!(
                    "../../assets/shaders/modules/lighting.wgsl"
                ),
                file_path: "modules/lighting.wgsl",
            },
            ModuleDef {
                source: include_str!(
                    "../../assets/shaders/modules/outline.wgsl"
                ),
                file_path: "modules/outline.wgsl",
            },
        ];

        for m in modules {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    PickerError::Shader(format!(
                        "failed to register shader module '{}': {e:?}",
                        m.file_path
                    ))
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose `shader` into a `wgpu::ShaderModule` ready for pipeline
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        shader: Shader,
    ) -> Result<wgpu::ShaderModule, PickerError> {
        let naga_module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose `shader` into a `naga::Module` without creating a wgpu shader
    /// module. Useful for testing shader composition without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Shader`] if composition fails.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
    ) -> Result<naga::Module, PickerError> {
        let (source, file_path) = shader.source();
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                PickerError::Shader(format!(
                    "failed to compose shader '{file_path}': {}",
                    e.emit_to_string(&self.composer)
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            if let Err(e) = composer.compose_naga(shader) {
                panic!("{shader:?} failed to compose: {e}");
            }
        }
    }
}
