//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, vertex layouts, mesh and
//! instance buffers, the material bind group, and shader composition.

/// Diffuse + specular material bind group.
pub mod material;
/// Static mesh and per-instance buffers.
pub mod mesh;
/// Shared wgpu boilerplate helpers for bind group layouts and pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Render-target and material textures.
pub mod texture;
/// Declarative vertex layouts.
pub mod vertex;
