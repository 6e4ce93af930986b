//! GPU-based instance picking.
//!
//! Every frame the instanced scene is rendered with a per-fragment
//! instance identifier next to color and depth, either in a dedicated
//! `R8Uint` attachment or in the stencil buffer. When the cursor moves, the
//! single texel under it is copied back synchronously and becomes the new
//! [`PickResult`].

/// Identifier in a dedicated color attachment.
pub mod attachment;
/// Synchronous single-texel GPU read-back.
pub mod readback;
/// Identifier in the stencil buffer.
pub mod stencil;

pub use attachment::AttachmentPicking;
pub use readback::TexelReadback;
pub use stencil::StencilPicking;

use crate::error::PickerError;
use crate::gpu::mesh::{GpuMesh, InstanceBuffer};
use crate::gpu::vertex::{BufferLayout, InstanceModel, VertexPnt};
use crate::options::PickingMode;

/// Identifier value meaning "no object under this texel". Both identifier
/// buffers are cleared to it every frame.
pub const NO_HOVER: u8 = 0xFF;

/// Depth format of the attachment strategy.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Depth/stencil format of the stencil strategy.
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Depth24PlusStencil8;

/// Identifier format of the attachment strategy.
pub const IDENTIFIER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Uint;

/// The instance under the cursor, or none.
///
/// Wraps the raw identifier byte; [`NO_HOVER`] means nothing is hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickResult(u8);

impl PickResult {
    /// Nothing hovered.
    pub const NONE: Self = Self(NO_HOVER);

    /// Interpret a read-back identifier. Anything that is not the index of
    /// one of `instance_count` instances means "none".
    #[must_use]
    pub fn from_raw(raw: u8, instance_count: usize) -> Self {
        if usize::from(raw) < instance_count {
            Self(raw)
        } else {
            Self::NONE
        }
    }

    /// The hovered instance index, if any.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        (self.0 != NO_HOVER).then_some(usize::from(self.0))
    }

    /// The raw identifier byte.
    #[must_use]
    pub fn raw(self) -> u8 {
        self.0
    }

    /// Whether nothing is hovered.
    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == NO_HOVER
    }
}

impl Default for PickResult {
    fn default() -> Self {
        Self::NONE
    }
}

/// Which corner framebuffer row 0 lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferOrigin {
    /// Row 0 is the top row (wgpu, Vulkan, Metal, D3D).
    TopLeft,
    /// Row 0 is the bottom row (OpenGL).
    BottomLeft,
}

/// Map a cursor position in window coordinates to the framebuffer texel
/// under it.
///
/// Window coordinates have their origin top-left. The position is scaled by
/// `framebuffer / window` (HiDPI), truncated, and flipped vertically for a
/// bottom-left `origin`. Returns `None` for positions outside the
/// framebuffer or degenerate sizes; a read there would be out of bounds.
#[must_use]
pub fn window_to_framebuffer(
    (x, y): (f32, f32),
    (window_width, window_height): (f32, f32),
    (fb_width, fb_height): (u32, u32),
    origin: FramebufferOrigin,
) -> Option<(u32, u32)> {
    if window_width <= 0.0
        || window_height <= 0.0
        || fb_width == 0
        || fb_height == 0
    {
        return None;
    }
    let (fb_w, fb_h) = (fb_width as f32, fb_height as f32);
    let fx = (x * fb_w / window_width).floor();
    let fy = (y * fb_h / window_height).floor();
    if !(fx >= 0.0 && fy >= 0.0 && fx < fb_w && fy < fb_h) {
        return None;
    }
    let (tx, ty) = (fx as u32, fy as u32);
    let ty = match origin {
        FramebufferOrigin::TopLeft => ty,
        FramebufferOrigin::BottomLeft => fb_height - 1 - ty,
    };
    Some((tx, ty))
}

/// Bind group layouts every scene and outline pipeline is built against.
pub struct SceneLayouts<'a> {
    /// `@group(0)`: view uniform.
    pub camera: &'a wgpu::BindGroupLayout,
    /// `@group(1)` of the scene shaders: material maps.
    pub material: &'a wgpu::BindGroupLayout,
    /// `@group(1)` of the outline shaders: outline uniform.
    pub outline: &'a wgpu::BindGroupLayout,
}

/// Everything one frame of the scene is drawn with.
pub struct SceneDraw<'a> {
    /// View uniform bind group.
    pub camera: &'a wgpu::BindGroup,
    /// Material bind group.
    pub material: &'a wgpu::BindGroup,
    /// Outline uniform bind group.
    pub outline: &'a wgpu::BindGroup,
    /// The instanced mesh.
    pub mesh: &'a GpuMesh,
    /// Per-instance model matrices.
    pub instances: &'a InstanceBuffer,
    /// Background color.
    pub clear_color: wgpu::Color,
}

/// A picking pipeline: renders the scene with per-fragment identifiers,
/// draws the hover outline and reads identifiers back.
pub trait PickingStrategy {
    /// Which identifier storage this strategy uses.
    fn mode(&self) -> PickingMode;

    /// Recreate the offscreen targets for a new framebuffer size. Until the
    /// next [`encode_scene`](Self::encode_scene) there is nothing to read.
    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32);

    /// Current target size in texels.
    fn size(&self) -> (u32, u32);

    /// Record the primary pass, leaving the shaded scene in `target` and the
    /// identifiers in the strategy's own buffer.
    fn encode_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &SceneDraw<'_>,
    );

    /// Record the outline of instance `hovered` over `target`. Must follow
    /// [`encode_scene`](Self::encode_scene) in the same frame.
    fn encode_highlight(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &SceneDraw<'_>,
        hovered: u32,
    );

    /// Whether the current targets hold a rendered frame.
    fn has_rendered(&self) -> bool;

    /// Synchronously read the identifier at framebuffer texel `texel`.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Readback`] if nothing has been rendered yet,
    /// the texel is out of bounds, or the GPU copy fails.
    fn read_identifier(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texel: (u32, u32),
    ) -> Result<u8, PickerError>;
}

/// Instanced lit-mesh pipeline shared by both strategies; they differ in
/// color targets and depth/stencil state.
pub(crate) fn scene_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    layouts: &SceneLayouts<'_>,
    targets: &[Option<wgpu::ColorTargetState>],
    depth_stencil: wgpu::DepthStencilState,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Pipeline Layout")),
        bind_group_layouts: &[layouts.camera, layouts.material],
        push_constant_ranges: &[],
    });
    let vertex = BufferLayout::of::<VertexPnt>();
    let instance = BufferLayout::of::<InstanceModel>();
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} Pipeline")),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex.as_wgpu(), instance.as_wgpu()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets,
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(depth_stencil),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Bind the scene resources shared by both strategies' primary pass.
pub(crate) fn bind_scene(
    pass: &mut wgpu::RenderPass<'_>,
    scene: &SceneDraw<'_>,
) {
    pass.set_bind_group(0, scene.camera, &[]);
    pass.set_bind_group(1, scene.material, &[]);
    pass.set_vertex_buffer(0, scene.mesh.buffer().slice(..));
    pass.set_vertex_buffer(1, scene.instances.buffer().slice(..));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_identifiers_mean_none() {
        assert_eq!(PickResult::from_raw(124, 125).index(), Some(124));
        assert!(PickResult::from_raw(125, 125).is_none());
        assert!(PickResult::from_raw(200, 125).is_none());
        assert!(PickResult::from_raw(NO_HOVER, 125).is_none());
        assert_eq!(PickResult::default(), PickResult::NONE);
    }

    #[test]
    fn hidpi_scaling() {
        let texel = window_to_framebuffer(
            (100.0, 50.0),
            (640.0, 640.0),
            (1280, 1280),
            FramebufferOrigin::TopLeft,
        );
        assert_eq!(texel, Some((200, 100)));
    }

    #[test]
    fn bottom_left_origin_flips_rows() {
        let (window, fb) = ((640.0, 480.0), (640, 480));
        let origin = FramebufferOrigin::BottomLeft;
        let top = window_to_framebuffer((0.0, 0.0), window, fb, origin);
        assert_eq!(top, Some((0, 479)));
        let bottom = window_to_framebuffer((639.0, 479.5), window, fb, origin);
        assert_eq!(bottom, Some((639, 0)));
    }

    #[test]
    fn outside_positions_are_rejected() {
        let window = (640.0, 640.0);
        let fb = (640, 640);
        let origin = FramebufferOrigin::TopLeft;
        let map = |position, window, fb| {
            window_to_framebuffer(position, window, fb, origin)
        };
        assert_eq!(map((-1.0, 10.0), window, fb), None);
        assert_eq!(map((10.0, 640.0), window, fb), None);
        assert_eq!(map((f32::NAN, 10.0), window, fb), None);
        assert_eq!(map((10.0, 10.0), (0.0, 640.0), fb), None);
        assert_eq!(map((10.0, 10.0), window, (640, 0)), None);
        assert_eq!(map((639.9, 0.0), window, fb), Some((639, 0)));
    }
}
