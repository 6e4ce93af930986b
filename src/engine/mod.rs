//! The render-loop driver tying camera, scene, picking and overlay together.

mod frame;
mod input;

use crate::camera::{CameraBinding, FlyCamera};
use crate::error::PickerError;
use crate::gpu::material::Material;
use crate::gpu::mesh::{GpuMesh, InstanceBuffer};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::highlight::Highlight;
use crate::options::{Options, PickingMode};
use crate::overlay::{Overlay, ViewGizmo};
use crate::picking::{
    AttachmentPicking, PickResult, PickingStrategy, SceneLayouts,
    StencilPicking,
};
use crate::scene::{InstanceGrid, SceneAssets};
use crate::util::frame_stats::FrameStats;

/// Background color of the scene.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

/// The render-loop driver: owns the GPU context, the camera, the instanced
/// scene, the picking strategy and the overlay.
///
/// # Frame loop
///
/// Each frame runs, in this order, [`update`](Self::update),
/// [`update_overlay`](Self::update_overlay),
/// [`render_scene`](Self::render_scene) and
/// [`render_overlay`](Self::render_overlay).
/// [`frame`](Self::frame) does all four against the window surface;
/// [`render_to`](Self::render_to) does the last two against any texture.
///
/// # Input
///
/// Forward [`InputEvent`](crate::input::InputEvent)s to
/// [`handle_event`](Self::handle_event). Cursor motion reads back the
/// identifier under the cursor synchronously and updates
/// [`hovered`](Self::hovered).
pub struct PickingEngine {
    context: RenderContext,
    options: Options,

    camera: FlyCamera,
    camera_binding: CameraBinding,

    grid: InstanceGrid,
    mesh: GpuMesh,
    instances: InstanceBuffer,
    material: Material,
    highlight: Highlight,

    strategy: Box<dyn PickingStrategy>,
    overlay: Option<Box<dyn Overlay>>,

    hovered: PickResult,
    window_size: (f32, f32),
    frame_stats: FrameStats,
}

impl PickingEngine {
    /// Build every GPU resource for `assets` under `options`.
    ///
    /// The window size starts out equal to the framebuffer size; send a
    /// [`WindowResized`](crate::input::InputEvent::WindowResized) event on
    /// HiDPI displays.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::OptionsParse`] or
    /// [`PickerError::InstanceLimit`] for options that fail
    /// [`Options::validate`], or [`PickerError::Shader`] if a shader fails
    /// to compose.
    pub fn new(
        context: RenderContext,
        assets: &SceneAssets,
        options: Options,
    ) -> Result<Self, PickerError> {
        options.validate()?;
        let mut composer = ShaderComposer::new()?;
        let (width, height) = (context.width(), context.height());
        let device = &context.device;

        let grid = InstanceGrid::from_options(&options.scene)?;
        let aspect = width as f32 / height.max(1) as f32;
        let camera = FlyCamera::new(&options.camera, aspect);
        let camera_binding = CameraBinding::new(device);

        let mesh = GpuMesh::new(device, "Instance Mesh", &assets.vertices);
        let instances =
            InstanceBuffer::new(device, "Instance Models", grid.len());
        let material_layout = Material::bind_group_layout(device);
        let material = Material::new(
            device,
            &context.queue,
            &material_layout,
            &assets.diffuse,
            &assets.specular,
        );
        let highlight = Highlight::new(device, &options.highlight);

        let layouts = SceneLayouts {
            camera: &camera_binding.layout,
            material: &material_layout,
            outline: &highlight.layout,
        };
        let format = context.format();
        let strategy: Box<dyn PickingStrategy> = match options.picking.mode {
            PickingMode::Attachment => Box::new(AttachmentPicking::new(
                device,
                &mut composer,
                &layouts,
                format,
                (width, height),
            )?),
            PickingMode::Stencil => Box::new(StencilPicking::new(
                device,
                &mut composer,
                &layouts,
                format,
                (width, height),
            )?),
        };

        let overlay: Option<Box<dyn Overlay>> = if options.overlay.gizmo {
            Some(Box::new(ViewGizmo::new(
                device,
                &mut composer,
                format,
                &options.overlay,
            )?))
        } else {
            None
        };

        log::info!(
            "picking engine ready: {} instances, {:?} picking, \
             {width}x{height}",
            grid.len(),
            strategy.mode(),
        );

        Ok(Self {
            context,
            options,
            camera,
            camera_binding,
            grid,
            mesh,
            instances,
            material,
            highlight,
            strategy,
            overlay,
            hovered: PickResult::NONE,
            window_size: (width as f32, height as f32),
            frame_stats: FrameStats::default(),
        })
    }

    /// Replace the overlay (or remove it with `None`).
    pub fn set_overlay(&mut self, overlay: Option<Box<dyn Overlay>>) {
        self.overlay = overlay;
    }

    /// The instance currently under the cursor.
    pub fn hovered(&self) -> PickResult {
        self.hovered
    }

    /// Averaged frames per second over the recent frame window.
    pub fn fps(&self) -> f32 {
        self.frame_stats.fps()
    }

    /// The active options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The fly camera.
    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    /// The instanced grid.
    pub fn grid(&self) -> &InstanceGrid {
        &self.grid
    }

    /// How many view uniforms have been uploaded since creation.
    pub fn view_uploads(&self) -> u64 {
        self.camera_binding.uploads()
    }

    /// The GPU context.
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Which picking strategy is in use.
    pub fn picking_mode(&self) -> PickingMode {
        self.strategy.mode()
    }

    /// Framebuffer pixels per window unit.
    fn pixels_per_point(&self) -> f32 {
        if self.window_size.0 > 0.0 {
            self.context.width() as f32 / self.window_size.0
        } else {
            1.0
        }
    }
}
