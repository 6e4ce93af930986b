use super::{PickingEngine, CLEAR_COLOR};
use crate::picking::SceneDraw;

impl PickingEngine {
    /// Advance the simulation by `dt` seconds: integrate camera movement,
    /// rotate and upload the instances, then resolve and upload the view.
    pub fn update(&mut self, dt: f32) {
        self.camera.integrate(dt);
        self.grid.rotate(dt);
        self.instances
            .write(&self.context.queue, &self.grid.instance_models());
        self.sync_camera();
    }

    /// Start the overlay frame and let it manipulate the view. A changed
    /// view only marks the camera dirty; the next [`update`](Self::update)
    /// resolves and uploads it, so the view uniform is derived at most once
    /// per frame.
    pub fn update_overlay(&mut self, dt: f32) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        overlay.begin_frame(dt);
        let mut view = self.camera.view();
        overlay.view_manipulate(&mut view, self.camera.distance());
        if self.camera.apply_manipulated_view(view) {
            log::debug!("view changed by overlay");
        }
    }

    /// Record the picking pass and, when an instance is hovered, its
    /// outline into `encoder`, leaving the shaded scene in `target`.
    pub fn render_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        let scene = SceneDraw {
            camera: &self.camera_binding.bind_group,
            material: &self.material.bind_group,
            outline: &self.highlight.bind_group,
            mesh: &self.mesh,
            instances: &self.instances,
            clear_color: CLEAR_COLOR,
        };
        self.strategy.encode_scene(encoder, target, &scene);
        if let Some(hovered) = self.highlight.prepare(
            &self.context.queue,
            self.hovered,
            self.grid.models(),
        ) {
            self.strategy.encode_highlight(encoder, target, &scene, hovered);
        }
    }

    /// Record the overlay over `target`.
    pub fn render_overlay(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        let pixels_per_point = self.pixels_per_point();
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.render(&self.context, encoder, target, pixels_per_point);
        }
    }

    /// Render scene and overlay into `target` and submit. `target` must
    /// have the context's format and size.
    pub fn render_to(&mut self, target: &wgpu::TextureView) {
        let mut encoder = self.context.create_encoder();
        self.render_scene(&mut encoder, target);
        self.render_overlay(&mut encoder, target);
        self.context.submit(encoder);
    }

    /// Run one full frame against the window surface and present it.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if no frame could be acquired; the
    /// caller reconfigures on `Lost` or `Outdated`.
    pub fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let dt = self.frame_stats.tick();
        self.update(dt);
        self.update_overlay(dt);

        let output = self.context.get_next_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to(&view);
        output.present();
        Ok(())
    }

    fn sync_camera(&mut self) {
        let report = self.camera.resolve();
        if report.projection_rebuilt {
            log::debug!(
                "projection rebuilt: fov {:.1}, aspect {:.3}",
                self.camera.fov(),
                self.camera.aspect()
            );
        }
        if let Some(uniform) = report.uniform {
            self.camera_binding.upload(&self.context.queue, &uniform);
        }
    }
}
