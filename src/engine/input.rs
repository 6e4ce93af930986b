use super::PickingEngine;
use crate::input::InputEvent;
use crate::picking::{window_to_framebuffer, FramebufferOrigin, PickResult};

impl PickingEngine {
    /// Process a platform-agnostic input event.
    ///
    /// The overlay sees the event first. Keys drive the fly camera, scroll
    /// changes the field of view, and cursor motion re-picks, the latter
    /// two only while the overlay does not capture the pointer. Resize
    /// events always apply.
    pub fn handle_event(&mut self, event: &InputEvent) {
        let consumed = self
            .overlay
            .as_mut()
            .is_some_and(|overlay| overlay.handle_event(event));
        let captured = consumed || self.overlay_wants_pointer();

        match *event {
            InputEvent::KeyChanged { ref key, pressed } => {
                if consumed {
                    return;
                }
                if let Some(direction) = self.options.keybindings.lookup(key) {
                    if pressed {
                        self.camera.press(direction);
                    } else {
                        self.camera.release(direction);
                    }
                }
            }
            InputEvent::Scroll { delta } => {
                if !captured {
                    self.camera.scroll(delta);
                }
            }
            InputEvent::CursorMoved { x, y } => {
                if !captured {
                    self.pick_at(x, y);
                }
            }
            InputEvent::MouseButton { .. } => {}
            InputEvent::FramebufferResized { width, height } => {
                self.resize(width, height);
            }
            InputEvent::WindowResized { width, height } => {
                if width > 0.0 && height > 0.0 {
                    self.window_size = (width, height);
                }
            }
        }
    }

    /// Resize the surface, the camera aspect and the picking targets.
    /// Zero-sized framebuffers are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("ignoring resize to {width}x{height}");
            return;
        }
        self.context.resize(width, height);
        let _ = self.camera.resize(width, height);
        self.strategy.resize(&self.context.device, width, height);
        log::info!("resized to {width}x{height}");
    }

    /// Read the identifier under window position `(x, y)` and store the
    /// result. Positions outside the framebuffer and failed reads keep the
    /// previous result.
    pub fn pick_at(&mut self, x: f32, y: f32) {
        if !self.strategy.has_rendered() {
            return;
        }
        let Some(texel) = window_to_framebuffer(
            (x, y),
            self.window_size,
            self.strategy.size(),
            FramebufferOrigin::TopLeft,
        ) else {
            log::debug!("cursor ({x}, {y}) is outside the framebuffer");
            return;
        };

        match self.strategy.read_identifier(
            &self.context.device,
            &self.context.queue,
            texel,
        ) {
            Ok(raw) => {
                let picked = PickResult::from_raw(raw, self.grid.len());
                if picked != self.hovered {
                    log::debug!("hovered instance: {:?}", picked.index());
                }
                self.hovered = picked;
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    fn overlay_wants_pointer(&self) -> bool {
        self.overlay.as_ref().is_some_and(|overlay| overlay.wants_pointer())
    }
}
