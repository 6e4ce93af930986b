/// Platform-agnostic input events.
///
/// The viewer translates windowing-system events into these and hands them
/// to [`PickingEngine::handle_event`](crate::engine::PickingEngine::handle_event).
/// Cursor positions are in window (logical) coordinates; the engine maps
/// them to framebuffer texels itself.
///
/// # Example
///
/// ```
/// use picker::input::InputEvent;
///
/// let event = InputEvent::KeyChanged {
///     key: "KeyW".to_owned(),
///     pressed: true,
/// };
/// assert!(matches!(event, InputEvent::KeyChanged { pressed: true, .. }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A physical key went down or up.
    KeyChanged {
        /// Key code string in `winit::keyboard::KeyCode` debug format
        /// (`"KeyW"`, `"Escape"`, ...).
        key: String,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel (positive = away from the user).
    Scroll {
        /// Vertical scroll amount in lines.
        delta: f32,
    },
    /// Cursor moved to an absolute window position.
    CursorMoved {
        /// Horizontal position in window coordinates.
        x: f32,
        /// Vertical position in window coordinates.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Framebuffer (physical pixel) size changed.
    FramebufferResized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// Window (logical) size changed.
    WindowResized {
        /// New width in window coordinates.
        width: f32,
        /// New height in window coordinates.
        height: f32,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Left,
        }
    }
}
