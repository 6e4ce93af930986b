//! Input handling: platform-agnostic event types and the movement
//! directions that key bindings resolve to.

/// Platform-agnostic input events.
pub mod event;
/// Bindable camera movement directions.
pub mod keyboard;

pub use event::{InputEvent, MouseButton};
pub use keyboard::MoveDirection;
