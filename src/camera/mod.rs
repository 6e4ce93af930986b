//! Camera system for 3D scene viewing.
//!
//! Provides a keyboard-driven fly camera whose projection and view uniform
//! are derived lazily from dirty inputs, plus the GPU binding for the
//! uniform.

/// Fly camera controller: movement, scroll zoom and dependency resolution.
pub mod controller;
/// View uniform type and its GPU buffer.
pub mod core;

pub use controller::{FlyCamera, ResolveReport};
pub use self::core::{CameraBinding, ViewUniform};
