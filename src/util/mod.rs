//! Shared utilities for the render loop.

/// Frame-duration ring buffer for FPS display.
pub mod frame_stats;
