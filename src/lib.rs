// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! GPU instance picking with a reactive fly camera, built on wgpu.
//!
//! A grid of instanced, textured meshes is rendered with a per-fragment
//! instance identifier next to color and depth. Moving the cursor reads
//! the identifier under it back from the GPU, and the hovered instance is
//! outlined. Camera state (view, field of view, aspect) lives in
//! [`dirty::Dirty`] values so derived transforms are rebuilt at most once
//! per frame.
//!
//! # Key entry points
//!
//! - [`engine::PickingEngine`] - the render-loop driver
//! - [`picking::PickingStrategy`] - identifier attachment or stencil picking
//! - [`camera::FlyCamera`] - keyboard fly camera with lazy transforms
//! - [`options::Options`] - TOML-backed runtime configuration
//! - [`overlay::Overlay`] - UI layer with the built-in view gizmo
//!
//! # Frame order
//!
//! `update` (camera integration, instance rotation, uniform upload) →
//! `update_overlay` (gizmo view manipulation) → `render_scene` (picking
//! pass, blit, outline) → `render_overlay`.

pub mod camera;
pub mod dirty;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod highlight;
pub mod input;
pub mod options;
pub mod overlay;
pub mod picking;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;
