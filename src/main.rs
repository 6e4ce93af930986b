//! Interactive picking demo: a rotating grid of textured cubes, the one
//! under the cursor outlined.
//!
//! Usage: `picker [OPTIONS.toml]`. Movement keys default to W/A/S/D, the
//! scroll wheel changes the field of view, and dragging the axis gizmo in
//! the top-left corner orbits the camera.

use std::path::Path;

use picker::options::Options;
use picker::viewer::Viewer;

fn main() {
    env_logger::init();

    let options = match std::env::args().nth(1) {
        Some(path) => match Options::load(Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    if let Err(e) = Viewer::builder().with_options(options).build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
