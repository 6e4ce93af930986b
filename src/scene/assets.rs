use std::path::Path;

use image::RgbaImage;

use crate::error::PickerError;
use crate::gpu::vertex::VertexPnt;
use crate::options::SceneOptions;

const FLOATS_PER_VERTEX: usize = 8;

/// CPU-side scene data: the instanced mesh and its two material maps.
pub struct SceneAssets {
    /// Non-indexed triangle list.
    pub vertices: Vec<VertexPnt>,
    /// Diffuse (albedo) map.
    pub diffuse: RgbaImage,
    /// Specular mask.
    pub specular: RgbaImage,
}

impl SceneAssets {
    /// Load the mesh and material maps named in `options`, relative to its
    /// assets directory.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Io`] if the mesh cannot be read,
    /// [`PickerError::AssetParse`] if it is malformed and
    /// [`PickerError::Image`] if an image cannot be decoded.
    pub fn load(options: &SceneOptions) -> Result<Self, PickerError> {
        let dir = &options.assets_dir;
        let mesh_path = dir.join(&options.mesh);
        let text = std::fs::read_to_string(&mesh_path)?;
        let vertices = parse_mesh(&text).map_err(|e| match e {
            PickerError::AssetParse(msg) => {
                let path = mesh_path.display();
                PickerError::AssetParse(format!("{path}: {msg}"))
            }
            other => other,
        })?;
        let diffuse = load_image(&dir.join(&options.diffuse_map))?;
        let specular = load_image(&dir.join(&options.specular_map))?;
        log::info!(
            "loaded {} vertices, {}x{} diffuse, {}x{} specular",
            vertices.len(),
            diffuse.width(),
            diffuse.height(),
            specular.width(),
            specular.height()
        );
        Ok(Self {
            vertices,
            diffuse,
            specular,
        })
    }
}

/// Decode an image file into RGBA8.
///
/// # Errors
///
/// Returns [`PickerError::Image`] if the file is missing or cannot be
/// decoded.
pub fn load_image(path: &Path) -> Result<RgbaImage, PickerError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Parse a whitespace-separated mesh: eight floats per vertex (position,
/// normal, texture coordinates), three vertices per triangle.
///
/// # Errors
///
/// Returns [`PickerError::AssetParse`] on a non-numeric token, a trailing
/// partial vertex, a partial triangle or an empty mesh.
pub fn parse_mesh(text: &str) -> Result<Vec<VertexPnt>, PickerError> {
    let floats = text
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token.parse::<f32>().map_err(|e| {
                PickerError::AssetParse(format!("token {i} ({token:?}): {e}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if floats.is_empty() {
        return Err(PickerError::AssetParse("mesh has no vertices".to_owned()));
    }
    if floats.len() % FLOATS_PER_VERTEX != 0 {
        return Err(PickerError::AssetParse(format!(
            "{} floats is not a whole number of \
             {FLOATS_PER_VERTEX}-float vertices",
            floats.len()
        )));
    }

    let vertices: Vec<VertexPnt> = floats
        .chunks_exact(FLOATS_PER_VERTEX)
        .map(|v| VertexPnt {
            position: [v[0], v[1], v[2]],
            normal: [v[3], v[4], v[5]],
            texcoords: [v[6], v[7]],
        })
        .collect();
    if vertices.len() % 3 != 0 {
        return Err(PickerError::AssetParse(format!(
            "{} vertices do not form whole triangles",
            vertices.len()
        )));
    }
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "
        0 0 0  0 0 1  0 0
        1 0 0  0 0 1  1 0
        0 1 0  0 0 1  0 1
    ";

    #[test]
    fn parses_records_in_field_order() {
        let vertices = parse_mesh(TRIANGLE).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[2].texcoords, [0.0, 1.0]);
    }

    #[test]
    fn rejects_bad_tokens_and_partial_records() {
        assert!(matches!(parse_mesh("0 0 x"), Err(PickerError::AssetParse(_))));
        assert!(matches!(parse_mesh("1 2 3"), Err(PickerError::AssetParse(_))));
        assert!(matches!(parse_mesh("   "), Err(PickerError::AssetParse(_))));
        let two_vertices = "0 0 0 0 0 1 0 0\n1 0 0 0 0 1 1 0";
        assert!(matches!(
            parse_mesh(two_vertices),
            Err(PickerError::AssetParse(_))
        ));
    }

    #[test]
    fn bundled_assets_load() {
        let assets = SceneAssets::load(&SceneOptions::default()).unwrap();
        assert_eq!(assets.vertices.len(), 36);
        assert!(assets.diffuse.width() > 0);
        assert_eq!(assets.diffuse.dimensions(), assets.specular.dimensions());
    }

    #[test]
    fn bundled_cube_normals_face_outward() {
        let assets = SceneAssets::load(&SceneOptions::default()).unwrap();
        for triangle in assets.vertices.chunks_exact(3) {
            let p = |i: usize| glam::Vec3::from(triangle[i].position);
            let face = (p(1) - p(0)).cross(p(2) - p(0));
            let normal = glam::Vec3::from(triangle[0].normal);
            // Counter-clockwise winding seen from outside.
            assert!(face.dot(normal) > 0.0);
            assert!(p(0).dot(normal) > 0.0);
        }
    }

    #[test]
    fn missing_mesh_is_an_io_error() {
        let options = SceneOptions {
            assets_dir: std::env::temp_dir().join("picker-no-such-dir"),
            ..SceneOptions::default()
        };
        assert!(matches!(SceneAssets::load(&options), Err(PickerError::Io(_))));
    }
}
