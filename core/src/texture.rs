//! Texture mapping: planar UVs over the source grid
//!
//! UVs are a direct projection of the grid onto the unit square,
//! `(col / (W-1), row / (H-1))`. Texture pixels are never sampled; the
//! decoded texture only has to exist for UVs to be emitted.

use glam::Vec2;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::mesh::{GridSize, Mesh};
use crate::raster::RasterImage;

/// Name used for the single material of a textured mesh
pub const DEFAULT_MATERIAL_NAME: &str = "mharender_texture";

/// Texture a mesh refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRef {
    pub name: String,
    pub texture_path: PathBuf,
}

impl MaterialRef {
    pub fn new(texture_path: impl Into<PathBuf>) -> Self {
        Self {
            name: DEFAULT_MATERIAL_NAME.to_string(),
            texture_path: texture_path.into(),
        }
    }
}

/// What the caller was able to provide as a texture
#[derive(Debug)]
pub enum TextureInput {
    /// No texture requested
    None,
    /// Texture decoded successfully
    Decoded {
        image: RasterImage,
        reference: PathBuf,
    },
    /// Texture requested but decoding failed
    Failed {
        reference: PathBuf,
        error: ConvertError,
    },
}

impl TextureInput {
    /// Wrap a decode attempt for `path`
    pub fn from_decode(path: &Path, result: crate::Result<RasterImage>) -> Self {
        match result {
            Ok(image) => TextureInput::Decoded {
                image,
                reference: path.to_path_buf(),
            },
            Err(error) => TextureInput::Failed {
                reference: path.to_path_buf(),
                error,
            },
        }
    }
}

/// Mesh plus per-vertex UVs and an optional material.
///
/// `uvs` is either empty or exactly `mesh.vertex_count()` long.
#[derive(Debug)]
pub struct TexturedMesh {
    pub mesh: Mesh,
    pub uvs: Vec<Vec2>,
    pub material: Option<MaterialRef>,
    /// Recoverable problems met while texturing
    pub warnings: Vec<ConvertError>,
}

impl TexturedMesh {
    /// Mesh without texture coordinates
    pub fn untextured(mesh: Mesh) -> Self {
        Self {
            mesh,
            uvs: Vec::new(),
            material: None,
            warnings: Vec::new(),
        }
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }
}

/// Planar UV per grid vertex, in vertex order
pub fn planar_uvs(grid: GridSize, flip_v: bool) -> Vec<Vec2> {
    let last_col = (grid.width.max(2) - 1) as f32;
    let last_row = (grid.height.max(2) - 1) as f32;

    let mut uvs = Vec::with_capacity(grid.vertex_count());
    for row in 0..grid.height {
        let v = row as f32 / last_row;
        let v = if flip_v { 1.0 - v } else { v };
        for col in 0..grid.width {
            uvs.push(Vec2::new(col as f32 / last_col, v));
        }
    }
    uvs
}

/// Attach UVs to a mesh according to `texture`.
///
/// A failed texture never aborts: the error is converted into a
/// `TextureDecodeFailure` warning and the mesh comes back without UVs.
pub fn map_texture(mesh: Mesh, texture: TextureInput, flip_v: bool) -> TexturedMesh {
    match texture {
        TextureInput::None => TexturedMesh::untextured(mesh),
        TextureInput::Decoded { image, reference } => {
            let (tw, th) = image.dimensions();
            tracing::debug!("Mapping {}x{} texture {:?}", tw, th, reference);

            let uvs = planar_uvs(mesh.grid(), flip_v);
            debug_assert_eq!(uvs.len(), mesh.vertex_count());
            TexturedMesh {
                mesh,
                uvs,
                material: Some(MaterialRef::new(reference)),
                warnings: Vec::new(),
            }
        }
        TextureInput::Failed { reference, error } => {
            let warning = match error {
                e @ ConvertError::TextureDecodeFailure { .. } => e,
                other => ConvertError::TextureDecodeFailure {
                    path: reference,
                    reason: other.to_string(),
                },
            };
            tracing::warn!("{}; continuing without texture coordinates", warning);

            let mut textured = TexturedMesh::untextured(mesh);
            textured.warnings.push(warning);
            textured
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height_field::HeightField;
    use crate::mesh::triangulate;

    fn grid_mesh(width: u32, height: u32) -> Mesh {
        let field =
            HeightField::from_samples(width, height, vec![0.3; (width * height) as usize]).unwrap();
        triangulate(&field, 1.0).unwrap()
    }

    fn texture() -> RasterImage {
        RasterImage::from_u8(2, 2, 3, vec![255; 12]).unwrap()
    }

    #[test]
    fn test_planar_uvs_corners() {
        let uvs = planar_uvs(GridSize::new(3, 5), false);
        assert_eq!(uvs.len(), 15);
        assert_eq!(uvs[0], Vec2::new(0.0, 0.0));
        assert_eq!(uvs[2], Vec2::new(1.0, 0.0));
        assert_eq!(uvs[12], Vec2::new(0.0, 1.0));
        assert_eq!(uvs[14], Vec2::new(1.0, 1.0));
        assert_eq!(uvs[7], Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_planar_uvs_flip_v() {
        let uvs = planar_uvs(GridSize::new(2, 3), true);
        assert_eq!(uvs[0], Vec2::new(0.0, 1.0));
        assert_eq!(uvs[5], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_uvs_in_unit_square() {
        let uvs = planar_uvs(GridSize::new(13, 7), false);
        assert!(uvs
            .iter()
            .all(|uv| (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)));
    }

    #[test]
    fn test_no_texture_no_uvs() {
        let textured = map_texture(grid_mesh(3, 3), TextureInput::None, false);
        assert!(!textured.has_uvs());
        assert!(textured.material.is_none());
        assert!(textured.warnings.is_empty());
    }

    #[test]
    fn test_decoded_texture_aligned_uvs() {
        let input = TextureInput::Decoded {
            image: texture(),
            reference: "wood.png".into(),
        };
        let textured = map_texture(grid_mesh(4, 3), input, false);

        assert_eq!(textured.uvs.len(), textured.mesh.vertex_count());
        let material = textured.material.unwrap();
        assert_eq!(material.texture_path, PathBuf::from("wood.png"));
        assert_eq!(material.name, DEFAULT_MATERIAL_NAME);
    }

    #[test]
    fn test_failed_texture_degrades() {
        let plain = map_texture(grid_mesh(3, 2), TextureInput::None, false);

        let failed = TextureInput::from_decode(
            Path::new("broken.png"),
            Err(ConvertError::Decode {
                path: "broken.png".into(),
                reason: "bad magic".into(),
            }),
        );
        let degraded = map_texture(grid_mesh(3, 2), failed, false);

        assert_eq!(degraded.mesh, plain.mesh);
        assert!(degraded.uvs.is_empty());
        assert!(degraded.material.is_none());
        assert_eq!(degraded.warnings.len(), 1);
        assert_eq!(
            degraded.warnings[0].kind(),
            crate::ErrorKind::TextureDecodeFailure
        );
        assert!(degraded.warnings[0].is_recoverable());
    }
}
