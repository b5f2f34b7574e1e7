//! Grid mesh types and triangulation
//!
//! Vertices are emitted in row-major order so that the vertex for grid cell
//! `(row, col)` always lives at index `row * width + col`. Faces store those
//! positional indices, so the vertex order is fixed for the life of a mesh.

use glam::Vec3;
use rayon::prelude::*;

use crate::error::{ConvertError, Result};
use crate::height_field::HeightField;

/// Triangle as three vertex indices
pub type Face = [u32; 3];

/// Dimensions of the grid a mesh was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn vertex_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn face_count(&self) -> usize {
        2 * (self.width as usize).saturating_sub(1) * (self.height as usize).saturating_sub(1)
    }

    /// Vertex index of grid cell `(row, col)`
    #[inline]
    pub fn index(&self, row: u32, col: u32) -> u32 {
        row * self.width + col
    }

    /// Inverse of [`GridSize::index`]: `(row, col)`
    #[inline]
    pub fn cell(&self, index: u32) -> (u32, u32) {
        (index / self.width, index % self.width)
    }
}

/// Triangle mesh over a regular grid
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    grid: GridSize,
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Swap in a new vertex set of the same length, keeping faces.
    ///
    /// Consumes the mesh so the previous vertex set cannot be observed
    /// alongside the new one.
    pub(crate) fn with_vertices(self, vertices: Vec<Vec3>) -> Self {
        debug_assert_eq!(vertices.len(), self.vertices.len());
        Self {
            grid: self.grid,
            vertices,
            faces: self.faces,
        }
    }
}

/// Triangulate a height field into a grid mesh.
///
/// Vertex `(row, col)` is placed at `(col, row, sample * z_scale)`. Each
/// 2x2 block is split along the `(r,c)-(r+1,c+1)` diagonal into
/// `[(r,c), (r+1,c), (r+1,c+1)]` and `[(r,c), (r+1,c+1), (r,c+1)]`.
pub fn triangulate(field: &HeightField, z_scale: f32) -> Result<Mesh> {
    let grid = GridSize::new(field.width(), field.height());
    if grid.width < 2 || grid.height < 2 {
        return Err(ConvertError::InvalidHeightField(format!(
            "need at least 2x2 samples to form a triangle, got {}x{}",
            grid.width, grid.height
        )));
    }
    if grid.vertex_count() > u32::MAX as usize {
        return Err(ConvertError::InvalidHeightField(format!(
            "{}x{} grid exceeds the 32-bit vertex index range",
            grid.width, grid.height
        )));
    }

    let width = grid.width as usize;

    let mut vertices = vec![Vec3::ZERO; grid.vertex_count()];
    vertices
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            let row = row as u32;
            for (col, v) in out.iter_mut().enumerate() {
                let col = col as u32;
                *v = Vec3::new(col as f32, row as f32, field.sample(row, col) * z_scale);
            }
        });

    // Two faces per cell, (width - 1) cells per row of quads
    let mut faces: Vec<Face> = vec![[0; 3]; grid.face_count()];
    faces
        .par_chunks_mut(2 * (width - 1))
        .enumerate()
        .for_each(|(row, out)| {
            let r = row as u32;
            for (c, pair) in out.chunks_exact_mut(2).enumerate() {
                let c = c as u32;
                let top_left = grid.index(r, c);
                let top_right = grid.index(r, c + 1);
                let bottom_left = grid.index(r + 1, c);
                let bottom_right = grid.index(r + 1, c + 1);

                pair[0] = [top_left, bottom_left, bottom_right];
                pair[1] = [top_left, bottom_right, top_right];
            }
        });

    tracing::debug!(
        "Triangulated {}x{} grid: {} vertices, {} faces",
        grid.width,
        grid.height,
        vertices.len(),
        faces.len()
    );

    Ok(Mesh {
        grid,
        vertices,
        faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32) -> HeightField {
        HeightField::from_samples(width, height, vec![0.0; (width * height) as usize]).unwrap()
    }

    fn ramp(width: u32, height: u32) -> HeightField {
        let n = (width * height) as usize;
        let samples = (0..n).map(|i| i as f32 / n as f32).collect();
        HeightField::from_samples(width, height, samples).unwrap()
    }

    #[test]
    fn test_flat_2x2() {
        let mesh = triangulate(&flat(2, 2), 1.0).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert!(mesh.vertices().iter().all(|v| v.z == 0.0));
        assert_eq!(mesh.faces(), &[[0, 2, 3], [0, 3, 1]]);
    }

    #[test]
    fn test_counts_for_various_sizes() {
        for (w, h) in [(2, 2), (3, 2), (2, 5), (4, 4), (17, 9), (64, 3)] {
            let mesh = triangulate(&ramp(w, h), 1.0).unwrap();
            assert_eq!(mesh.vertex_count(), (w * h) as usize);
            assert_eq!(mesh.face_count(), (2 * (w - 1) * (h - 1)) as usize);

            let n = mesh.vertex_count() as u32;
            assert!(mesh.faces().iter().flatten().all(|&i| i < n));
        }
    }

    #[test]
    fn test_index_identity() {
        let field = ramp(5, 4);
        let mesh = triangulate(&field, 2.0).unwrap();
        let grid = mesh.grid();

        for row in 0..4 {
            for col in 0..5 {
                let idx = grid.index(row, col);
                assert_eq!(idx, row * 5 + col);
                assert_eq!(grid.cell(idx), (row, col));

                let v = mesh.vertices()[idx as usize];
                assert_eq!(v.x, col as f32);
                assert_eq!(v.y, row as f32);
                assert_eq!(v.z, field.sample(row, col) * 2.0);
            }
        }
    }

    #[test]
    fn test_fixed_diagonal_everywhere() {
        let mesh = triangulate(&ramp(4, 3), 1.0).unwrap();
        let grid = mesh.grid();

        let mut k = 0;
        for r in 0..2 {
            for c in 0..3 {
                let a = [grid.index(r, c), grid.index(r + 1, c), grid.index(r + 1, c + 1)];
                let b = [grid.index(r, c), grid.index(r + 1, c + 1), grid.index(r, c + 1)];
                assert_eq!(mesh.faces()[k], a);
                assert_eq!(mesh.faces()[k + 1], b);
                k += 2;
            }
        }
    }

    #[test]
    fn test_winding_normal_points_negative_z() {
        // x = col, y = row: every face has a right-handed normal along -z
        let mesh = triangulate(&ramp(6, 5), 1.0).unwrap();
        for f in mesh.faces() {
            let a = mesh.vertices()[f[0] as usize].truncate();
            let b = mesh.vertices()[f[1] as usize].truncate();
            let c = mesh.vertices()[f[2] as usize].truncate();
            assert_eq!((b - a).perp_dot(c - a), -1.0, "face {:?}", f);

            let normal = (b - a).extend(0.0).cross((c - a).extend(0.0));
            assert!(normal.z < 0.0);
        }
    }

    #[test]
    fn test_single_row_or_column_rejected() {
        for (w, h) in [(1, 5), (5, 1), (1, 1)] {
            let err = triangulate(&flat(w, h), 1.0).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidHeightField);
        }
    }

    #[test]
    fn test_deterministic() {
        let field = ramp(33, 21);
        let a = triangulate(&field, 1.5).unwrap();
        let b = triangulate(&field, 1.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_z_scale_applied() {
        let field = HeightField::from_samples(2, 2, vec![1.0; 4]).unwrap();
        let mesh = triangulate(&field, 10.0).unwrap();
        assert!(mesh.vertices().iter().all(|v| v.z == 10.0));
    }
}
