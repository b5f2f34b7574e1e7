//! Wavefront OBJ output (and the small reader used to verify it)
//!
//! Layout of a written file:
//!
//! ```text
//! mtllib <name>.mtl      (only with a material sidecar)
//! v x y z                (one per vertex, vertex order)
//! vt u v                 (one per vertex, only when UVs exist)
//! usemtl <name>          (only with a material sidecar)
//! f a b c | f a/a b/b c/c (1-based)
//! ```

use glam::{Vec2, Vec3};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{ConvertError, Result};
use crate::texture::{MaterialRef, TexturedMesh};

/// Files produced by [`save_obj`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFiles {
    pub obj: PathBuf,
    pub mtl: Option<PathBuf>,
}

/// Plain decimal: shortest round-trip digits, always a fractional part,
/// never an exponent (`0.0`, `0.5`, `0.00000196`)
struct ObjFloat(f32);

impl fmt::Display for ObjFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        if self.0.is_finite() && self.0.fract() == 0.0 {
            f.write_str(".0")?;
        }
        Ok(())
    }
}

/// Serialize a mesh as OBJ text.
///
/// `mtllib` names a material library to reference; it is only honoured
/// when the mesh carries a material.
pub fn write_obj<W: Write>(w: &mut W, textured: &TexturedMesh, mtllib: Option<&str>) -> io::Result<()> {
    let material = textured.material.as_ref().zip(mtllib);

    if let Some((_, lib)) = material {
        writeln!(w, "mtllib {}", lib)?;
    }

    for v in textured.mesh.vertices() {
        writeln!(w, "v {} {} {}", ObjFloat(v.x), ObjFloat(v.y), ObjFloat(v.z))?;
    }

    let has_uv = textured.has_uvs();
    if has_uv {
        for t in &textured.uvs {
            writeln!(w, "vt {} {}", ObjFloat(t.x), ObjFloat(t.y))?;
        }
    }

    if let Some((m, _)) = material {
        writeln!(w, "usemtl {}", m.name)?;
    }

    // OBJ indices are 1-based; UVs share the vertex index
    for face in textured.mesh.faces() {
        let [a, b, c] = face.map(|i| i as u64 + 1);
        if has_uv {
            writeln!(w, "f {a}/{a} {b}/{b} {c}/{c}")?;
        } else {
            writeln!(w, "f {a} {b} {c}")?;
        }
    }

    Ok(())
}

/// Serialize a material library with a single diffuse-textured material
pub fn write_mtl<W: Write>(w: &mut W, material: &MaterialRef) -> io::Result<()> {
    writeln!(w, "newmtl {}", material.name)?;
    writeln!(w, "Ka 1.0 1.0 1.0")?;
    writeln!(w, "Kd 1.0 1.0 1.0")?;
    writeln!(w, "Ks 0.0 0.0 0.0")?;
    writeln!(w, "map_Kd {}", material.texture_path.display())?;
    Ok(())
}

/// Write `textured` to `path` without ever exposing a partial file.
///
/// Output goes to a temporary file in the destination directory which is
/// renamed over `path` only once fully flushed. With `with_material` and a
/// bound texture, a `.mtl` sidecar is staged the same way; both files are
/// complete before either is moved into place, and the sidecar is removed
/// again if the OBJ cannot be.
pub fn save_obj(path: &Path, textured: &TexturedMesh, with_material: bool) -> Result<SavedFiles> {
    let sidecar = match (&textured.material, with_material) {
        (Some(material), true) => {
            let mtl_path = path.with_extension("mtl");
            let material = MaterialRef {
                name: material.name.clone(),
                texture_path: texture_path_for(&mtl_path, &material.texture_path),
            };
            let staged = stage(&mtl_path, |w| write_mtl(w, &material))?;
            Some((mtl_path, staged))
        }
        _ => None,
    };

    let lib = sidecar.as_ref().map(|(mtl_path, _)| {
        mtl_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "materials.mtl".to_string())
    });
    let staged_obj = stage(path, |w| write_obj(w, textured, lib.as_deref()))?;

    let mut saved = SavedFiles {
        obj: path.to_path_buf(),
        mtl: None,
    };
    match sidecar {
        Some((mtl_path, staged_mtl)) => {
            commit(staged_mtl, &mtl_path)?;
            if let Err(err) = commit(staged_obj, path) {
                if let Err(e) = std::fs::remove_file(&mtl_path) {
                    tracing::warn!("Failed to remove orphaned {:?}: {}", mtl_path, e);
                }
                return Err(err);
            }
            saved.mtl = Some(mtl_path);
        }
        None => commit(staged_obj, path)?,
    }

    tracing::debug!(
        "Wrote {:?}: {} vertices, {} uvs, {} faces",
        path,
        textured.mesh.vertex_count(),
        textured.uvs.len(),
        textured.mesh.face_count()
    );

    Ok(saved)
}

/// Texture path as seen from the directory holding the `.mtl` file.
///
/// Viewers resolve `map_Kd` against the material library's directory, not
/// against the working directory the texture was named from.
fn texture_path_for(mtl_path: &Path, texture: &Path) -> PathBuf {
    let mtl_dir = mtl_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    match (std::path::absolute(texture), std::path::absolute(mtl_dir)) {
        (Ok(texture), Ok(dir)) => relative_path(&texture, &dir).unwrap_or(texture),
        _ => texture.to_path_buf(),
    }
}

/// Lexical path from absolute `base` to absolute `path`
fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
    let path: Vec<Component> = path.components().collect();
    let base: Vec<Component> = base.components().collect();

    let common = path.iter().zip(&base).take_while(|(a, b)| a == b).count();
    // Different roots or drives
    if common == 0 {
        return None;
    }
    if base[common..].iter().any(|c| !matches!(c, Component::Normal(_))) {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in &base[common..] {
        rel.push("..");
    }
    for c in &path[common..] {
        rel.push(c.as_os_str());
    }
    Some(rel)
}

/// Write a complete temporary file next to `path`
fn stage<F>(path: &Path, write: F) -> Result<NamedTempFile>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ConvertError::write_failure(path, e))?;
    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        write(&mut w).map_err(|e| ConvertError::write_failure(path, e))?;
        w.flush().map_err(|e| ConvertError::write_failure(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| ConvertError::write_failure(path, e))?;
    Ok(tmp)
}

/// Move a staged file over `path`
fn commit(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .map_err(|e| ConvertError::write_failure(path, e.error))?;
    Ok(())
}

/// Triangle read back from an OBJ file (0-based indices)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjFace {
    pub vertices: [u32; 3],
    pub uvs: Option<[u32; 3]>,
}

/// Geometry parsed from an OBJ file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjDocument {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub faces: Vec<ObjFace>,
    pub mtllib: Option<String>,
    pub usemtl: Option<String>,
}

/// Parse `v`, `vt`, `f`, `mtllib` and `usemtl` records.
///
/// Polygons with more than three corners are fan-triangulated. Comments
/// and unknown records are skipped.
pub fn read_obj<R: BufRead>(reader: R) -> io::Result<ObjDocument> {
    let mut doc = ObjDocument::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let bad = |what: &str| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line {}: {}: {:?}", line_no + 1, what, line),
            )
        };

        match parts[0] {
            "v" if parts.len() >= 4 => {
                let x = parse_f32(parts[1]).ok_or_else(|| bad("bad vertex"))?;
                let y = parse_f32(parts[2]).ok_or_else(|| bad("bad vertex"))?;
                let z = parse_f32(parts[3]).ok_or_else(|| bad("bad vertex"))?;
                doc.positions.push(Vec3::new(x, y, z));
            }
            "vt" if parts.len() >= 3 => {
                let u = parse_f32(parts[1]).ok_or_else(|| bad("bad texture coordinate"))?;
                let v = parse_f32(parts[2]).ok_or_else(|| bad("bad texture coordinate"))?;
                doc.uvs.push(Vec2::new(u, v));
            }
            "f" if parts.len() >= 4 => {
                let corners = parts[1..]
                    .iter()
                    .map(|s| parse_obj_vertex(s))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| bad("bad face"))?;

                let has_uv = corners.iter().all(|(_, vt)| vt.is_some());
                for i in 1..corners.len() - 1 {
                    let tri = [corners[0], corners[i], corners[i + 1]];
                    doc.faces.push(ObjFace {
                        vertices: tri.map(|(v, _)| v),
                        uvs: has_uv.then(|| tri.map(|(_, vt)| vt.unwrap_or(0))),
                    });
                }
            }
            "mtllib" if parts.len() >= 2 => doc.mtllib = Some(parts[1..].join(" ")),
            "usemtl" if parts.len() >= 2 => doc.usemtl = Some(parts[1..].join(" ")),
            _ => {}
        }
    }

    Ok(doc)
}

/// Read an OBJ file from disk
pub fn load_obj(path: &Path) -> io::Result<ObjDocument> {
    read_obj(io::BufReader::new(File::open(path)?))
}

fn parse_f32(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Parse a face corner: "v", "v/vt", "v/vt/vn" or "v//vn"
fn parse_obj_vertex(s: &str) -> Option<(u32, Option<u32>)> {
    let mut parts = s.split('/');

    let vi = parts.next()?.parse::<u32>().ok()?.checked_sub(1)?; // OBJ indices are 1-based

    let vti = match parts.next().filter(|s| !s.is_empty()) {
        Some(t) => Some(t.parse::<u32>().ok()?.checked_sub(1)?),
        None => None,
    };

    Some((vi, vti))
}
