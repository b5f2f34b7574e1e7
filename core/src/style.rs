//! Style presets: per-style vertical relief scaling

use glam::Vec3;
use std::fmt;
use std::str::FromStr;

use crate::mesh::Mesh;

/// Named relief style. Only the z component of a vertex is affected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Style {
    /// Relief as extracted
    #[default]
    Modern,
    /// Flattened relief
    Classic,
    /// Exaggerated relief
    Nostalgic,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Modern, Style::Classic, Style::Nostalgic];

    /// Multiplier applied to vertex z
    pub fn z_multiplier(self) -> f32 {
        match self {
            Style::Modern => 1.0,
            Style::Classic => 0.5,
            Style::Nostalgic => 1.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Modern => "modern",
            Style::Classic => "classic",
            Style::Nostalgic => "nostalgic",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown style token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style '{0}' (expected modern, classic or nostalgic)")]
pub struct ParseStyleError(pub String);

impl FromStr for Style {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modern" => Ok(Style::Modern),
            "classic" => Ok(Style::Classic),
            "nostalgic" => Ok(Style::Nostalgic),
            _ => Err(ParseStyleError(s.to_string())),
        }
    }
}

/// Return a new vertex sequence with z scaled by the style multiplier
pub fn deform(vertices: &[Vec3], style: Style) -> Vec<Vec3> {
    if style == Style::Modern {
        return vertices.to_vec();
    }
    let k = style.z_multiplier();
    vertices
        .iter()
        .map(|v| Vec3::new(v.x, v.y, v.z * k))
        .collect()
}

impl Mesh {
    /// Apply a style, producing a mesh with the same faces and grid
    pub fn into_styled(self, style: Style) -> Mesh {
        let vertices = deform(self.vertices(), style);
        self.with_vertices(vertices)
    }
}
