//! mharender core - 2D drawing to 3D mesh conversion
//!
//! A single deterministic forward pass from one raster image to one static
//! mesh:
//!
//! 1. [`extract_height_field`] - luminance grid normalized to `[0, 1]`
//! 2. [`triangulate`] - one vertex per sample, two triangles per grid cell
//! 3. [`Mesh::into_styled`] - per-style z scaling
//! 4. [`map_texture`] - planar UVs when a texture is bound
//! 5. [`save_obj`] - Wavefront OBJ, written atomically
//!
//! [`Converter`] strings the stages together behind an injected
//! [`ImageDecoder`].
//!
//! # Example
//! ```no_run
//! use mharender_core::*;
//!
//! let converter = Converter::new(default_decoder(), ConversionConfig::default());
//! let request = ConversionRequest::new("drawing.png")
//!     .style(Style::Nostalgic)
//!     .output("drawing.obj");
//! let report = converter.convert(&request)?;
//! println!("{} faces", report.face_count);
//! # Ok::<(), ConvertError>(())
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod height_field;
pub mod mesh;
pub mod obj;
pub mod pipeline;
pub mod raster;
pub mod style;
pub mod texture;

pub use config::{ConversionConfig, HeightConfig, LuminanceWeights, TextureConfig};
#[cfg(feature = "image-decode")]
pub use decode::RasterDecoder;
pub use decode::{ImageDecoder, UnavailableDecoder, check_format, default_decoder};
pub use error::{ConvertError, ErrorKind, Result};
pub use height_field::{HeightField, extract_height_field};
pub use mesh::{Face, GridSize, Mesh, triangulate};
pub use obj::{ObjDocument, ObjFace, SavedFiles, load_obj, read_obj, save_obj, write_obj};
pub use pipeline::{ConversionReport, ConversionRequest, Converter, DEFAULT_OUTPUT};
pub use raster::{RasterImage, Samples};
pub use style::{ParseStyleError, Style, deform};
pub use texture::{MaterialRef, TextureInput, TexturedMesh, map_texture, planar_uvs};
