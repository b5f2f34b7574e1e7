//! End-to-end conversion: image file -> styled, textured OBJ

use std::path::{Path, PathBuf};

use crate::config::ConversionConfig;
use crate::decode::{ImageDecoder, check_format};
use crate::error::{ConvertError, Result};
use crate::height_field::extract_height_field;
use crate::mesh::{Mesh, triangulate};
use crate::obj::save_obj;
use crate::raster::RasterImage;
use crate::style::Style;
use crate::texture::{TextureInput, TexturedMesh, map_texture};

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "output.obj";

/// One conversion job
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub style: Style,
    pub texture: Option<PathBuf>,
    pub output: PathBuf,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            style: Style::default(),
            texture: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn texture(mut self, texture: impl Into<PathBuf>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}

/// Summary of a finished conversion
#[derive(Debug)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub material_library: Option<PathBuf>,
    pub vertex_count: usize,
    pub face_count: usize,
    pub uv_count: usize,
    /// Recoverable problems (currently only texture failures)
    pub warnings: Vec<ConvertError>,
}

/// Runs the pipeline with an injected decoder
pub struct Converter<D> {
    decoder: D,
    config: ConversionConfig,
}

impl<D: ImageDecoder> Converter<D> {
    pub fn new(decoder: D, config: ConversionConfig) -> Self {
        Self { decoder, config }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Height field -> triangulation -> style
    pub fn build_mesh(&self, image: &RasterImage, style: Style) -> Result<Mesh> {
        let field = extract_height_field(image, &self.config.height.luminance)?;
        let mesh = triangulate(&field, self.config.height.z_scale)?;
        Ok(mesh.into_styled(style))
    }

    /// Decode the optional texture and attach UVs; never fails
    pub fn apply_texture(&self, mesh: Mesh, texture: Option<&Path>) -> TexturedMesh {
        let input = match texture {
            None => TextureInput::None,
            Some(path) => TextureInput::from_decode(path, self.decoder.decode(path)),
        };
        map_texture(mesh, input, self.config.texture.flip_v)
    }

    /// Run a full conversion and write the result
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionReport> {
        check_format(&request.input)?;

        let image = self.decoder.decode(&request.input)?;
        tracing::debug!(
            "Loaded {:?} ({}x{}, {} channel(s))",
            request.input,
            image.width(),
            image.height(),
            image.channels()
        );

        let mesh = self.build_mesh(&image, request.style)?;
        let textured = self.apply_texture(mesh, request.texture.as_deref());

        let saved = save_obj(&request.output, &textured, self.config.texture.write_material)?;

        tracing::info!(
            "Converted {:?} -> {:?} (style={}, {} vertices, {} faces, {} uvs)",
            request.input,
            saved.obj,
            request.style,
            textured.mesh.vertex_count(),
            textured.mesh.face_count(),
            textured.uvs.len()
        );

        Ok(ConversionReport {
            output: saved.obj,
            material_library: saved.mtl,
            vertex_count: textured.mesh.vertex_count(),
            face_count: textured.mesh.face_count(),
            uv_count: textured.uvs.len(),
            warnings: textured.warnings,
        })
    }
}
