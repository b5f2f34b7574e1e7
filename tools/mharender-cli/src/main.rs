//! mharender - convert a 2D drawing into a 3D OBJ model
//!
//! # Usage
//!
//! ```bash
//! # Grayscale relief with default settings -> output.obj
//! mharender drawing.png
//!
//! # Exaggerated relief, textured, custom output
//! mharender drawing.png --style nostalgic --texture paper.jpg --output model.obj
//!
//! # Also write model.mtl referencing the texture
//! mharender drawing.png --texture paper.jpg --output model.obj --material
//! ```
//!
//! Settings not given on the command line come from `--config <file>` or
//! `mharender.toml` in the platform config directory.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mharender_core::{ConversionConfig, ConversionRequest, Converter, Style, default_decoder};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mharender")]
#[command(about = "Convert 2D drawings to 3D models with customizable styles and textures")]
#[command(version)]
struct Cli {
    /// Input drawing (PNG or JPEG)
    input: PathBuf,

    /// Base style for the 3D model
    #[arg(short, long, value_enum, default_value_t = StyleArg::Modern)]
    style: StyleArg,

    /// Optional image to use as a texture
    #[arg(short, long)]
    texture: Option<PathBuf>,

    /// Path for the output OBJ file
    #[arg(short, long, default_value = mharender_core::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Configuration file (defaults to mharender.toml in the config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Height multiplier applied before the style (overrides config)
    #[arg(long)]
    z_scale: Option<f32>,

    /// Flip the V texture coordinate (overrides config)
    #[arg(long)]
    flip_v: bool,

    /// Write a .mtl material library next to the OBJ when textured
    #[arg(long)]
    material: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    Modern,
    Classic,
    Nostalgic,
}

impl From<StyleArg> for Style {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Modern => Style::Modern,
            StyleArg::Classic => Style::Classic,
            StyleArg::Nostalgic => Style::Nostalgic,
        }
    }
}

impl Cli {
    /// Merge command-line overrides into the loaded configuration
    fn resolve_config(&self) -> Result<ConversionConfig> {
        let mut config = ConversionConfig::discover(self.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(z_scale) = self.z_scale {
            config.height.z_scale = z_scale;
        }
        if self.flip_v {
            config.texture.flip_v = true;
        }
        if self.material {
            config.texture.write_material = true;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn request(&self) -> ConversionRequest {
        let mut request = ConversionRequest::new(&self.input)
            .style(self.style.into())
            .output(&self.output);
        if let Some(texture) = &self.texture {
            request = request.texture(texture);
        }
        request
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let config = cli.resolve_config()?;
    let converter = Converter::new(default_decoder(), config);

    let request = cli.request();
    let report = converter
        .convert(&request)
        .with_context(|| format!("Failed to convert {:?}", request.input))?;

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    if let Some(mtl) = &report.material_library {
        println!("Material library saved to {}", mtl.display());
    }
    println!("Model saved to {}", report.output.display());

    Ok(())
}
