//! Conversion configuration (mharender.toml)
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock behaviour:
//!
//! ```toml
//! [height]
//! z_scale = 1.0
//! luminance = { red = 0.299, green = 0.587, blue = 0.114 }
//!
//! [texture]
//! flip_v = false
//! write_material = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "mharender.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(default)]
    pub height: HeightConfig,
    #[serde(default)]
    pub texture: TextureConfig,
}

/// Height field extraction and z scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightConfig {
    #[serde(default)]
    pub luminance: LuminanceWeights,
    /// Multiplier applied to normalized samples when emitting vertex z
    #[serde(default = "default_z_scale")]
    pub z_scale: f32,
}

/// Per-channel weights used to collapse RGB into a single luminance sample.
///
/// Defaults are the ITU-R BT.601 coefficients. Weights are divided by their
/// sum, so they need not add up to exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LuminanceWeights {
    #[serde(default = "default_red")]
    pub red: f32,
    #[serde(default = "default_green")]
    pub green: f32,
    #[serde(default = "default_blue")]
    pub blue: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureConfig {
    /// Emit `v = 1 - row/(H-1)` instead of `row/(H-1)`
    #[serde(default)]
    pub flip_v: bool,
    /// Write a `.mtl` sidecar and reference it from the OBJ
    #[serde(default)]
    pub write_material: bool,
}

fn default_z_scale() -> f32 { 1.0 }
fn default_red() -> f32 { 0.299 }
fn default_green() -> f32 { 0.587 }
fn default_blue() -> f32 { 0.114 }

impl Default for HeightConfig {
    fn default() -> Self {
        Self {
            luminance: LuminanceWeights::default(),
            z_scale: default_z_scale(),
        }
    }
}

impl Default for LuminanceWeights {
    fn default() -> Self {
        Self {
            red: default_red(),
            green: default_green(),
            blue: default_blue(),
        }
    }
}

impl LuminanceWeights {
    /// Weights scaled so they sum to 1
    pub fn normalized(&self) -> [f32; 3] {
        let sum = self.red + self.green + self.blue;
        [self.red / sum, self.green / sum, self.blue / sum]
    }

    /// Weights must be finite, non-negative and not all zero
    pub fn validate(&self) -> Result<()> {
        let weights = [self.red, self.green, self.blue];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConvertError::Config {
                path: None,
                reason: format!("luminance weights must be finite and non-negative, got {weights:?}"),
            });
        }
        let sum: f32 = weights.iter().sum();
        if !(sum > 0.0 && sum.is_finite()) {
            return Err(ConvertError::Config {
                path: None,
                reason: format!("luminance weights must have a positive finite sum, got {weights:?}"),
            });
        }
        Ok(())
    }
}

impl ConversionConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ConversionConfig = toml::from_str(content).map_err(|e| ConvertError::Config {
            path: None,
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConvertError::Config {
            path: Some(path.to_path_buf()),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConvertError::Config { reason, .. } => ConvertError::Config {
                path: Some(path.to_path_buf()),
                reason,
            },
            other => other,
        })
    }

    /// Resolve configuration: explicit path, then the platform config
    /// directory, then built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match config_dir().map(|dir| dir.join(CONFIG_FILE_NAME)) {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading config from {:?}", path);
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.height.luminance.validate()?;
        if !self.height.z_scale.is_finite() {
            return Err(ConvertError::Config {
                path: None,
                reason: format!("z_scale must be finite, got {}", self.height.z_scale),
            });
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> String {
        // Plain structs of numbers and bools always serialize
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "mharender", "mharender")
        .map(|dirs| dirs.config_dir().to_path_buf())
}
