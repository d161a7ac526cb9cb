//! Level configuration files.
//!
//! A level is configured as a JSON document listing the grid spacing and
//! the ordered layers, each with a PNG image path and its color table:
//!
//! ```json
//! {
//!   "grid_spacing": [1.0, 1.0, 1.0],
//!   "layers": [
//!     {
//!       "name": "ground",
//!       "image": "layers/ground.png",
//!       "table": [{ "color": [0, 0, 0, 255], "template": "wall" }]
//!     }
//!   ]
//! }
//! ```
//!
//! `resolve` decodes the referenced images and builds the runtime layer
//! descriptors.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::color::Rgba;
use crate::color_key::{ColorKeyTable, ObjectTemplateRef};
use crate::layer::{LayerDescriptor, LevelLayers};

/// Errors that can occur loading or resolving a level configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// File system error
    Io(std::io::Error),
    /// JSON serialization error
    Json(String),
    /// Layer image decode error
    Image(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One color to template pair in a layer's table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMapping {
    /// RGBA channels of the key color.
    pub color: [u8; 4],
    /// Template id the color resolves to.
    pub template: String,
}

/// One configured layer: a name, a PNG source, and its color table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Layer name.
    pub name: String,
    /// Path to the source PNG, relative to the config file's directory
    /// unless absolute.
    pub image: PathBuf,
    /// Ordered color table; on duplicate colors the first entry wins.
    pub table: Vec<ColorMapping>,
}

/// The serialized level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// World-units per pixel on each axis.
    pub grid_spacing: [f32; 3],
    /// Layers in generation order.
    pub layers: Vec<LayerConfig>,
}

impl LevelConfig {
    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Grid spacing as a vector.
    pub fn grid_spacing_vec(&self) -> Vec3 {
        Vec3::from_array(self.grid_spacing)
    }

    /// Decode every layer image and build the runtime layer list.
    ///
    /// Relative image paths are resolved against `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> ConfigResult<LevelLayers> {
        let mut level = LevelLayers::new(self.grid_spacing_vec());
        for layer in &self.layers {
            let path = if layer.image.is_absolute() {
                layer.image.clone()
            } else {
                base_dir.join(&layer.image)
            };
            let image = crate::raster::RasterImage::load_png(&path).map_err(|e| {
                ConfigError::Image(format!("layer '{}' ({}): {}", layer.name, path.display(), e))
            })?;
            let table = ColorKeyTable::build(layer.table.iter().map(|m| {
                (Rgba::from(m.color), ObjectTemplateRef::new(m.template.clone()))
            }));
            level.push(LayerDescriptor::new(layer.name.clone(), image, table));
        }
        Ok(level)
    }
}
