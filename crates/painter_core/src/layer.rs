//! Level layers: named raster images paired with color key tables.

use bevy::prelude::*;

use crate::color_key::ColorKeyTable;
use crate::raster::RasterImage;

/// One layer of a level: a source image and the table that resolves its
/// pixel colors to object templates.
#[derive(Clone, Debug)]
pub struct LayerDescriptor {
    /// Layer name, used for container naming and skip warnings.
    pub name: String,
    /// Source raster; every non-transparent pixel is a placement candidate.
    pub image: RasterImage,
    /// Color to template lookup for this layer.
    pub table: ColorKeyTable,
}

impl LayerDescriptor {
    /// Create a layer descriptor.
    pub fn new(name: impl Into<String>, image: RasterImage, table: ColorKeyTable) -> Self {
        Self {
            name: name.into(),
            image,
            table,
        }
    }

    /// Why this layer cannot generate anything, if it cannot.
    ///
    /// A layer with no pixels or an empty table is skipped by the
    /// assembler with a warning rather than failing the whole rebuild.
    pub fn validity_issue(&self) -> Option<&'static str> {
        if self.image.pixel_count() == 0 {
            Some("image has no pixels")
        } else if self.table.is_empty() {
            Some("color table is empty")
        } else {
            None
        }
    }
}

/// Ordered level configuration: the layers to generate, the grid spacing,
/// and the table used for quick builds from the live canvas.
///
/// Layer order determines generation order and therefore the z-order of
/// the output hierarchy, not pixel semantics.
#[derive(Resource, Debug)]
pub struct LevelLayers {
    /// Layers in generation order.
    pub layers: Vec<LayerDescriptor>,
    /// World-units per pixel on each axis.
    pub grid_spacing: Vec3,
    /// Table applied to canvas snapshots on quick build, if configured.
    pub quick_build_table: Option<ColorKeyTable>,
}

impl LevelLayers {
    /// Create an empty configuration with the given grid spacing.
    pub fn new(grid_spacing: Vec3) -> Self {
        Self {
            layers: Vec::new(),
            grid_spacing,
            quick_build_table: None,
        }
    }

    /// Append a layer at the end of the generation order.
    pub fn push(&mut self, layer: LayerDescriptor) {
        self.layers.push(layer);
    }
}

impl Default for LevelLayers {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}
