//! Core logic for the level painter.
//!
//! Two halves, usable together or independently:
//! - the raster paint canvas: a fixed-size pixel buffer with brush, eraser,
//!   and two-click line tools, plus lossless PNG export;
//! - the layered placement engine: maps every non-transparent pixel of one
//!   or more layer images to a spawned object through a color key table.
//!
//! A canvas snapshot can feed the assembler directly (quick build), or a
//! pre-authored PNG can be configured as a layer source via `LevelConfig`.
//!
//! # Architecture
//!
//! - `Rgba` / `PixelBuffer` / `RasterImage`: pixel value types and grids
//! - `ColorKeyTable`: exact-match color to template lookup (first wins)
//! - `LayerDescriptor` / `LevelLayers`: ordered level configuration
//! - `LevelAssembler` + `ObjectFactory`: clear-then-generate placement
//! - `RasterCanvas` + `PaintController`: drawing and tool state machine
//! - `PaintPlugin` / `LevelBuilderPlugin`: Bevy message-bus integration

pub mod assembler;
pub mod canvas;
pub mod color;
pub mod color_key;
pub mod config;
pub mod layer;
pub mod line;
pub mod plugin;
pub mod raster;
pub mod tool;

pub use assembler::{
    AssemblyError, AssemblyResult, GenerationRoot, LevelAssembler, ObjectFactory, RebuildReport,
    GENERATION_ROOT_NAME,
};
pub use canvas::{RasterCanvas, DEFAULT_BRUSH_SIZE};
pub use color::Rgba;
pub use color_key::{ColorKeyTable, ObjectTemplateRef};
pub use config::{ColorMapping, ConfigError, ConfigResult, LayerConfig, LevelConfig};
pub use layer::{LayerDescriptor, LevelLayers};
pub use plugin::{
    CancelLine, ClearRequested, ColorChanged, EntityFactory, LevelBuilderPlugin, LevelRebuilt,
    PaintPlugin, PaintSet, PlacedObject, PointerClick, PointerDrag, QuickBuildRequested,
    RebuildRequested, SaveDirectory, SaveRequested, SetColorCommand, SetToolCommand, TextureSaved,
    ToolChanged, QUICK_LAYER_NAME,
};
pub use raster::{PixelBuffer, RasterImage};
pub use tool::{LineState, PaintController, ToolKind};
