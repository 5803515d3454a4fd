//! # Maptile Core
//!
//! Codec and in-memory model for binary map tile geometry files.
//!
//! A tile file carries eleven terrain meshes followed by ten layers of line
//! quads, all little-endian with no header:
//! - **Cursor**: bounds-checked little-endian reader and matching writer
//! - **Validate**: finiteness checks for decoded coordinates
//! - **Mesh**: per-material vertex + triangle chunks
//! - **Quad**: thick-line quad chunks with opaque per-corner extras
//! - **Tile**: the aggregate model, whole-file decode/encode and editing
//! - **Text**: stamping glyph paths from an external glyph table

pub mod cursor;
pub mod mesh;
pub mod quad;
pub mod text;
pub mod theme;
pub mod tile;
pub mod validate;

pub use cursor::{ByteCursor, ByteWriter};
pub use mesh::{MeshLayer, Triangle};
pub use quad::{CornerExtras, LineLayer, Quad, QuadChunk};
pub use text::{GlyphTable, Segment, TextStyle};
pub use theme::{Rgb, Theme};
pub use tile::{DecodeReport, TileGeometry, Trailing};

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A world-space `(x, y)` position. The wire format's elevation is dropped.
pub type Coordinate = Vec2;

/// Number of terrain mesh layers in every tile.
pub const MESH_LAYER_COUNT: usize = 11;

/// Number of positional line layers in every tile.
pub const LINE_LAYER_COUNT: usize = 10;

/// Tile codec and editing errors
#[derive(Error, Debug)]
pub enum TileError {
    #[error("Out of bounds at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid coordinate ({x}, {y}) at offset {offset}")]
    InvalidCoordinate { offset: usize, x: f32, y: f32 },

    #[error("Index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown mesh layer: {0}")]
    UnknownLayer(String),

    #[error("Vertex index {index} out of range for a layer of {len} vertices")]
    VertexIndexOutOfRange { index: u16, len: usize },

    #[error("Triangle index overflow: layer already holds {existing} vertices")]
    IndexOverflow { existing: usize },

    #[error("Chunk too large: {count} entries exceeds the limit of {limit}")]
    ChunkTooLarge { count: usize, limit: usize },

    #[error("No glyph for character {0:?}")]
    UnknownGlyph(char),

    #[error("Tile files must use the .bin extension: {0}")]
    InvalidExtension(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for tile operations
pub type TileResult<T> = Result<T, TileError>;

/// Tile configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Layer naming and colour theme
    pub theme: Theme,
    /// Half-width of quads created by line editing
    pub line_thickness: f32,
    /// Vertical advance per text line, as a multiple of glyph size
    pub text_line_spacing: f32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Earth,
            line_thickness: 4.0,
            text_line_spacing: 1.3,
        }
    }
}

impl TileConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> TileResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| TileError::Serialization(e.to_string()))
    }
}
