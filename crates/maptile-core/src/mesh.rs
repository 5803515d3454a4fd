//! Terrain Meshes
//!
//! One mesh chunk per terrain material:
//!
//! ```text
//! u16 vertex_count
//! vertex_count x (f32 x, f32 zero, f32 y)
//! u16 index_count
//! index_count / 3 x (u16 a, u16 b, u16 c)
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::cursor::{ByteCursor, ByteWriter};
use crate::validate::coordinate_is_valid;
use crate::{Coordinate, TileError, TileResult};

/// Three indices into the owning layer's vertex list
pub type Triangle = [u16; 3];

const VERTEX_RECORD_SIZE: usize = 12;
const TRIANGLE_RECORD_SIZE: usize = 6;

/// Vertices and triangles of one terrain material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshLayer {
    /// Vertex positions
    pub vertices: Vec<Coordinate>,
    /// Triangles indexing into `vertices`
    pub triangles: Vec<Triangle>,
}

impl MeshLayer {
    /// Create an empty layer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// Reset both lists
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
    }

    /// Decode a chunk starting at `offset`, returning the layer and bytes consumed
    pub fn decode(buffer: &[u8], offset: usize) -> TileResult<(Self, usize)> {
        let mut cursor = ByteCursor::at(buffer, offset);
        let layer = Self::read(&mut cursor)?;
        Ok((layer, cursor.offset() - offset))
    }

    /// Read a chunk at the cursor.
    ///
    /// A non-finite vertex fails the whole chunk. An index count that is not a
    /// multiple of three is truncated and the leftover indices stay unread.
    pub fn read(cursor: &mut ByteCursor<'_>) -> TileResult<Self> {
        let vertex_count = cursor.read_u16le()? as usize;
        let mut vertices = Vec::with_capacity(vertex_count.min(cursor.remaining() / VERTEX_RECORD_SIZE));

        for _ in 0..vertex_count {
            let record_offset = cursor.offset();
            let x = cursor.read_f32le()?;
            let _zero = cursor.read_f32le()?;
            let y = cursor.read_f32le()?;

            let vertex = Vec2::new(x, y);
            if !coordinate_is_valid(vertex) {
                return Err(TileError::InvalidCoordinate {
                    offset: record_offset,
                    x,
                    y,
                });
            }
            vertices.push(vertex);
        }

        let index_count = cursor.read_u16le()? as usize;
        let triangle_count = index_count / 3;
        let mut triangles = Vec::with_capacity(triangle_count.min(cursor.remaining() / TRIANGLE_RECORD_SIZE));

        for _ in 0..triangle_count {
            triangles.push([cursor.read_u16le()?, cursor.read_u16le()?, cursor.read_u16le()?]);
        }

        log::trace!(
            "mesh chunk: {} vertices, {} triangles (index count {})",
            vertices.len(),
            triangles.len(),
            index_count
        );

        Ok(Self { vertices, triangles })
    }

    /// Size of this layer once encoded
    pub fn encoded_len(&self) -> usize {
        2 + VERTEX_RECORD_SIZE * self.vertices.len() + 2 + TRIANGLE_RECORD_SIZE * self.triangles.len()
    }

    /// Encode this layer as a standalone chunk
    pub fn encode(&self) -> TileResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.encoded_len());
        self.write(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Append this layer's chunk to `writer`. The elevation field is written as zero.
    pub fn write(&self, writer: &mut ByteWriter) -> TileResult<()> {
        let vertex_count = count_prefix(self.vertices.len())?;
        let index_count = count_prefix(self.triangles.len() * 3)?;

        writer.write_u16le(vertex_count);
        for vertex in &self.vertices {
            writer.write_f32le(vertex.x);
            writer.write_f32le(0.0);
            writer.write_f32le(vertex.y);
        }

        writer.write_u16le(index_count);
        for triangle in &self.triangles {
            for index in triangle {
                writer.write_u16le(*index);
            }
        }

        Ok(())
    }

    /// Append a batch of geometry whose triangles index `vertices` from zero.
    ///
    /// Incoming indices are shifted past the existing vertices. Nothing is
    /// appended if a shifted index would not fit in `u16`.
    pub fn append(&mut self, vertices: &[Coordinate], triangles: &[Triangle]) -> TileResult<()> {
        let base = self.vertices.len();

        let shifted: Option<Vec<Triangle>> = triangles
            .iter()
            .map(|triangle| {
                let [a, b, c] = (*triangle).map(|index| u16::try_from(base + index as usize).ok());
                Some([a?, b?, c?])
            })
            .collect();
        let shifted = shifted.ok_or(TileError::IndexOverflow { existing: base })?;

        self.vertices.extend_from_slice(vertices);
        self.triangles.extend(shifted);
        Ok(())
    }

    /// Resolve triangle `index` into its three coordinates
    pub fn triangle_coords(&self, index: usize) -> TileResult<[Coordinate; 3]> {
        let triangle = self.triangles.get(index).ok_or(TileError::IndexOutOfRange {
            index,
            len: self.triangles.len(),
        })?;

        let mut coords = [Vec2::ZERO; 3];
        for (slot, vertex_index) in coords.iter_mut().zip(triangle) {
            *slot = *self
                .vertices
                .get(*vertex_index as usize)
                .ok_or(TileError::VertexIndexOutOfRange {
                    index: *vertex_index,
                    len: self.vertices.len(),
                })?;
        }
        Ok(coords)
    }
}

/// Convert an entry count into the format's `u16` length prefix
pub(crate) fn count_prefix(count: usize) -> TileResult<u16> {
    u16::try_from(count).map_err(|_| TileError::ChunkTooLarge {
        count,
        limit: u16::MAX as usize,
    })
}
