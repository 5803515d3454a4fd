//! Line Quads
//!
//! Thick line segments stored as four-corner strips:
//!
//! ```text
//! u16 corner_count
//! corner_count / 4 x 4 x (f32 x, f32 zero, f32 y, u32 altitude, f32 flag)
//! ```
//!
//! The altitude and flag fields have no known meaning. They are kept as raw
//! bits so decoded quads re-encode byte for byte.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::cursor::{ByteCursor, ByteWriter};
use crate::mesh::count_prefix;
use crate::validate::polygon_is_valid;
use crate::{Coordinate, TileResult};

/// Encoded size of one quad (four 20-byte corner records)
pub const QUAD_RECORD_SIZE: usize = 80;

/// Opaque per-corner fields carried alongside each quad corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CornerExtras {
    /// Raw bits of the altitude field
    pub altitude: u32,
    /// Raw bits of the flag field (an `f32` on the wire)
    pub flag: u32,
}

impl CornerExtras {
    /// Extras written for freshly built quads: zero altitude, flags `1, 0, 0, 1`.
    pub const CANONICAL: [CornerExtras; 4] = [
        CornerExtras { altitude: 0, flag: 0x3F80_0000 },
        CornerExtras { altitude: 0, flag: 0 },
        CornerExtras { altitude: 0, flag: 0 },
        CornerExtras { altitude: 0, flag: 0x3F80_0000 },
    ];

    /// The flag interpreted as the float it is stored as
    pub fn flag_value(&self) -> f32 {
        f32::from_bits(self.flag)
    }
}

/// A four-corner strip approximating a thick line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    /// Corners in source winding order
    pub corners: [Coordinate; 4],
    /// Opaque fields for each corner
    pub extras: [CornerExtras; 4],
}

impl Quad {
    /// Build a quad with canonical extras
    pub fn new(corners: [Coordinate; 4]) -> Self {
        Self {
            corners,
            extras: CornerExtras::CANONICAL,
        }
    }

    /// The segment joining the midpoints of the two short edges
    pub fn centerline(&self) -> (Coordinate, Coordinate) {
        let [a, b, c, d] = self.corners;
        ((a + b) * 0.5, (c + d) * 0.5)
    }

    /// Twice the signed area; positive for counter-clockwise corners
    pub fn signed_area2(&self) -> f32 {
        (0..4)
            .map(|i| self.corners[i].perp_dot(self.corners[(i + 1) % 4]))
            .sum()
    }

    fn read(cursor: &mut ByteCursor<'_>) -> TileResult<Self> {
        let mut corners = [Vec2::ZERO; 4];
        let mut extras = [CornerExtras::default(); 4];

        for (corner, extra) in corners.iter_mut().zip(extras.iter_mut()) {
            let x = cursor.read_f32le()?;
            let _zero = cursor.read_f32le()?;
            let y = cursor.read_f32le()?;
            let altitude = cursor.read_u32le()?;
            let flag = cursor.read_u32le()?;

            *corner = Vec2::new(x, y);
            *extra = CornerExtras { altitude, flag };
        }

        Ok(Self { corners, extras })
    }

    fn write(&self, writer: &mut ByteWriter) {
        for (corner, extra) in self.corners.iter().zip(&self.extras) {
            writer.write_f32le(corner.x);
            writer.write_f32le(0.0);
            writer.write_f32le(corner.y);
            writer.write_u32le(extra.altitude);
            writer.write_u32le(extra.flag);
        }
    }
}

/// Result of decoding one quad chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadChunk {
    /// Quads whose corners were all finite
    pub quads: Vec<Quad>,
    /// Quads skipped for holding a NaN or infinite corner
    pub dropped: usize,
}

impl QuadChunk {
    /// Decode a chunk starting at `offset`, returning it and the bytes consumed.
    ///
    /// Dropped quads still count towards the bytes consumed.
    pub fn decode(buffer: &[u8], offset: usize) -> TileResult<(Self, usize)> {
        let mut cursor = ByteCursor::at(buffer, offset);
        let chunk = Self::read(&mut cursor)?;
        Ok((chunk, cursor.offset() - offset))
    }

    /// Read a chunk at the cursor. Corners beyond the last whole quad stay unread.
    pub fn read(cursor: &mut ByteCursor<'_>) -> TileResult<Self> {
        let corner_count = cursor.read_u16le()? as usize;
        let quad_count = corner_count / 4;

        let mut quads = Vec::with_capacity(quad_count.min(cursor.remaining() / QUAD_RECORD_SIZE));
        let mut dropped = 0;

        for _ in 0..quad_count {
            let record_offset = cursor.offset();
            let quad = Quad::read(cursor)?;

            if !polygon_is_valid(&quad.corners) {
                log::debug!("dropping quad with non-finite corner at offset {}", record_offset);
                dropped += 1;
                continue;
            }
            quads.push(quad);
        }

        Ok(Self { quads, dropped })
    }
}

/// One positional slot of line quads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineLayer {
    pub quads: Vec<Quad>,
}

impl LineLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn clear(&mut self) {
        self.quads.clear();
    }

    pub fn push(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    /// Size of this layer once encoded
    pub fn encoded_len(&self) -> usize {
        2 + QUAD_RECORD_SIZE * self.quads.len()
    }

    /// Encode this layer as a standalone chunk
    pub fn encode(&self) -> TileResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.encoded_len());
        self.write(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Append this layer's chunk to `writer`
    pub fn write(&self, writer: &mut ByteWriter) -> TileResult<()> {
        writer.write_u16le(count_prefix(self.quads.len() * 4)?);
        for quad in &self.quads {
            quad.write(writer);
        }
        Ok(())
    }
}

impl From<QuadChunk> for LineLayer {
    fn from(chunk: QuadChunk) -> Self {
        Self { quads: chunk.quads }
    }
}
