//! Byte Cursor
//!
//! Sequential little-endian primitives over in-memory buffers.

use crate::{TileError, TileResult};

/// Bounds-checked little-endian reader with an explicit offset
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a cursor positioned at `offset`
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    /// Current read offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left after the current offset
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// The unread tail of the buffer
    pub fn rest(&self) -> &'a [u8] {
        self.data.get(self.offset..).unwrap_or(&[])
    }

    /// Read `n` raw bytes
    pub fn read_n_bytes(&mut self, n: usize) -> TileResult<&'a [u8]> {
        let bytes = self
            .offset
            .checked_add(n)
            .and_then(|end| self.data.get(self.offset..end))
            .ok_or(TileError::OutOfBounds {
                offset: self.offset,
                needed: n,
                remaining: self.remaining(),
            })?;
        self.offset += n;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> TileResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_n_bytes(N)?);
        Ok(out)
    }

    pub fn read_u16le(&mut self) -> TileResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32le(&mut self) -> TileResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32le(&mut self) -> TileResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }
}

/// Growable little-endian writer
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn write_u16le(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32le(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32le(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Take the accumulated bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
