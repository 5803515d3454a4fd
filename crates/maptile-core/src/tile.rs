//! Tile Geometry
//!
//! The aggregate model for one tile file: eleven mesh layers keyed by the
//! theme's memory order and ten positional line layers. Decoding reads the
//! mesh chunks then the quad chunks back to back; encoding writes them in the
//! same order.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::cursor::{ByteCursor, ByteWriter};
use crate::mesh::{MeshLayer, Triangle};
use crate::quad::{LineLayer, Quad, QuadChunk};
use crate::theme::Theme;
use crate::{Coordinate, LINE_LAYER_COUNT, MESH_LAYER_COUNT, TileError, TileResult};

/// The four zero bytes some files carry after the last chunk
const ZERO_TERMINATOR: [u8; 4] = [0; 4];

/// What follows the last quad chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trailing {
    /// Nothing
    None,
    /// Exactly four zero bytes
    ZeroTerminator,
    /// Anything else; not understood
    Anomalous(Vec<u8>),
}

impl Trailing {
    fn classify(tail: &[u8]) -> Self {
        if tail.is_empty() {
            Self::None
        } else if tail == ZERO_TERMINATOR {
            Self::ZeroTerminator
        } else {
            Self::Anomalous(tail.to_vec())
        }
    }
}

/// Advisory details gathered while decoding a tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    /// Bytes taken by the 21 chunks
    pub bytes_consumed: usize,
    /// Quads skipped for non-finite corners
    pub dropped_quads: usize,
    /// Bytes after the last chunk
    pub trailing: Trailing,
}

impl DecodeReport {
    /// True if unexplained bytes follow the last chunk
    pub fn has_anomaly(&self) -> bool {
        matches!(self.trailing, Trailing::Anomalous(_))
    }
}

/// Meshes and line quads of a single map tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGeometry {
    theme: Theme,
    meshes: [MeshLayer; MESH_LAYER_COUNT],
    lines: [LineLayer; LINE_LAYER_COUNT],
}

impl TileGeometry {
    /// Create a tile with every layer empty
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            meshes: std::array::from_fn(|_| MeshLayer::new()),
            lines: std::array::from_fn(|_| LineLayer::new()),
        }
    }

    /// Alias of [`TileGeometry::new`], used as the stand-in for a missing file
    pub fn empty(theme: Theme) -> Self {
        Self::new(theme)
    }

    /// Decode a tile, logging any trailing-byte anomaly
    pub fn decode(bytes: &[u8], theme: Theme) -> TileResult<Self> {
        Self::decode_with_report(bytes, theme).map(|(tile, _)| tile)
    }

    /// Decode a tile and report what was skipped or left over.
    ///
    /// Structural errors abort the whole decode; no partial tile is returned.
    pub fn decode_with_report(bytes: &[u8], theme: Theme) -> TileResult<(Self, DecodeReport)> {
        let mut tile = Self::new(theme);
        let mut cursor = ByteCursor::new(bytes);

        for (mesh, key) in tile.meshes.iter_mut().zip(theme.memory_order()) {
            let start = cursor.offset();
            *mesh = MeshLayer::read(&mut cursor)?;
            log::debug!(
                "mesh {} @ {}: {} vertices, {} triangles",
                key,
                start,
                mesh.vertices.len(),
                mesh.triangles.len()
            );
        }

        let mut dropped_quads = 0;
        for (index, line) in tile.lines.iter_mut().enumerate() {
            let start = cursor.offset();
            let chunk = QuadChunk::read(&mut cursor)?;
            log::debug!(
                "line layer {} @ {}: {} quads, {} dropped",
                index,
                start,
                chunk.quads.len(),
                chunk.dropped
            );
            dropped_quads += chunk.dropped;
            *line = chunk.into();
        }

        let trailing = Trailing::classify(cursor.rest());
        if let Trailing::Anomalous(tail) = &trailing {
            log::warn!(
                "{} unexpected trailing bytes after offset {}: {}",
                tail.len(),
                cursor.offset(),
                hex_preview(tail)
            );
        }

        let report = DecodeReport {
            bytes_consumed: cursor.offset(),
            dropped_quads,
            trailing,
        };
        Ok((tile, report))
    }

    /// Read and decode a tile file
    pub fn from_file(path: impl AsRef<Path>, theme: Theme) -> TileResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        log::info!("Loaded {} ({} bytes)", path.as_ref().display(), bytes.len());
        Self::decode(&bytes, theme)
    }

    /// Size of the encoded tile
    pub fn encoded_len(&self) -> usize {
        self.meshes.iter().map(MeshLayer::encoded_len).sum::<usize>()
            + self.lines.iter().map(LineLayer::encoded_len).sum::<usize>()
    }

    /// Encode all chunks in file order. No trailing bytes are written.
    pub fn encode(&self) -> TileResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.encoded_len());
        for mesh in &self.meshes {
            mesh.write(&mut writer)?;
        }
        for line in &self.lines {
            line.write(&mut writer)?;
        }
        Ok(writer.into_bytes())
    }

    /// Encode and write to a `.bin` file
    pub fn save_as(&self, path: impl AsRef<Path>) -> TileResult<()> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("bin") {
            return Err(TileError::InvalidExtension(path.to_path_buf()));
        }

        let bytes = self.encode()?;
        std::fs::write(path, &bytes)?;
        log::info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn slot(&self, key: &str) -> TileResult<usize> {
        self.theme
            .slot_of(key)
            .ok_or_else(|| TileError::UnknownLayer(key.to_string()))
    }

    /// Mesh layer by key
    pub fn mesh(&self, key: &str) -> TileResult<&MeshLayer> {
        let slot = self.slot(key)?;
        Ok(&self.meshes[slot])
    }

    /// Mesh layers with their keys, in memory order
    pub fn mesh_layers(&self) -> impl Iterator<Item = (&'static str, &MeshLayer)> + '_ {
        self.theme.memory_order().iter().copied().zip(self.meshes.iter())
    }

    /// Mesh layers with their keys, in render order
    pub fn render_layers(&self) -> impl Iterator<Item = (&'static str, &MeshLayer)> + '_ {
        self.theme.render_order().iter().filter_map(move |key| {
            self.theme.slot_of(key).map(|slot| (*key, &self.meshes[slot]))
        })
    }

    /// Line layer by slot
    pub fn line_layer(&self, index: usize) -> TileResult<&LineLayer> {
        self.lines.get(index).ok_or(TileError::IndexOutOfRange {
            index,
            len: LINE_LAYER_COUNT,
        })
    }

    pub fn line_layers(&self) -> &[LineLayer; LINE_LAYER_COUNT] {
        &self.lines
    }

    fn line_layer_mut(&mut self, index: usize) -> TileResult<&mut LineLayer> {
        self.lines.get_mut(index).ok_or(TileError::IndexOutOfRange {
            index,
            len: LINE_LAYER_COUNT,
        })
    }

    /// Append a quad covering the segment `from -> to`, `thickness` either side.
    ///
    /// Corners run from-right, from-left, to-left, to-right. Viewed with y
    /// pointing up this has negative signed area; it is the counter-clockwise
    /// order of the game's ground plane, which stores y as its third axis.
    pub fn add_line(
        &mut self,
        layer_index: usize,
        from: Coordinate,
        to: Coordinate,
        thickness: f32,
    ) -> TileResult<()> {
        let quad = line_quad(from, to, thickness);
        self.line_layer_mut(layer_index)?.push(quad);
        Ok(())
    }

    /// Append one line quad per `(from, to)` pair
    pub fn add_path(
        &mut self,
        layer_index: usize,
        segments: &[(Coordinate, Coordinate)],
        thickness: f32,
    ) -> TileResult<()> {
        let layer = self.line_layer_mut(layer_index)?;
        layer
            .quads
            .extend(segments.iter().map(|(from, to)| line_quad(*from, *to, thickness)));
        Ok(())
    }

    /// Append geometry to a mesh layer, shifting the zero-based `triangles`
    /// past the layer's existing vertices
    pub fn add_geometry(
        &mut self,
        layer_key: &str,
        vertices: &[Coordinate],
        triangles: &[Triangle],
    ) -> TileResult<()> {
        let slot = self.slot(layer_key)?;
        self.meshes[slot].append(vertices, triangles)
    }

    /// Empty one mesh layer
    pub fn clear_layer(&mut self, layer_key: &str) -> TileResult<()> {
        let slot = self.slot(layer_key)?;
        self.meshes[slot].clear();
        Ok(())
    }

    pub fn clear_all_geometry(&mut self) {
        self.meshes.iter_mut().for_each(MeshLayer::clear);
    }

    pub fn clear_all_lines(&mut self) {
        self.lines.iter_mut().for_each(LineLayer::clear);
    }
}

fn line_quad(from: Coordinate, to: Coordinate, thickness: f32) -> Quad {
    let bearing = (to - from).to_angle();
    let left = Vec2::from_angle(bearing).perp() * thickness;

    Quad::new([from - left, from + left, to + left, to - left])
}

fn hex_preview(bytes: &[u8]) -> String {
    const LIMIT: usize = 16;
    let mut out: String = bytes
        .iter()
        .take(LIMIT)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");
    if bytes.len() > LIMIT {
        out.push_str(" ..");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quad::CornerExtras;

    const EMPTY_TILE_LEN: usize = MESH_LAYER_COUNT * 4 + LINE_LAYER_COUNT * 2;

    fn sample_tile() -> TileGeometry {
        let mut tile = TileGeometry::new(Theme::Earth);
        tile.add_geometry(
            "Grass",
            &[Vec2::new(-10.0, -10.0), Vec2::new(10.0, -10.0), Vec2::new(0.0, 10.0)],
            &[[0, 1, 2]],
        )
        .unwrap();
        tile.add_geometry(
            "Sea-0",
            &[
                Vec2::new(-500.0, -500.0),
                Vec2::new(500.0, -500.0),
                Vec2::new(500.0, 500.0),
                Vec2::new(-500.0, 500.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        tile.add_line(0, Vec2::ZERO, Vec2::new(100.0, 50.0), 4.0).unwrap();
        tile.add_line(9, Vec2::new(-20.0, 0.0), Vec2::new(-20.0, 30.0), 2.0).unwrap();
        tile
    }

    #[test]
    fn test_empty_tile_encoding() {
        let tile = TileGeometry::empty(Theme::Earth);
        let bytes = tile.encode().unwrap();
        assert_eq!(bytes, vec![0u8; EMPTY_TILE_LEN]);

        let (decoded, report) = TileGeometry::decode_with_report(&bytes, Theme::Earth).unwrap();
        assert_eq!(decoded, tile);
        assert_eq!(report.bytes_consumed, EMPTY_TILE_LEN);
        assert_eq!(report.trailing, Trailing::None);
    }

    #[test]
    fn test_round_trip() {
        let tile = sample_tile();
        let bytes = tile.encode().unwrap();
        assert_eq!(bytes.len(), tile.encoded_len());

        let decoded = TileGeometry::decode(&bytes, Theme::Earth).unwrap();
        assert_eq!(decoded, tile);
        assert_eq!(decoded.encode().unwrap(), bytes);
    }

    #[test]
    fn test_round_trip_with_zero_terminator() {
        let mut bytes = sample_tile().encode().unwrap();
        bytes.extend_from_slice(&[0, 0, 0, 0]);

        let (first, report) = TileGeometry::decode_with_report(&bytes, Theme::Earth).unwrap();
        assert_eq!(report.trailing, Trailing::ZeroTerminator);
        assert!(!report.has_anomaly());

        let second = TileGeometry::decode(&first.encode().unwrap(), Theme::Earth).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_trailing_anomalies() {
        let base = vec![0u8; EMPTY_TILE_LEN];
        let tails: [&[u8]; 4] = [&[1, 2, 3], &[1, 2, 3, 4, 5], &[0, 0, 0, 1], &[0; 8]];

        for tail in tails {
            let mut bytes = base.clone();
            bytes.extend_from_slice(tail);
            let (tile, report) = TileGeometry::decode_with_report(&bytes, Theme::Earth).unwrap();
            assert!(report.has_anomaly(), "tail {:?} should be anomalous", tail);
            assert_eq!(report.trailing, Trailing::Anomalous(tail.to_vec()));
            assert_eq!(tile, TileGeometry::empty(Theme::Earth));
        }
    }

    #[test]
    fn test_truncated_file_fails() {
        let bytes = sample_tile().encode().unwrap();
        let result = TileGeometry::decode(&bytes[..bytes.len() - 1], Theme::Earth);
        assert!(matches!(result, Err(TileError::OutOfBounds { .. })));

        assert!(matches!(
            TileGeometry::decode(&[], Theme::Earth),
            Err(TileError::OutOfBounds { offset: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_vertex_fails_decode() {
        let mut tile = TileGeometry::new(Theme::Earth);
        tile.add_geometry("Snow", &[Vec2::new(f32::INFINITY, 0.0)], &[]).unwrap();
        let bytes = tile.encode().unwrap();

        assert!(matches!(
            TileGeometry::decode(&bytes, Theme::Earth),
            Err(TileError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_invalid_quad_is_dropped() {
        let mut tile = TileGeometry::new(Theme::Earth);
        tile.add_line(2, Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0).unwrap();
        tile.lines[2].push(Quad::new([Vec2::new(f32::NAN, 0.0), Vec2::ZERO, Vec2::ONE, Vec2::X]));
        tile.add_line(2, Vec2::ZERO, Vec2::new(0.0, 10.0), 1.0).unwrap();
        let bytes = tile.encode().unwrap();

        let (decoded, report) = TileGeometry::decode_with_report(&bytes, Theme::Earth).unwrap();
        assert_eq!(report.dropped_quads, 1);
        assert_eq!(report.bytes_consumed, bytes.len());
        assert_eq!(decoded.line_layer(2).unwrap().len(), 2);
        assert_eq!(decoded.line_layer(2).unwrap().quads[1], tile.lines[2].quads[2]);
    }

    #[test]
    fn test_moon_theme_layers() {
        let mut tile = TileGeometry::new(Theme::Moon);
        tile.add_geometry("Moon-2", &[Vec2::ZERO], &[]).unwrap();
        assert!(matches!(
            tile.add_geometry("Grass", &[Vec2::ZERO], &[]),
            Err(TileError::UnknownLayer(_))
        ));

        let bytes = tile.encode().unwrap();
        let decoded = TileGeometry::decode(&bytes, Theme::Moon).unwrap();
        assert_eq!(decoded.mesh("Moon-2").unwrap().vertices.len(), 1);

        // The same bytes read under another theme land in the same slot
        let as_earth = TileGeometry::decode(&bytes, Theme::Earth).unwrap();
        assert_eq!(as_earth.mesh("Sea-2").unwrap().vertices.len(), 1);
    }

    #[test]
    fn test_add_line_along_x() {
        let mut tile = TileGeometry::new(Theme::Earth);
        tile.add_line(0, Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0).unwrap();

        let quad = tile.line_layer(0).unwrap().quads[0];
        let expected = [
            Vec2::new(0.0, -4.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(10.0, 4.0),
            Vec2::new(10.0, -4.0),
        ];
        for (corner, want) in quad.corners.iter().zip(expected) {
            assert!(corner.abs_diff_eq(want, 1e-5), "{:?} != {:?}", corner, want);
        }
        assert!(quad.signed_area2() < 0.0);
        assert_eq!(quad.extras, CornerExtras::CANONICAL);

        let (a, b) = quad.centerline();
        assert!(a.abs_diff_eq(Vec2::ZERO, 1e-5));
        assert!(b.abs_diff_eq(Vec2::new(10.0, 0.0), 1e-5));
    }

    #[test]
    fn test_add_line_winding_is_consistent() {
        let mut tile = TileGeometry::new(Theme::Earth);
        let targets = [
            Vec2::new(0.0, 10.0),
            Vec2::new(-10.0, 3.0),
            Vec2::new(-4.0, -9.0),
            Vec2::new(7.0, -7.0),
        ];
        for to in targets {
            tile.add_line(1, Vec2::new(1.0, 1.0), to, 2.0).unwrap();
        }

        for quad in &tile.line_layer(1).unwrap().quads {
            assert!(quad.signed_area2() < 0.0);
        }
    }

    #[test]
    fn test_add_line_rejects_bad_layer() {
        let mut tile = TileGeometry::new(Theme::Earth);
        let result = tile.add_line(10, Vec2::ZERO, Vec2::ONE, 4.0);
        assert!(matches!(result, Err(TileError::IndexOutOfRange { index: 10, len: 10 })));
        assert!(tile.line_layers().iter().all(LineLayer::is_empty));
    }

    #[test]
    fn test_add_path() {
        let mut tile = TileGeometry::new(Theme::Earth);
        let segments = [
            (Vec2::new(0.1, 0.0), Vec2::new(0.5, 1.0)),
            (Vec2::new(0.5, 1.0), Vec2::new(0.9, 0.0)),
            (Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.5)),
        ];
        tile.add_path(4, &segments, 4.0).unwrap();
        assert_eq!(tile.line_layer(4).unwrap().len(), 3);

        assert!(tile.add_path(11, &segments, 4.0).is_err());
        assert_eq!(tile.line_layer(4).unwrap().len(), 3);
    }

    #[test]
    fn test_add_geometry_translates_indices() {
        let mut tile = TileGeometry::new(Theme::Earth);
        let base: Vec<Vec2> = (0..6).map(|i| Vec2::new(i as f32, 0.0)).collect();
        tile.add_geometry("Rock", &base, &[[0, 1, 2], [3, 4, 5]]).unwrap();
        tile.add_geometry("Rock", &[Vec2::ONE, Vec2::Y], &[[0, 1, 0]]).unwrap();

        let rock = tile.mesh("Rock").unwrap();
        assert_eq!(rock.vertices.len(), 8);
        assert_eq!(rock.triangles, vec![[0, 1, 2], [3, 4, 5], [6, 7, 6]]);
    }

    #[test]
    fn test_unknown_layer() {
        let mut tile = TileGeometry::new(Theme::Earth);
        assert!(matches!(tile.mesh("Lava"), Err(TileError::UnknownLayer(_))));
        assert!(matches!(tile.clear_layer("Lava"), Err(TileError::UnknownLayer(_))));
        assert!(matches!(
            tile.add_geometry("Lava", &[Vec2::ZERO], &[]),
            Err(TileError::UnknownLayer(_))
        ));
        assert_eq!(tile, TileGeometry::new(Theme::Earth));
    }

    #[test]
    fn test_clear_operations() {
        let mut tile = sample_tile();
        tile.clear_layer("Grass").unwrap();
        assert!(tile.mesh("Grass").unwrap().is_empty());
        assert!(!tile.mesh("Sea-0").unwrap().is_empty());

        tile.clear_all_lines();
        assert!(tile.line_layers().iter().all(LineLayer::is_empty));

        tile.clear_all_geometry();
        tile.clear_all_geometry();
        assert_eq!(tile, TileGeometry::new(Theme::Earth));
    }

    #[test]
    fn test_layer_iteration_orders() {
        let tile = sample_tile();
        let memory: Vec<&str> = tile.mesh_layers().map(|(k, _)| k).collect();
        assert_eq!(memory.first(), Some(&"Road"));

        let render: Vec<(&str, usize)> = tile
            .render_layers()
            .map(|(k, mesh)| (k, mesh.triangles.len()))
            .collect();
        assert_eq!(render.len(), MESH_LAYER_COUNT);
        assert_eq!(render[0], ("Sea-0", 2));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("maptile_tile_test");
        let _ = std::fs::create_dir_all(&dir);
        let tile = sample_tile();

        let bad = dir.join("tile.dat");
        assert!(matches!(tile.save_as(&bad), Err(TileError::InvalidExtension(_))));
        assert!(!bad.exists());

        let path = dir.join("tile.bin");
        tile.save_as(&path).unwrap();
        let loaded = TileGeometry::from_file(&path, Theme::Earth).unwrap();
        assert_eq!(loaded, tile);

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = TileGeometry::from_file("/nonexistent/maptile/tile.bin", Theme::Earth);
        assert!(matches!(result, Err(TileError::Io(_))));
    }

    #[test]
    fn test_hex_preview() {
        assert_eq!(hex_preview(&[0x01, 0xab]), "01 ab");
        assert!(hex_preview(&[0u8; 20]).ends_with(" .."));
    }
}
