//! Text Stamping
//!
//! Lays out glyph paths from a caller-supplied [`GlyphTable`] and appends them
//! to a line layer as quads. Glyph segments are in unit space: a glyph of
//! size `s` is scaled by `s` and placed at the pen position.

use std::collections::HashMap;

use glam::Vec2;

use crate::tile::TileGeometry;
use crate::{Coordinate, TileConfig, TileError, TileResult};

/// A `(from, to)` line segment
pub type Segment = (Coordinate, Coordinate);

/// Source of glyph outlines, keyed by upper-case character
pub trait GlyphTable {
    fn glyph(&self, character: char) -> Option<&[Segment]>;
}

impl GlyphTable for HashMap<char, Vec<Segment>> {
    fn glyph(&self, character: char) -> Option<&[Segment]> {
        self.get(&character).map(Vec::as_slice)
    }
}

/// Text layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Glyph height and horizontal advance
    pub size: f32,
    /// Half-width of each stroke quad
    pub thickness: f32,
    /// Vertical advance per line, as a multiple of `size`
    pub line_spacing: f32,
}

impl TextStyle {
    pub fn from_config(config: &TileConfig, size: f32) -> Self {
        Self {
            size,
            thickness: config.line_thickness,
            line_spacing: config.text_line_spacing,
        }
    }
}

fn layout_text(
    text: &str,
    origin: Coordinate,
    style: &TextStyle,
    glyphs: &impl GlyphTable,
    out: &mut Vec<Segment>,
) -> TileResult<()> {
    let mut pen = origin;

    for character in text.to_uppercase().chars() {
        match character {
            ' ' => pen.x += style.size,
            '\n' => {
                pen.x = origin.x;
                pen.y -= style.size * style.line_spacing;
            }
            c => {
                let glyph = glyphs.glyph(c).ok_or(TileError::UnknownGlyph(c))?;
                out.extend(
                    glyph
                        .iter()
                        .map(|(from, to)| (*from * style.size + pen, *to * style.size + pen)),
                );
                pen.x += style.size;
            }
        }
    }

    Ok(())
}

impl TileGeometry {
    /// Stamp `text` onto a line layer starting at `origin`.
    ///
    /// Nothing is appended if the layer index or any character is rejected.
    pub fn add_text(
        &mut self,
        layer_index: usize,
        text: &str,
        origin: Coordinate,
        style: &TextStyle,
        glyphs: &impl GlyphTable,
    ) -> TileResult<()> {
        self.add_bolded_text(layer_index, text, origin, style, 1, glyphs)
    }

    /// Stamp `text` `weight` times, each copy shifted one unit along both axes
    pub fn add_bolded_text(
        &mut self,
        layer_index: usize,
        text: &str,
        origin: Coordinate,
        style: &TextStyle,
        weight: usize,
        glyphs: &impl GlyphTable,
    ) -> TileResult<()> {
        self.line_layer(layer_index)?;

        let mut segments = Vec::new();
        for i in 0..weight {
            layout_text(text, origin + Vec2::splat(i as f32), style, glyphs, &mut segments)?;
        }

        log::debug!(
            "stamping {:?} on line layer {}: {} segments",
            text,
            layer_index,
            segments.len()
        );
        self.add_path(layer_index, &segments, style.thickness)
    }
}
