//! Layer Themes
//!
//! Fixed layer tables for the two terrain themes. Memory order is the order
//! mesh chunks appear in a file; render order is the compositing order a
//! rasteriser should use. Both are immutable and chosen once per tile.
//!
//! The palette (layer fills, base colour and line colours) is exported for
//! an external render adapter; the codec itself only reads memory order.

use serde::{Deserialize, Serialize};

use crate::MESH_LAYER_COUNT;

/// 8-bit RGB colour
pub type Rgb = [u8; 3];

/// Terrain theme selecting layer names and palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Theme {
    /// Surface terrain
    #[default]
    Earth,
    /// Lunar terrain
    Moon,
}

const EARTH_MEMORY_ORDER: [&str; MESH_LAYER_COUNT] = [
    "Road", "Grass", "Sand", "Pond", "Snow", "Rock", "HardRock", "Sea-3", "Sea-2", "Sea-1", "Sea-0",
];

const EARTH_RENDER_ORDER: [&str; MESH_LAYER_COUNT] = [
    "Sea-0", "Sea-1", "Sea-2", "Sea-3", "Road", "Grass", "Sand", "Pond", "Snow", "Rock", "HardRock",
];

const EARTH_COLORS: [Rgb; MESH_LAYER_COUNT] = [
    [208, 208, 198], // Road
    [164, 184, 117], // Grass
    [227, 208, 141], // Sand
    [83, 185, 209],  // Pond
    [255, 255, 255], // Snow
    [139, 110, 92],  // Rock
    [88, 62, 45],    // HardRock
    [83, 185, 209],  // Sea-3
    [72, 163, 184],  // Sea-2
    [61, 142, 159],  // Sea-1
    [50, 121, 134],  // Sea-0
];

const MOON_MEMORY_ORDER: [&str; MESH_LAYER_COUNT] = [
    "Blank-1", "Blank-2", "Blank-3", "Blank-4", "Blank-5", "Blank-6", "Blank-7", "Moon-3", "Moon-2",
    "Moon-1", "Moon-0",
];

const MOON_RENDER_ORDER: [&str; MESH_LAYER_COUNT] = [
    "Moon-0", "Moon-1", "Moon-2", "Moon-3", "Blank-1", "Blank-2", "Blank-3", "Blank-4", "Blank-5",
    "Blank-6", "Blank-7",
];

const MOON_COLORS: [Rgb; MESH_LAYER_COUNT] = [
    [255, 1, 255],
    [255, 2, 255],
    [255, 3, 255],
    [255, 4, 255],
    [255, 5, 255],
    [255, 6, 255],
    [255, 7, 255],
    [59, 62, 76],    // Moon-3
    [84, 87, 101],   // Moon-2
    [109, 112, 126], // Moon-1
    [134, 137, 151], // Moon-0
];

/// Solid and dashed colours alternated across line layers
pub const LINE_COLORS: [Rgb; 2] = [[90, 90, 90], [140, 140, 140]];

impl Theme {
    /// Mesh layer keys in file order
    pub fn memory_order(&self) -> &'static [&'static str; MESH_LAYER_COUNT] {
        match self {
            Self::Earth => &EARTH_MEMORY_ORDER,
            Self::Moon => &MOON_MEMORY_ORDER,
        }
    }

    /// Mesh layer keys in compositing order
    pub fn render_order(&self) -> &'static [&'static str; MESH_LAYER_COUNT] {
        match self {
            Self::Earth => &EARTH_RENDER_ORDER,
            Self::Moon => &MOON_RENDER_ORDER,
        }
    }

    /// Position of `key` in memory order
    pub fn slot_of(&self, key: &str) -> Option<usize> {
        self.memory_order().iter().position(|k| *k == key)
    }

    /// Fill colour of a mesh layer
    pub fn layer_color(&self, key: &str) -> Option<Rgb> {
        let colors = match self {
            Self::Earth => &EARTH_COLORS,
            Self::Moon => &MOON_COLORS,
        };
        self.slot_of(key).map(|slot| colors[slot])
    }

    /// Background colour beneath all layers
    pub fn base_color(&self) -> Rgb {
        match self {
            Self::Earth => [40, 100, 110],
            Self::Moon => [159, 162, 176],
        }
    }

    /// Colour for line layer `index`, alternating between solid and dashed styles
    pub fn line_color(index: usize) -> Rgb {
        LINE_COLORS[index % 2]
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Earth => write!(f, "earth"),
            Self::Moon => write!(f, "moon"),
        }
    }
}
