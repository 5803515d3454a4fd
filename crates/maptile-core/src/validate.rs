//! Coordinate validity predicates used during decode.

use crate::Coordinate;

/// False if either component is NaN or infinite.
#[inline]
pub fn coordinate_is_valid(coordinate: Coordinate) -> bool {
    coordinate.is_finite()
}

/// True only if every coordinate is valid.
pub fn polygon_is_valid(coordinates: &[Coordinate]) -> bool {
    coordinates.iter().all(|c| coordinate_is_valid(*c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_coordinate_validity() {
        assert!(coordinate_is_valid(Vec2::new(-500.0, 500.0)));
        assert!(!coordinate_is_valid(Vec2::new(f32::NAN, 0.0)));
        assert!(!coordinate_is_valid(Vec2::new(0.0, f32::INFINITY)));
        assert!(!coordinate_is_valid(Vec2::new(f32::NEG_INFINITY, 0.0)));
    }

    #[test]
    fn test_polygon_validity() {
        let good = [Vec2::ZERO, Vec2::ONE, Vec2::new(3.0, -2.0)];
        assert!(polygon_is_valid(&good));
        assert!(polygon_is_valid(&[]));

        let bad = [Vec2::ZERO, Vec2::new(1.0, f32::NAN)];
        assert!(!polygon_is_valid(&bad));
    }
}
