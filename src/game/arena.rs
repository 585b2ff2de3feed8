//! Arena geometry - the fixed 3D volume players and balls move in

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A point in arena space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coord {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True when all three components sit exactly at the origin. A player
    /// whose target is the origin has never been handed one.
    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Coord) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Arena cell counts per axis and the spacing between cells.
///
/// The playable volume is a box centered at the origin; each axis spans
/// `(cells - 1) * spacing` arena units.
#[derive(Debug, Clone, Copy)]
pub struct ArenaConfig {
    pub cells_x: u32,
    pub cells_y: u32,
    pub cells_z: u32,
    pub spacing: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            cells_x: 13,
            cells_y: 8,
            cells_z: 8,
            spacing: 1.0,
        }
    }
}

impl ArenaConfig {
    fn half_extent(&self, cells: u32) -> f64 {
        (cells as f64 - 1.0) / 2.0 * self.spacing
    }

    fn random_axis(&self, cells: u32, rng: &mut impl Rng) -> f64 {
        let span = cells as f64 - 1.0;
        (rng.gen::<f64>() * span - span / 2.0) * self.spacing
    }

    /// Draw a point uniformly inside the arena box.
    pub fn random_coord(&self, rng: &mut impl Rng) -> Coord {
        Coord::new(
            self.random_axis(self.cells_x, rng),
            self.random_axis(self.cells_y, rng),
            self.random_axis(self.cells_z, rng),
        )
    }

    /// True when the point lies inside the bounding box.
    pub fn contains(&self, point: &Coord) -> bool {
        point.x.abs() <= self.half_extent(self.cells_x)
            && point.y.abs() <= self.half_extent(self.cells_y)
            && point.z.abs() <= self.half_extent(self.cells_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_coords_stay_in_the_box() {
        let arena = ArenaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..1000 {
            let point = arena.random_coord(&mut rng);
            assert!(arena.contains(&point), "escaped arena: {:?}", point);
        }
    }

    #[test]
    fn distance_matches_pythagoras() {
        let a = Coord::new(1.0, 2.0, 2.0);
        let b = Coord::ORIGIN;
        assert!((a.distance(&b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn origin_detection() {
        assert!(Coord::ORIGIN.is_origin());
        assert!(!Coord::new(0.0, 0.0, 0.1).is_origin());
    }
}
