//! Axial hex coordinates and facings.
//!
//! The grid is unbounded and pointy-top. Coordinates are `(q, r)` with the
//! implicit third cube component `s = -q - r`. All grid math here is integer
//! except [`HexCoord::line_to`] and [`bearing_degrees`], which interpolate in
//! floating point and snap back to the lattice.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// The six neighbor offsets, in the order used by [`HexCoord::neighbor`] and ring walks.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord::new(1, 0),
    HexCoord::new(1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(-1, 0),
    HexCoord::new(-1, 1),
    HexCoord::new(0, 1),
];

/// Movement vector for each facing (0..=5), clockwise in 60 degree steps.
const FACING_VECTORS: [HexCoord; 6] = [
    HexCoord::new(1, 0),
    HexCoord::new(0, 1),
    HexCoord::new(-1, 1),
    HexCoord::new(-1, 0),
    HexCoord::new(0, -1),
    HexCoord::new(1, -1),
];

/// An axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl HexCoord {
    /// The origin hex.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube component.
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance: `(|dq| + |dq + dr| + |dr|) / 2`.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.unsigned_abs() + (dq + dr).unsigned_abs() + dr.unsigned_abs()) / 2
    }

    /// Neighbor in direction `dir` (taken modulo 6) of [`DIRECTIONS`].
    #[must_use]
    pub const fn neighbor(self, dir: usize) -> Self {
        let d = DIRECTIONS[dir % 6];
        Self::new(self.q + d.q, self.r + d.r)
    }

    /// All six adjacent hexes.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        DIRECTIONS.map(|d| self + d)
    }

    /// One hex ahead along `facing`.
    #[must_use]
    pub fn ahead(self, facing: Facing) -> Self {
        self + facing.vector()
    }

    /// One hex behind, opposite to `facing`.
    #[must_use]
    pub fn behind(self, facing: Facing) -> Self {
        self - facing.vector()
    }

    /// Hexes on the straight line from `self` to `other`, both ends included.
    ///
    /// Samples `distance + 1` evenly spaced points and rounds each to the
    /// nearest hex.
    #[must_use]
    pub fn line_to(self, other: Self) -> Vec<Self> {
        let n = self.distance(other);
        if n == 0 {
            return vec![self];
        }
        (0..=n)
            .map(|i| {
                let t = f64::from(i) / f64::from(n);
                let q = f64::from(self.q) + f64::from(other.q - self.q) * t;
                let r = f64::from(self.r) + f64::from(other.r - self.r) * t;
                Self::round(q, r)
            })
            .collect()
    }

    /// Hexes exactly `radius` steps away, walking the ring clockwise from
    /// the south-west corner. Radius 0 yields only `self`.
    #[must_use]
    pub fn ring(self, radius: u32) -> Vec<Self> {
        if radius == 0 {
            return vec![self];
        }
        let steps = radius as i32;
        let mut current = self + HexCoord::new(-steps, steps);
        let mut out = Vec::with_capacity(6 * radius as usize);
        for dir in DIRECTIONS {
            for _ in 0..radius {
                out.push(current);
                current = current + dir;
            }
        }
        out
    }

    /// All hexes within `radius`, ring by ring from the center outwards.
    #[must_use]
    pub fn spiral(self, radius: u32) -> Vec<Self> {
        (0..=radius).flat_map(|k| self.ring(k)).collect()
    }

    /// Round fractional axial coordinates to the nearest hex.
    ///
    /// Converts to cube space, rounds each component, then recomputes the
    /// component with the largest rounding error so that `x + y + z == 0`.
    #[must_use]
    pub fn round(q: f64, r: f64) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let dq = (rq - q).abs();
        let dr = (rr - r).abs();
        let ds = (rs - s).abs();

        if dq > dr && dq > ds {
            rq = -rr - rs;
        } else if dr > ds {
            rr = -rq - rs;
        }
        Self::new(rq as i32, rr as i32)
    }
}

impl Add for HexCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for HexCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// One of six hex facings, 60 degrees apart. Facing 0 points along +q.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub struct Facing(u8);

impl Facing {
    /// Create a facing, wrapping any value into `0..=5`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value % 6)
    }

    /// Raw facing index.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Facing after a 60 degree turn to port.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        Self((self.0 + 5) % 6)
    }

    /// Facing after a 60 degree turn to starboard.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        Self((self.0 + 1) % 6)
    }

    /// Heading angle in degrees.
    #[must_use]
    pub fn degrees(self) -> f64 {
        f64::from(self.0) * 60.0
    }

    /// Unit movement vector for this facing.
    #[must_use]
    pub const fn vector(self) -> HexCoord {
        FACING_VECTORS[self.0 as usize]
    }

    /// Smallest number of 60 degree turns between two facings.
    #[must_use]
    pub const fn turns_to(self, other: Self) -> u8 {
        let diff = (other.0 + 6 - self.0) % 6;
        if diff > 3 {
            6 - diff
        } else {
            diff
        }
    }
}

impl TryFrom<u8> for Facing {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        if value < 6 {
            Ok(Self(value))
        } else {
            Err(format!("facing must be 0..=5, got {value}"))
        }
    }
}

impl From<Facing> for u8 {
    fn from(value: Facing) -> Self {
        value.0
    }
}

/// Bearing from `from` to `to` in degrees, `[0, 360)`, measured in the same
/// frame as [`Facing::degrees`]. Coincident hexes have bearing 0.
///
/// The axial delta is taken through cube space onto the plane so that each
/// facing vector lies exactly on its multiple of 60 degrees.
#[must_use]
pub fn bearing_degrees(from: HexCoord, to: HexCoord) -> f64 {
    let d = to - from;
    if d == HexCoord::ORIGIN {
        return 0.0;
    }
    // cube (x, y, z) = (q, s, r)
    let x = f64::from(d.q);
    let y = f64::from(d.s());
    let z = f64::from(d.r);
    let px = (x - y) / 2.0;
    let py = z * 3f64.sqrt() / 2.0;
    py.atan2(px).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_basics() {
        let a = HexCoord::new(0, 0);
        assert_eq!(a.distance(a), 0);
        assert_eq!(a.distance(HexCoord::new(3, 0)), 3);
        assert_eq!(a.distance(HexCoord::new(2, -4)), 4);
        assert_eq!(HexCoord::new(-2, 1).distance(HexCoord::new(1, -1)), 3);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let center = HexCoord::new(4, -2);
        let ns = center.neighbors();
        assert_eq!(ns.len(), 6);
        for n in ns {
            assert_eq!(center.distance(n), 1);
        }
        assert_eq!(center.neighbor(0), HexCoord::new(5, -2));
        assert_eq!(center.neighbor(6), center.neighbor(0));
    }

    #[test]
    fn test_line_endpoints_and_length() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(4, -2);
        let line = a.line_to(b);
        assert_eq!(line.len(), 5);
        assert_eq!(line[0], a);
        assert_eq!(line[4], b);
        for pair in line.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
        }
        assert_eq!(a.line_to(a), vec![a]);
    }

    #[test]
    fn test_ring_and_spiral_sizes() {
        let c = HexCoord::new(1, 1);
        assert_eq!(c.ring(0), vec![c]);
        let ring = c.ring(2);
        assert_eq!(ring.len(), 12);
        assert!(ring.iter().all(|h| c.distance(*h) == 2));
        assert_eq!(c.spiral(2).len(), 1 + 6 + 12);
    }

    #[test]
    fn test_round_keeps_cube_constraint() {
        let h = HexCoord::round(0.4, 0.4);
        assert_eq!(h.q + h.r + h.s(), 0);
        assert_eq!(HexCoord::round(1.1, -0.9), HexCoord::new(1, -1));
    }

    #[test]
    fn test_facing_turns_wrap() {
        let f = Facing::new(0);
        assert_eq!(f.turned_left().index(), 5);
        assert_eq!(f.turned_right().index(), 1);
        assert_eq!(Facing::new(5).turned_right().index(), 0);
        assert_eq!(Facing::new(1).turns_to(Facing::new(4)), 3);
        assert_eq!(Facing::new(0).turns_to(Facing::new(5)), 1);
    }

    #[test]
    fn test_ahead_and_behind_are_inverse() {
        let h = HexCoord::new(2, 3);
        for i in 0..6 {
            let f = Facing::new(i);
            assert_eq!(h.ahead(f).behind(f), h);
            assert_eq!(h.distance(h.ahead(f)), 1);
        }
    }

    #[test]
    fn test_facing_vectors_match_bearings() {
        for i in 0..6 {
            let f = Facing::new(i);
            let bearing = bearing_degrees(HexCoord::ORIGIN, f.vector());
            assert!((bearing - f.degrees()).abs() < 1e-9, "facing {i}: {bearing}");
        }
    }

    #[test]
    fn test_facing_rejects_out_of_range_on_deserialize() {
        assert!(Facing::try_from(6).is_err());
        assert_eq!(Facing::try_from(3), Ok(Facing::new(3)));
    }
}
