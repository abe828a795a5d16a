//! Lattice coordinate primitives: `Coord`, `Interval`, and `RowKey`.
//!
//! All mesh geometry lives on a signed 32-bit integer lattice. A row of a
//! mesh is addressed by its `(y, z)` pair and stores its occupied X cells as
//! half-open `[begin, end)` intervals. Both structs are `repr(C)` plain old
//! data so they can sit in region buffers (including GPU buffers) and be
//! bulk-copied with `bytemuck`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::IntervoxError;

/// Scalar lattice coordinate. The full signed range is valid, including
/// `Coord::MIN` and `Coord::MAX`.
pub type Coord = i32;

/// Half-open interval `[begin, end)` on the X axis.
///
/// Denotes the cells with `x` in `{begin, begin + 1, .., end - 1}`.
///
/// # Invariant
/// `begin < end`; no empty interval is ever stored in a mesh.
#[repr(C)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Interval {
    /// Inclusive lower bound.
    pub begin: Coord,
    /// Exclusive upper bound.
    pub end: Coord,
}

impl Interval {
    /// Construct an interval, rejecting the empty case.
    #[inline]
    pub fn new(begin: Coord, end: Coord) -> Result<Self, IntervoxError> {
        if begin >= end {
            return Err(IntervoxError::EmptyInterval { pos: 0, begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Number of cells covered. Widened arithmetic: the full-range interval
    /// `[Coord::MIN, Coord::MAX)` does not fit in `u32`.
    #[inline]
    pub fn len(&self) -> u64 {
        (self.end as i64 - self.begin as i64) as u64
    }

    /// Whether the interval denotes no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    /// Whether `x` falls inside `[begin, end)`.
    #[inline]
    pub fn contains(&self, x: Coord) -> bool {
        self.begin <= x && x < self.end
    }
}

/// Row key for the 3-D sparse structure: the `(y, z)` pair shared by all
/// cells of one row.
///
/// The derived `Ord` is lexicographic with `y` major and `z` minor, which is
/// the order `row_keys` arrays are sorted in.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
)]
pub struct RowKey {
    pub y: Coord,
    pub z: Coord,
}

impl RowKey {
    #[inline]
    pub fn new(y: Coord, z: Coord) -> Self {
        Self { y, z }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rejects_empty() {
        assert!(Interval::new(5, 5).is_err());
        assert!(Interval::new(5, 4).is_err());
        assert!(Interval::new(5, 6).is_ok());
    }

    #[test]
    fn interval_contains_is_half_open() {
        let iv = Interval::new(2, 5).unwrap();
        assert!(!iv.contains(1));
        assert!(iv.contains(2));
        assert!(iv.contains(4));
        assert!(!iv.contains(5));
    }

    #[test]
    fn interval_len_survives_full_signed_range() {
        let iv = Interval::new(Coord::MIN, Coord::MAX).unwrap();
        assert_eq!(iv.len(), (u32::MAX as u64));
        let tiny = Interval::new(Coord::MAX - 1, Coord::MAX).unwrap();
        assert_eq!(tiny.len(), 1);
    }

    #[test]
    fn row_key_order_is_y_major_z_minor() {
        let a = RowKey::new(0, 9);
        let b = RowKey::new(1, 0);
        let c = RowKey::new(1, 1);
        assert!(a < b);
        assert!(b < c);
        let mut v = vec![c, a, b];
        v.sort();
        assert_eq!(v, vec![a, b, c]);
    }

    #[test]
    fn row_key_equality_is_componentwise() {
        assert_eq!(RowKey::new(3, -7), RowKey::new(3, -7));
        assert_ne!(RowKey::new(3, -7), RowKey::new(3, 7));
        assert_ne!(RowKey::new(-3, 7), RowKey::new(3, 7));
    }

    #[test]
    fn serde_roundtrip() {
        let iv = Interval::new(-4, 9).unwrap();
        let s = serde_json::to_string(&iv).expect("serialize");
        let de: Interval = serde_json::from_str(&s).expect("deserialize");
        assert_eq!(de, iv);

        let k = RowKey::new(-1, 2);
        let s = serde_json::to_string(&k).expect("serialize");
        let de: RowKey = serde_json::from_str(&s).expect("deserialize");
        assert_eq!(de, k);
    }
}
