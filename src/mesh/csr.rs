//! CSR interval-set mesh container.
//!
//! A [`Mesh`] is a sparse 3-D occupancy set stored as three parallel arrays:
//! sorted `(y, z)` row keys, CSR offsets into the interval array, and the
//! flat array of half-open X intervals. The arrays live in one
//! [`MemoryRegion`] and are exclusively owned by the mesh; a mesh is
//! immutable once constructed.
//!
//! # Invariants
//!
//! - `row_keys` is strictly increasing under the `RowKey` order.
//! - `row_ptr[0] == 0`, `row_ptr[num_rows] == num_intervals`, and `row_ptr`
//!   is monotone.
//! - Per row, intervals are sorted by `begin`, pairwise non-overlapping, and
//!   non-empty.
//! - No row is empty; rows without intervals must not appear in `row_keys`.
//!
//! The validating constructors enforce these on every mesh they accept;
//! engine-produced meshes re-check them in debug builds and under the
//! `check-invariants` feature via [`DebugInvariants`].

use core::fmt::{self, Debug};

use crate::error::IntervoxError;
use crate::invariants::DebugInvariants;
use crate::mesh::coords::{Coord, Interval, RowKey};
use crate::region::{HostRegion, MemoryRegion};

/// Sparse 3-D occupancy mesh in CSR form over interval sets.
pub struct Mesh<R: MemoryRegion = HostRegion> {
    row_keys: R::Buffer<RowKey>,
    row_ptr: R::Buffer<usize>,
    intervals: R::Buffer<Interval>,
    num_rows: usize,
    num_intervals: usize,
}

/// Mesh whose arrays live in host memory. The intersection engine operates
/// on this type.
pub type HostMesh = Mesh<HostRegion>;

impl<R: MemoryRegion> Debug for Mesh<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("num_rows", &self.num_rows)
            .field("num_intervals", &self.num_intervals)
            .finish()
    }
}

impl<R: MemoryRegion> Mesh<R> {
    /// The empty mesh: zero rows, zero intervals. Absorbing element of
    /// intersection.
    pub fn empty(region: &R) -> Result<Self, IntervoxError> {
        Ok(Self {
            row_keys: region.alloc(0)?,
            row_ptr: region.upload(&[0usize])?,
            intervals: region.alloc(0)?,
            num_rows: 0,
            num_intervals: 0,
        })
    }

    /// Number of non-empty rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Total number of stored intervals.
    #[inline]
    pub fn num_intervals(&self) -> usize {
        self.num_intervals
    }

    /// Whether the mesh denotes no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub(crate) fn row_keys_buf(&self) -> &R::Buffer<RowKey> {
        &self.row_keys
    }

    pub(crate) fn row_ptr_buf(&self) -> &R::Buffer<usize> {
        &self.row_ptr
    }

    pub(crate) fn intervals_buf(&self) -> &R::Buffer<Interval> {
        &self.intervals
    }

    /// Build a mesh in `region` from host arrays, without validation.
    ///
    /// Callers must hand in arrays already satisfying the mesh invariants;
    /// [`crate::region::mesh_to`] and the engine do.
    pub(crate) fn upload_parts_in(
        region: &R,
        row_keys: &[RowKey],
        row_ptr: &[usize],
        intervals: &[Interval],
    ) -> Result<Self, IntervoxError> {
        debug_assert_eq!(row_ptr.len(), row_keys.len() + 1);
        Ok(Self {
            row_keys: region.upload(row_keys)?,
            row_ptr: region.upload(row_ptr)?,
            intervals: region.upload(intervals)?,
            num_rows: row_keys.len(),
            num_intervals: intervals.len(),
        })
    }
}

impl HostMesh {
    /// The empty host mesh. Infallible: host allocation of empty arrays
    /// cannot fail.
    pub fn empty_host() -> Self {
        Self {
            row_keys: Vec::new().into(),
            row_ptr: vec![0usize].into(),
            intervals: Vec::new().into(),
            num_rows: 0,
            num_intervals: 0,
        }
    }

    /// Build and validate a host mesh from per-row interval lists.
    ///
    /// Rows must arrive strictly increasing by `(y, z)`; each row's
    /// intervals must be sorted, non-overlapping, and non-empty; no row may
    /// be empty.
    ///
    /// # Example
    /// ```rust
    /// # fn try_main() -> Result<(), intervox::error::IntervoxError> {
    /// use intervox::mesh::{Interval, Mesh, RowKey};
    /// let m = Mesh::from_rows([
    ///     (RowKey::new(0, 0), vec![Interval::new(0, 5)?, Interval::new(9, 12)?]),
    ///     (RowKey::new(0, 1), vec![Interval::new(-3, 3)?]),
    /// ])?;
    /// assert_eq!(m.num_rows(), 2);
    /// assert_eq!(m.num_intervals(), 3);
    /// # Ok(())
    /// # }
    /// # try_main().unwrap();
    /// ```
    pub fn from_rows<I>(rows: I) -> Result<Self, IntervoxError>
    where
        I: IntoIterator<Item = (RowKey, Vec<Interval>)>,
    {
        let mut row_keys = Vec::new();
        let mut row_ptr = vec![0usize];
        let mut intervals = Vec::new();
        for (key, ivs) in rows {
            row_keys.push(key);
            intervals.extend_from_slice(&ivs);
            row_ptr.push(intervals.len());
        }
        Self::from_raw_parts(row_keys, row_ptr, intervals)
    }

    /// Build a host mesh from raw CSR arrays, validating every invariant.
    ///
    /// # Errors
    /// Returns the first violation found: array length mismatches, unsorted
    /// or duplicate row keys, non-monotone `row_ptr`, empty rows, or
    /// malformed interval runs.
    pub fn from_raw_parts(
        row_keys: Vec<RowKey>,
        row_ptr: Vec<usize>,
        intervals: Vec<Interval>,
    ) -> Result<Self, IntervoxError> {
        let mesh = Self {
            num_rows: row_keys.len(),
            num_intervals: intervals.len(),
            row_keys: row_keys.into(),
            row_ptr: row_ptr.into(),
            intervals: intervals.into(),
        };
        mesh.validate_invariants()?;
        Ok(mesh)
    }

    /// Engine-internal constructor: arrays are trusted, re-checked only in
    /// debug builds.
    pub(crate) fn from_raw_unchecked(
        row_keys: Vec<RowKey>,
        row_ptr: Vec<usize>,
        intervals: Vec<Interval>,
    ) -> Self {
        let mesh = Self {
            num_rows: row_keys.len(),
            num_intervals: intervals.len(),
            row_keys: row_keys.into(),
            row_ptr: row_ptr.into(),
            intervals: intervals.into(),
        };
        mesh.debug_assert_invariants();
        mesh
    }

    /// Sorted row keys.
    #[inline]
    pub fn row_keys(&self) -> &[RowKey] {
        self.row_keys.as_slice()
    }

    /// CSR offsets; length `num_rows + 1`.
    #[inline]
    pub fn row_ptr(&self) -> &[usize] {
        self.row_ptr.as_slice()
    }

    /// Flat interval array.
    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        self.intervals.as_slice()
    }

    /// Interval run of row `r`.
    #[inline]
    pub fn row(&self, r: usize) -> &[Interval] {
        let ptr = self.row_ptr.as_slice();
        &self.intervals.as_slice()[ptr[r]..ptr[r + 1]]
    }

    /// Index of the row with key `key`, if present.
    #[inline]
    pub fn find_row(&self, key: RowKey) -> Option<usize> {
        self.row_keys.as_slice().binary_search(&key).ok()
    }

    /// Whether the cell `(x, y, z)` is occupied.
    pub fn contains(&self, x: Coord, y: Coord, z: Coord) -> bool {
        let Some(r) = self.find_row(RowKey::new(y, z)) else {
            return false;
        };
        let run = self.row(r);
        let i = run.partition_point(|iv| iv.begin <= x);
        i > 0 && x < run[i - 1].end
    }

    /// Iterate rows as `(key, interval run)` pairs in key order.
    pub fn rows(&self) -> impl Iterator<Item = (RowKey, &[Interval])> + '_ {
        self.row_keys
            .as_slice()
            .iter()
            .enumerate()
            .map(move |(r, &key)| (key, self.row(r)))
    }

    /// Array-for-array equality of the CSR representation.
    ///
    /// Stricter than cell-wise equality: two meshes denoting the same cells
    /// with different interval splits compare unequal.
    pub fn structural_eq(&self, other: &Self) -> bool {
        self.num_rows == other.num_rows
            && self.num_intervals == other.num_intervals
            && self.row_keys.as_slice() == other.row_keys.as_slice()
            && self.row_ptr.as_slice() == other.row_ptr.as_slice()
            && self.intervals.as_slice() == other.intervals.as_slice()
    }

    /// Consume the mesh, yielding the raw CSR arrays.
    pub fn into_raw_parts(self) -> (Vec<RowKey>, Vec<usize>, Vec<Interval>) {
        (
            self.row_keys.into_inner(),
            self.row_ptr.into_inner(),
            self.intervals.into_inner(),
        )
    }
}

impl DebugInvariants for HostMesh {
    fn validate_invariants(&self) -> Result<(), IntervoxError> {
        let keys = self.row_keys.as_slice();
        let ptr = self.row_ptr.as_slice();
        let ivs = self.intervals.as_slice();

        // Array layout against the declared sizes.
        if keys.len() != self.num_rows {
            return Err(IntervoxError::LayoutMismatch {
                what: "row_keys",
                expected: self.num_rows,
                found: keys.len(),
            });
        }
        if ptr.len() != self.num_rows + 1 {
            return Err(IntervoxError::LayoutMismatch {
                what: "row_ptr",
                expected: self.num_rows + 1,
                found: ptr.len(),
            });
        }
        if ivs.len() != self.num_intervals {
            return Err(IntervoxError::LayoutMismatch {
                what: "intervals",
                expected: self.num_intervals,
                found: ivs.len(),
            });
        }
        if ptr[0] != 0 {
            return Err(IntervoxError::LayoutMismatch {
                what: "row_ptr[0]",
                expected: 0,
                found: ptr[0],
            });
        }
        if ptr[self.num_rows] != self.num_intervals {
            return Err(IntervoxError::LayoutMismatch {
                what: "row_ptr[num_rows]",
                expected: self.num_intervals,
                found: ptr[self.num_rows],
            });
        }

        for r in 0..self.num_rows {
            // Strictly increasing keys.
            if r + 1 < self.num_rows && keys[r] >= keys[r + 1] {
                return Err(IntervoxError::UnsortedRowKeys { row: r + 1 });
            }
            // Monotone offsets.
            if ptr[r] > ptr[r + 1] {
                return Err(IntervoxError::RowPtrNotMonotone { row: r });
            }
            if ptr[r + 1] > ivs.len() {
                return Err(IntervoxError::LayoutMismatch {
                    what: "row_ptr entry",
                    expected: ivs.len(),
                    found: ptr[r + 1],
                });
            }
            // No empty rows.
            if ptr[r] == ptr[r + 1] {
                return Err(IntervoxError::EmptyRow { row: r });
            }
            // Sorted, non-overlapping, non-empty interval run.
            let run = &ivs[ptr[r]..ptr[r + 1]];
            for (k, iv) in run.iter().enumerate() {
                if iv.is_empty() {
                    return Err(IntervoxError::EmptyInterval {
                        pos: ptr[r] + k,
                        begin: iv.begin,
                        end: iv.end,
                    });
                }
                if k + 1 < run.len() && run[k].end > run[k + 1].begin {
                    return Err(IntervoxError::OverlappingIntervals {
                        row: r,
                        pos: ptr[r] + k,
                    });
                }
            }
        }
        Ok(())
    }
}
