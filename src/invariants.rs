//! Invariant checking for meshes entering and leaving the engine.
//!
//! Every mesh this crate accepts or produces must satisfy the CSR contract:
//! strictly increasing `(y, z)` row keys, a monotone `row_ptr` bracketed by
//! `0` and `num_intervals`, sorted non-overlapping non-empty interval runs,
//! and no empty rows. The validating loaders (`Mesh::from_rows`,
//! `Mesh::from_raw_parts`) check unconditionally and surface the first
//! violation as an [`IntervoxError`]. The intersection engine trusts its
//! inputs in release builds; [`DebugInvariants::debug_assert_invariants`]
//! re-checks them in debug builds and under the `check-invariants` feature.

use crate::error::IntervoxError;

/// Validation hook implemented by the mesh container.
pub trait DebugInvariants {
    /// Walk the structure and return the first invariant violation found,
    /// carrying the offending index: [`IntervoxError::UnsortedRowKeys`],
    /// [`IntervoxError::RowPtrNotMonotone`], [`IntervoxError::EmptyRow`],
    /// [`IntervoxError::OverlappingIntervals`],
    /// [`IntervoxError::EmptyInterval`], or
    /// [`IntervoxError::LayoutMismatch`] when an array length disagrees with
    /// the declared sizes.
    fn validate_invariants(&self) -> Result<(), IntervoxError>;

    /// Panic on a violated invariant in debug builds or when the
    /// `check-invariants` feature is enabled; free in release builds.
    fn debug_assert_invariants(&self) {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = self.validate_invariants() {
            panic!("mesh invariant violated: {e}");
        }
    }
}
