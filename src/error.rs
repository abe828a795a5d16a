//! `IntervoxError`: unified error type for intervox public APIs
//!
//! Every fallible operation in the crate reports through this enum. Variants
//! carry the offending row or position index so a failure can be traced to a
//! concrete location in the input arrays.

use thiserror::Error;

use crate::mesh::Coord;

/// Unified error type for intervox operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntervoxError {
    /// An interval with `begin >= end` was supplied; empty intervals are
    /// never stored.
    #[error("interval at position {pos} is empty: [{begin}, {end})")]
    EmptyInterval { pos: usize, begin: Coord, end: Coord },
    /// Row keys are not strictly increasing under (y, z) lexicographic order.
    #[error("row keys not strictly increasing at row {row}")]
    UnsortedRowKeys { row: usize },
    /// Intervals within a row are unsorted or overlap a neighbour.
    #[error("intervals in row {row} unsorted or overlapping at position {pos}")]
    OverlappingIntervals { row: usize, pos: usize },
    /// A row with no intervals appeared in `row_keys`.
    #[error("row {row} has no intervals")]
    EmptyRow { row: usize },
    /// `row_ptr` decreased between consecutive rows.
    #[error("row_ptr is not monotone at row {row}")]
    RowPtrNotMonotone { row: usize },
    /// One of the three mesh arrays has a length inconsistent with the
    /// declared sizes.
    #[error("mesh layout mismatch: {what} has length {found}, expected {expected}")]
    LayoutMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A buffer read or write fell outside the allocated range.
    #[error("buffer access out of bounds in region `{region}`: offset {offset}, len {len}")]
    RangeOutOfBounds {
        region: &'static str,
        offset: usize,
        len: usize,
    },
    /// A region could not allocate a buffer of the requested size.
    #[error("allocation of {len} elements failed in region `{region}`")]
    AllocationFailed { region: &'static str, len: usize },
    /// Workspace configuration requested fewer index buffers than the
    /// minimum of two.
    #[error("workspace requires at least 2 index buffers, got {got}")]
    WorkspaceTooSmall { got: usize },
    /// Mapping a GPU staging buffer for readback failed.
    #[cfg(feature = "wgpu")]
    #[error("failed to map GPU staging buffer for readback")]
    GpuMappingFailed,
}
