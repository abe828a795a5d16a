//! # intervox
//!
//! intervox computes set intersections of three-dimensional sparse occupancy
//! meshes stored in compressed sparse row (CSR) form over interval sets. A
//! mesh is a set of unit voxels on an integer lattice; each non-empty
//! `(y, z)` row stores its occupied X cells as sorted half-open intervals,
//! so long contiguous runs compress to a single pair of coordinates.
//!
//! ## Features
//! - CSR interval-set mesh container parameterised by memory region
//!   (host vectors, or GPU buffers behind the `wgpu` feature)
//! - Bulk-synchronous data-parallel intersection engine on Rayon:
//!   row mapping, per-row two-pointer merge, prefix-scan offsets,
//!   disjoint-slice emission, and row compaction
//! - Reusable workspace so repeated intersections amortise scratch
//!   allocations
//! - Invariant validation for every mesh accepted or produced, promotable to
//!   release builds via the `check-invariants` feature
//!
//! ## Usage
//! ```rust
//! use intervox::prelude::*;
//!
//! # fn try_main() -> Result<(), IntervoxError> {
//! let a = Mesh::from_rows([(RowKey::new(0, 0), vec![Interval::new(0, 10)?])])?;
//! let b = Mesh::from_rows([(RowKey::new(0, 0), vec![Interval::new(5, 15)?])])?;
//! let c = intersect(&a, &b)?;
//! assert!(c.contains(7, 0, 0));
//! assert!(!c.contains(3, 0, 0));
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```
//!
//! Intersection is the only Boolean operation offered; meshes are
//! indicator-valued (no per-cell payload) and the in-memory CSR layout is the
//! only format. Callers needing serialisation bring their own.

pub mod error;
pub mod intersect;
pub mod invariants;
pub mod mesh;
pub mod region;
pub mod workspace;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::error::IntervoxError;
    pub use crate::intersect::{intersect, intersect_with};
    pub use crate::invariants::DebugInvariants;
    pub use crate::mesh::{Coord, HostMesh, Interval, Mesh, RowKey};
    pub use crate::region::{mesh_to, HostRegion, MemoryRegion, RegionBuffer};
    #[cfg(feature = "wgpu")]
    pub use crate::region::wgpu::WgpuRegion;
    pub use crate::workspace::{Workspace, WorkspaceConfig};
}
