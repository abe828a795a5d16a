//! Mesh module: coordinate primitives and the CSR container.

pub mod coords;
pub mod csr;

pub use coords::{Coord, Interval, RowKey};
pub use csr::{HostMesh, Mesh};
