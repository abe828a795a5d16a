#![allow(dead_code)]
use std::collections::HashSet;

use intervox::mesh::{Coord, HostMesh, Interval, Mesh, RowKey};

pub fn iv(begin: Coord, end: Coord) -> Interval {
    Interval::new(begin, end).unwrap()
}

pub fn key(y: Coord, z: Coord) -> RowKey {
    RowKey::new(y, z)
}

/// Build a host mesh from literal rows: `((y, z), [(begin, end), ..])`.
pub fn mesh(rows: &[((Coord, Coord), &[(Coord, Coord)])]) -> HostMesh {
    Mesh::from_rows(rows.iter().map(|&((y, z), ivs)| {
        (
            key(y, z),
            ivs.iter().map(|&(b, e)| iv(b, e)).collect::<Vec<_>>(),
        )
    }))
    .unwrap()
}

/// Enumerate every occupied cell. Only call on meshes with small intervals.
pub fn cells(m: &HostMesh) -> HashSet<(Coord, Coord, Coord)> {
    let mut out = HashSet::new();
    for (k, run) in m.rows() {
        for ivl in run {
            for x in ivl.begin..ivl.end {
                out.insert((x, k.y, k.z));
            }
        }
    }
    out
}

/// Assert a mesh's three arrays match the expected literal form.
pub fn expect_mesh(
    actual: &HostMesh,
    keys: &[(Coord, Coord)],
    ptr: &[usize],
    intervals: &[(Coord, Coord)],
) {
    let keys: Vec<RowKey> = keys.iter().map(|&(y, z)| key(y, z)).collect();
    let intervals: Vec<Interval> = intervals.iter().map(|&(b, e)| iv(b, e)).collect();
    assert_eq!(actual.row_keys(), &keys[..], "row_keys mismatch");
    assert_eq!(actual.row_ptr(), ptr, "row_ptr mismatch");
    assert_eq!(actual.intervals(), &intervals[..], "intervals mismatch");
}

pub fn expect_empty(actual: &HostMesh) {
    assert_eq!(actual.num_rows(), 0, "expected empty mesh");
    assert_eq!(actual.num_intervals(), 0, "expected empty mesh");
}
