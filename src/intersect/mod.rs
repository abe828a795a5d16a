//! Mesh intersection engine.
//!
//! Computes `C = A ∩ B` for two host-region meshes: a cell `(x, y, z)` is in
//! C iff it is in both inputs. The engine is bulk-synchronous data-parallel;
//! each phase is one Rayon dispatch over an index range, fenced by the join
//! at the end of the call:
//!
//! 1. **Row mapping**: the side with fewer rows drives a parallel loop of
//!    binary searches into the other side's sorted keys, keeping the work at
//!    `O(min(|A|,|B|) * log max(|A|,|B|))`; matched rows are packed by an
//!    exclusive scan plus scatter.
//! 2. **Counting**: the per-row two-pointer merge runs in COUNT mode.
//! 3. **Scan**: an exclusive prefix scan of the counts yields the output
//!    CSR offsets and the total interval count.
//! 4. **Emission**: the merge re-runs in EMIT mode, each row writing its
//!    own disjoint slice of the preallocated interval array; no atomics.
//! 5. **Compaction**: matched rows whose merge produced nothing are
//!    removed so the result never contains an empty row. Surviving rows keep
//!    their offsets and the interval array is reused verbatim.
//!
//! Any phase that determines the result is empty returns the empty mesh
//! immediately. The engine never returns a partial mesh: the result
//! satisfies every mesh invariant or an error is returned before any mesh
//! exists. Inputs are only borrowed and may be shared across concurrent
//! intersections.

pub(crate) mod bulk;
pub mod merge;

use rayon::prelude::*;

use crate::error::IntervoxError;
use crate::invariants::DebugInvariants;
use crate::mesh::coords::{Interval, RowKey};
use crate::mesh::csr::{HostMesh, Mesh};
use crate::workspace::Workspace;

/// Intersect two meshes using a transient workspace.
///
/// Convenience overload of [`intersect_with`] for one-off calls; repeated
/// intersections should thread a [`Workspace`] to reuse scratch buffers.
pub fn intersect(a: &HostMesh, b: &HostMesh) -> Result<HostMesh, IntervoxError> {
    let mut ws = Workspace::new();
    intersect_with(a, b, &mut ws)
}

/// Intersect two meshes, drawing scratch arrays from `ws`.
///
/// Inputs must satisfy the mesh invariants; the engine trusts them in
/// release builds and asserts them under `debug_assertions` or the
/// `check-invariants` feature. The result is a fresh mesh owned by the
/// caller, never sharing buffers with the inputs.
pub fn intersect_with(
    a: &HostMesh,
    b: &HostMesh,
    ws: &mut Workspace,
) -> Result<HostMesh, IntervoxError> {
    a.debug_assert_invariants();
    b.debug_assert_invariants();

    if a.is_empty() || b.is_empty() {
        return Ok(Mesh::empty_host());
    }

    // The smaller row set drives the search; `small_is_a` restores A/B roles
    // in the packed index pairs below. Output key order follows the small
    // side, which equals RowKey order since both sides are sorted.
    let small_is_a = a.num_rows() <= b.num_rows();
    let (small, large) = if small_is_a { (a, b) } else { (b, a) };
    let n = small.num_rows();

    let [flags, positions, large_idx, idx_a, idx_b, counts, keep, keep_pos] =
        ws.index_buffers([n, n + 1, n, n, n, n, n, n + 1]);

    // Phase 1: flag each small-side row present in the large side.
    let small_keys = small.row_keys();
    let large_keys = large.row_keys();
    flags
        .par_iter_mut()
        .zip(large_idx.par_iter_mut())
        .enumerate()
        .for_each(
            |(i, (flag, li))| match large_keys.binary_search(&small_keys[i]) {
                Ok(pos) => {
                    *flag = 1;
                    *li = pos;
                }
                Err(_) => *flag = 0,
            },
        );

    let matched = bulk::exclusive_scan(flags, positions);
    if matched == 0 {
        return Ok(Mesh::empty_host());
    }

    let flags = &*flags;
    let positions = &positions[..n];
    let large_idx = &*large_idx;

    // Pack matched rows and their source indices.
    let mut out_rows = vec![RowKey::default(); matched];
    bulk::scatter_compact(flags, positions, &mut out_rows, |i| small_keys[i]);
    bulk::scatter_compact(flags, positions, &mut idx_a[..matched], |i| {
        if small_is_a {
            i
        } else {
            large_idx[i]
        }
    });
    bulk::scatter_compact(flags, positions, &mut idx_b[..matched], |i| {
        if small_is_a {
            large_idx[i]
        } else {
            i
        }
    });
    let idx_a = &idx_a[..matched];
    let idx_b = &idx_b[..matched];

    // Phase 2: count intersecting intervals per matched row. A row whose
    // subrange is empty counts zero and is compacted away below.
    counts[..matched]
        .par_iter_mut()
        .enumerate()
        .for_each(|(r, c)| *c = merge::count_overlap(a.row(idx_a[r]), b.row(idx_b[r])));

    // Phase 3: offsets for the output CSR.
    let mut row_ptr_out = vec![0usize; matched + 1];
    let total = bulk::exclusive_scan(&counts[..matched], &mut row_ptr_out);
    if total == 0 {
        return Ok(Mesh::empty_host());
    }

    // Phase 4: emit into per-row disjoint slices of the output array.
    let mut intervals_out = vec![Interval::default(); total];
    bulk::split_rows_mut(&mut intervals_out, &row_ptr_out)
        .into_par_iter()
        .enumerate()
        .for_each(|(r, out)| {
            let expected = out.len();
            let emitted = merge::emit_overlap(a.row(idx_a[r]), b.row(idx_b[r]), out);
            debug_assert_eq!(emitted, expected);
        });

    // Phase 5: drop matched rows whose merge came up empty.
    keep[..matched]
        .par_iter_mut()
        .enumerate()
        .for_each(|(r, k)| *k = usize::from(row_ptr_out[r] < row_ptr_out[r + 1]));
    let kept = bulk::exclusive_scan(&keep[..matched], &mut keep_pos[..matched + 1]);
    if kept == matched {
        return Ok(Mesh::from_raw_unchecked(
            out_rows,
            row_ptr_out,
            intervals_out,
        ));
    }
    if kept == 0 {
        return Ok(Mesh::empty_host());
    }

    let keep = &keep[..matched];
    let keep_pos = &keep_pos[..matched];
    let mut kept_rows = vec![RowKey::default(); kept];
    let mut kept_ptr = vec![0usize; kept + 1];
    bulk::scatter_compact(keep, keep_pos, &mut kept_rows, |r| out_rows[r]);
    bulk::scatter_compact(keep, keep_pos, &mut kept_ptr[..kept], |r| row_ptr_out[r]);
    kept_ptr[kept] = total;

    // Dropped rows contributed zero intervals, so the surviving offsets stay
    // contiguous and the interval array moves into the result verbatim.
    Ok(Mesh::from_raw_unchecked(kept_rows, kept_ptr, intervals_out))
}
