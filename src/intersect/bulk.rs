//! Bulk-synchronous parallel primitives: scan, scatter-compact, row split.
//!
//! Each function is one dispatch in the engine's phase sequence; the implicit
//! join of the underlying Rayon call is the inter-phase fence. Iterations
//! never communicate except through the scan results and explicit output
//! arrays, so they may run on any worker in any order.

use rayon::prelude::*;

/// Items handed to one worker per dispatch. Large enough to amortise task
/// overhead, small enough to keep all cores fed on mid-sized meshes.
const CHUNK: usize = 4096;

/// Exclusive prefix scan of `counts` into CSR offsets.
///
/// Writes `offsets[i] = counts[0] + .. + counts[i - 1]` for `i` in
/// `[0, n]`, so `offsets[n]` is the total, which is also returned.
/// `offsets` must be one element longer than `counts`.
///
/// Two-pass chunked scan: per-chunk sums in parallel, a serial scan over the
/// small sum array, then a parallel fixup writing each chunk's prefix.
pub(crate) fn exclusive_scan(counts: &[usize], offsets: &mut [usize]) -> usize {
    let n = counts.len();
    debug_assert_eq!(offsets.len(), n + 1);
    if n == 0 {
        offsets[0] = 0;
        return 0;
    }

    let sums: Vec<usize> = counts
        .par_chunks(CHUNK)
        .map(|chunk| chunk.iter().sum())
        .collect();

    let mut bases = Vec::with_capacity(sums.len());
    let mut acc = 0usize;
    for &s in &sums {
        bases.push(acc);
        acc += s;
    }
    let total = acc;

    offsets[..n]
        .par_chunks_mut(CHUNK)
        .zip(counts.par_chunks(CHUNK))
        .zip(bases.par_iter())
        .for_each(|((out, chunk), &base)| {
            let mut acc = base;
            for (o, &c) in out.iter_mut().zip(chunk) {
                *o = acc;
                acc += c;
            }
        });
    offsets[n] = total;
    total
}

/// Scatter the flagged items into the packed output array.
///
/// `positions` must be the exclusive scan of `flags`, and `out` must have
/// exactly as many elements as there are set flags; item `i` with
/// `flags[i] != 0` lands at `out[positions[i]]` as `value_at(i)`.
///
/// Each input chunk owns the contiguous output window its kept items map to,
/// so workers write disjoint slices and need no atomics.
pub(crate) fn scatter_compact<T, F>(
    flags: &[usize],
    positions: &[usize],
    out: &mut [T],
    value_at: F,
) where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let n = flags.len();
    debug_assert_eq!(positions.len(), n);
    if n == 0 {
        debug_assert!(out.is_empty());
        return;
    }

    let mut windows = Vec::with_capacity(n.div_ceil(CHUNK));
    let mut rest = out;
    let mut start = 0usize;
    while start < n {
        let end = (start + CHUNK).min(n);
        let kept = positions[end - 1] + flags[end - 1] - positions[start];
        let (window, tail) = std::mem::take(&mut rest).split_at_mut(kept);
        rest = tail;
        windows.push((start, end, window));
        start = end;
    }
    debug_assert!(rest.is_empty());

    windows.into_par_iter().for_each(|(start, end, window)| {
        let mut k = 0;
        for i in start..end {
            if flags[i] != 0 {
                window[k] = value_at(i);
                k += 1;
            }
        }
        debug_assert_eq!(k, window.len());
    });
}

/// Split `buf` into one mutable slice per CSR row.
///
/// `offsets` must be monotone with `offsets[0] == 0` and a final entry equal
/// to `buf.len()`. The returned slices are disjoint, so a parallel loop over
/// them writes without synchronisation.
pub(crate) fn split_rows_mut<'a, T>(buf: &'a mut [T], offsets: &[usize]) -> Vec<&'a mut [T]> {
    debug_assert!(!offsets.is_empty());
    debug_assert_eq!(*offsets.last().expect("offsets non-empty"), buf.len());
    let mut rows = Vec::with_capacity(offsets.len() - 1);
    let mut rest = buf;
    let mut prev = offsets[0];
    for &off in &offsets[1..] {
        let (row, tail) = std::mem::take(&mut rest).split_at_mut(off - prev);
        rows.push(row);
        rest = tail;
        prev = off;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_scan(counts: &[usize]) -> (Vec<usize>, usize) {
        let mut out = Vec::with_capacity(counts.len() + 1);
        let mut acc = 0usize;
        for &c in counts {
            out.push(acc);
            acc += c;
        }
        out.push(acc);
        (out, acc)
    }

    #[test]
    fn scan_empty() {
        let mut offsets = vec![99usize];
        assert_eq!(exclusive_scan(&[], &mut offsets), 0);
        assert_eq!(offsets, vec![0]);
    }

    #[test]
    fn scan_matches_reference_small() {
        let counts = [3usize, 0, 1, 7, 0, 2];
        let mut offsets = vec![0usize; counts.len() + 1];
        let total = exclusive_scan(&counts, &mut offsets);
        let (expect, expect_total) = reference_scan(&counts);
        assert_eq!(offsets, expect);
        assert_eq!(total, expect_total);
    }

    #[test]
    fn scan_matches_reference_across_chunks() {
        // Spans several worker chunks so the fixup pass is exercised.
        let counts: Vec<usize> = (0..3 * CHUNK + 17).map(|i| (i * 7 + 3) % 5).collect();
        let mut offsets = vec![0usize; counts.len() + 1];
        let total = exclusive_scan(&counts, &mut offsets);
        let (expect, expect_total) = reference_scan(&counts);
        assert_eq!(offsets, expect);
        assert_eq!(total, expect_total);
    }

    #[test]
    fn scatter_packs_flagged_items() {
        let flags: Vec<usize> = vec![1, 0, 0, 1, 1, 0, 1];
        let (positions, total) = {
            let (p, t) = reference_scan(&flags);
            (p[..flags.len()].to_vec(), t)
        };
        let mut out = vec![0usize; total];
        scatter_compact(&flags, &positions, &mut out, |i| i * 10);
        assert_eq!(out, vec![0, 30, 40, 60]);
    }

    #[test]
    fn scatter_across_chunks_matches_filter() {
        let flags: Vec<usize> = (0..2 * CHUNK + 5).map(|i| usize::from(i % 3 == 0)).collect();
        let (scan, total) = reference_scan(&flags);
        let mut out = vec![0usize; total];
        scatter_compact(&flags, &scan[..flags.len()], &mut out, |i| i);
        let expect: Vec<usize> = (0..flags.len()).filter(|i| i % 3 == 0).collect();
        assert_eq!(out, expect);
    }

    #[test]
    fn scatter_all_dropped() {
        let flags = vec![0usize; 10];
        let positions = vec![0usize; 10];
        let mut out: Vec<usize> = Vec::new();
        scatter_compact(&flags, &positions, &mut out, |i| i);
        assert!(out.is_empty());
    }

    #[test]
    fn split_rows_covers_buffer() {
        let mut buf: Vec<u32> = (0..6).collect();
        let offsets = [0usize, 2, 2, 5, 6];
        let rows = split_rows_mut(&mut buf, &offsets);
        let lens: Vec<usize> = rows.iter().map(|r| r.len()).collect();
        assert_eq!(lens, vec![2, 0, 3, 1]);
        assert_eq!(rows[2], &[2, 3, 4]);
    }
}
