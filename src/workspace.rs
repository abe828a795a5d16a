//! Reusable scratch buffers for the intersection engine.
//!
//! Every intersection needs a handful of `usize` count/offset arrays (row
//! flags, scan positions, per-row counts, index maps). A [`Workspace`] keeps
//! those allocations alive across calls so repeated intersections stop paying
//! for them; buffers grow by doubling to fit the largest call seen and are
//! never shrunk. A workspace is an opaque handle: preserving allocations is
//! its only observable behaviour.
//!
//! Sharing: the engine takes `&mut Workspace`, so the borrow checker
//! serialises concurrent use. Callers running intersections in parallel
//! should own one workspace per thread.

use serde::{Deserialize, Serialize};

use crate::error::IntervoxError;

/// Number of index buffers one intersection draws from the workspace.
pub(crate) const ENGINE_SLOTS: usize = 8;

/// Workspace configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Number of reusable `usize` count/offset buffers to hold. Must be at
    /// least 2; the engine extends the list on demand if it needs more than
    /// configured.
    pub size_buffer_count: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            size_buffer_count: ENGINE_SLOTS,
        }
    }
}

/// Reusable scratch arrays threaded through consecutive intersections.
#[derive(Debug, Default)]
pub struct Workspace {
    slots: Vec<Vec<usize>>,
}

impl Workspace {
    /// Workspace with the default configuration.
    pub fn new() -> Self {
        Self {
            slots: vec![Vec::new(); WorkspaceConfig::default().size_buffer_count],
        }
    }

    /// Workspace with an explicit configuration.
    ///
    /// # Errors
    /// `WorkspaceTooSmall` if fewer than 2 buffers are requested.
    pub fn with_config(cfg: WorkspaceConfig) -> Result<Self, IntervoxError> {
        if cfg.size_buffer_count < 2 {
            return Err(IntervoxError::WorkspaceTooSmall {
                got: cfg.size_buffer_count,
            });
        }
        Ok(Self {
            slots: vec![Vec::new(); cfg.size_buffer_count],
        })
    }

    /// Current capacity of each slot, in elements. Exposed so callers can
    /// observe (and tests can assert) that allocations persist across calls.
    pub fn slot_capacities(&self) -> Vec<usize> {
        self.slots.iter().map(|s| s.len()).collect()
    }

    /// Borrow `N` index buffers at once, each grown to at least the
    /// requested length. Contents are unspecified; callers overwrite before
    /// reading.
    pub(crate) fn index_buffers<const N: usize>(&mut self, lens: [usize; N]) -> [&mut [usize]; N] {
        if self.slots.len() < N {
            self.slots.resize_with(N, Vec::new);
        }
        for (slot, &len) in self.slots.iter_mut().zip(lens.iter()) {
            ensure_capacity(slot, len);
        }
        let mut it = self.slots.iter_mut().zip(lens.iter());
        std::array::from_fn(|_| {
            let (slot, &len) = it.next().expect("slot count ensured above");
            &mut slot[..len]
        })
    }
}

/// Grow `slot` by doubling until it holds `len` elements. Never shrinks,
/// never preserves contents on growth.
fn ensure_capacity(slot: &mut Vec<usize>, len: usize) {
    if slot.len() < len {
        let mut cap = slot.len().max(64);
        while cap < len {
            cap *= 2;
        }
        slot.resize(cap, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_floor_is_two() {
        assert!(matches!(
            Workspace::with_config(WorkspaceConfig {
                size_buffer_count: 1
            }),
            Err(IntervoxError::WorkspaceTooSmall { got: 1 })
        ));
        assert!(Workspace::with_config(WorkspaceConfig {
            size_buffer_count: 2
        })
        .is_ok());
    }

    #[test]
    fn buffers_grow_and_never_shrink() {
        let mut ws = Workspace::new();
        let [a, b] = ws.index_buffers([100, 10]);
        assert_eq!(a.len(), 100);
        assert_eq!(b.len(), 10);

        let caps_after_big = ws.slot_capacities();
        let [a, _b] = ws.index_buffers([5, 5]);
        assert_eq!(a.len(), 5);
        // Smaller follow-up call keeps the larger allocation.
        assert_eq!(ws.slot_capacities(), caps_after_big);
    }

    #[test]
    fn growth_is_by_doubling() {
        let mut ws = Workspace::new();
        let _ = ws.index_buffers([65]);
        // 64 doubled once.
        assert_eq!(ws.slot_capacities()[0], 128);
        let _ = ws.index_buffers([129]);
        assert_eq!(ws.slot_capacities()[0], 256);
    }

    #[test]
    fn slot_list_extends_on_demand() {
        let mut ws = Workspace::with_config(WorkspaceConfig {
            size_buffer_count: 2,
        })
        .unwrap();
        let bufs = ws.index_buffers([4; 5]);
        assert_eq!(bufs.len(), 5);
        assert_eq!(ws.slot_capacities().len(), 5);
    }

    #[test]
    fn borrowed_buffers_are_disjoint() {
        let mut ws = Workspace::new();
        let [a, b, c] = ws.index_buffers([8, 8, 8]);
        a[0] = 1;
        b[0] = 2;
        c[0] = 3;
        assert_eq!((a[0], b[0], c[0]), (1, 2, 3));
    }
}
