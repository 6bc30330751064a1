//! ATS invalidation-tag tracker: a two-entry fixed array recording
//! outstanding `ATS.INVAL` requests so an `IOFENCE.C` can wait for them and
//! a completion/timeout callback can release them.

use crate::iommu::command::InvalidationScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItagRoute {
    pub segment_valid: bool,
    pub segment: u8,
    pub requester_id: u16,
    pub full_device_id: u32,
}

#[derive(Debug, Clone, Copy)]
struct ItagSlot {
    busy: bool,
    route: ItagRoute,
    pid: Option<u32>,
    addr: u64,
    global: bool,
    scope: InvalidationScope,
    completions_received: u8,
    expected_completions: u8,
    timed_out: bool,
}

impl Default for ItagSlot {
    fn default() -> Self {
        ItagSlot {
            busy: false,
            route: ItagRoute {
                segment_valid: false,
                segment: 0,
                requester_id: 0,
                full_device_id: 0,
            },
            pid: None,
            addr: 0,
            global: false,
            scope: InvalidationScope::Vma,
            completions_received: 0,
            expected_completions: 0,
            timed_out: false,
        }
    }
}

pub const ITAG_COUNT: usize = 2;

/// The IOMMU's two ITAG slots: at most two outstanding invalidations per
/// IOMMU, new commands stall rather than overflow.
#[derive(Default)]
pub struct ItagTracker {
    slots: [ItagSlot; ITAG_COUNT],
}

impl ItagTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn any_busy(&self) -> bool {
        self.slots.iter().any(|s| s.busy)
    }

    pub fn any_timed_out(&self) -> bool {
        self.slots.iter().any(|s| s.timed_out)
    }

    pub fn clear_timeouts(&mut self) -> bool {
        let any = self.any_timed_out();
        for s in &mut self.slots {
            s.timed_out = false;
        }
        any
    }

    /// Allocate a free slot for a new `ATS.INVAL`, returning its 1-based
    /// tag (matching the "itag" wire value passed to `sendInvalReq`), or
    /// `None` if both slots are busy (the caller must stall).
    pub fn allocate(
        &mut self,
        route: ItagRoute,
        pid: Option<u32>,
        addr: u64,
        global: bool,
        scope: InvalidationScope,
        expected_completions: u8,
    ) -> Option<u8> {
        let idx = self.slots.iter().position(|s| !s.busy)?;
        self.slots[idx] = ItagSlot {
            busy: true,
            route,
            pid,
            addr,
            global,
            scope,
            completions_received: 0,
            expected_completions,
            timed_out: false,
        };
        Some(idx as u8 + 1)
    }

    /// Device completion report: a bitmap of ITAGs (bit `n` => tag `n+1`)
    /// and the completion count each carries. A slot is released once its
    /// count reaches its expected total.
    pub fn complete(&mut self, itag_bitmap: u32, completion_count: u8) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if !slot.busy {
                continue;
            }
            if itag_bitmap & (1 << idx) == 0 {
                continue;
            }
            slot.completions_received = slot.completions_received.saturating_add(completion_count);
            if slot.completions_received >= slot.expected_completions {
                slot.busy = false;
            }
        }
    }

    /// `atsInvalidationTimeout`: mark bitmap-selected ITAGs as timed out
    /// and release them immediately; a sticky flag is surfaced by the next
    /// `IOFENCE.C`.
    pub fn timeout(&mut self, itag_bitmap: u32) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if itag_bitmap & (1 << idx) != 0 && slot.busy {
                slot.busy = false;
                slot.timed_out = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> ItagRoute {
        ItagRoute {
            segment_valid: false,
            segment: 0,
            requester_id: 0,
            full_device_id: 0x10,
        }
    }

    #[test]
    fn allocate_fails_once_both_slots_busy() {
        let mut t = ItagTracker::new();
        assert!(t.allocate(route(), None, 0, false, InvalidationScope::Vma, 1).is_some());
        assert!(t.allocate(route(), None, 0, false, InvalidationScope::Vma, 1).is_some());
        assert!(t.allocate(route(), None, 0, false, InvalidationScope::Vma, 1).is_none());
    }

    #[test]
    fn complete_releases_slot_once_expected_count_reached() {
        let mut t = ItagTracker::new();
        let tag = t.allocate(route(), None, 0, false, InvalidationScope::Vma, 2).unwrap();
        assert!(t.any_busy());
        t.complete(1 << (tag - 1), 1);
        assert!(t.any_busy(), "one of two expected completions is not enough");
        t.complete(1 << (tag - 1), 1);
        assert!(!t.any_busy());
    }

    #[test]
    fn timeout_releases_slot_and_sets_sticky_flag() {
        let mut t = ItagTracker::new();
        let tag = t.allocate(route(), None, 0, false, InvalidationScope::Vma, 1).unwrap();
        t.timeout(1 << (tag - 1));
        assert!(!t.any_busy());
        assert!(t.any_timed_out());
        assert!(t.clear_timeouts());
        assert!(!t.any_timed_out());
    }
}
