//! The level-bucketed event wheel (C2, SPEC_FULL.md §4.2).

use crate::circuit::GateId;
use bitvec::prelude::*;

/// Pending-evaluation queue, one FIFO bucket per topological level plus a deferred
/// same-level list for DFF feedback (SPEC_FULL.md §3, §4.2).
///
/// Level `0` is reserved for primary inputs and flip-flops (SPEC_FULL.md §3). A plain
/// [`insert`](EventWheel::insert) places a gate straight into its own bucket, including
/// bucket `0` — that is how a freshly-applied input vector reaches the drain it was
/// applied for. The separate [`propagate`](EventWheel::propagate) entry point is for
/// re-activating the *successors* of a gate that just changed mid-drain: there, landing
/// back in bucket `0` would mean re-entering the pass currently being drained, so a
/// level-`0` successor is instead staged to [`same_level_wrap`](EventWheel::same_level_wrap)
/// and only becomes visible in bucket `0` on the *next* drain, via
/// [`finish_drain`](EventWheel::finish_drain). This is what gives flip-flop feedback its
/// unit delay.
pub struct EventWheel {
    buckets: Vec<Vec<GateId>>,
    scheduled: BitVec,
    cursor: usize,
    same_level_wrap: Vec<GateId>,
}

impl EventWheel {
    pub fn new(num_gates: usize, max_level: u32) -> EventWheel {
        EventWheel {
            buckets: (0..=max_level as usize).map(|_| Vec::new()).collect(),
            scheduled: bitvec![0; num_gates + 1],
            cursor: 0,
            same_level_wrap: Vec::new(),
        }
    }

    /// Schedules `g` (which lives at `level`) into its own bucket unless it is already
    /// pending. Used for externally-driven assignments (primary inputs, forced literals)
    /// that should take effect in the drain about to run.
    pub fn insert(&mut self, g: GateId, level: u32) {
        if self.scheduled[g.index()] {
            return;
        }
        self.buckets[level as usize].push(g);
        self.scheduled.set(g.index(), true);
    }

    /// Schedules `g` as the successor of a gate that just changed mid-drain, unless
    /// already pending. A level-`0` successor is deferred to the next drain rather than
    /// reinserted into the pass currently running (SPEC_FULL.md §4.2's same-level rule).
    pub fn propagate(&mut self, g: GateId, level: u32) {
        if self.scheduled[g.index()] {
            return;
        }
        if level == 0 {
            self.same_level_wrap.push(g);
        } else {
            self.buckets[level as usize].push(g);
        }
        self.scheduled.set(g.index(), true);
    }

    /// Pops the next pending gate, advancing the cursor past empty buckets.
    /// Clears its `scheduled` flag. Returns `None` once every bucket up to
    /// `max_level` is empty.
    pub fn retrieve(&mut self) -> Option<GateId> {
        while self.cursor < self.buckets.len() && self.buckets[self.cursor].is_empty() {
            self.cursor += 1;
        }
        let g = self.buckets.get_mut(self.cursor)?.pop()?;
        self.scheduled.set(g.index(), false);
        Some(g)
    }

    /// Drains the same-level wrap list built up this pass, clearing its members'
    /// `scheduled` flags (so an intervening forced assignment before the next drain
    /// can still re-schedule them) and staging them into bucket `0` for the next
    /// drain. Resets the cursor to `0`. Returns the gates that were staged, so the
    /// caller can do its own DFF next-state bookkeeping on them.
    pub fn finish_drain(&mut self) -> Vec<GateId> {
        let wrapped = std::mem::take(&mut self.same_level_wrap);
        for &g in &wrapped {
            self.scheduled.set(g.index(), false);
            self.buckets[0].push(g);
        }
        self.cursor = 0;
        wrapped
    }

    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.same_level_wrap.clear();
        self.scheduled.set_all(false);
        self.cursor = 0;
    }
}
