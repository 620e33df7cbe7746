// Numan Thabit 2026
// frame.rs - slotframe cells and delayed 6P requests

use std::collections::VecDeque;
use std::fmt;

/// Lower bound on allocated cells per slotframe.
pub const MIN_CELLS: u32 = 0;
/// Upper bound on allocated cells per slotframe.
pub const MAX_CELLS: u32 = 100;

/// One pending 6P negotiation carrying a single allocation decision.
///
/// A request submitted with delay `T` releases its decision on the `(T+1)`-th
/// [`Slotframe::step_end`] after submission and is removed in that same pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRequest {
    id: u64,
    ttl: i64,
    decision: i64,
}

impl CellRequest {
    fn new(id: u64, ttl: u32, decision: i64) -> Self {
        Self {
            id,
            ttl: i64::from(ttl),
            decision,
        }
    }

    /// Advances the countdown by one slotframe. Returns the decision on the
    /// call that finds the countdown at zero, and 0 on every other call.
    fn tick(&mut self) -> i64 {
        if self.ttl == 0 {
            self.ttl -= 1;
            return self.decision;
        }
        self.ttl -= 1;
        0
    }

    /// True once the decision has been released; the request is then dropped.
    fn expired(&self) -> bool {
        self.ttl < 0
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn decision(&self) -> i64 {
        self.decision
    }
}

impl fmt::Display for CellRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "6P[{},{},{}]", self.id, self.ttl, self.decision)
    }
}

/// Per-run slotframe resource state: the allocated cell count, the cells
/// consumed by the current slotframe and the queue of in-flight 6P requests.
#[derive(Debug, Clone)]
pub struct Slotframe {
    cells_allocated: u32,
    cells_used: u32,
    sixp_delay: u32,
    pending: VecDeque<CellRequest>,
    total_sixp: u64,
}

impl Slotframe {
    /// Creates an empty slotframe whose requests take `sixp_delay` step-end
    /// calls to complete.
    pub fn new(sixp_delay: u32) -> Self {
        Self {
            cells_allocated: MIN_CELLS,
            cells_used: 0,
            sixp_delay,
            pending: VecDeque::new(),
            total_sixp: 0,
        }
    }

    pub fn allocated(&self) -> u32 {
        self.cells_allocated
    }

    pub fn used(&self) -> u32 {
        self.cells_used
    }

    pub fn unused(&self) -> u32 {
        self.cells_allocated - self.cells_used
    }

    /// Number of requests still in flight.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Lifetime count of requests ever submitted to this frame.
    pub fn total_requests(&self) -> u64 {
        self.total_sixp
    }

    /// Submits a delayed allocation change (negative to deallocate). The
    /// magnitude is not validated here; the effective allocation is clamped
    /// when the request completes.
    pub fn allocate(&mut self, decision: i64) {
        let request = CellRequest::new(self.total_sixp, self.sixp_delay, decision);
        self.pending.push_back(request);
        self.total_sixp += 1;
    }

    /// Forces the allocation directly, bypassing the 6P exchange. Baseline
    /// controllers use this; the value is still clamped to [`MAX_CELLS`].
    pub fn set_allocated(&mut self, cells: u32) {
        self.cells_allocated = cells.min(MAX_CELLS);
    }

    /// Offers `n` packets to the current slotframe and returns how many of
    /// them the allocated cells actually carry.
    pub fn offer_traffic(&mut self, n: u32) -> u32 {
        self.cells_used = n.min(self.cells_allocated);
        self.cells_used
    }

    /// Closes the slotframe: ticks every pending request in submission order,
    /// applies the decisions that came due, drops completed requests and
    /// resets the used-cell count for the next slotframe.
    pub fn step_end(&mut self) {
        let mut i = 0;
        while i < self.pending.len() {
            let decision = self.pending[i].tick();
            if decision != 0 {
                self.effective_allocation(decision);
            }
            if self.pending[i].expired() {
                self.pending.remove(i);
            } else {
                i += 1;
            }
        }
        self.cells_used = 0;
    }

    fn effective_allocation(&mut self, decision: i64) {
        let next = i64::from(self.cells_allocated) + decision;
        self.cells_allocated = next.clamp(i64::from(MIN_CELLS), i64::from(MAX_CELLS)) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_applies_on_the_delay_plus_one_step_end() {
        let mut frame = Slotframe::new(2);
        frame.allocate(5);

        frame.step_end();
        assert_eq!(frame.allocated(), 0);
        frame.step_end();
        assert_eq!(frame.allocated(), 0);
        frame.step_end();
        assert_eq!(frame.allocated(), 5);
        frame.step_end();
        assert_eq!(frame.allocated(), 5);
    }

    #[test]
    fn request_occupies_pending_list_for_delay_plus_one_calls() {
        let mut frame = Slotframe::new(2);
        frame.allocate(1);
        assert_eq!(frame.pending_requests(), 1);

        frame.step_end();
        assert_eq!(frame.pending_requests(), 1);
        frame.step_end();
        assert_eq!(frame.pending_requests(), 1);
        frame.step_end();
        assert_eq!(frame.pending_requests(), 0);
    }

    #[test]
    fn zero_delay_applies_on_next_step_end() {
        let mut frame = Slotframe::new(0);
        frame.allocate(3);
        frame.step_end();
        assert_eq!(frame.allocated(), 3);
        assert_eq!(frame.pending_requests(), 0);
    }

    #[test]
    fn effective_allocation_clamps_both_bounds() {
        let mut frame = Slotframe::new(0);
        frame.allocate(500);
        frame.step_end();
        assert_eq!(frame.allocated(), MAX_CELLS);

        frame.allocate(-500);
        frame.step_end();
        assert_eq!(frame.allocated(), MIN_CELLS);
    }

    #[test]
    fn requests_complete_in_submission_order() {
        let mut frame = Slotframe::new(1);
        frame.allocate(4);
        frame.step_end();
        frame.allocate(-1);
        frame.step_end();
        assert_eq!(frame.allocated(), 4);
        frame.step_end();
        assert_eq!(frame.allocated(), 3);
        assert_eq!(frame.total_requests(), 2);
    }

    #[test]
    fn offer_traffic_caps_at_allocation() {
        let mut frame = Slotframe::new(0);
        frame.set_allocated(4);
        assert_eq!(frame.offer_traffic(9), 4);
        assert_eq!(frame.used(), 4);
        assert_eq!(frame.unused(), 0);

        frame.step_end();
        assert_eq!(frame.used(), 0);
        assert_eq!(frame.offer_traffic(2), 2);
        assert_eq!(frame.unused(), 2);
    }

    #[test]
    fn set_allocated_clamps_to_max() {
        let mut frame = Slotframe::new(0);
        frame.set_allocated(1000);
        assert_eq!(frame.allocated(), MAX_CELLS);
    }
}
