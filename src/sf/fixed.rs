// Numan Thabit 2026
// sf/fixed.rs - constant-allocation baseline

use crate::frame::Slotframe;
use crate::sf::{Record, SchedulingFunction, DECISION_KEY};

/// Pins the slotframe to a constant allocation, skipping the 6P exchange
/// entirely. Baseline for comparing the adaptive controllers against.
#[derive(Debug, Clone, Copy)]
pub struct Fixed {
    cells: u32,
}

impl Fixed {
    pub fn new(cells: u32) -> Self {
        Self { cells }
    }
}

impl SchedulingFunction for Fixed {
    fn schema(&self) -> &'static [&'static str] {
        &[DECISION_KEY]
    }

    fn apply(
        &mut self,
        _iter: u64,
        frame: &mut Slotframe,
        _traffic: u32,
        _drop: u32,
        _txq: u32,
        _old_txq: u32,
    ) -> Record {
        frame.set_allocated(self.cells);

        let mut record = Record::new();
        record.insert(DECISION_KEY, 0i64);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forces_allocation_unconditionally() {
        let mut sf = Fixed::new(7);
        let mut frame = Slotframe::new(2);
        frame.set_allocated(42);

        let record = sf.apply(0, &mut frame, 9, 3, 10, 0);
        assert_eq!(frame.allocated(), 7);
        assert_eq!(record.decision(), Some(0));
        assert_eq!(frame.pending_requests(), 0);
    }

    #[test]
    fn reasserts_after_external_change() {
        let mut sf = Fixed::new(4);
        let mut frame = Slotframe::new(0);

        sf.apply(0, &mut frame, 0, 0, 0, 0);
        frame.allocate(10);
        frame.step_end();
        assert_eq!(frame.allocated(), 14);

        sf.apply(1, &mut frame, 0, 0, 0, 0);
        assert_eq!(frame.allocated(), 4);
    }
}
