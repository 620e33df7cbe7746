// Numan Thabit 2026
// sf/delta_q.rs - unfiltered single-slotframe delta-Q controller

use crate::config::DeltaQParams;
use crate::frame::Slotframe;
use crate::sf::{Record, SchedulingFunction, DECISION_KEY};

/// Reacts to the raw queue growth of a single slotframe, with no smoothing.
/// Allocates the instantaneous backlog growth and releases whatever sits
/// above the overprovision target, so it keeps churning requests on any
/// non-constant traffic.
#[derive(Debug, Clone, Copy)]
pub struct DeltaQ {
    overprovision: u32,
}

impl DeltaQ {
    pub fn new(params: DeltaQParams) -> Self {
        Self {
            overprovision: params.overprovision,
        }
    }
}

impl SchedulingFunction for DeltaQ {
    fn schema(&self) -> &'static [&'static str] {
        &[DECISION_KEY]
    }

    fn apply(
        &mut self,
        _iter: u64,
        frame: &mut Slotframe,
        _traffic: u32,
        drop: u32,
        txq: u32,
        old_txq: u32,
    ) -> Record {
        let mut dq = i64::from(txq) - i64::from(old_txq);
        let unused = i64::from(frame.unused());

        if drop > 0 {
            // drops demand cells right away
            dq += i64::from(drop);
        }

        let mut decision = 0;
        if dq > 0 {
            decision = dq;
        } else if unused > i64::from(self.overprovision) {
            decision = -(unused - i64::from(self.overprovision));
        }

        let mut record = Record::new();
        record.insert(DECISION_KEY, decision);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_queue_growth() {
        let mut sf = DeltaQ::new(DeltaQParams { overprovision: 1 });
        let mut frame = Slotframe::new(2);

        let record = sf.apply(0, &mut frame, 5, 0, 7, 3);
        assert_eq!(record.decision(), Some(4));
    }

    #[test]
    fn drop_counts_as_urgent_growth() {
        let mut sf = DeltaQ::new(DeltaQParams { overprovision: 1 });
        let mut frame = Slotframe::new(2);

        // queue shrank by one but three packets were lost
        let record = sf.apply(0, &mut frame, 5, 3, 9, 10);
        assert_eq!(record.decision(), Some(2));
    }

    #[test]
    fn releases_surplus_above_target() {
        let mut sf = DeltaQ::new(DeltaQParams { overprovision: 1 });
        let mut frame = Slotframe::new(2);
        frame.set_allocated(6);
        frame.offer_traffic(2); // unused = 4

        let record = sf.apply(0, &mut frame, 2, 0, 0, 0);
        assert_eq!(record.decision(), Some(-3));
    }

    #[test]
    fn holds_within_target() {
        let mut sf = DeltaQ::new(DeltaQParams { overprovision: 2 });
        let mut frame = Slotframe::new(2);
        frame.set_allocated(4);
        frame.offer_traffic(2); // unused = 2, not above target

        let record = sf.apply(0, &mut frame, 2, 0, 0, 0);
        assert_eq!(record.decision(), Some(0));
    }
}
