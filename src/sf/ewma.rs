// Numan Thabit 2026
// sf/ewma.rs - EWMA-filtered delta-Q controller

use crate::config::{ConfigError, EwmaParams};
use crate::filter::ewma;
use crate::frame::Slotframe;
use crate::sf::{Record, SchedulingFunction, DECISION_KEY};

/// Smooths both the queue growth and the unused-cell count with a single
/// EWMA before deciding. Drops bypass the smoothing: the lost packets are
/// added to the growth average directly and the unused average is reset,
/// since the unused state cannot be trusted while the queue is overflowing.
///
/// Handles moderately bursty traffic; sustained bursts defeat the unused
/// average because the average is not available at every point in time.
#[derive(Debug, Clone, Copy)]
pub struct EwmaDeltaQ {
    alpha: f64,
    overprovision: u32,

    ewma_dq: f64,
    ewma_u: f64,
}

impl EwmaDeltaQ {
    pub fn new(params: EwmaParams) -> Result<Self, ConfigError> {
        params.validate().map_err(ConfigError::Validation)?;
        Ok(Self {
            alpha: params.alpha,
            overprovision: params.overprovision,
            ewma_dq: 0.0,
            ewma_u: 0.0,
        })
    }
}

impl SchedulingFunction for EwmaDeltaQ {
    fn schema(&self) -> &'static [&'static str] {
        &["ewma_dq", "ewma_u", DECISION_KEY]
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
        let dq = i64::from(txq) - i64::from(old_txq);

        self.ewma_dq = ewma(self.ewma_dq, dq as f64, self.alpha);
        self.ewma_u = ewma(self.ewma_u, f64::from(frame.unused()), self.alpha);

        if drop > 0 {
            // lost packets demand cells right away, unfiltered
            self.ewma_dq += f64::from(drop);
            // while dropping, the true unused state must be learned anew
            self.ewma_u = 0.0;
        }

        let rounded_dq = self.ewma_dq.round() as i64;
        let rounded_u = self.ewma_u.floor() as i64;

        let mut decision = 0;
        if rounded_dq > 0 {
            decision = rounded_dq;
            // debit the average so the in-flight request is not re-requested
            self.ewma_dq -= decision as f64;
        } else if rounded_u > i64::from(self.overprovision) {
            decision = -(rounded_u - i64::from(self.overprovision));
            self.ewma_u += decision as f64;
        }

        let mut record = Record::new();
        record.insert("ewma_dq", self.ewma_dq);
        record.insert("ewma_u", self.ewma_u);
        record.insert(DECISION_KEY, decision);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(alpha: f64, overprovision: u32) -> EwmaParams {
        EwmaParams {
            alpha,
            overprovision,
        }
    }

    #[test]
    fn rejects_alpha_outside_unit_interval() {
        assert!(EwmaDeltaQ::new(params(0.0, 1)).is_err());
        assert!(EwmaDeltaQ::new(params(1.1, 1)).is_err());
        assert!(EwmaDeltaQ::new(params(1.0, 1)).is_ok());
    }

    #[test]
    fn debits_average_after_allocating() {
        let mut sf = EwmaDeltaQ::new(params(0.5, 1)).expect("params");
        let mut frame = Slotframe::new(2);

        // dq = 4, filtered to 2.0, rounded to 2, debited back to 0.0
        let record = sf.apply(0, &mut frame, 4, 0, 4, 0);
        assert_eq!(record.decision(), Some(2));
        assert_eq!(record.get("ewma_dq"), Some(crate::sf::Value::Float(0.0)));
    }

    #[test]
    fn drop_bypasses_smoothing_and_resets_unused() {
        let mut sf = EwmaDeltaQ::new(params(0.5, 1)).expect("params");
        let mut frame = Slotframe::new(2);
        frame.set_allocated(4);
        frame.offer_traffic(1); // unused = 3, seeds the average

        sf.apply(0, &mut frame, 1, 0, 0, 0);

        // queue is flat but two packets dropped: dq average gains the full
        // drop and the unused average restarts from zero
        let record = sf.apply(1, &mut frame, 8, 2, 10, 10);
        assert_eq!(record.decision(), Some(2));
        assert_eq!(record.get("ewma_u"), Some(crate::sf::Value::Float(0.0)));
    }

    #[test]
    fn releases_filtered_surplus_symmetrically() {
        let mut sf = EwmaDeltaQ::new(params(1.0, 1)).expect("params");
        let mut frame = Slotframe::new(2);
        frame.set_allocated(5);
        frame.offer_traffic(0); // unused = 5

        // alpha 1 makes the averages track the samples exactly
        let record = sf.apply(0, &mut frame, 0, 0, 0, 0);
        assert_eq!(record.decision(), Some(-4));
        // deallocation is debited back into the unused average
        assert_eq!(record.get("ewma_u"), Some(crate::sf::Value::Float(1.0)));
    }
}
