// Numan Thabit 2026
// sf/txq_budget.rs - combined cells+queue-headroom budget controller

use crate::config::{ConfigError, TxqBudgetParams};
use crate::engine::MAX_TXQ;
use crate::filter::{ewma, ewmm2};
use crate::frame::Slotframe;
use crate::sf::{Record, SchedulingFunction, DECISION_KEY};

// larger than MAX_CELLS + MAX_TXQ is all that matters
const BIG_M: f64 = 1000.0;

/// Tracks a single spending budget: unused cells plus remaining queue
/// headroom. Its minimum over the recent past is what can be released
/// safely. The envelope filter only tracks maxima, so the budget is held
/// inverted against [`BIG_M`] and un-inverted for the decision.
#[derive(Debug, Clone, Copy)]
pub struct TxqBudget {
    alpha0: f64,
    alpha1: f64,
    overprovision: u32,

    ewma_dq: f64,
    ewma_u: f64,
    ewmm_budget: f64,
}

impl TxqBudget {
    pub fn new(params: TxqBudgetParams) -> Result<Self, ConfigError> {
        params.validate().map_err(ConfigError::Validation)?;
        Ok(Self {
            alpha0: params.alpha0,
            alpha1: params.alpha1,
            overprovision: params.overprovision,
            ewma_dq: 0.0,
            ewma_u: 0.0,
            ewmm_budget: 0.0,
        })
    }
}

impl SchedulingFunction for TxqBudget {
    fn schema(&self) -> &'static [&'static str] {
        &["ewma_dq", "ewma_u", "ewmm", "ewmm_budget", DECISION_KEY]
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

        self.ewma_dq = ewma(self.ewma_dq, dq as f64, self.alpha0);
        // kept for diagnostics only; decisions use the budget envelope
        self.ewma_u = ewma(self.ewma_u, f64::from(frame.unused()), self.alpha1);

        // minimum budget seen in the recent past, alpha1 steps of memory
        let txq_left = MAX_TXQ - txq;
        let current_budget = BIG_M - f64::from(frame.unused() + txq_left);
        self.ewmm_budget = ewmm2(self.ewmm_budget, current_budget, self.alpha1);
        let real_ewmm_budget = BIG_M - self.ewmm_budget;

        if drop > 0 {
            self.ewma_dq += f64::from(drop);
        }

        let rounded_dq = self.ewma_dq.floor() as i64;
        let rounded_budget = real_ewmm_budget.floor() as i64;

        let mut decision = 0;
        if rounded_dq > 0 {
            decision = rounded_dq;
            // debit the average so the in-flight request is not re-requested
            self.ewma_dq -= decision as f64;
        } else if rounded_budget > i64::from(self.overprovision) {
            decision = -(rounded_budget - i64::from(self.overprovision));
            // debit the budget in inverse space: decision is negative, so
            // subtracting twice its value pushes the stored maximum up
            self.ewmm_budget -= 2.0 * decision as f64;
        }

        let mut record = Record::new();
        record.insert("ewma_dq", self.ewma_dq);
        record.insert("ewma_u", self.ewma_u);
        record.insert("ewmm", self.ewmm_budget);
        record.insert("ewmm_budget", real_ewmm_budget);
        record.insert(DECISION_KEY, decision);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sf(alpha0: f64, alpha1: f64, overprovision: u32) -> TxqBudget {
        TxqBudget::new(TxqBudgetParams {
            alpha0,
            alpha1,
            overprovision,
        })
        .expect("params")
    }

    #[test]
    fn budget_counts_cells_and_headroom() {
        let mut sf = sf(0.5, 0.5, 1);
        let mut frame = Slotframe::new(2);
        frame.set_allocated(3);
        frame.offer_traffic(1); // unused = 2

        // txq 4 leaves headroom 6; first sample seeds the envelope, so the
        // budget minimum is 2 + 6 = 8 and everything above the target goes
        let record = sf.apply(0, &mut frame, 1, 0, 4, 4);
        assert_eq!(record.decision(), Some(-7));
        assert_eq!(
            record.get("ewmm_budget"),
            Some(crate::sf::Value::Float(8.0))
        );
    }

    #[test]
    fn release_debits_inverse_space_twice() {
        let mut sf = sf(0.5, 0.5, 1);
        let mut frame = Slotframe::new(2);
        frame.set_allocated(3);
        frame.offer_traffic(1);

        let record = sf.apply(0, &mut frame, 1, 0, 4, 4);
        let stored = match record.get("ewmm") {
            Some(crate::sf::Value::Float(v)) => v,
            other => panic!("unexpected {other:?}"),
        };
        // budget envelope was BIG_M - 8, then debited by 2 * -7
        assert_eq!(stored, (BIG_M - 8.0) - 2.0 * -7.0);
    }

    #[test]
    fn growth_branch_wins_over_release() {
        let mut sf = sf(1.0, 0.5, 1);
        let mut frame = Slotframe::new(2);
        frame.set_allocated(3);
        frame.offer_traffic(3); // unused 0

        let record = sf.apply(0, &mut frame, 4, 0, 6, 2);
        assert_eq!(record.decision(), Some(4));
    }

    #[test]
    fn drop_feeds_growth_average_unfiltered() {
        let mut sf = sf(0.5, 0.5, 1);
        let mut frame = Slotframe::new(2);
        frame.offer_traffic(0);

        let record = sf.apply(0, &mut frame, 12, 2, 10, 10);
        // dq 0 but two drops: floor(0 + 2) allocated
        assert_eq!(record.decision(), Some(2));
    }
}
