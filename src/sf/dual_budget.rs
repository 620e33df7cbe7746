// Numan Thabit 2026
// sf/dual_budget.rs - separate cells and queue-headroom budget controller

use tracing::debug;

use crate::config::{ConfigError, DualBudgetParams};
use crate::engine::MAX_TXQ;
use crate::filter::{ewma, ewmm2};
use crate::frame::Slotframe;
use crate::sf::{Record, SchedulingFunction, DECISION_KEY};

// larger than MAX_CELLS + MAX_TXQ is all that matters
const BIG_M: f64 = 1000.0;

/// Keeps two separate release budgets: the minimum unused-cell count and the
/// minimum queue headroom seen in the recent past, each tracked as a
/// decaying envelope in inverse space against [`BIG_M`]. Cells are released
/// against the unused budget first; the headroom budget is consulted second
/// and only spent when the unused-cell average would still clear its target
/// afterwards, so abundant queue headroom cannot starve the link.
#[derive(Debug, Clone, Copy)]
pub struct DualBudget {
    alpha0: f64,
    alpha1: f64,
    overprovision_cells: u32,
    overprovision_txq: u32,

    ewma_dq: f64,
    ewma_u: f64,
    ewmm_u: f64,
    ewmm_txql: f64,
}

impl DualBudget {
    pub fn new(params: DualBudgetParams) -> Result<Self, ConfigError> {
        params.validate().map_err(ConfigError::Validation)?;
        Ok(Self {
            alpha0: params.alpha0,
            alpha1: params.alpha1,
            overprovision_cells: params.overprovision_cells,
            overprovision_txq: params.overprovision_txq,
            ewma_dq: 0.0,
            ewma_u: 0.0,
            ewmm_u: 0.0,
            ewmm_txql: 0.0,
        })
    }
}

impl SchedulingFunction for DualBudget {
    fn schema(&self) -> &'static [&'static str] {
        &["ewma_dq", "ewma_u", "ewmm_u", "ewmm_txql", DECISION_KEY]
    }

    fn apply(
        &mut self,
        iter: u64,
        frame: &mut Slotframe,
        _traffic: u32,
        drop: u32,
        txq: u32,
        old_txq: u32,
    ) -> Record {
        let mut alloc_because_drop = false;

        let dq = i64::from(txq) - i64::from(old_txq);
        let txq_left = MAX_TXQ - txq;

        self.ewma_dq = ewma(self.ewma_dq, dq as f64, self.alpha0);
        // kept for diagnostics and the release guard below
        self.ewma_u = ewma(self.ewma_u, f64::from(frame.unused()), self.alpha1);

        // minimum unused cells and queue headroom over the recent past,
        // both held inverted against BIG_M since the envelope tracks maxima
        self.ewmm_u = ewmm2(self.ewmm_u, BIG_M - f64::from(frame.unused()), self.alpha1);
        self.ewmm_txql = ewmm2(self.ewmm_txql, BIG_M - f64::from(txq_left), self.alpha1);
        let real_ewmm_u = BIG_M - self.ewmm_u;
        let real_ewmm_txql = BIG_M - self.ewmm_txql;

        if drop > 0 {
            alloc_because_drop = true;
            self.ewma_dq += f64::from(drop);
        }

        let rounded_dq = self.ewma_dq.round() as i64;
        let rounded_ewma_u = self.ewma_u.floor() as i64;
        let rounded_u = real_ewmm_u.floor() as i64;
        let rounded_txql = real_ewmm_txql.floor() as i64;

        let mut decision = 0;
        if rounded_dq > 0 {
            decision = rounded_dq;
            // debit the average so the in-flight request is not re-requested
            self.ewma_dq -= decision as f64;

            if alloc_because_drop {
                debug!(iter, decision, "allocating after drop");
            } else {
                debug!(iter, decision, "allocating on queue growth");
            }
        } else if rounded_u > i64::from(self.overprovision_cells) {
            decision = -(rounded_u - i64::from(self.overprovision_cells));
            // debit in inverse space: the negative decision raises the
            // stored maximum, lowering the derived minimum
            self.ewmm_u -= decision as f64;
        } else if rounded_txql > i64::from(self.overprovision_txq) {
            decision = -(rounded_txql - i64::from(self.overprovision_txq));
            if rounded_ewma_u + decision > i64::from(self.overprovision_cells) {
                self.ewmm_txql -= decision as f64;
            } else {
                // releasing on headroom alone would eat into the cell
                // overprovision, do nothing
                decision = 0;
            }
        }

        let mut record = Record::new();
        record.insert("ewma_dq", self.ewma_dq);
        record.insert("ewma_u", self.ewma_u);
        record.insert("ewmm_u", real_ewmm_u);
        record.insert("ewmm_txql", real_ewmm_txql);
        record.insert(DECISION_KEY, decision);
        record
    }
}
