// Numan Thabit 2026
// sf/msf.rs - legacy MSF usage-threshold controller

use crate::config::{ConfigError, MsfParams};
use crate::frame::Slotframe;
use crate::sf::{Record, SchedulingFunction, DECISION_KEY};

/// Reimplementation of the legacy MSF adaptation law: accumulate elapsed
/// (allocated) and used cell-steps, and once a window's worth of cells has
/// elapsed, nudge the allocation by one cell when the usage ratio leaves the
/// `[low, high]` band. Decisions are evaluated every slotframe rather than
/// exactly at the window boundary, and the window reduction carries the
/// remainder forward instead of resetting the accumulators.
#[derive(Debug, Clone, Copy)]
pub struct MsfLegacy {
    low: f64,
    high: f64,
    window: u32,

    elapsed: u64,
    used: f64,
}

impl MsfLegacy {
    pub fn new(params: MsfParams) -> Result<Self, ConfigError> {
        params.validate().map_err(ConfigError::Validation)?;
        Ok(Self {
            low: params.low,
            high: params.high,
            window: params.window,
            elapsed: 0,
            used: 0.0,
        })
    }
}

impl SchedulingFunction for MsfLegacy {
    fn schema(&self) -> &'static [&'static str] {
        &["usage", DECISION_KEY]
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
        // MSF cannot measure usage without at least one cell
        if frame.allocated() == 0 {
            let mut record = Record::new();
            record.insert("usage", 0.0f64);
            record.insert(DECISION_KEY, 1i64);
            return record;
        }

        self.elapsed += u64::from(frame.allocated());
        self.used += f64::from(frame.used());
        let mut usage = 0.0;
        let mut decision = 0;

        if self.elapsed > u64::from(self.window) {
            usage = self.used / self.elapsed as f64;

            if usage > self.high {
                decision = 1;
            }
            if usage < self.low {
                decision = -1;
            }

            // reduce by one window, carrying the remainder forward
            self.elapsed -= u64::from(self.window);
            self.used = (self.used - usage * f64::from(self.window)).max(0.0);
        }

        let mut record = Record::new();
        record.insert("usage", usage);
        record.insert(DECISION_KEY, decision);
        record
    }
}
