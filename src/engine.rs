// Numan Thabit 2026
// engine.rs - discrete-time slotframe simulation driver

use std::io;

use thiserror::Error;
use tracing::debug;

use crate::frame::Slotframe;
use crate::report::Reporter;
use crate::sf::{Record, SchedulingFunction};
use crate::traffic::TrafficSource;

/// Transmit queue bound; packets admitted beyond this are dropped.
pub const MAX_TXQ: u32 = 10;

/// Iteration index separating startup transients from the settled window.
/// Statistics strictly after this index feed the second set of totals.
pub const WARMUP_ITER: u64 = 3600;

/// Error surfaced by the simulation driver.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The scheduling function broke its contract: every record it returns
    /// must carry an integer `decision` entry. Not recoverable.
    #[error("scheduling function returned no integer 'decision' entry at iteration {iter}")]
    MissingDecision {
        /// Iteration at which the record came back malformed.
        iter: u64,
    },
    /// The output consumer failed to accept a record.
    #[error("report output failed: {0}")]
    Report(#[from] io::Error),
}

/// Cumulative counters over a span of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Packets offered by the traffic source.
    pub traffic: u64,
    /// 6P requests submitted.
    pub sixp: u64,
    /// Packets dropped at the queue bound.
    pub drop: u64,
    /// Allocated cell-steps.
    pub cells: u64,
    /// Allocated-but-idle cell-steps.
    pub unused_cells: u64,
    /// Carried cell-steps.
    pub used_cells: u64,
}

impl Totals {
    /// Requests as a percentage of offered traffic.
    pub fn pct_sixp(&self) -> f64 {
        percentage(self.sixp, self.traffic)
    }

    /// Dropped packets as a percentage of offered traffic.
    pub fn pct_drop(&self) -> f64 {
        percentage(self.drop, self.traffic)
    }

    /// Idle cell-steps as a percentage of allocated cell-steps.
    pub fn pct_unused_cells(&self) -> f64 {
        percentage(self.unused_cells, self.cells)
    }

    /// Carried cell-steps as a percentage of allocated cell-steps.
    pub fn pct_used_cells(&self) -> f64 {
        percentage(self.used_cells, self.cells)
    }
}

fn percentage(value: u64, base: u64) -> f64 {
    if base == 0 {
        return 0.0;
    }
    100.0 * value as f64 / base as f64
}

/// Statistics for a completed (or in-progress) run: the whole run and the
/// settled window starting strictly after [`WARMUP_ITER`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub whole: Totals,
    pub settled: Totals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimState {
    Running,
    Stopped,
}

/// The discrete-time driver. Each step admits traffic into the bounded
/// queue, accounts drops, carries what the slotframe allows, consults the
/// scheduling function and submits its decision as a delayed 6P request.
/// Fully deterministic given a deterministic traffic source.
#[derive(Debug)]
pub struct Simulation<S, T, R> {
    max_iter: Option<u64>,
    traffic: T,
    schedfun: S,
    reporter: R,

    frame: Slotframe,
    state: SimState,
    iter_idx: u64,
    txq: u32,
    old_txq: u32,

    whole: Totals,
    settled: Totals,
    sixp_at_warmup: u64,
}

impl<S, T, R> Simulation<S, T, R>
where
    S: SchedulingFunction,
    T: TrafficSource,
    R: Reporter,
{
    /// Builds a simulation and announces the scheduling function's schema to
    /// the reporter. `max_iter` is the last iteration index to run,
    /// inclusive; `None` runs until the caller stops stepping.
    pub fn new(
        max_iter: Option<u64>,
        sixp_delay: u32,
        traffic: T,
        schedfun: S,
        mut reporter: R,
    ) -> Result<Self, EngineError> {
        reporter.start(schedfun.schema())?;
        Ok(Self {
            max_iter,
            traffic,
            schedfun,
            reporter,
            frame: Slotframe::new(sixp_delay),
            state: SimState::Running,
            iter_idx: 0,
            txq: 0,
            old_txq: 0,
            whole: Totals::default(),
            settled: Totals::default(),
            sixp_at_warmup: 0,
        })
    }

    /// Runs one slotframe and returns its merged record, or `None` once the
    /// iteration bound has been passed (the final summary is emitted to the
    /// reporter exactly once, on the first call past the bound).
    pub fn step(&mut self) -> Result<Option<Record>, EngineError> {
        if self.state == SimState::Stopped {
            return Ok(None);
        }
        if let Some(max) = self.max_iter {
            if self.iter_idx > max {
                let stats = self.stats();
                self.reporter.end(&stats)?;
                self.state = SimState::Stopped;
                return Ok(None);
            }
        }

        // apply requests that came due last step, reset used cells
        self.frame.step_end();
        self.old_txq = self.txq;
        let mut drop = 0;

        let traffic = self.traffic.traffic_at(self.iter_idx);
        self.whole.traffic += u64::from(traffic);
        if self.iter_idx > WARMUP_ITER {
            self.settled.traffic += u64::from(traffic);
        }

        // admit into the bounded queue; the excess is lost
        self.txq += traffic;
        if self.txq > MAX_TXQ {
            drop = self.txq - MAX_TXQ;
            self.txq = MAX_TXQ;
            self.whole.drop += u64::from(drop);
            if self.iter_idx > WARMUP_ITER {
                self.settled.drop += u64::from(drop);
            }
        }

        // whatever the allocated cells cannot carry stays queued
        self.txq -= self.frame.offer_traffic(self.txq);

        let mut record = self.schedfun.apply(
            self.iter_idx,
            &mut self.frame,
            traffic,
            drop,
            self.txq,
            self.old_txq,
        );
        let decision = record
            .decision()
            .ok_or(EngineError::MissingDecision { iter: self.iter_idx })?;
        if decision != 0 {
            debug!(iter = self.iter_idx, decision, "submitting 6P request");
            self.frame.allocate(decision);
        }

        let avgtraf = self.whole.traffic as f64 / (self.iter_idx + 1) as f64;
        let errtraf = avgtraf - f64::from(self.frame.allocated());
        record.insert("iter", self.iter_idx);
        record.insert("traffic", traffic);
        record.insert("tottraf", self.whole.traffic);
        record.insert("totdrop", self.whole.drop);
        record.insert("totsixp", self.frame.total_requests());
        record.insert("avgtraf", avgtraf);
        record.insert("errtraf", errtraf);
        record.insert("drop", drop);
        record.insert("txq_old", self.old_txq);
        record.insert("txq_new", self.txq);
        record.insert("cells", self.frame.allocated());
        record.insert("cells_used", self.frame.used());
        record.insert("cells_unused", self.frame.unused());
        record.insert("sixp", self.frame.pending_requests());

        self.whole.cells += u64::from(self.frame.allocated());
        self.whole.unused_cells += u64::from(self.frame.unused());
        self.whole.used_cells += u64::from(self.frame.used());
        if self.iter_idx > WARMUP_ITER {
            self.settled.cells += u64::from(self.frame.allocated());
            self.settled.unused_cells += u64::from(self.frame.unused());
            self.settled.used_cells += u64::from(self.frame.used());
        } else if self.iter_idx == WARMUP_ITER {
            // baseline for the settled-window request count
            self.sixp_at_warmup = self.frame.total_requests();
        }

        self.reporter.record(&record)?;
        self.iter_idx += 1;
        Ok(Some(record))
    }

    /// Drives [`Simulation::step`] to termination and returns the final
    /// statistics. Never returns on an unbounded run.
    pub fn run(&mut self) -> Result<RunStats, EngineError> {
        while self.step()?.is_some() {}
        Ok(self.stats())
    }

    /// Current statistics snapshot; request totals are read live from the
    /// slotframe.
    pub fn stats(&self) -> RunStats {
        let mut whole = self.whole;
        let mut settled = self.settled;
        whole.sixp = self.frame.total_requests();
        settled.sixp = whole.sixp - self.sixp_at_warmup;
        RunStats { whole, settled }
    }

    pub fn frame(&self) -> &Slotframe {
        &self.frame
    }

    /// Queue depth after the most recent step.
    pub fn txq(&self) -> u32 {
        self.txq
    }

    /// Next iteration index to run.
    pub fn iter_idx(&self) -> u64 {
        self.iter_idx
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SimState::Stopped
    }
}
