// Numan Thabit 2026
// report.rs - per-step output consumers

use std::io::{self, Write};

use crate::engine::RunStats;
use crate::sf::Record;

/// Engine metric columns, in display order. The pending-request count
/// (`sixp`) is carried in every record but not part of the column set.
pub const SIM_COLUMNS: [&str; 13] = [
    "iter",
    "traffic",
    "avgtraf",
    "errtraf",
    "tottraf",
    "totsixp",
    "totdrop",
    "drop",
    "txq_old",
    "txq_new",
    "cells",
    "cells_used",
    "cells_unused",
];

/// Receives the per-run output stream: one `start` with the active
/// scheduling function's schema, one `record` per step and one `end` with
/// the cumulative statistics.
pub trait Reporter {
    fn start(&mut self, schema: &'static [&'static str]) -> io::Result<()>;
    fn record(&mut self, record: &Record) -> io::Result<()>;
    fn end(&mut self, stats: &RunStats) -> io::Result<()>;
}

/// Discards everything. Used when only the final [`RunStats`] matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReport;

impl Reporter for NullReport {
    fn start(&mut self, _schema: &'static [&'static str]) -> io::Result<()> {
        Ok(())
    }

    fn record(&mut self, _record: &Record) -> io::Result<()> {
        Ok(())
    }

    fn end(&mut self, _stats: &RunStats) -> io::Result<()> {
        Ok(())
    }
}

/// Dumps every key of every record as `key=value` pairs, one line per step.
/// Keys print in a deterministic order: engine columns, then the function
/// schema, then anything else sorted by name.
#[derive(Debug)]
pub struct RawReport<W: Write> {
    out: W,
    schema: &'static [&'static str],
}

impl<W: Write> RawReport<W> {
    pub fn new(out: W) -> Self {
        Self { out, schema: &[] }
    }
}

impl<W: Write> Reporter for RawReport<W> {
    fn start(&mut self, schema: &'static [&'static str]) -> io::Result<()> {
        self.schema = schema;
        Ok(())
    }

    fn record(&mut self, record: &Record) -> io::Result<()> {
        let mut printed: Vec<&str> = Vec::with_capacity(record.len());
        for &key in SIM_COLUMNS.iter().chain(self.schema.iter()) {
            if printed.contains(&key) {
                continue;
            }
            if let Some(value) = record.get(key) {
                write!(self.out, "{key}={value} ")?;
                printed.push(key);
            }
        }

        let mut rest: Vec<&str> = record
            .keys()
            .filter(|key| !printed.contains(key))
            .collect();
        rest.sort_unstable();
        for key in rest {
            if let Some(value) = record.get(key) {
                write!(self.out, "{key}={value} ")?;
            }
        }
        writeln!(self.out)
    }

    fn end(&mut self, _stats: &RunStats) -> io::Result<()> {
        Ok(())
    }
}

/// Gnuplot-friendly aligned columns: a `# `-prefixed header naming the
/// engine columns followed by the function schema, one space-separated row
/// per step and a commented final report with the run statistics.
#[derive(Debug)]
pub struct ColumnReport<W: Write> {
    out: W,
    schema: &'static [&'static str],
}

impl<W: Write> ColumnReport<W> {
    pub fn new(out: W) -> Self {
        Self { out, schema: &[] }
    }
}

impl<W: Write> Reporter for ColumnReport<W> {
    fn start(&mut self, schema: &'static [&'static str]) -> io::Result<()> {
        self.schema = schema;
        write!(self.out, "#")?;
        for key in SIM_COLUMNS.iter().chain(self.schema.iter()) {
            write!(self.out, " {key}")?;
        }
        writeln!(self.out)
    }

    fn record(&mut self, record: &Record) -> io::Result<()> {
        for &key in SIM_COLUMNS.iter().chain(self.schema.iter()) {
            match record.get(key) {
                Some(value) => write!(self.out, "{value} ")?,
                None => write!(self.out, "- ")?,
            }
        }
        writeln!(self.out)
    }

    fn end(&mut self, stats: &RunStats) -> io::Result<()> {
        let whole = &stats.whole;
        let settled = &stats.settled;

        writeln!(self.out, "#")?;
        writeln!(self.out, "# Final report:")?;
        writeln!(self.out, "#   total_traffic     : {}", whole.traffic)?;
        writeln!(self.out, "#   total_sixp        : {}", whole.sixp)?;
        writeln!(self.out, "#   total_drop        : {}", whole.drop)?;
        writeln!(self.out, "#   total_cells       : {}", whole.cells)?;
        writeln!(self.out, "#   total_unused_cells: {}", whole.unused_cells)?;
        writeln!(self.out, "#   total_used_cells  : {}", whole.used_cells)?;
        writeln!(self.out, "#")?;
        writeln!(self.out, "#   pct_sixp          : {}", whole.pct_sixp())?;
        writeln!(self.out, "#   pct_drop          : {}", whole.pct_drop())?;
        writeln!(self.out, "#   pct_unused_cells  : {}", whole.pct_unused_cells())?;
        writeln!(self.out, "#   pct_used_cells    : {}", whole.pct_used_cells())?;
        writeln!(self.out, "#")?;
        writeln!(self.out, "#")?;
        writeln!(self.out, "#")?;
        writeln!(self.out, "# After t={}:", crate::engine::WARMUP_ITER)?;
        writeln!(self.out, "#   total_traffic     : {}", settled.traffic)?;
        writeln!(self.out, "#   total_sixp        : {}", settled.sixp)?;
        writeln!(self.out, "#   total_drop        : {}", settled.drop)?;
        writeln!(self.out, "#   total_cells       : {}", settled.cells)?;
        writeln!(self.out, "#   total_unused_cells: {}", settled.unused_cells)?;
        writeln!(self.out, "#   total_used_cells  : {}", settled.used_cells)?;
        writeln!(self.out, "#")?;
        writeln!(self.out, "#   pct_sixp          : {}", settled.pct_sixp())?;
        writeln!(self.out, "#   pct_drop          : {}", settled.pct_drop())?;
        writeln!(
            self.out,
            "#   pct_unused_cells  : {}",
            settled.pct_unused_cells()
        )?;
        writeln!(
            self.out,
            "#   pct_used_cells    : {}",
            settled.pct_used_cells()
        )
    }
}
