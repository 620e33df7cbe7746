// Numan Thabit 2026
// sf/mod.rs - scheduling function contract and per-step records

use std::fmt;

use ahash::AHashMap;

use crate::frame::Slotframe;

pub mod delta_q;
pub mod dual_budget;
pub mod ewma;
pub mod ewmm;
pub mod fixed;
pub mod msf;
pub mod txq_budget;

/// Key under which every scheduling function must report its decision.
pub const DECISION_KEY: &str = "decision";

/// Numeric value carried in a per-step record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    /// Returns the integer payload, or `None` for floats.
    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(value),
            Value::Float(_) => None,
        }
    }

    /// Returns the value widened to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(value) => value as f64,
            Value::Float(value) => value,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// Per-step diagnostics mapping. A scheduling function seeds it with its own
/// metrics and the engine merges the simulation metrics in before reporting.
#[derive(Debug, Clone, Default)]
pub struct Record {
    entries: AHashMap<&'static str, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: &'static str, value: impl Into<Value>) {
        self.entries.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).copied()
    }

    /// The decision entry required by the scheduling-function contract, when
    /// present and integer-typed.
    pub fn decision(&self) -> Option<i64> {
        self.get(DECISION_KEY).and_then(Value::as_int)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A cell-allocation control law, driven once per slotframe.
///
/// Implementations keep whatever filter state they need between calls; the
/// engine never inspects it. The returned record must contain an integer
/// [`DECISION_KEY`] entry: positive to allocate that many cells, negative to
/// deallocate, zero for no change. A record without one is a defect in the
/// implementation, not a runtime condition the engine recovers from.
pub trait SchedulingFunction {
    /// Diagnostic keys this function reports, in display order.
    fn schema(&self) -> &'static [&'static str];

    /// Decides the allocation change for the slotframe that just closed.
    ///
    /// `traffic` is the amount offered this step before drop accounting,
    /// `drop` the packets lost to the queue bound, `txq` the queue depth
    /// after sending and `old_txq` the depth at the previous step.
    fn apply(
        &mut self,
        iter: u64,
        frame: &mut Slotframe,
        traffic: u32,
        drop: u32,
        txq: u32,
        old_txq: u32,
    ) -> Record;
}
