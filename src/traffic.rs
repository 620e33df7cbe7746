// Numan Thabit 2026
// traffic.rs - per-slotframe traffic sources

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ConfigError;

/// Produces the packet count arriving at each slotframe. Sources are driven
/// by iteration index, so replaying a run replays the exact same sequence.
pub trait TrafficSource {
    fn traffic_at(&mut self, iter: u64) -> u32;
}

/// A finite sequence of packet counts replayed cyclically.
#[derive(Debug, Clone)]
pub struct Pattern {
    values: Vec<u32>,
}

impl Pattern {
    /// Wraps a pattern; at least one value is required.
    pub fn new(values: Vec<u32>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::Validation(
                "traffic pattern must not be empty".into(),
            ));
        }
        Ok(Self { values })
    }

    /// The same packet count at every slotframe.
    pub fn constant(value: u32) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// A flat warm-up of `base` followed by a truncated cosine profile,
    /// `base + amplitude * cos(2πi / period)` per slotframe.
    pub fn sinusoid(
        base: u32,
        amplitude: u32,
        period: u64,
        warmup: u64,
        len: u64,
    ) -> Result<Self, ConfigError> {
        if period == 0 {
            return Err(ConfigError::Validation(
                "sinusoid period must be non-zero".into(),
            ));
        }
        let mut values = Vec::with_capacity(len as usize);
        for _ in 0..len.min(warmup) {
            values.push(base);
        }
        for i in warmup..len {
            let phase = TAU * i as f64 / period as f64;
            let value = f64::from(base) + f64::from(amplitude) * phase.cos();
            values.push((value as i64).max(0) as u32);
        }
        Self::new(values)
    }

    /// Uniform draws in `0..=max`, fixed by `seed` so runs are repeatable.
    pub fn random(len: usize, max: u32, seed: u64) -> Result<Self, ConfigError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let values = (0..len).map(|_| rng.gen_range(0..=max)).collect();
        Self::new(values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TrafficSource for Pattern {
    fn traffic_at(&mut self, iter: u64) -> u32 {
        self.values[(iter % self.values.len() as u64) as usize]
    }
}
