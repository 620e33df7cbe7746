// Numan Thabit 2026
// config.rs - run and controller parameter schema

use std::{
    env, fmt, fs,
    io::{self, Read},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;

/// Error returned while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when reading a configuration file from disk.
    #[error("failed to read config '{path}': {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Source IO error.
        #[source]
        source: io::Error,
    },
    /// Error when parsing the configuration contents.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration did not pass validation checks.
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Simulation configuration loaded at startup.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Run-level knobs shared by every controller.
    pub run: RunParams,
    /// Instantaneous delta-Q controller parameters.
    pub delta_q: DeltaQParams,
    /// EWMA-filtered delta-Q controller parameters.
    pub ewma: EwmaParams,
    /// EWMM (decaying-envelope) controller parameters.
    pub ewmm: EwmmParams,
    /// Combined cells+TxQ budget controller parameters.
    pub txq_budget: TxqBudgetParams,
    /// Dual-budget controller parameters.
    pub dual_budget: DualBudgetParams,
    /// Legacy MSF usage-threshold controller parameters.
    pub msf: MsfParams,
}

impl Config {
    /// Loads configuration from `NUMICELL_CONFIG` if set, otherwise returns
    /// defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("NUMICELL_CONFIG") {
            Ok(path) => Self::from_path(path),
            Err(_missing) => {
                let cfg = Self::default();
                cfg.validate()?;
                Ok(cfg)
            }
        }
    }

    /// Loads a configuration file from the provided path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads configuration from any reader implementing [`Read`].
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ConfigError> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|source| ConfigError::Io {
                path: PathBuf::from("<reader>"),
                source,
            })?;
        Self::from_toml_str(&buf)
    }

    /// Loads configuration from a TOML string slice.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        <Self as FromStr>::from_str(input)
    }

    /// Validates the configuration, returning an error when constraints are
    /// violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ewma.validate().map_err(ConfigError::Validation)?;
        self.ewmm.validate().map_err(ConfigError::Validation)?;
        self.txq_budget.validate().map_err(ConfigError::Validation)?;
        self.dual_budget.validate().map_err(ConfigError::Validation)?;
        self.msf.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn check_alpha(name: &str, alpha: f64) -> Result<(), String> {
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(())
    } else {
        Err(format!("{name} must lie in (0, 1], got {alpha}"))
    }
}

/// Run-level knobs shared by every controller.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RunParams {
    /// Step-end calls between submitting a 6P request and its effect.
    pub sixp_delay: u32,
    /// Last iteration index to simulate, inclusive. `None` runs unbounded.
    pub max_iter: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            sixp_delay: 2,
            max_iter: None,
        }
    }
}

impl fmt::Display for RunParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_iter {
            Some(max) => write!(f, "delay={} max_iter={max}", self.sixp_delay),
            None => write!(f, "delay={} unbounded", self.sixp_delay),
        }
    }
}

/// Parameters for the instantaneous delta-Q controller.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DeltaQParams {
    /// Unused cells tolerated before deallocating.
    pub overprovision: u32,
}

impl Default for DeltaQParams {
    fn default() -> Self {
        Self { overprovision: 1 }
    }
}

/// Parameters for the EWMA-filtered delta-Q controller.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EwmaParams {
    /// Smoothing factor applied to both the delta-Q and unused-cell averages.
    pub alpha: f64,
    /// Unused cells tolerated before deallocating.
    pub overprovision: u32,
}

impl Default for EwmaParams {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            overprovision: 1,
        }
    }
}

impl EwmaParams {
    /// Ensures invariants for the parameters hold.
    pub fn validate(&self) -> Result<(), String> {
        check_alpha("ewma.alpha", self.alpha)
    }
}

/// Parameters for the EWMM decaying-envelope controller.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EwmmParams {
    /// Smoothing factor for the delta-Q average.
    pub alpha0: f64,
    /// Smoothing factor for the unused-cell average and envelope.
    pub alpha1: f64,
    /// Unused cells tolerated before deallocating.
    pub overprovision: u32,
}

impl Default for EwmmParams {
    fn default() -> Self {
        Self {
            alpha0: 0.01,
            alpha1: 0.005,
            overprovision: 1,
        }
    }
}

impl EwmmParams {
    /// Ensures invariants for the parameters hold.
    pub fn validate(&self) -> Result<(), String> {
        check_alpha("ewmm.alpha0", self.alpha0)?;
        check_alpha("ewmm.alpha1", self.alpha1)
    }
}

/// Parameters for the combined cells+TxQ budget controller.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TxqBudgetParams {
    /// Smoothing factor for the delta-Q average.
    pub alpha0: f64,
    /// Per-step decay of the minimum-budget envelope.
    pub alpha1: f64,
    /// Combined budget (unused cells + queue headroom) tolerated before
    /// deallocating.
    pub overprovision: u32,
}

impl Default for TxqBudgetParams {
    fn default() -> Self {
        Self {
            alpha0: 0.01,
            alpha1: 0.005,
            overprovision: 1,
        }
    }
}

impl TxqBudgetParams {
    /// Ensures invariants for the parameters hold.
    pub fn validate(&self) -> Result<(), String> {
        check_alpha("txq_budget.alpha0", self.alpha0)?;
        check_alpha("txq_budget.alpha1", self.alpha1)
    }
}

/// Parameters for the dual-budget controller.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DualBudgetParams {
    /// Smoothing factor for the delta-Q average.
    pub alpha0: f64,
    /// Per-step decay of both minimum envelopes.
    pub alpha1: f64,
    /// Unused cells tolerated before deallocating.
    pub overprovision_cells: u32,
    /// Queue headroom tolerated before deallocating.
    pub overprovision_txq: u32,
}

impl Default for DualBudgetParams {
    fn default() -> Self {
        Self {
            alpha0: 0.01,
            alpha1: 0.005,
            overprovision_cells: 1,
            // floor(0.7 * MAX_TXQ)
            overprovision_txq: 7,
        }
    }
}

impl DualBudgetParams {
    /// Ensures invariants for the parameters hold.
    pub fn validate(&self) -> Result<(), String> {
        check_alpha("dual_budget.alpha0", self.alpha0)?;
        check_alpha("dual_budget.alpha1", self.alpha1)
    }
}

/// Parameters for the legacy MSF usage-threshold controller.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MsfParams {
    /// Usage ratio below which one cell is released.
    pub low: f64,
    /// Usage ratio above which one cell is requested.
    pub high: f64,
    /// Allocated-cell-steps accumulated before each usage evaluation.
    pub window: u32,
}

impl Default for MsfParams {
    fn default() -> Self {
        Self {
            low: 0.25,
            high: 0.75,
            window: 100,
        }
    }
}

impl MsfParams {
    /// Ensures invariants for the parameters hold.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.low) || !(0.0..=1.0).contains(&self.high) {
            return Err("msf thresholds must lie in [0, 1]".into());
        }
        if self.low >= self.high {
            return Err(format!(
                "msf.low must be < msf.high, got {} >= {}",
                self.low, self.high
            ));
        }
        if self.window == 0 {
            return Err("msf.window must be non-zero".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.run.sixp_delay, 2);
        assert_eq!(cfg.dual_budget.overprovision_txq, 7);
    }

    #[test]
    fn invalid_alpha_rejected() {
        let input = r#"
            [ewma]
            alpha = 0.0
        "#;

        let err = Config::from_toml_str(input).unwrap_err();
        match err {
            ConfigError::Validation(msg) => {
                assert!(msg.contains("ewma.alpha"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn alpha_above_one_rejected() {
        let input = r#"
            [dual_budget]
            alpha1 = 1.5
        "#;

        assert!(Config::from_toml_str(input).is_err());
    }

    #[test]
    fn inverted_msf_thresholds_rejected() {
        let input = r#"
            [msf]
            low = 0.8
            high = 0.2
        "#;

        assert!(Config::from_toml_str(input).is_err());
    }

    #[test]
    fn sections_override_independently() {
        let input = r#"
            [run]
            sixp_delay = 5
            max_iter = 86400

            [ewma]
            alpha = 0.1
        "#;

        let cfg = Config::from_toml_str(input).expect("config");
        assert_eq!(cfg.run.sixp_delay, 5);
        assert_eq!(cfg.run.max_iter, Some(86400));
        assert_eq!(cfg.ewma.alpha, 0.1);
        assert_eq!(cfg.ewma.overprovision, 1);
        assert_eq!(cfg.msf.window, 100);
    }
}
