//! Forecast configuration
//!
//! Model order and horizon are always supplied by the caller. The two
//! historical forecast contexts disagree on the order (ARIMA(1,1,1) for the
//! full dataset, ARIMA(5,1,0) for a filtered subset), so both are offered
//! as named presets rather than baked into the engine.
//!
//! Settings can be read from a TOML file:
//!
//! ```toml
//! [forecast]
//! order = [1, 1, 1]
//! horizon = 5
//! gap_policy = "zero_fill"
//! confidence_level = 0.95
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// ARIMA order `(p, d, q)`
///
/// Serialized as a `[p, d, q]` array; deserialization goes through
/// [`ArimaOrder::new`] so the component limits always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i64; 3]", into = "[i64; 3]")]
pub struct ArimaOrder {
    /// Autoregressive order
    p: usize,
    /// Differencing order
    d: usize,
    /// Moving-average order
    q: usize,
}

impl ArimaOrder {
    /// Largest supported AR order
    pub const MAX_P: usize = 10;
    /// Largest supported differencing order
    pub const MAX_D: usize = 2;
    /// Largest supported MA order
    pub const MAX_Q: usize = 10;

    /// Order used when forecasting the full, unfiltered dataset
    pub const FULL_DATASET: ArimaOrder = ArimaOrder { p: 1, d: 1, q: 1 };

    /// Order used when forecasting a filtered subset
    pub const FILTERED_SUBSET: ArimaOrder = ArimaOrder { p: 5, d: 1, q: 0 };

    /// Create a validated order
    ///
    /// Components are taken as signed integers so that negative values read
    /// from user input are reported instead of wrapping.
    pub fn new(p: i64, d: i64, q: i64) -> Result<Self> {
        let p = Self::component("p", p, Self::MAX_P)?;
        let d = Self::component("d", d, Self::MAX_D)?;
        let q = Self::component("q", q, Self::MAX_Q)?;
        Ok(Self { p, d, q })
    }

    fn component(name: &str, value: i64, max: usize) -> Result<usize> {
        if value < 0 {
            return Err(ForecastError::Configuration(format!(
                "Order component {} must not be negative, got {}",
                name, value
            )));
        }
        let value = value as usize;
        if value > max {
            return Err(ForecastError::Configuration(format!(
                "Order component {} must be at most {}, got {}",
                name, max, value
            )));
        }
        Ok(value)
    }

    /// AR order
    pub fn p(&self) -> usize {
        self.p
    }

    /// Differencing order
    pub fn d(&self) -> usize {
        self.d
    }

    /// MA order
    pub fn q(&self) -> usize {
        self.q
    }

    /// A mean is estimated only for undifferenced models
    pub fn includes_constant(&self) -> bool {
        self.d == 0
    }

    /// Number of estimated mean-equation parameters
    pub fn parameter_count(&self) -> usize {
        self.p + self.q + usize::from(self.includes_constant())
    }

    /// Shortest series a fit is attempted on
    pub fn min_observations(&self) -> usize {
        self.d + self.parameter_count() + 1
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::FULL_DATASET
    }
}

impl TryFrom<[i64; 3]> for ArimaOrder {
    type Error = ForecastError;

    fn try_from([p, d, q]: [i64; 3]) -> Result<Self> {
        Self::new(p, d, q)
    }
}

impl From<ArimaOrder> for [i64; 3] {
    fn from(order: ArimaOrder) -> Self {
        [order.p as i64, order.d as i64, order.q as i64]
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = ForecastError;

    /// Parse `"p,d,q"`, optionally wrapped in parentheses
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts = trimmed
            .split(',')
            .map(|part| {
                part.trim().parse::<i64>().map_err(|e| {
                    ForecastError::Configuration(format!(
                        "Invalid order component '{}': {}",
                        part.trim(),
                        e
                    ))
                })
            })
            .collect::<Result<Vec<i64>>>()?;

        match parts.as_slice() {
            [p, d, q] => Self::new(*p, *d, *q),
            _ => Err(ForecastError::Configuration(format!(
                "Order must have three components p,d,q, got '{}'",
                s
            ))),
        }
    }
}

/// How a series with missing years is handled before fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Reindex to contiguous years, missing years count zero
    #[default]
    ZeroFill,
    /// Refuse to fit a gapped series
    Reject,
    /// Fit on the positional index and report the missing years
    Positional,
}

impl FromStr for GapPolicy {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "zero_fill" | "zerofill" | "fill" => Ok(GapPolicy::ZeroFill),
            "reject" => Ok(GapPolicy::Reject),
            "positional" => Ok(GapPolicy::Positional),
            other => Err(ForecastError::Configuration(format!(
                "Unknown gap policy '{}', expected zero_fill, reject or positional",
                other
            ))),
        }
    }
}

/// Raw, unvalidated settings as they appear in a configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub order: [i64; 3],
    pub horizon: i64,
    pub gap_policy: GapPolicy,
    pub confidence_level: Option<f64>,
    pub max_iterations: i64,
    pub tolerance: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            order: [1, 1, 1],
            horizon: ForecastConfig::DEFAULT_HORIZON as i64,
            gap_policy: GapPolicy::default(),
            confidence_level: None,
            max_iterations: ForecastConfig::DEFAULT_MAX_ITERATIONS as i64,
            tolerance: ForecastConfig::DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    forecast: ForecastSettings,
}

/// Validated forecast configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    order: ArimaOrder,
    horizon: usize,
    gap_policy: GapPolicy,
    confidence_level: Option<f64>,
    max_iterations: usize,
    tolerance: f64,
}

impl ForecastConfig {
    /// Number of future years forecast by default
    pub const DEFAULT_HORIZON: usize = 5;
    /// Default optimizer iteration cap
    pub const DEFAULT_MAX_ITERATIONS: usize = 2000;
    /// Default optimizer convergence tolerance
    pub const DEFAULT_TOLERANCE: f64 = 1e-8;

    /// Create a configuration for an order and horizon
    pub fn new(order: ArimaOrder, horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::Configuration(
                "Forecast horizon must be positive".to_string(),
            ));
        }

        Ok(Self {
            order,
            horizon,
            gap_policy: GapPolicy::default(),
            confidence_level: None,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
        })
    }

    /// Set the gap policy
    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    /// Request confidence bounds at the given level, e.g. `0.95`
    pub fn with_confidence_level(mut self, level: f64) -> Result<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::Configuration(format!(
                "Confidence level must be between 0 and 1, got {}",
                level
            )));
        }
        self.confidence_level = Some(level);
        Ok(self)
    }

    /// Set the optimizer iteration cap and convergence tolerance
    pub fn with_optimizer(mut self, max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(ForecastError::Configuration(
                "Iteration limit must be positive".to_string(),
            ));
        }
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(ForecastError::Configuration(format!(
                "Tolerance must be a positive number, got {}",
                tolerance
            )));
        }
        self.max_iterations = max_iterations;
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Parse the `[forecast]` table of a TOML document
    ///
    /// Missing keys fall back to the defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Self::try_from(file.forecast)
    }

    /// Read a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn gap_policy(&self) -> GapPolicy {
        self.gap_policy
    }

    pub fn confidence_level(&self) -> Option<f64> {
        self.confidence_level
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Raw settings equivalent to this configuration
    pub fn to_settings(&self) -> ForecastSettings {
        ForecastSettings {
            order: self.order.into(),
            horizon: self.horizon as i64,
            gap_policy: self.gap_policy,
            confidence_level: self.confidence_level,
            max_iterations: self.max_iterations as i64,
            tolerance: self.tolerance,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            horizon: Self::DEFAULT_HORIZON,
            gap_policy: GapPolicy::default(),
            confidence_level: None,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }
}

impl TryFrom<ForecastSettings> for ForecastConfig {
    type Error = ForecastError;

    fn try_from(settings: ForecastSettings) -> Result<Self> {
        let order = ArimaOrder::try_from(settings.order)?;

        if settings.horizon <= 0 {
            return Err(ForecastError::Configuration(format!(
                "Forecast horizon must be positive, got {}",
                settings.horizon
            )));
        }
        if settings.max_iterations <= 0 {
            return Err(ForecastError::Configuration(format!(
                "Iteration limit must be positive, got {}",
                settings.max_iterations
            )));
        }

        let mut config = ForecastConfig::new(order, settings.horizon as usize)?
            .with_gap_policy(settings.gap_policy)
            .with_optimizer(settings.max_iterations as usize, settings.tolerance)?;

        if let Some(level) = settings.confidence_level {
            config = config.with_confidence_level(level)?;
        }

        Ok(config)
    }
}
