// =============================================================================
// Engine configuration
// =============================================================================
//
// The core consumes exactly two externally configurable parameters: the cache
// TTL in hours (`CACHE_EXPIRE_HOURS` in the environment) and the set of named
// lookback windows. Everything else carries a serde default so that a config
// embedded in a larger application file keeps deserialising as fields are
// added.

use serde::{Deserialize, Serialize};
use tracing::warn;

fn default_cache_expire_hours() -> i64 {
    6
}

fn default_benchmark_annual_return() -> f64 {
    0.02
}

fn default_risk_window_days() -> i64 {
    180
}

fn default_time_windows() -> Vec<TimeWindow> {
    [
        ("T-0", 0),
        ("T-3", 3),
        ("T-7", 7),
        ("T-30", 30),
        ("T-90", 90),
        ("T-180", 180),
    ]
    .iter()
    .map(|&(name, days)| TimeWindow {
        name: name.to_string(),
        days,
    })
    .collect()
}

/// One named lookback window, e.g. `T-30` = the trailing 30 calendar days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub name: String,
    pub days: i64,
}

/// Configuration for the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Cache entry time-to-live in hours.
    #[serde(default = "default_cache_expire_hours")]
    pub cache_expire_hours: i64,

    /// Named lookback windows processed per entity, in order.
    #[serde(default = "default_time_windows")]
    pub time_windows: Vec<TimeWindow>,

    /// Benchmark annual rate used for excess-return calculations (0.02 = 2 %).
    #[serde(default = "default_benchmark_annual_return")]
    pub benchmark_annual_return: f64,

    /// Lookback used for the per-entity risk summary.
    #[serde(default = "default_risk_window_days")]
    pub risk_window_days: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cache_expire_hours: default_cache_expire_hours(),
            time_windows: default_time_windows(),
            benchmark_annual_return: default_benchmark_annual_return(),
            risk_window_days: default_risk_window_days(),
        }
    }
}

impl AnalysisConfig {
    /// Build a config from defaults, honouring the `CACHE_EXPIRE_HOURS`
    /// environment variable when present.
    ///
    /// An unparseable value is logged and ignored rather than failing
    /// startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("CACHE_EXPIRE_HOURS") {
            match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => config.cache_expire_hours = hours,
                _ => warn!(%raw, "ignoring invalid CACHE_EXPIRE_HOURS"),
            }
        }

        config
    }
}
