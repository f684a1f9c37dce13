// =============================================================================
// Time-Window Aggregator — named lookback windows over one bar series
// =============================================================================
//
// Slices a fully augmented series into the configured lookback windows
// (T-0 through T-180 by default) and assembles one result record per window.
//
// Window bounds are calendar-based: the nominal start is `latest - days`,
// extended backwards by `days / 5` to compensate for non-trading days
// (roughly one extra week per five business weeks). A series shorter than
// the window falls back to its most recent `min(days, len)` bars — a window
// over a non-empty series is never empty.
//
// Each window is computed independently; one window's failure is recorded
// and the remaining windows still run.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::TimeWindow;
use crate::error::AnalysisError;
use crate::indicators::{AugmentedSeries, LatestIndicators};
use crate::risk::{compute_risk_metrics, RiskSummary};

/// One fully computed lookback window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowResult {
    pub window_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub data_point_count: usize,
    pub latest_indicators: LatestIndicators,
    /// Absolute close-to-close change across the window; 0 for a
    /// single-bar window.
    pub price_change: f64,
    /// Percentage change across the window; 0 for a single-bar window or a
    /// zero opening close.
    pub price_change_pct: f64,
    /// Window-level risk summary; absent below two bars.
    pub risk_metrics: Option<RiskSummary>,
    /// Provenance tag carried through from the input series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

/// Per-window outcome: a result record, or the error that window hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindowOutcome {
    Ok(WindowResult),
    Err { error: String },
}

impl WindowOutcome {
    pub fn as_ok(&self) -> Option<&WindowResult> {
        match self {
            Self::Ok(result) => Some(result),
            Self::Err { .. } => None,
        }
    }
}

/// Sub-view of `augmented` covering the trailing `window_days` calendar
/// days, with the non-trading-day extension and the short-series fallback.
///
/// Returns `None` only when the series itself is empty.
pub fn slice_window(augmented: &AugmentedSeries, window_days: i64) -> Option<AugmentedSeries> {
    let latest = augmented.series.latest_date()?;
    let start = latest - Duration::days(window_days);
    // Extend by ~20% to cover weekends and holidays inside the window.
    let extended_start = start - Duration::days(window_days / 5);

    let len = augmented.series.len();
    let start_index = match augmented.series.first_index_on_or_after(extended_start) {
        Some(i) => i,
        None => {
            // Every bar predates the window: fall back to the most recent
            // min(window_days, len) bars, but never an empty slice.
            let count = (window_days.max(0) as usize).min(len).max(1);
            len - count
        }
    };

    Some(augmented.slice(start_index))
}

/// Compute one named window over an augmented series.
pub fn analyze_window(
    augmented: &AugmentedSeries,
    window: &TimeWindow,
    benchmark_annual: f64,
) -> Result<WindowResult, AnalysisError> {
    let slice = slice_window(augmented, window.days).ok_or(AnalysisError::InsufficientData {
        required: 1,
        available: 0,
    })?;

    let bars = slice.series.bars();
    let latest_indicators = slice.latest().ok_or(AnalysisError::InsufficientData {
        required: 1,
        available: 0,
    })?;

    let (price_change, price_change_pct) = if bars.len() > 1 {
        let first = bars[0].close;
        let last = bars[bars.len() - 1].close;
        let pct = if first != 0.0 {
            (last / first - 1.0) * 100.0
        } else {
            0.0
        };
        (last - first, pct)
    } else {
        (0.0, 0.0)
    };

    let risk_metrics = compute_risk_metrics(&slice.series, benchmark_annual);

    debug!(
        code = %slice.series.code,
        window = %window.name,
        bars = bars.len(),
        "window analysed"
    );

    Ok(WindowResult {
        window_name: window.name.clone(),
        start_date: bars[0].date,
        end_date: bars[bars.len() - 1].date,
        data_point_count: bars.len(),
        latest_indicators,
        price_change,
        price_change_pct,
        risk_metrics,
        data_source: slice.series.data_source.clone(),
    })
}

/// Compute every configured window, isolating failures per window.
pub fn analyze_windows(
    augmented: &AugmentedSeries,
    windows: &[TimeWindow],
    benchmark_annual: f64,
) -> BTreeMap<String, WindowOutcome> {
    let mut results = BTreeMap::new();

    for window in windows {
        match analyze_window(augmented, window, benchmark_annual) {
            Ok(result) => {
                results.insert(window.name.clone(), WindowOutcome::Ok(result));
            }
            Err(e) => {
                error!(
                    code = %augmented.series.code,
                    window = %window.name,
                    error = %e,
                    "window analysis failed"
                );
                results.insert(
                    window.name.clone(),
                    WindowOutcome::Err {
                        error: e.to_string(),
                    },
                );
            }
        }
    }

    results
}
