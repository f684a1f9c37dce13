// =============================================================================
// Risk Metrics Calculator — single-shot risk summary for one bar series
// =============================================================================
//
// Derives the full scalar battery from daily close-to-close returns:
//
//   volatility    = stddev(returns) * sqrt(252)
//   annual_return = mean(returns) * 252
//   sharpe_ratio  = mean(excess) / stddev(excess) * sqrt(252)
//   max_drawdown  = min((cumprod(1 + r) - running_max) / running_max)
//   calmar_ratio  = |annual_return / max_drawdown|, 0 when drawdown is 0
//   var_95        = 5th percentile of the return distribution
//   skewness      = third standardised moment
//   kurtosis      = fourth standardised moment, excess (normal = 0)
//   win_rate      = fraction of positive-return days
//
// Every ratio is guarded so that a series of at least two bars always yields
// finite fields. Fewer than two bars is insufficient data and yields no
// summary at all — callers must not confuse that with a summary of zeros.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::indicators::momentum::{daily_returns, TRADING_DAYS_PER_YEAR};
use crate::series::BarSeries;

/// Scalar risk statistics for one bar series slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub volatility: f64,
    pub annual_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub var_95: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub total_trading_days: usize,
    pub positive_days: usize,
    pub negative_days: usize,
    pub win_rate: f64,
}

/// Compute the risk summary for `series` against a benchmark annual rate
/// (0.02 = 2 %).
///
/// Returns `None` (with a warning) for fewer than two bars.
pub fn compute_risk_metrics(series: &BarSeries, benchmark_annual: f64) -> Option<RiskSummary> {
    if series.len() < 2 {
        warn!(
            code = %series.code,
            bars = series.len(),
            "insufficient data for risk metrics (need at least 2 bars)"
        );
        return None;
    }

    let closes = series.closes();
    let returns = daily_returns(&closes);

    let volatility = std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
    let annual_return = mean(&returns) * TRADING_DAYS_PER_YEAR;

    let daily_benchmark = benchmark_annual / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_benchmark).collect();
    let excess_std = std_dev(&excess);
    let sharpe_ratio = if excess_std != 0.0 {
        mean(&excess) / excess_std * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let max_drawdown = cumulative_max_drawdown(&returns);
    let calmar_ratio = if max_drawdown != 0.0 {
        (annual_return / max_drawdown).abs()
    } else {
        0.0
    };

    let var_95 = percentile(&returns, 5.0);

    let positive_days = returns.iter().filter(|r| **r > 0.0).count();
    let negative_days = returns.iter().filter(|r| **r < 0.0).count();
    let win_rate = positive_days as f64 / returns.len() as f64;

    let summary = RiskSummary {
        volatility,
        annual_return,
        sharpe_ratio,
        max_drawdown,
        calmar_ratio,
        var_95,
        skewness: skewness(&returns),
        kurtosis: excess_kurtosis(&returns),
        total_trading_days: returns.len(),
        positive_days,
        negative_days,
        win_rate,
    };

    debug!(
        code = %series.code,
        trading_days = summary.total_trading_days,
        volatility = summary.volatility,
        sharpe = summary.sharpe_ratio,
        "risk metrics computed"
    );

    Some(summary)
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof 1); 0 when fewer than two observations.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    var.sqrt()
}

/// Worst peak-to-trough decline of the cumulative return curve, as a
/// non-positive fraction.
fn cumulative_max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut running_max = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > running_max {
            running_max = cumulative;
        }
        if running_max > 0.0 {
            let dd = (cumulative - running_max) / running_max;
            if dd < worst {
                worst = dd;
            }
        }
    }

    worst
}

/// Percentile with linear interpolation between order statistics.
fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = pct / 100.0 * (sorted.len() as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let weight = rank - lo as f64;
    sorted[lo] * (1.0 - weight) + sorted[hi] * weight
}

/// Third standardised moment; 0 for a degenerate (constant) sample.
fn skewness(values: &[f64]) -> f64 {
    let sd = population_std(values);
    if sd < 1e-15 {
        return 0.0;
    }
    let m = mean(values);
    values
        .iter()
        .map(|v| ((v - m) / sd).powi(3))
        .sum::<f64>()
        / values.len() as f64
}

/// Fourth standardised moment minus 3 (excess kurtosis); 0 for a degenerate
/// sample.
fn excess_kurtosis(values: &[f64]) -> f64 {
    let sd = population_std(values);
    if sd < 1e-15 {
        return 0.0;
    }
    let m = mean(values);
    let m4 = values
        .iter()
        .map(|v| ((v - m) / sd).powi(4))
        .sum::<f64>()
        / values.len() as f64;
    m4 - 3.0
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
