// =============================================================================
// Momentum & volatility — price change, rolling volatility, rolling drawdown
// =============================================================================
//
//   price_change_pct(k) = (close_t / close_{t-k} - 1) * 100
//   volatility(n)       = stddev(daily returns, n) * sqrt(252)   (annualised)
//   max_drawdown(n)     = rolling min of (close - rolling_max(n)) / rolling_max(n)
//
// The drawdown columns use min-periods-1 rolling extrema so a value exists
// from day one; volatility needs a full window of returns.

use super::ma::rolling_std;

/// Trading days per year, used to annualise daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Percentage change over `k` bars; the first `k` entries are undefined, as
/// is any entry whose reference close is zero.
pub fn price_change_pct(closes: &[f64], k: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if k == 0 {
        return result;
    }

    for t in k..closes.len() {
        let prev = closes[t - k];
        if prev != 0.0 {
            result[t] = Some((closes[t] / prev - 1.0) * 100.0);
        }
    }

    result
}

/// Simple daily returns of `closes`; entry `i` is the return into bar
/// `i + 1`, so the output is one shorter than the input.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Annualised rolling volatility of daily returns over `n` days, aligned
/// with `closes`. Undefined until `n` returns have accumulated.
pub fn rolling_volatility(closes: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if closes.len() < 2 {
        return result;
    }

    let returns = daily_returns(closes);
    let std = rolling_std(&returns, n);

    // returns[i] belongs to bar i + 1.
    for (i, sd) in std.into_iter().enumerate() {
        if let Some(sd) = sd {
            result[i + 1] = Some(sd * TRADING_DAYS_PER_YEAR.sqrt());
        }
    }

    result
}

/// Rolling maximum drawdown over `n` days, min-periods-1: the worst
/// peak-to-current decline within the trailing window, as a non-positive
/// fraction. Defined from day one.
pub fn rolling_max_drawdown(closes: &[f64], n: usize) -> Vec<Option<f64>> {
    let len = closes.len();
    let mut result = vec![None; len];
    if n == 0 || len == 0 {
        return result;
    }

    // Drawdown of each bar against the trailing n-day high.
    let mut drawdown = Vec::with_capacity(len);
    for t in 0..len {
        let start = t + 1 - (t + 1).min(n);
        let peak = closes[start..=t].iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        drawdown.push(if peak != 0.0 {
            (closes[t] - peak) / peak
        } else {
            0.0
        });
    }

    // Rolling minimum of the drawdown series, min-periods-1.
    for t in 0..len {
        let start = t + 1 - (t + 1).min(n);
        let worst = drawdown[start..=t].iter().fold(f64::INFINITY, |a, &b| a.min(b));
        result[t] = Some(worst);
    }

    result
}
