// =============================================================================
// Moving Averages — SMA, EMA and the rolling standard deviation
// =============================================================================
//
// SMA here follows the engine's min-periods-1 policy: the first `n - 1`
// entries average however many values exist so far instead of being marked
// undefined, so a value is available from day one. Table rendering upstream
// depends on this; the policy applies to simple means only and must NOT be
// generalised to the other indicators.
//
// EMA uses the smoothing factor 2 / (n + 1) and is seeded with the series'
// first value, i.e. exponential weighting from the start rather than an SMA
// seed.

/// Simple moving average over the trailing `n` values, min-periods-1.
///
/// Every entry is defined for a non-empty input: entry `i` is the mean of
/// the last `min(n, i + 1)` values.
pub fn sma(values: &[f64], n: usize) -> Vec<Option<f64>> {
    if n == 0 {
        return vec![None; values.len()];
    }

    let mut result = Vec::with_capacity(values.len());
    let mut running_sum = 0.0;

    for i in 0..values.len() {
        running_sum += values[i];
        if i >= n {
            running_sum -= values[i - n];
        }
        let count = (i + 1).min(n) as f64;
        result.push(Some(running_sum / count));
    }

    result
}

/// Exponential moving average with alpha `2 / (n + 1)`, seeded by the first
/// value. Defined from index 0.
pub fn ema(values: &[f64], n: usize) -> Vec<Option<f64>> {
    if n == 0 || values.is_empty() {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (n as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());

    let mut prev = values[0];
    result.push(Some(prev));
    for &v in &values[1..] {
        prev = v * alpha + prev * (1.0 - alpha);
        result.push(Some(prev));
    }

    result
}

/// Rolling sample standard deviation (ddof = 1) over a full `n`-value
/// window. The first `n - 1` entries are undefined; `n < 2` yields an
/// all-undefined series (a single observation has no sample deviation).
pub fn rolling_std(values: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if n < 2 {
        return result;
    }

    for i in (n - 1)..values.len() {
        let window = &values[i + 1 - n..=i];
        let mean = window.iter().sum::<f64>() / n as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
        result[i] = Some(var.sqrt());
    }

    result
}
