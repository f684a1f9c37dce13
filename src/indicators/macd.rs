// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(fast) - EMA(slow)
//   Signal    = EMA(MACD, signal)
//   Histogram = MACD - Signal
//
// With the engine's first-value-seeded EMA every component is defined from
// index 0. Defaults: fast = 12, slow = 26, signal = 9.

use super::ma::ema;

/// MACD line, signal line and histogram, each aligned with `closes`.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Compute the MACD triple for `closes`.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_n: usize) -> MacdSeries {
    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // The MACD line is fully defined whenever the input is non-empty, so the
    // signal EMA can run over the raw values directly.
    let line_values: Vec<f64> = line.iter().map(|v| v.unwrap_or(0.0)).collect();
    let signal = ema(&line_values, signal_n);

    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        macd: line,
        signal,
        histogram,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_defined_from_day_one() {
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let m = macd(&closes, 12, 26, 9);
        assert_eq!(m.macd.len(), 40);
        assert!(m.macd.iter().all(|v| v.is_some()));
        assert!(m.signal.iter().all(|v| v.is_some()));
        assert!(m.histogram.iter().all(|v| v.is_some()));
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let closes = vec![100.0; 60];
        let m = macd(&closes, 12, 26, 9);
        for ((macd, signal), hist) in m
            .macd
            .iter()
            .zip(m.signal.iter())
            .zip(m.histogram.iter())
        {
            assert!(macd.unwrap().abs() < 1e-10);
            assert!(signal.unwrap().abs() < 1e-10);
            assert!(hist.unwrap().abs() < 1e-10);
        }
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let m = macd(&closes, 12, 26, 9);
        for i in 0..closes.len() {
            let expected = m.macd[i].unwrap() - m.signal[i].unwrap();
            assert!((m.histogram[i].unwrap() - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn macd_positive_in_uptrend() {
        // In a sustained uptrend the fast EMA sits above the slow EMA.
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let m = macd(&closes, 12, 26, 9);
        assert!(m.macd.last().unwrap().unwrap() > 0.0);
    }

    #[test]
    fn macd_empty_input() {
        let m = macd(&[], 12, 26, 9);
        assert!(m.macd.is_empty());
        assert!(m.signal.is_empty());
        assert!(m.histogram.is_empty());
    }
}
