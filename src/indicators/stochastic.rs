// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
//   %K = 100 * (close - lowest_low_k) / (highest_high_k - lowest_low_k)
//   %D = SMA(%K, d)  over a full window of defined %K values
//
// Defaults: k = 14, d = 3. %K is undefined through the k-bar warm-up and
// whenever the k-bar range is zero (highest high equals lowest low); %D is
// undefined until d consecutive defined %K values exist.

/// %K and %D series aligned with the input bars.
#[derive(Debug, Clone)]
pub struct StochasticSeries {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

/// Compute the stochastic oscillator from parallel high/low/close slices.
///
/// The three slices must be the same length (they come from one bar series).
pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_window: usize,
    d_window: usize,
) -> StochasticSeries {
    let len = closes.len();
    let mut k_series = vec![None; len];
    let mut d_series = vec![None; len];

    if k_window == 0 || d_window == 0 || len < k_window {
        return StochasticSeries {
            k: k_series,
            d: d_series,
        };
    }

    for t in (k_window - 1)..len {
        let lo = lows[t + 1 - k_window..=t]
            .iter()
            .fold(f64::INFINITY, |a, &b| a.min(b));
        let hi = highs[t + 1 - k_window..=t]
            .iter()
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        if hi > lo {
            k_series[t] = Some(100.0 * (closes[t] - lo) / (hi - lo));
        }
    }

    // %D: plain mean over the last d_window %K values, all of which must be
    // defined.
    for t in (d_window - 1)..len {
        let window = &k_series[t + 1 - d_window..=t];
        if window.iter().all(|v| v.is_some()) {
            let sum: f64 = window.iter().flatten().sum();
            d_series[t] = Some(sum / d_window as f64);
        }
    }

    StochasticSeries {
        k: k_series,
        d: d_series,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn bars(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        (highs, lows)
    }

    #[test]
    fn k_and_d_always_in_range() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.9).sin() * 8.0).collect();
        let (highs, lows) = bars(&closes);
        let stoch = stochastic(&highs, &lows, &closes, 14, 3);
        for v in stoch.k.iter().chain(stoch.d.iter()).flatten() {
            assert!((0.0..=100.0).contains(v), "stochastic {v} out of range");
        }
    }

    #[test]
    fn warmup_undefined_then_defined() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let (highs, lows) = bars(&closes);
        let stoch = stochastic(&highs, &lows, &closes, 14, 3);
        assert!(stoch.k[..13].iter().all(|v| v.is_none()));
        assert!(stoch.k[13..].iter().all(|v| v.is_some()));
        // %D needs three defined %K values.
        assert!(stoch.d[..15].iter().all(|v| v.is_none()));
        assert!(stoch.d[15..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn close_at_window_high_gives_k_near_100() {
        // Strictly rising closes with a fixed band: the latest close sits at
        // the top of its own bar but below the window's highest high + 1, so
        // %K is high but bounded.
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let (highs, lows) = bars(&closes);
        let stoch = stochastic(&highs, &lows, &closes, 14, 3);
        let k = stoch.k.last().unwrap().unwrap();
        assert!(k > 80.0, "expected %K near the top, got {k}");
    }

    #[test]
    fn zero_range_window_is_undefined() {
        // Perfectly flat bars: highest high == lowest low, no defined %K.
        let closes = vec![100.0; 30];
        let highs = vec![100.0; 30];
        let lows = vec![100.0; 30];
        let stoch = stochastic(&highs, &lows, &closes, 14, 3);
        assert!(stoch.k.iter().all(|v| v.is_none()));
        assert!(stoch.d.iter().all(|v| v.is_none()));
    }

    #[test]
    fn zero_window_is_all_undefined() {
        let closes = vec![1.0, 2.0, 3.0];
        let (highs, lows) = bars(&closes);
        let stoch = stochastic(&highs, &lows, &closes, 0, 3);
        assert!(stoch.k.iter().all(|v| v.is_none()));
    }
}
