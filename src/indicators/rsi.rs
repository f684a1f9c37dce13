// =============================================================================
// Relative Strength Index (RSI) — simple rolling means
// =============================================================================
//
// This variant averages gains and losses with plain rolling means over the
// last `n` deltas (not Wilder's smoothing):
//
//   avg_gain_t = mean(max(delta, 0)  for the last n deltas)
//   avg_loss_t = mean(max(-delta, 0) for the last n deltas)
//   RS  = avg_gain / avg_loss
//   RSI = 100 - 100 / (1 + RS)
//
// Edge cases:
//   * avg_loss == 0 with avg_gain > 0  => RS is infinite, RSI saturates at 100
//   * avg_gain == avg_loss == 0        => no movement in the window, RSI is a
//     neutral 50 (an explicit decision; RS itself is 0/0)

/// Default lookback used by the indicator battery.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI series aligned with `closes`. The first `n` entries are undefined
/// (one delta is consumed per pair of closes, and a full window of `n`
/// deltas must accumulate).
pub fn rsi(closes: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if n == 0 || closes.len() <= n {
        return result;
    }

    // deltas[i] is the change into bar i + 1.
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    for t in n..closes.len() {
        let window = &deltas[t - n..t];
        let (sum_gain, sum_loss) = window.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });

        let avg_gain = sum_gain / n as f64;
        let avg_loss = sum_loss / n as f64;

        let value = if avg_loss == 0.0 && avg_gain == 0.0 {
            50.0 // Flat window — neutral.
        } else if avg_loss == 0.0 {
            100.0 // Only gains — saturate.
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };

        result[t] = Some(value);
    }

    result
}
