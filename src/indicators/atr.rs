// =============================================================================
// Average True Range (ATR) — rolling mean of the True Range
// =============================================================================
//
// True Range for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// The first bar has no previous close, so its TR is simply H - L. ATR is the
// plain rolling mean of TR over `n` bars (not Wilder's smoothing), undefined
// through the warm-up. Default period: 14.

use crate::series::Bar;

/// ATR series aligned with `bars`; the first `n - 1` entries are undefined.
pub fn atr(bars: &[Bar], n: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; bars.len()];
    if n == 0 || bars.is_empty() {
        return result;
    }

    let mut tr = Vec::with_capacity(bars.len());
    tr.push(bars[0].high - bars[0].low);
    for i in 1..bars.len() {
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_close = bars[i - 1].close;

        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();
        tr.push(hl.max(hc).max(lc));
    }

    let mut running_sum = 0.0;
    for i in 0..tr.len() {
        running_sum += tr[i];
        if i >= n {
            running_sum -= tr[i - n];
        }
        if i + 1 >= n {
            result[i] = Some(running_sum / n as f64);
        }
    }

    result
}
