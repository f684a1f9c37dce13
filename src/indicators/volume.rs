// =============================================================================
// Volume indicators — rolling volume mean and volume ratio
// =============================================================================
//
// The volume (and turnover) moving average follows the min-periods-1 SMA
// policy. Volume ratio compares the current day's volume against that mean:
//
//   ratio = volume / volume_ma(n)
//
// A zero mean (an entirely untraded window) makes the ratio undefined.

use super::ma::sma;

/// Rolling mean of `volumes` over `n` days, min-periods-1.
pub fn volume_sma(volumes: &[f64], n: usize) -> Vec<Option<f64>> {
    sma(volumes, n)
}

/// Current volume divided by its `n`-day rolling mean; undefined when the
/// mean is zero.
pub fn volume_ratio(volumes: &[f64], n: usize) -> Vec<Option<f64>> {
    let ma = volume_sma(volumes, n);

    volumes
        .iter()
        .zip(ma.iter())
        .map(|(&v, m)| match m {
            Some(m) if *m != 0.0 => Some(v / m),
            _ => None,
        })
        .collect()
}
