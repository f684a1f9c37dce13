// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band is the min-periods-1 SMA; the upper and lower bands need a
// full `n`-bar sample standard deviation, so they stay undefined through the
// warm-up:
//
//   upper = middle + k * sigma
//   lower = middle - k * sigma
//   width    = (upper - lower) / middle * 100
//   position = (close - lower) / (upper - lower) * 100
//
// `position` places the current close within the band (0 = at the lower
// band, 100 = at the upper band) and is undefined when the band has zero
// width.

use super::ma::{rolling_std, sma};

/// Full Bollinger Band series, each column aligned with `closes`.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub width: Vec<Option<f64>>,
    pub position: Vec<Option<f64>>,
}

/// Compute Bollinger Bands with window `n` and band width `k` standard
/// deviations.
pub fn bollinger(closes: &[f64], n: usize, k: f64) -> BollingerSeries {
    let middle = sma(closes, n);
    let std = rolling_std(closes, n);

    let len = closes.len();
    let mut upper = vec![None; len];
    let mut lower = vec![None; len];
    let mut width = vec![None; len];
    let mut position = vec![None; len];

    for i in 0..len {
        let (m, sd) = match (middle[i], std[i]) {
            (Some(m), Some(sd)) => (m, sd),
            _ => continue,
        };

        let u = m + k * sd;
        let l = m - k * sd;
        upper[i] = Some(u);
        lower[i] = Some(l);

        if m != 0.0 {
            width[i] = Some((u - l) / m * 100.0);
        }
        if u != l {
            position[i] = Some((closes[i] - l) / (u - l) * 100.0);
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
        width,
        position,
    }
}
