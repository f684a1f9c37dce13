// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicator battery computed
// for every analysed series. Each primitive returns a column aligned
// index-for-index with its input; entries before a window has accumulated
// enough history are `None`, never a silently wrong number. `None`
// serialises as JSON `null`.
//
// `augment` runs the full battery over a bar series and bundles the result
// with the untouched input. When the input is unusable the bundle simply
// carries no indicators — callers detect the absence instead of receiving
// fabricated values.

pub mod atr;
pub mod bollinger;
pub mod ma;
pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod stochastic;
pub mod volume;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::series::BarSeries;

/// The full indicator battery, one column per indicator, every column the
/// same length as the bar series it was computed from. Serde names match
/// the upstream report columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    #[serde(rename = "MA5")]
    pub ma5: Vec<Option<f64>>,
    #[serde(rename = "MA10")]
    pub ma10: Vec<Option<f64>>,
    #[serde(rename = "MA20")]
    pub ma20: Vec<Option<f64>>,
    #[serde(rename = "MA60")]
    pub ma60: Vec<Option<f64>>,

    #[serde(rename = "EMA12")]
    pub ema12: Vec<Option<f64>>,
    #[serde(rename = "EMA26")]
    pub ema26: Vec<Option<f64>>,

    #[serde(rename = "RSI")]
    pub rsi: Vec<Option<f64>>,

    #[serde(rename = "MACD")]
    pub macd: Vec<Option<f64>>,
    #[serde(rename = "MACD_Signal")]
    pub macd_signal: Vec<Option<f64>>,
    #[serde(rename = "MACD_Histogram")]
    pub macd_histogram: Vec<Option<f64>>,

    #[serde(rename = "BB_Upper")]
    pub bb_upper: Vec<Option<f64>>,
    #[serde(rename = "BB_Middle")]
    pub bb_middle: Vec<Option<f64>>,
    #[serde(rename = "BB_Lower")]
    pub bb_lower: Vec<Option<f64>>,
    #[serde(rename = "BB_Width")]
    pub bb_width: Vec<Option<f64>>,
    #[serde(rename = "BB_Position")]
    pub bb_position: Vec<Option<f64>>,

    #[serde(rename = "Stoch_K")]
    pub stoch_k: Vec<Option<f64>>,
    #[serde(rename = "Stoch_D")]
    pub stoch_d: Vec<Option<f64>>,

    #[serde(rename = "ATR")]
    pub atr: Vec<Option<f64>>,

    #[serde(rename = "Volume_MA20")]
    pub volume_ma20: Vec<Option<f64>>,
    #[serde(rename = "Volume_Ratio")]
    pub volume_ratio: Vec<Option<f64>>,
    #[serde(rename = "Amount_MA20")]
    pub amount_ma20: Vec<Option<f64>>,

    #[serde(rename = "Price_Change_1d")]
    pub price_change_1d: Vec<Option<f64>>,
    #[serde(rename = "Price_Change_5d")]
    pub price_change_5d: Vec<Option<f64>>,
    #[serde(rename = "Price_Change_20d")]
    pub price_change_20d: Vec<Option<f64>>,

    #[serde(rename = "Volatility_20d")]
    pub volatility_20d: Vec<Option<f64>>,

    #[serde(rename = "Max_Drawdown")]
    pub max_drawdown: Vec<Option<f64>>,
}

fn tail(column: &[Option<f64>], start: usize) -> Vec<Option<f64>> {
    column[start..].to_vec()
}

impl IndicatorSet {
    /// Compute the full battery for `series` (minimum length 1).
    pub fn compute(series: &BarSeries) -> Self {
        let bars = series.bars();
        let closes = series.closes();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let volumes = series.volumes();
        let amounts = series.amounts();

        let macd_series = macd::macd(&closes, 12, 26, 9);
        let bb = bollinger::bollinger(&closes, 20, 2.0);
        let stoch = stochastic::stochastic(&highs, &lows, &closes, 14, 3);

        Self {
            ma5: ma::sma(&closes, 5),
            ma10: ma::sma(&closes, 10),
            ma20: ma::sma(&closes, 20),
            ma60: ma::sma(&closes, 60),
            ema12: ma::ema(&closes, 12),
            ema26: ma::ema(&closes, 26),
            rsi: rsi::rsi(&closes, rsi::DEFAULT_RSI_PERIOD),
            macd: macd_series.macd,
            macd_signal: macd_series.signal,
            macd_histogram: macd_series.histogram,
            bb_upper: bb.upper,
            bb_middle: bb.middle,
            bb_lower: bb.lower,
            bb_width: bb.width,
            bb_position: bb.position,
            stoch_k: stoch.k,
            stoch_d: stoch.d,
            atr: atr::atr(bars, 14),
            volume_ma20: volume::volume_sma(&volumes, 20),
            volume_ratio: volume::volume_ratio(&volumes, 20),
            amount_ma20: volume::volume_sma(&amounts, 20),
            price_change_1d: momentum::price_change_pct(&closes, 1),
            price_change_5d: momentum::price_change_pct(&closes, 5),
            price_change_20d: momentum::price_change_pct(&closes, 20),
            volatility_20d: momentum::rolling_volatility(&closes, 20),
            max_drawdown: momentum::rolling_max_drawdown(&closes, 60),
        }
    }

    /// Columns restricted to bar indices `start..`, preserving alignment
    /// with a series sliced at the same index. Warm-up entries computed from
    /// the full history survive the cut, so a window slice keeps indicator
    /// values that a fresh computation on the short slice could not produce.
    pub fn slice(&self, start: usize) -> Self {
        Self {
            ma5: tail(&self.ma5, start),
            ma10: tail(&self.ma10, start),
            ma20: tail(&self.ma20, start),
            ma60: tail(&self.ma60, start),
            ema12: tail(&self.ema12, start),
            ema26: tail(&self.ema26, start),
            rsi: tail(&self.rsi, start),
            macd: tail(&self.macd, start),
            macd_signal: tail(&self.macd_signal, start),
            macd_histogram: tail(&self.macd_histogram, start),
            bb_upper: tail(&self.bb_upper, start),
            bb_middle: tail(&self.bb_middle, start),
            bb_lower: tail(&self.bb_lower, start),
            bb_width: tail(&self.bb_width, start),
            bb_position: tail(&self.bb_position, start),
            stoch_k: tail(&self.stoch_k, start),
            stoch_d: tail(&self.stoch_d, start),
            atr: tail(&self.atr, start),
            volume_ma20: tail(&self.volume_ma20, start),
            volume_ratio: tail(&self.volume_ratio, start),
            amount_ma20: tail(&self.amount_ma20, start),
            price_change_1d: tail(&self.price_change_1d, start),
            price_change_5d: tail(&self.price_change_5d, start),
            price_change_20d: tail(&self.price_change_20d, start),
            volatility_20d: tail(&self.volatility_20d, start),
            max_drawdown: tail(&self.max_drawdown, start),
        }
    }
}

/// A bar series bundled with its computed indicator columns.
///
/// `indicators` is absent when augmentation could not run (empty input);
/// the series itself is always the caller's data, untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentedSeries {
    pub series: BarSeries,
    pub indicators: Option<IndicatorSet>,
}

impl AugmentedSeries {
    /// Sub-view covering bar indices `start..`, slicing bars and indicator
    /// columns in parallel.
    pub fn slice(&self, start: usize) -> Self {
        Self {
            series: self.series.slice(start),
            indicators: self.indicators.as_ref().map(|set| set.slice(start)),
        }
    }

    /// Snapshot of the most recent indicator values, or `None` for an empty
    /// series.
    pub fn latest(&self) -> Option<LatestIndicators> {
        let bars = self.series.bars();
        let last = bars.last()?;
        let i = bars.len() - 1;

        let prev_close = if bars.len() > 1 {
            Some(bars[i - 1].close)
        } else {
            None
        };

        let col = |column: &dyn Fn(&IndicatorSet) -> Option<f64>, default: f64| -> f64 {
            self.indicators
                .as_ref()
                .and_then(|set| column(set))
                .unwrap_or(default)
        };

        Some(LatestIndicators {
            price: last.close,
            price_change: prev_close.map(|p| last.close - p).unwrap_or(0.0),
            price_change_pct: col(&|s| s.price_change_1d[i], 0.0),
            volume: last.volume,
            volume_ratio: col(&|s| s.volume_ratio[i], 1.0),
            rsi: col(&|s| s.rsi[i], 50.0),
            macd: col(&|s| s.macd[i], 0.0),
            macd_signal: col(&|s| s.macd_signal[i], 0.0),
            macd_histogram: col(&|s| s.macd_histogram[i], 0.0),
            bb_position: col(&|s| s.bb_position[i], 50.0),
            bb_width: col(&|s| s.bb_width[i], 0.0),
            stoch_k: col(&|s| s.stoch_k[i], 50.0),
            stoch_d: col(&|s| s.stoch_d[i], 50.0),
            atr: col(&|s| s.atr[i], 0.0),
            volatility_20d: col(&|s| s.volatility_20d[i], 0.0),
            ma5: col(&|s| s.ma5[i], last.close),
            ma20: col(&|s| s.ma20[i], last.close),
            ma60: col(&|s| s.ma60[i], last.close),
            ema12: col(&|s| s.ema12[i], last.close),
            ema26: col(&|s| s.ema26[i], last.close),
            max_drawdown: col(&|s| s.max_drawdown[i], 0.0),
        })
    }
}

/// Most recent indicator values for one series, with neutral fallbacks for
/// still-undefined columns (50 for bounded oscillators, the close for
/// moving averages, 0 or 1 elsewhere).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestIndicators {
    pub price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub volume: f64,
    pub volume_ratio: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bb_position: f64,
    pub bb_width: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub atr: f64,
    pub volatility_20d: f64,
    pub ma5: f64,
    pub ma20: f64,
    pub ma60: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub max_drawdown: f64,
}

/// Run the full indicator battery over `series`.
///
/// An empty series cannot be augmented; the input is returned untouched
/// with no indicator columns (the caller detects augmentation failure by
/// their absence). Never panics, never fails the caller.
pub fn augment(series: &BarSeries) -> AugmentedSeries {
    if series.is_empty() {
        warn!(code = %series.code, "cannot augment an empty bar series");
        return AugmentedSeries {
            series: series.clone(),
            indicators: None,
        };
    }

    let set = IndicatorSet::compute(series);
    debug!(code = %series.code, rows = series.len(), "indicator battery computed");

    AugmentedSeries {
        series: series.clone(),
        indicators: Some(set),
    }
}
