// =============================================================================
// Bar / BarSeries — the daily OHLCV data model
// =============================================================================
//
// A `BarSeries` is the engine's only input: one entity's chronologically
// ordered, duplicate-free daily bars, produced by the external data-fetch
// layer. Construction validates the invariants once; everything downstream
// can then index freely without re-checking.
//
// Invariants:
//   * dates strictly increasing (trading days only, no duplicates)
//   * 0 < low <= min(open, close) <= max(open, close) <= high
//   * volume >= 0, amount >= 0
//
// The engine never mutates a series it was given — augmentation and window
// slicing return new values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One trading day's OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Turnover value for the day.
    pub amount: f64,
}

impl Bar {
    fn validate(&self) -> Result<(), String> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(format!("non-positive or non-finite price on {}", self.date));
        }
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if self.low > body_low || body_high > self.high {
            return Err(format!(
                "OHLC ordering violated on {}: low={} open={} close={} high={}",
                self.date, self.low, self.open, self.close, self.high
            ));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(format!("negative volume on {}", self.date));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(format!("negative amount on {}", self.date));
        }
        Ok(())
    }
}

/// A validated, chronologically ordered bar series for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// Entity identifier (stock code).
    pub code: String,
    /// Provenance tag from the data-fetch layer, e.g. "primary" or "mock".
    /// Not used internally; passed through into analysis results.
    pub data_source: Option<String>,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, validating every invariant.
    ///
    /// A malformed input is an `UpstreamData` error — the engine does not
    /// attempt to repair dirty data from the fetch layer.
    pub fn new(
        code: impl Into<String>,
        data_source: Option<String>,
        bars: Vec<Bar>,
    ) -> Result<Self, AnalysisError> {
        let code = code.into();

        for bar in &bars {
            if let Err(reason) = bar.validate() {
                return Err(AnalysisError::UpstreamData {
                    code,
                    reason,
                });
            }
        }
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AnalysisError::UpstreamData {
                    code,
                    reason: format!(
                        "dates not strictly increasing: {} followed by {}",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }

        Ok(Self {
            code,
            data_source,
            bars,
        })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Date of the most recent bar.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes, oldest first.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Turnover amounts, oldest first.
    pub fn amounts(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.amount).collect()
    }

    /// Sub-series covering `range` of bar indices, keeping code and
    /// provenance. `range` must be within bounds.
    pub(crate) fn slice(&self, start: usize) -> Self {
        Self {
            code: self.code.clone(),
            data_source: self.data_source.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }

    /// Index of the first bar with `date >= cutoff`, or `None` when every
    /// bar is older.
    pub(crate) fn first_index_on_or_after(&self, cutoff: NaiveDate) -> Option<usize> {
        self.bars.iter().position(|b| b.date >= cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(n as i64)
    }

    fn bar(date: NaiveDate, close: f64) -> Bar {
        Bar {
            date,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000.0,
            amount: 1_000.0 * close,
        }
    }

    #[test]
    fn valid_series_accepted() {
        let bars: Vec<Bar> = (0..5).map(|i| bar(day(i), 10.0 + i as f64)).collect();
        let series = BarSeries::new("600519", Some("primary".to_string()), bars).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.latest_date(), Some(day(4)));
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0, 13.0, 14.0]);
    }

    #[test]
    fn unsorted_dates_rejected() {
        let bars = vec![bar(day(1), 10.0), bar(day(0), 11.0)];
        let err = BarSeries::new("600519", None, bars).unwrap_err();
        assert!(matches!(err, AnalysisError::UpstreamData { .. }));
    }

    #[test]
    fn duplicate_dates_rejected() {
        let bars = vec![bar(day(0), 10.0), bar(day(0), 11.0)];
        assert!(BarSeries::new("600519", None, bars).is_err());
    }

    #[test]
    fn broken_ohlc_ordering_rejected() {
        let mut b = bar(day(0), 10.0);
        b.high = 9.0; // high below close
        assert!(BarSeries::new("600519", None, vec![b]).is_err());
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut b = bar(day(0), 10.0);
        b.low = 0.0;
        assert!(BarSeries::new("600519", None, vec![b]).is_err());
    }

    #[test]
    fn negative_volume_rejected() {
        let mut b = bar(day(0), 10.0);
        b.volume = -1.0;
        assert!(BarSeries::new("600519", None, vec![b]).is_err());
    }

    #[test]
    fn empty_series_is_valid() {
        let series = BarSeries::new("600519", None, Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.latest_date().is_none());
    }

    #[test]
    fn first_index_on_or_after_cutoff() {
        let bars: Vec<Bar> = (0..10).map(|i| bar(day(i), 10.0)).collect();
        let series = BarSeries::new("600519", None, bars).unwrap();
        assert_eq!(series.first_index_on_or_after(day(3)), Some(3));
        assert_eq!(series.first_index_on_or_after(day(0)), Some(0));
        assert_eq!(series.first_index_on_or_after(day(11)), None);
    }
}
