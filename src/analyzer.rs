// =============================================================================
// Stock Analyzer — per-entity analysis orchestration
// =============================================================================
//
// Drives one entity's full analysis: augment the bar series with the
// indicator battery, compute every configured lookback window (failures
// isolated per window), derive the risk summary over the long window, and
// memoize the whole record in the result cache.
//
// Cache keys combine the entity, the computation kind and the current
// calendar day, so a hit is invalidated at least once per day even when
// the TTL is longer. Cache trouble is never fatal: a failed read is a miss
// and a failed write just means the result is not persisted.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::cache::{CacheNamespace, ResultCache};
use crate::config::AnalysisConfig;
use crate::indicators::augment;
use crate::risk::{compute_risk_metrics, RiskSummary};
use crate::series::BarSeries;
use crate::windows::{analyze_windows, slice_window, WindowOutcome};

/// Full analysis record for one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub code: String,
    pub name: String,
    /// Provenance tag carried through from the input series.
    pub data_source: Option<String>,
    /// One outcome per configured window, keyed by window name.
    pub time_windows: BTreeMap<String, WindowOutcome>,
    /// Risk summary over the long lookback; absent below two bars.
    pub risk_metrics: Option<RiskSummary>,
    /// Set only when the input was unusable; individual window errors live
    /// inside `time_windows`.
    pub error: Option<String>,
}

/// Cross-entity means over successfully analysed stocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub avg_price_change_pct: f64,
    pub avg_volume_ratio: f64,
    pub avg_rsi: f64,
    pub avg_volatility: f64,
}

/// Per-entity analysis driver with a shared result cache.
pub struct StockAnalyzer {
    config: AnalysisConfig,
    cache: Arc<ResultCache>,
}

impl StockAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        let cache = Arc::new(ResultCache::new(config.cache_expire_hours));
        Self { config, cache }
    }

    /// The shared result cache (also used directly by higher layers to
    /// memoize fetches).
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Deterministic cache key for `(input, kind)` on the given calendar
    /// day: hex-encoded SHA-256 of `{input}_{kind}_{YYYYMMDD}`.
    pub fn cache_key_for_day(input: &str, kind: &str, day: NaiveDate) -> String {
        let material = format!("{}_{}_{}", input, kind, day.format("%Y%m%d"));
        hex::encode(Sha256::digest(material.as_bytes()))
    }

    /// Cache key for today.
    pub fn cache_key(input: &str, kind: &str) -> String {
        Self::cache_key_for_day(input, kind, Utc::now().date_naive())
    }

    /// Analyse one entity's bar series, uncached.
    pub fn analyze_stock(&self, series: &BarSeries, name: &str) -> StockAnalysis {
        info!(code = %series.code, name, bars = series.len(), "analysing stock");

        if series.is_empty() {
            return StockAnalysis {
                code: series.code.clone(),
                name: name.to_string(),
                data_source: series.data_source.clone(),
                time_windows: BTreeMap::new(),
                risk_metrics: None,
                error: Some("no usable bar data".to_string()),
            };
        }

        let augmented = augment(series);

        let time_windows = analyze_windows(
            &augmented,
            &self.config.time_windows,
            self.config.benchmark_annual_return,
        );

        // Risk summary over the long lookback (T-180 by default).
        let risk_metrics = slice_window(&augmented, self.config.risk_window_days)
            .and_then(|s| compute_risk_metrics(&s.series, self.config.benchmark_annual_return));

        info!(code = %series.code, windows = time_windows.len(), "stock analysis complete");

        StockAnalysis {
            code: series.code.clone(),
            name: name.to_string(),
            data_source: series.data_source.clone(),
            time_windows,
            risk_metrics,
            error: None,
        }
    }

    /// Analyse with daily-keyed memoization in the `analysis_result`
    /// namespace.
    pub fn analyze_cached(&self, series: &BarSeries, name: &str) -> StockAnalysis {
        let key = Self::cache_key(&series.code, "full_analysis");

        if let Some(payload) = self.cache.get(CacheNamespace::AnalysisResult, &key) {
            match serde_json::from_str::<StockAnalysis>(&payload) {
                Ok(cached) => {
                    info!(code = %series.code, "using cached analysis result");
                    return cached;
                }
                // A corrupt payload is a miss, never an error.
                Err(e) => warn!(code = %series.code, error = %e, "discarding unreadable cache entry"),
            }
        }

        let analysis = self.analyze_stock(series, name);

        // Cache trouble is a non-event for the caller.
        if let Err(e) = self.store_result(&key, &analysis) {
            warn!(code = %series.code, error = %e, "analysis result not cached");
        }
        self.cache.purge_expired();

        analysis
    }

    fn store_result(&self, key: &str, analysis: &StockAnalysis) -> Result<()> {
        let payload = serde_json::to_string(analysis)
            .with_context(|| format!("failed to serialise analysis result for {}", analysis.code))?;
        self.cache.set(CacheNamespace::AnalysisResult, key, payload);
        Ok(())
    }

    /// Means of the headline T-0 metrics across successfully analysed
    /// stocks.
    pub fn average_metrics(analyses: &[StockAnalysis]) -> AverageMetrics {
        let mut change = Vec::new();
        let mut volume_ratio = Vec::new();
        let mut rsi = Vec::new();
        let mut volatility = Vec::new();

        for analysis in analyses.iter().filter(|a| a.error.is_none()) {
            if let Some(t0) = analysis
                .time_windows
                .get("T-0")
                .and_then(|o| o.as_ok())
            {
                change.push(t0.latest_indicators.price_change_pct);
                volume_ratio.push(t0.latest_indicators.volume_ratio);
                rsi.push(t0.latest_indicators.rsi);
            }
            if let Some(risk) = &analysis.risk_metrics {
                volatility.push(risk.volatility);
            }
        }

        let avg = |values: &[f64]| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };

        AverageMetrics {
            avg_price_change_pct: avg(&change),
            avg_volume_ratio: avg(&volume_ratio),
            avg_rsi: avg(&rsi),
            avg_volatility: avg(&volatility),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Bar;
    use chrono::Duration;

    fn init_logs() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    fn series(code: &str, n: usize) -> BarSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<Bar> = (0..n)
            .map(|i| {
                let c = 50.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1;
                Bar {
                    date: start + Duration::days(i as i64),
                    open: c,
                    high: c * 1.02,
                    low: c * 0.98,
                    close: c,
                    volume: 20_000.0,
                    amount: 20_000.0 * c,
                }
            })
            .collect();
        BarSeries::new(code, Some("primary".to_string()), bars).unwrap()
    }

    #[test]
    fn full_analysis_covers_all_windows() {
        init_logs();
        let analyzer = StockAnalyzer::new(AnalysisConfig::default());
        let analysis = analyzer.analyze_stock(&series("600519", 250), "Kweichow Moutai");

        assert!(analysis.error.is_none());
        assert_eq!(analysis.time_windows.len(), 6);
        assert!(analysis
            .time_windows
            .values()
            .all(|o| o.as_ok().is_some()));
        assert!(analysis.risk_metrics.is_some());
        assert_eq!(analysis.data_source.as_deref(), Some("primary"));
    }

    #[test]
    fn empty_series_is_a_top_level_error() {
        let analyzer = StockAnalyzer::new(AnalysisConfig::default());
        let empty = BarSeries::new("600519", None, Vec::new()).unwrap();
        let analysis = analyzer.analyze_stock(&empty, "empty");
        assert!(analysis.error.is_some());
        assert!(analysis.time_windows.is_empty());
        assert!(analysis.risk_metrics.is_none());
    }

    #[test]
    fn short_series_still_analyses_all_windows() {
        // Five bars: every window falls back to what exists; none errors.
        let analyzer = StockAnalyzer::new(AnalysisConfig::default());
        let analysis = analyzer.analyze_stock(&series("000001", 5), "Ping An Bank");
        assert!(analysis.error.is_none());
        assert_eq!(analysis.time_windows.len(), 6);
        let t180 = analysis.time_windows["T-180"].as_ok().unwrap();
        assert_eq!(t180.data_point_count, 5);
    }

    #[test]
    fn cache_key_is_daily_and_deterministic() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let a = StockAnalyzer::cache_key_for_day("600519", "full_analysis", day);
        let b = StockAnalyzer::cache_key_for_day("600519", "full_analysis", day);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // hex-encoded SHA-256

        // Next day, different input or kind: different keys.
        let next = StockAnalyzer::cache_key_for_day("600519", "full_analysis", day + Duration::days(1));
        assert_ne!(a, next);
        assert_ne!(a, StockAnalyzer::cache_key_for_day("000001", "full_analysis", day));
        assert_ne!(a, StockAnalyzer::cache_key_for_day("600519", "valuation", day));
    }

    #[test]
    fn cached_analysis_round_trips() {
        let analyzer = StockAnalyzer::new(AnalysisConfig::default());
        let s = series("600519", 100);

        let first = analyzer.analyze_cached(&s, "Kweichow Moutai");
        // Second call must be served from the cache and carry the same
        // numbers.
        let second = analyzer.analyze_cached(&s, "Kweichow Moutai");
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );

        let stats = analyzer.cache().stats();
        assert_eq!(stats.table_stats["analysis_result"], 1);
    }

    #[test]
    fn average_metrics_skips_failed_analyses() {
        let analyzer = StockAnalyzer::new(AnalysisConfig::default());
        let good = analyzer.analyze_stock(&series("600519", 200), "a");
        let empty = BarSeries::new("999999", None, Vec::new()).unwrap();
        let failed = analyzer.analyze_stock(&empty, "b");

        let avg = StockAnalyzer::average_metrics(&[good.clone(), failed]);
        let t0 = good.time_windows["T-0"].as_ok().unwrap();
        assert!((avg.avg_rsi - t0.latest_indicators.rsi).abs() < 1e-10);
        assert!((avg.avg_volatility - good.risk_metrics.unwrap().volatility).abs() < 1e-10);
    }

    #[test]
    fn average_metrics_of_nothing_is_zero() {
        let avg = StockAnalyzer::average_metrics(&[]);
        assert_eq!(avg.avg_rsi, 0.0);
        assert_eq!(avg.avg_volatility, 0.0);
    }

    #[test]
    fn analysis_serialises_nan_free() {
        let analyzer = StockAnalyzer::new(AnalysisConfig::default());
        let analysis = analyzer.analyze_stock(&series("600519", 30), "x");
        // The whole record must be representable as plain JSON scalars.
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(!json.contains("NaN"));
        assert!(!json.contains("inf"));
    }
}
