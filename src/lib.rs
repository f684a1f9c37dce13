// =============================================================================
// stocklens — Technical Indicator & Risk Analytics Engine
// =============================================================================
//
// Ingests one entity's daily OHLCV bar series and derives a fixed battery of
// technical indicators and risk statistics over multiple rolling lookback
// windows, memoizing full results in a TTL-keyed cache.
//
// The engine is pure computation: it consumes an already-aligned,
// chronologically ordered series from the data-fetch layer and returns
// augmented series and scalar summaries as JSON-serializable records.
// Undefined values (warm-up windows, degenerate divisions) are typed
// options that serialise as `null`.
// =============================================================================

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod indicators;
pub mod risk;
pub mod series;
pub mod windows;

pub use analyzer::{AverageMetrics, StockAnalysis, StockAnalyzer};
pub use cache::{CacheNamespace, CacheStats, ResultCache};
pub use config::{AnalysisConfig, TimeWindow};
pub use error::AnalysisError;
pub use indicators::{augment, AugmentedSeries, IndicatorSet, LatestIndicators};
pub use risk::{compute_risk_metrics, RiskSummary};
pub use series::{Bar, BarSeries};
pub use windows::{analyze_window, analyze_windows, slice_window, WindowOutcome, WindowResult};
