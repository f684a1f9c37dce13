// =============================================================================
// Error taxonomy for the analytics engine
// =============================================================================
//
// Recoverable numeric edge cases (warm-up windows, zero denominators) never
// become errors — they surface as `None` entries in the affected series.
// Only conditions the caller must act on are modelled here.

use thiserror::Error;

/// Typed error hierarchy for the analytics engine.
///
/// Library code returns specific variants; orchestration code wraps with
/// `anyhow::Context` when propagating further up.
#[derive(Error, Debug)]
pub enum AnalysisError {
    // -- Input validation ----------------------------------------------------
    /// The input bar series is malformed (unsorted dates, duplicate days,
    /// non-positive prices, broken OHLC ordering). Not recovered: the caller
    /// gets its series back un-augmented.
    #[error("upstream data error for {code}: {reason}")]
    UpstreamData { code: String, reason: String },

    /// Fewer bars than a computation's minimum requirement.
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    // -- Cache ---------------------------------------------------------------
    /// The cache backing store failed a read or write. Always treated as a
    /// miss by callers; computation proceeds uncached.
    #[error("cache unavailable: {reason}")]
    CacheUnavailable { reason: String },
}
