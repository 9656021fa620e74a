use std::fmt;

use serde::Serialize;

use crate::cache_probe::result::ProbeResult;

/// Which classification rule produced a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceKind {
    CdnHeaders,
    Performance,
    ContentFreshness,
    ConditionalRequest,
    CacheHeaders,
}

/// One observation made while comparing the probes. Entries are appended in
/// the order the rules run and never reordered.
#[derive(Debug, Clone, Serialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub detail: String,
    pub supports_cache: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheLevel {
    CdnCached,
    BrowserCached,
    ConditionalCached,
    PossiblyCached,
    NotCached,
}

impl fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheLevel::CdnCached => "CDN_CACHED",
            CacheLevel::BrowserCached => "BROWSER_CACHED",
            CacheLevel::ConditionalCached => "CONDITIONAL_CACHED",
            CacheLevel::PossiblyCached => "POSSIBLY_CACHED",
            CacheLevel::NotCached => "NOT_CACHED",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        })
    }
}

/// The probes collected for one resource, in the order they were issued.
/// The conditional probe only exists when the first probe produced an ETag.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeSet {
    pub first: ProbeResult,
    pub second: ProbeResult,
    pub conditional: Option<ProbeResult>,
}

/// Timing comparison between the bypass probe and the default probe.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceComparison {
    pub first_ms: f64,
    pub second_ms: f64,
    pub time_difference_ms: f64,
    pub percent_speedup: f64,
    pub significantly_faster: bool,
}

/// Result of verifying one resource. Built in a single pass by
/// [`classify`](super::analysis::classify) and immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub url: String,
    pub label: String,
    pub probes: ProbeSet,
    pub evidence: Vec<Evidence>,
    pub performance: PerformanceComparison,
    pub cdn_cached: bool,
    pub browser_cached: bool,
    pub conditional_validated: bool,
    pub verified: bool,
    pub level: CacheLevel,
    pub confidence: Confidence,
}
