use serde::Deserialize;
use url::Url;

/// Tuning knobs for the verification heuristics. The timing thresholds and
/// the evidence quorum encode operator judgment rather than derived limits,
/// so they stay configurable per suite instead of being hard-coded.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOptions {
    /// Minimum absolute speedup of the second probe before timing counts as
    /// cache evidence.
    #[serde(default = "default_min_time_difference_ms")]
    pub min_time_difference_ms: f64,

    /// Minimum relative speedup, in percent, required together with the
    /// absolute threshold.
    #[serde(default = "default_min_percent_speedup")]
    pub min_percent_speedup: f64,

    /// How many supporting evidence entries verify a resource when no single
    /// strong signal is present.
    #[serde(default = "default_min_positive_evidence")]
    pub min_positive_evidence: usize,

    /// Pause between the bypass probe and the default probe, giving
    /// write-through caches time to fill.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Pause between resources in a batch.
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            min_time_difference_ms: default_min_time_difference_ms(),
            min_percent_speedup: default_min_percent_speedup(),
            min_positive_evidence: default_min_positive_evidence(),
            settle_delay_ms: default_settle_delay_ms(),
            pacing_delay_ms: default_pacing_delay_ms(),
        }
    }
}

fn default_min_time_difference_ms() -> f64 {
    50.0
}

fn default_min_percent_speedup() -> f64 {
    20.0
}

fn default_min_positive_evidence() -> usize {
    2
}

fn default_settle_delay_ms() -> u64 {
    200
}

fn default_pacing_delay_ms() -> u64 {
    300
}

/// A single resource to verify.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Absolute URL, or a path resolved against the suite's `base_url`.
    pub url: String,
}

/// A named group of resources verified together under one label.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteConfig {
    /// Free-form tag attached to every outcome of this suite. Grouping only,
    /// no effect on classification.
    pub label: String,

    /// Resolved against relative target paths when present.
    #[serde(default)]
    pub base_url: Option<String>,

    pub targets: Vec<TargetConfig>,

    #[serde(default)]
    pub options: VerifyOptions,
}

impl SuiteConfig {
    /// Absolute targets pass through untouched; relative ones are joined to
    /// the suite's base URL. A target that resolves against nothing is kept
    /// as-is and will surface as a failed probe.
    pub fn resolve_url(&self, target: &str) -> String {
        if Url::parse(target).is_ok() {
            return target.to_string();
        }
        match &self.base_url {
            Some(base) => Url::parse(base)
                .and_then(|base| base.join(target))
                .map(|resolved| resolved.to_string())
                .unwrap_or_else(|_| target.to_string()),
            None => target.to_string(),
        }
    }

    pub fn resolved_targets(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|target| self.resolve_url(&target.url))
            .collect()
    }
}

pub type Config = std::collections::HashMap<String, SuiteConfig>;
