use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::verifier::outcome::VerificationOutcome;

/// Below this share of verified resources the caching setup needs attention.
const CRITICAL_VERIFICATION_RATE: f64 = 60.0;
/// Below this average speedup the cache is not buying much.
const LOW_AVERAGE_SPEEDUP: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub verified: usize,
    pub cdn_cached: usize,
    pub browser_cached: usize,
    pub conditional_validated: usize,
    pub not_verified: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceStats {
    pub average_first_ms: f64,
    pub average_second_ms: f64,
    pub average_speedup_percent: f64,
    pub max_speedup_percent: f64,
}

/// Aggregated view over a finished batch, plus the per-resource outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub performance: PerformanceStats,
    pub recommendations: Vec<Recommendation>,
    pub outcomes: Vec<VerificationOutcome>,
}

impl VerificationReport {
    pub fn from_outcomes(outcomes: Vec<VerificationOutcome>) -> Self {
        let summary = ReportSummary {
            total: outcomes.len(),
            verified: outcomes.iter().filter(|o| o.verified).count(),
            cdn_cached: outcomes.iter().filter(|o| o.cdn_cached).count(),
            browser_cached: outcomes.iter().filter(|o| o.browser_cached).count(),
            conditional_validated: outcomes
                .iter()
                .filter(|o| o.conditional_validated)
                .count(),
            not_verified: outcomes.iter().filter(|o| !o.verified).count(),
        };

        let mut performance = PerformanceStats::default();
        if !outcomes.is_empty() {
            let count = outcomes.len() as f64;
            performance.average_first_ms =
                outcomes.iter().map(|o| o.performance.first_ms).sum::<f64>() / count;
            performance.average_second_ms =
                outcomes.iter().map(|o| o.performance.second_ms).sum::<f64>() / count;
            performance.average_speedup_percent = outcomes
                .iter()
                .map(|o| o.performance.percent_speedup)
                .sum::<f64>()
                / count;
            performance.max_speedup_percent = outcomes
                .iter()
                .map(|o| o.performance.percent_speedup)
                .fold(0.0, f64::max);
        }

        let recommendations = build_recommendations(&summary, &performance);

        VerificationReport {
            generated_at: Utc::now(),
            summary,
            performance,
            recommendations,
            outcomes,
        }
    }

    /// Human-readable summary for the console.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Cache verification report ===");
        let _ = writeln!(
            out,
            "Resources: {} total, {} verified, {} not verified",
            self.summary.total, self.summary.verified, self.summary.not_verified
        );
        let _ = writeln!(
            out,
            "Layers: {} CDN, {} browser, {} conditional",
            self.summary.cdn_cached,
            self.summary.browser_cached,
            self.summary.conditional_validated
        );
        let _ = writeln!(
            out,
            "Timing: first {:.2}ms avg, second {:.2}ms avg, speedup {:.1}% avg / {:.1}% max",
            self.performance.average_first_ms,
            self.performance.average_second_ms,
            self.performance.average_speedup_percent,
            self.performance.max_speedup_percent
        );
        for recommendation in &self.recommendations {
            let _ = writeln!(
                out,
                "[{:?}] {}: {}",
                recommendation.severity, recommendation.category, recommendation.message
            );
        }
        out
    }

    /// Serializes the full report, outcomes included, to a JSON file.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn build_recommendations(
    summary: &ReportSummary,
    performance: &PerformanceStats,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    if summary.total == 0 {
        return recommendations;
    }

    let verification_rate = summary.verified as f64 / summary.total as f64 * 100.0;
    if verification_rate < CRITICAL_VERIFICATION_RATE {
        recommendations.push(Recommendation {
            severity: Severity::Critical,
            category: "cache verification".to_string(),
            message: format!(
                "only {verification_rate:.1}% of resources are actually being cached, review cache headers and configuration"
            ),
        });
    }

    if summary.cdn_cached == 0 && summary.browser_cached > 0 {
        recommendations.push(Recommendation {
            severity: Severity::Warning,
            category: "CDN configuration".to_string(),
            message: "resources are only browser-cached, not CDN-cached, check the edge configuration".to_string(),
        });
    }

    if performance.average_speedup_percent < LOW_AVERAGE_SPEEDUP {
        recommendations.push(Recommendation {
            severity: Severity::Info,
            category: "performance impact".to_string(),
            message: format!(
                "cache speedup is only {:.1}% on average, consider longer max-age or an edge cache",
                performance.average_speedup_percent
            ),
        });
    }

    if summary.conditional_validated == 0 {
        recommendations.push(Recommendation {
            severity: Severity::Info,
            category: "conditional caching".to_string(),
            message: "no conditional revalidation observed, consider serving ETags".to_string(),
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::Utc;

    use crate::cache_probe::result::ProbeResult;
    use crate::config::verify_config::VerifyOptions;
    use crate::verifier::analysis::classify;
    use crate::verifier::outcome::ProbeSet;

    fn probe(duration_ms: f64, cache_control: Option<&str>, cdn: Option<&str>) -> ProbeResult {
        ProbeResult {
            url: "http://localhost/resource".to_string(),
            succeeded: true,
            http_status: Some(200),
            duration_ms,
            content_length: 512,
            headers: HashMap::new(),
            etag: None,
            last_modified: None,
            cache_control: cache_control.map(str::to_string),
            cdn_cache_status: cdn.map(str::to_string),
            server_date: None,
            requested_at: Utc::now(),
            error: None,
        }
    }

    fn outcome(first_ms: f64, second_ms: f64, cc: Option<&str>, cdn: Option<&str>) -> VerificationOutcome {
        classify(
            "/resource",
            "report-test",
            ProbeSet {
                first: probe(first_ms, cc, None),
                second: probe(second_ms, cc, cdn),
                conditional: None,
            },
            &VerifyOptions::default(),
        )
    }

    #[test]
    fn summary_counts_levels_and_flags() {
        let outcomes = vec![
            outcome(300.0, 30.0, Some("public, max-age=3600"), None),
            outcome(100.0, 100.0, Some("no-cache"), None),
            outcome(80.0, 40.0, None, Some("HIT")),
        ];

        let report = VerificationReport::from_outcomes(outcomes);

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.verified, 2);
        assert_eq!(report.summary.not_verified, 1);
        assert_eq!(report.summary.cdn_cached, 1);
        assert_eq!(report.summary.browser_cached, 1);
        assert_eq!(report.summary.conditional_validated, 0);
        assert_eq!(report.outcomes.len(), 3);
    }

    #[test]
    fn performance_stats_average_over_all_outcomes() {
        let outcomes = vec![
            outcome(300.0, 100.0, None, None),
            outcome(100.0, 100.0, None, None),
        ];

        let report = VerificationReport::from_outcomes(outcomes);

        assert_eq!(report.performance.average_first_ms, 200.0);
        assert_eq!(report.performance.average_second_ms, 100.0);
        assert!((report.performance.average_speedup_percent - 33.3).abs() < 0.1);
        assert!((report.performance.max_speedup_percent - 66.7).abs() < 0.1);
    }

    #[test]
    fn poor_results_trigger_recommendations() {
        // One slow unverified resource, browser caching only.
        let outcomes = vec![
            outcome(300.0, 30.0, Some("public, max-age=3600"), None),
            outcome(100.0, 100.0, Some("no-cache"), None),
            outcome(90.0, 95.0, None, None),
        ];

        let report = VerificationReport::from_outcomes(outcomes);

        let categories: Vec<&str> = report
            .recommendations
            .iter()
            .map(|r| r.category.as_str())
            .collect();
        assert!(categories.contains(&"cache verification"));
        assert!(categories.contains(&"CDN configuration"));
        assert!(categories.contains(&"conditional caching"));
        assert_eq!(report.recommendations[0].severity, Severity::Critical);
    }

    #[test]
    fn healthy_results_stay_quiet() {
        let outcomes = vec![
            outcome(300.0, 30.0, Some("public, max-age=3600"), Some("HIT")),
            outcome(280.0, 25.0, Some("public, max-age=3600"), Some("HIT")),
        ];
        let mut report = VerificationReport::from_outcomes(outcomes);

        // Conditional revalidation is the only thing this batch never saw.
        report
            .recommendations
            .retain(|r| r.category != "conditional caching");
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn empty_batch_produces_no_recommendations() {
        let report = VerificationReport::from_outcomes(Vec::new());
        assert_eq!(report.summary.total, 0);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.performance.average_first_ms, 0.0);
    }

    #[test]
    fn render_text_mentions_totals_and_recommendations() {
        let outcomes = vec![outcome(100.0, 100.0, Some("no-cache"), None)];
        let report = VerificationReport::from_outcomes(outcomes);

        let text = report.render_text();
        assert!(text.contains("1 total"));
        assert!(text.contains("0 verified"));
        assert!(text.contains("cache verification"));
    }
}
