use chrono::DateTime;

use crate::cache_probe::result::ProbeResult;
use crate::config::verify_config::VerifyOptions;

use super::outcome::{
    CacheLevel, Confidence, Evidence, EvidenceKind, PerformanceComparison, ProbeSet,
    VerificationOutcome,
};

/// Maximum drift between the two `date` headers for them to count as the
/// same origin render.
const FRESHNESS_DATE_DRIFT_MS: i64 = 2000;
/// A slow first answer followed by a near-instant second one reads as a
/// cache replay even when the speedup thresholds are tuned higher.
const FRESHNESS_SLOW_FIRST_MS: f64 = 100.0;
const FRESHNESS_FAST_SECOND_MS: f64 = 50.0;

const CDN_HIT: &str = "HIT";

/// Classifies the collected probes. Pure and deterministic: identical probe
/// data always yields the same evidence list, verdict, level and confidence.
/// Every rule runs off whichever probes carry the signal it needs, so a
/// failed probe weakens the verdict instead of suppressing unrelated rules.
pub fn classify(
    url: &str,
    label: &str,
    probes: ProbeSet,
    options: &VerifyOptions,
) -> VerificationOutcome {
    let mut evidence: Vec<Evidence> = Vec::new();

    // 1. CDN cache status. The second probe is the one allowed to hit the
    //    edge, so its header carries the verdict.
    let first_cdn = probes.first.cdn_cache_status.as_deref();
    let second_cdn = probes.second.cdn_cache_status.as_deref();
    let cdn_cached = second_cdn == Some(CDN_HIT);
    if let Some(second_status) = second_cdn {
        evidence.push(Evidence {
            kind: EvidenceKind::CdnHeaders,
            detail: format!(
                "first: {}, second: {}",
                first_cdn.unwrap_or("none"),
                second_status
            ),
            supports_cache: cdn_cached,
        });
    }

    // 2. Timing comparison between the bypass probe and the default probe.
    let first_ms = probes.first.duration_ms;
    let second_ms = probes.second.duration_ms;
    let time_difference_ms = first_ms - second_ms;
    let percent_speedup = if first_ms > 0.0 {
        time_difference_ms / first_ms * 100.0
    } else {
        0.0
    };
    let significantly_faster = time_difference_ms > options.min_time_difference_ms
        && percent_speedup > options.min_percent_speedup;
    let browser_cached = significantly_faster;
    if significantly_faster {
        evidence.push(Evidence {
            kind: EvidenceKind::Performance,
            detail: format!(
                "second request {:.1}% faster ({:.0}ms)",
                percent_speedup, time_difference_ms
            ),
            supports_cache: true,
        });
    }

    // 3. Same origin date on both responses but a much faster second answer.
    //    Informational: does not flip any verdict flag on its own.
    if let (Some(first_date), Some(second_date)) = (
        parse_server_date(&probes.first),
        parse_server_date(&probes.second),
    ) {
        let drift_ms = (first_date - second_date).num_milliseconds().abs();
        if drift_ms < FRESHNESS_DATE_DRIFT_MS
            && first_ms > FRESHNESS_SLOW_FIRST_MS
            && second_ms < FRESHNESS_FAST_SECOND_MS
        {
            evidence.push(Evidence {
                kind: EvidenceKind::ContentFreshness,
                detail: "same server date but much faster second response".to_string(),
                supports_cache: true,
            });
        }
    }

    // 4. Conditional revalidation.
    let conditional_validated = probes
        .conditional
        .as_ref()
        .and_then(|probe| probe.http_status)
        == Some(304);
    if conditional_validated {
        evidence.push(Evidence {
            kind: EvidenceKind::ConditionalRequest,
            detail: "ETag validation returned 304 Not Modified".to_string(),
            supports_cache: true,
        });
    }

    // 5. Cache-control that does not forbid shared caching.
    if let (Some(first_cc), Some(_)) = (
        probes.first.cache_control.as_deref(),
        probes.second.cache_control.as_deref(),
    ) {
        if is_positive_cache_control(first_cc) {
            evidence.push(Evidence {
                kind: EvidenceKind::CacheHeaders,
                detail: format!("positive cache-control: {first_cc}"),
                supports_cache: true,
            });
        }
    }

    // 6. Verdict: a quorum of supporting observations, or any single strong
    //    one.
    let positive_evidence = evidence.iter().filter(|e| e.supports_cache).count();
    let strong_evidence = cdn_cached || significantly_faster || conditional_validated;
    let verified = positive_evidence >= options.min_positive_evidence || strong_evidence;

    // 7. First matching level wins.
    let (level, confidence) = if cdn_cached {
        (CacheLevel::CdnCached, Confidence::High)
    } else if significantly_faster {
        (CacheLevel::BrowserCached, Confidence::Medium)
    } else if conditional_validated {
        (CacheLevel::ConditionalCached, Confidence::Medium)
    } else if positive_evidence > 0 {
        (CacheLevel::PossiblyCached, Confidence::Low)
    } else {
        (CacheLevel::NotCached, Confidence::High)
    };

    VerificationOutcome {
        url: url.to_string(),
        label: label.to_string(),
        probes,
        evidence,
        performance: PerformanceComparison {
            first_ms,
            second_ms,
            time_difference_ms,
            percent_speedup,
            significantly_faster,
        },
        cdn_cached,
        browser_cached,
        conditional_validated,
        verified,
        level,
        confidence,
    }
}

fn parse_server_date(probe: &ProbeResult) -> Option<DateTime<chrono::FixedOffset>> {
    probe
        .server_date
        .as_deref()
        .and_then(|date| DateTime::parse_from_rfc2822(date).ok())
}

fn is_positive_cache_control(value: &str) -> bool {
    let value = value.to_ascii_lowercase();
    !["no-cache", "no-store", "private"]
        .iter()
        .any(|directive| value.contains(directive))
}
