pub mod analysis;
pub mod outcome;

use std::time::Duration;

use tokio::time::sleep;

use crate::cache_probe::prelude::*;
use crate::config::verify_config::VerifyOptions;

use analysis::classify;
use outcome::{ProbeSet, VerificationOutcome};

/// Stateless verification service. All state lives in the outcome values it
/// returns; independent calls never observe each other.
pub struct CacheVerifier {
    client: reqwest::Client,
    options: VerifyOptions,
}

impl CacheVerifier {
    pub fn new(client: reqwest::Client, options: VerifyOptions) -> Self {
        CacheVerifier { client, options }
    }

    /// Runs the three-probe sequence against one resource and classifies the
    /// result. The sequence is strictly ordered: the timing comparison only
    /// means something if the bypass probe went out first. Probe failures
    /// degrade the verdict instead of raising.
    pub async fn verify(&self, url: &str, label: &str) -> VerificationOutcome {
        log::info!("verifying cache behavior for {url}");

        let first = probe_url(&self.client, url, ProbeMode::Bypass).await;

        // Let any write-through cache fill finish before sampling it.
        sleep(Duration::from_millis(self.options.settle_delay_ms)).await;

        let second = probe_url(&self.client, url, ProbeMode::Default).await;

        let conditional = match first.etag.clone() {
            Some(etag) => {
                Some(probe_url(&self.client, url, ProbeMode::Conditional { etag }).await)
            }
            None => None,
        };

        classify(
            url,
            label,
            ProbeSet {
                first,
                second,
                conditional,
            },
            &self.options,
        )
    }

    /// Verifies every URL in input order, one at a time, pacing requests so
    /// the target never sees a burst. Returns one outcome per URL in the
    /// same order; URLs are never deduplicated or aggregated.
    pub async fn verify_batch(&self, urls: &[String], label: &str) -> Vec<VerificationOutcome> {
        let mut outcomes = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            log::info!("verifying {}/{}: {url}", index + 1, urls.len());
            outcomes.push(self.verify(url, label).await);
            if index + 1 < urls.len() {
                sleep(Duration::from_millis(self.options.pacing_delay_ms)).await;
            }
        }
        outcomes
    }
}
