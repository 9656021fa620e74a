use std::time::Duration;

use reqwest::Client;

pub mod cache_probe;
pub mod config;
pub mod report;
pub mod verifier;

use config::app_config::load_config;
use report::VerificationReport;
use verifier::CacheVerifier;
use verifier::outcome::VerificationOutcome;

fn to_fixed_width(input: &str, width: usize) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

fn print_outcome(suite_tag: &str, outcome: &VerificationOutcome) {
    let marker = if outcome.verified { "✅" } else { "❌" };
    println!(
        "[{suite_tag}] {marker} URL: {}, Level: {}, Confidence: {}, First: {:.2}ms, Second: {:.2}ms",
        outcome.url,
        outcome.level,
        outcome.confidence,
        outcome.performance.first_ms,
        outcome.performance.second_ms,
    );
    for item in &outcome.evidence {
        let sign = if item.supports_cache { "+" } else { "-" };
        println!("[{suite_tag}]    {sign} {}", item.detail);
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let app_config = load_config();
    let max_suite_width = app_config.max_suite_width;

    let mut handles = vec![];

    // Suites run in parallel; within a suite the probes stay strictly
    // sequential and paced, which is what the timing comparison relies on.
    for (suite_name, suite) in app_config.config {
        let handle = tokio::spawn(async move {
            let client = Client::builder()
                .timeout(Duration::from_secs(5))
                .user_agent("cacheprobe/1.0")
                .build()
                .expect("Failed to create client");

            let verifier = CacheVerifier::new(client, suite.options.clone());
            let urls = suite.resolved_targets();
            let outcomes = verifier.verify_batch(&urls, &suite.label).await;

            let suite_tag = to_fixed_width(&suite_name, max_suite_width);
            for outcome in &outcomes {
                print_outcome(&suite_tag, outcome);
            }
            outcomes
        });

        handles.push(handle);
    }

    let mut all_outcomes = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(outcomes) => all_outcomes.extend(outcomes),
            Err(e) => log::error!("suite task failed: {e}"),
        }
    }

    let report = VerificationReport::from_outcomes(all_outcomes);
    println!("{}", report.render_text());

    if let Some(path) = app_config.report_file {
        if let Err(e) = report.write_json(&path) {
            log::error!("Failed to write report to {path}: {e}");
        }
    }
}
