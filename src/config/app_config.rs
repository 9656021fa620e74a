use std::env;

use super::verify_config::Config;

pub struct AppConfig {
    pub config: Config,
    pub report_file: Option<String>,
    pub max_suite_width: usize,
}

/// Load the runner configuration from a YAML file and environment variables.
/// Reads the file named by `CONFIG_FILE` (default `config.yml`), parses it
/// into the suite map, and picks up the optional `REPORT_FILE` destination
/// for the JSON report. Startup configuration errors are fatal.
pub fn load_config() -> AppConfig {
    let config_file_location = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.yml".to_string());
    let config_str =
        std::fs::read_to_string(&config_file_location).expect("Failed to read config.yml");

    let config: Config = serde_yaml::from_str(&config_str).expect("Invalid YAML");

    let report_file = env::var("REPORT_FILE").ok();
    if let Some(path) = &report_file {
        log::info!("JSON report will be written to {path}");
    }

    let max_suite_width = config.keys().map(|suite| suite.len()).max().unwrap_or(10);

    AppConfig {
        config,
        report_file,
        max_suite_width,
    }
}
