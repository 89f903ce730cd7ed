//! Test configuration rooted in a temporary project directory

use fpds_task_orders::Config;
use fpds_task_orders::types::Contractor;
use std::path::Path;
use std::time::Duration;

/// Config with all paths under `project_dir`, no request delay, fast retries
/// and the feed pointed at `feed_url`
pub fn test_config(project_dir: &Path, feed_url: &str) -> Config {
    let mut config = Config::from_project_dir(project_dir);
    config.feed.base_url = feed_url.to_string();
    config.feed.request_timeout = Duration::from_secs(5);
    config.retry.max_attempts = 1;
    config.retry.initial_delay = Duration::from_millis(5);
    config.retry.max_delay = Duration::from_millis(10);
    config.retry.jitter = false;
    config.batch.request_delay = Duration::ZERO;
    config
}

/// Contractor with only the required fields
pub fn contractor(name: &str, piid: &str) -> Contractor {
    Contractor {
        name: name.to_string(),
        award_number: piid.to_string(),
        award_number_dashes: String::new(),
        uei: String::new(),
        location: String::new(),
    }
}

/// Write the contractor list where the config expects it
pub fn write_contractors(config: &Config, contractors: &[Contractor]) {
    let path = &config.paths.input_file;
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec_pretty(contractors).unwrap()).unwrap();
}
