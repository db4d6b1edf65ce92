//! Suite runner: executes scenarios and aggregates a report

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::checks;
use crate::config::SuiteConfig;
use crate::driver::{Driver, DriverConfig};
use crate::error::{E2eError, E2eResult};
use crate::scenario::Scenario;
use crate::suite;

/// Result of running a single scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running the whole suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub started_at: String,
    pub results: Vec<ScenarioResult>,
}

/// Runs scenarios against the configured target, one browser context each.
pub struct SuiteRunner {
    config: SuiteConfig,
}

impl SuiteRunner {
    pub fn new(config: SuiteConfig) -> Self {
        Self { config }
    }

    /// Verify the driver toolchain and the target origin before any run.
    pub async fn preflight(&self) -> E2eResult<()> {
        Driver::check_installed()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let mut last_error = String::new();
        for attempt in 1..=3 {
            match client.get(&self.config.base_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(url = %self.config.base_url, "target reachable");
                    return Ok(());
                }
                Ok(resp) => {
                    last_error = format!("status {}", resp.status());
                    warn!(attempt, "target probe returned {}", resp.status());
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(attempt, "target probe failed: {e}");
                }
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        Err(E2eError::TargetUnreachable {
            url: self.config.base_url.clone(),
            reason: last_error,
        })
    }

    /// Run the full suite.
    pub async fn run_all(&self, parallel: bool) -> E2eResult<SuiteResult> {
        self.run_scenarios(suite::scenarios(&self.config), parallel)
            .await
    }

    /// Run a single scenario by name.
    pub async fn run_named(&self, name: &str) -> E2eResult<SuiteResult> {
        let scenario = suite::scenarios(&self.config)
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::Driver(format!("no scenario named '{name}'")))?;
        self.run_scenarios(vec![scenario], false).await
    }

    /// Run a list of scenarios, sequentially or one task per scenario.
    ///
    /// Scenarios share nothing mutable; each run gets its own browser
    /// context, so parallel execution needs no coordination beyond joining.
    pub async fn run_scenarios(
        &self,
        scenarios: Vec<Scenario>,
        parallel: bool,
    ) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();
        info!("running {} scenario(s)...", scenarios.len());

        let results = if parallel {
            let mut set = JoinSet::new();
            for (index, scenario) in scenarios.into_iter().enumerate() {
                let driver_config = DriverConfig::from_suite(&self.config);
                set.spawn(async move {
                    let result = run_scenario(&Driver::new(driver_config), &scenario).await;
                    (index, result)
                });
            }
            let mut indexed = Vec::new();
            while let Some(joined) = set.join_next().await {
                let (index, result) = joined
                    .map_err(|e| E2eError::Driver(format!("scenario task panicked: {e}")))?;
                indexed.push((index, result));
            }
            indexed.sort_by_key(|(index, _)| *index);
            indexed.into_iter().map(|(_, result)| result).collect()
        } else {
            let driver = Driver::new(DriverConfig::from_suite(&self.config));
            let mut results = Vec::new();
            for scenario in &scenarios {
                results.push(run_scenario(&driver, scenario).await);
            }
            results
        };

        for result in &results {
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        let suite = summarize(results, start.elapsed(), started_at);
        info!(
            "results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );
        Ok(suite)
    }

    /// Write the suite result as pretty JSON under the output directory.
    pub fn write_results(&self, result: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let path = self.config.output_dir.join("suite-results.json");
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(&path, json)?;
        info!("results written to {}", path.display());
        Ok(path)
    }
}

/// Run one scenario end to end: browser steps, then checks over the reads.
///
/// Every failure stays local to the scenario; the caller keeps running the
/// rest of the suite.
async fn run_scenario(driver: &Driver, scenario: &Scenario) -> ScenarioResult {
    let start = Instant::now();
    debug!(scenario = %scenario.name, "starting");

    let outcome = match driver.run(scenario).await {
        Ok(reads) => scenario
            .checks
            .iter()
            .try_for_each(|check| checks::evaluate(check, &reads)),
        Err(e) => Err(e),
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(()) => ScenarioResult {
            name: scenario.name.clone(),
            success: true,
            duration_ms,
            error: None,
        },
        Err(e) => ScenarioResult {
            name: scenario.name.clone(),
            success: false,
            duration_ms,
            error: Some(e.to_string()),
        },
    }
}

fn summarize(results: Vec<ScenarioResult>, elapsed: Duration, started_at: String) -> SuiteResult {
    let passed = results.iter().filter(|r| r.success).count();
    SuiteResult {
        total: results.len(),
        passed,
        failed: results.len() - passed,
        duration_ms: elapsed.as_millis() as u64,
        started_at,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, success: bool) -> ScenarioResult {
        ScenarioResult {
            name: name.to_string(),
            success,
            duration_ms: 10,
            error: if success {
                None
            } else {
                Some("boom".to_string())
            },
        }
    }

    #[test]
    fn summarize_counts_pass_and_fail() {
        let suite = summarize(
            vec![result("a", true), result("b", false), result("c", true)],
            Duration::from_millis(1234),
            "2026-01-01T00:00:00Z".to_string(),
        );
        assert_eq!(suite.total, 3);
        assert_eq!(suite.passed, 2);
        assert_eq!(suite.failed, 1);
        assert_eq!(suite.duration_ms, 1234);
    }

    #[test]
    fn summarize_of_empty_run_is_all_zero() {
        let suite = summarize(vec![], Duration::ZERO, String::new());
        assert_eq!(suite.total, 0);
        assert_eq!(suite.failed, 0);
    }

    #[test]
    fn suite_result_serializes_round_trip() {
        let suite = summarize(
            vec![result("login-standard-user", false)],
            Duration::from_millis(5),
            "2026-01-01T00:00:00Z".to_string(),
        );
        let json = serde_json::to_string(&suite).unwrap();
        let back: SuiteResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.results[0].error.as_deref(), Some("boom"));
    }
}
