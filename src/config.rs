//! Suite configuration and the credential fixture

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides the target origin.
pub const BASE_URL_ENV: &str = "SAUCEDEMO_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// A username/password pair for the storefront login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// The two fixed fixture users the suite runs with.
///
/// Built once at suite start and shared read-only; scenarios never mutate it.
#[derive(Debug, Clone)]
pub struct Users {
    /// Accepted at login.
    pub standard: Credentials,
    /// Rejected at login with the locked-out banner.
    pub locked_out: Credentials,
}

impl Users {
    pub fn fixture() -> Self {
        Self {
            standard: Credentials::new("standard_user", "secret_sauce"),
            locked_out: Credentials::new("locked_out_user", "secret_sauce"),
        }
    }
}

/// Configuration for a suite run.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Target origin, no trailing slash.
    pub base_url: String,

    /// Fixture users.
    pub users: Users,

    /// Bound on waits for page-load / element-visibility preconditions.
    pub load_timeout: Duration,

    /// Bound on default element waits inside a scenario body.
    pub action_timeout: Duration,

    /// Overall deadline for a single scenario, browser startup included.
    pub scenario_timeout: Duration,

    /// Browser to launch.
    pub browser: Browser,

    /// Run the browser without a visible window.
    pub headless: bool,

    /// Directory for the JSON results report.
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            users: Users::fixture(),
            load_timeout: Duration::from_secs(10),
            action_timeout: Duration::from_secs(5),
            scenario_timeout: Duration::from_secs(90),
            browser: Browser::Chromium,
            headless: true,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(format!("unknown browser: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_users_are_the_two_known_accounts() {
        let users = Users::fixture();
        assert_eq!(users.standard.username, "standard_user");
        assert_eq!(users.locked_out.username, "locked_out_user");
        assert_eq!(users.standard.password, users.locked_out.password);
    }

    #[test]
    fn default_config_has_no_trailing_slash() {
        let config = SuiteConfig::default();
        assert!(!config.base_url.ends_with('/'));
    }

    #[test]
    fn browser_round_trips_through_str() {
        for browser in [Browser::Chromium, Browser::Firefox, Browser::Webkit] {
            assert_eq!(browser.as_str().parse::<Browser>().unwrap(), browser);
        }
        assert!("safari".parse::<Browser>().is_err());
    }
}
