//! The SauceDemo scenarios
//!
//! Four user journeys over the storefront: the two login outcomes, price
//! sorting, and checkout. All of them go through the same login routine,
//! parameterized by credentials and by whether login is expected to land
//! on the inventory page.

use std::time::Duration;

use crate::config::{Credentials, SuiteConfig};
use crate::scenario::{selectors, Check, Locator, Scenario, Step};

/// URL pattern that marks arrival on the inventory page.
pub const INVENTORY_URL_PATTERN: &str = r"inventory\.html";

/// Banner text shown when a locked-out account tries to log in.
pub const LOCKED_OUT_MESSAGE: &str = "Epic sadface: Sorry, this user has been locked out.";

/// Header text shown after a completed order.
pub const ORDER_COMPLETE_MESSAGE: &str = "Thank you for your order!";

/// Value of the low-to-high option in the sort dropdown.
const SORT_LOW_TO_HIGH: &str = "lohi";

/// Whether a login attempt should land on the inventory page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginExpectation {
    /// Wait for the inventory URL after submitting.
    Success,
    /// Submit and stop; the caller asserts on the error banner.
    Failure,
}

/// The shared login routine: navigate, fill credentials, submit.
///
/// On [`LoginExpectation::Success`] a URL wait is appended so every caller
/// gets the same arrival guarantee; the failure path skips it since the
/// page is expected to stay on the login form.
pub fn login_steps(
    user: &Credentials,
    expectation: LoginExpectation,
    load_timeout: Duration,
) -> Vec<Step> {
    let mut steps = vec![
        Step::Navigate {
            path: "/".to_string(),
        },
        Step::Fill {
            target: selectors::USERNAME.into(),
            value: user.username.clone(),
        },
        Step::Fill {
            target: selectors::PASSWORD.into(),
            value: user.password.clone(),
        },
        Step::Click {
            target: selectors::LOGIN_BUTTON.into(),
        },
    ];

    if expectation == LoginExpectation::Success {
        steps.push(Step::WaitUrl {
            pattern: INVENTORY_URL_PATTERN.to_string(),
            timeout_ms: load_timeout.as_millis() as u64,
        });
    }

    steps
}

/// Build the full scenario list for one suite run.
pub fn scenarios(config: &SuiteConfig) -> Vec<Scenario> {
    vec![
        login_standard_user(config),
        login_locked_out_user(config),
        sort_low_to_high(config),
        checkout_completion(config),
    ]
}

fn login_standard_user(config: &SuiteConfig) -> Scenario {
    let load_ms = config.load_timeout.as_millis() as u64;
    Scenario::new("login-standard-user")
        .steps(login_steps(
            &config.users.standard,
            LoginExpectation::Success,
            config.load_timeout,
        ))
        // Both must hold: the URL matched above, and the list is visible.
        .step(Step::WaitVisible {
            target: selectors::INVENTORY_LIST.into(),
            timeout_ms: load_ms,
        })
}

fn login_locked_out_user(config: &SuiteConfig) -> Scenario {
    Scenario::new("login-locked-out-user")
        .steps(login_steps(
            &config.users.locked_out,
            LoginExpectation::Failure,
            config.load_timeout,
        ))
        .step(Step::ReadText {
            key: "error".to_string(),
            target: selectors::ERROR_MESSAGE.into(),
        })
        .check(Check::TextContains {
            key: "error".to_string(),
            needle: LOCKED_OUT_MESSAGE.to_string(),
        })
}

fn sort_low_to_high(config: &SuiteConfig) -> Scenario {
    let load_ms = config.load_timeout.as_millis() as u64;
    let sort_control = Locator::with_fallback(
        selectors::SORT_CONTAINER,
        selectors::SORT_CONTAINER_FALLBACK,
    );

    Scenario::new("inventory-sort-low-to-high")
        .steps(login_steps(
            &config.users.standard,
            LoginExpectation::Success,
            config.load_timeout,
        ))
        .step(Step::WaitNetworkIdle {
            timeout_ms: load_ms,
        })
        .step(Step::WaitVisible {
            target: selectors::INVENTORY_LIST.into(),
            timeout_ms: load_ms,
        })
        .step(Step::WaitVisible {
            target: sort_control.clone(),
            timeout_ms: load_ms,
        })
        .step(Step::SelectOption {
            target: sort_control,
            value: SORT_LOW_TO_HIGH.to_string(),
        })
        // Reordering has no loading indicator; poll until the displayed
        // prices stop changing instead of sleeping a fixed interval.
        .step(Step::WaitStableText {
            target: selectors::ITEM_PRICE.into(),
            poll_ms: 250,
            timeout_ms: 5_000,
        })
        .step(Step::ReadAll {
            key: "prices".to_string(),
            target: selectors::ITEM_PRICE.into(),
        })
        .check(Check::PricesAscending {
            key: "prices".to_string(),
        })
}

fn checkout_completion(config: &SuiteConfig) -> Scenario {
    Scenario::new("checkout-completion")
        .steps(login_steps(
            &config.users.standard,
            LoginExpectation::Success,
            config.load_timeout,
        ))
        .step(Step::Click {
            target: selectors::ADD_BACKPACK.into(),
        })
        .step(Step::Click {
            target: selectors::CART_LINK.into(),
        })
        .step(Step::Click {
            target: selectors::CHECKOUT.into(),
        })
        .step(Step::Fill {
            target: selectors::FIRST_NAME.into(),
            value: "John".to_string(),
        })
        .step(Step::Fill {
            target: selectors::LAST_NAME.into(),
            value: "Doe".to_string(),
        })
        .step(Step::Fill {
            target: selectors::POSTAL_CODE.into(),
            value: "12345".to_string(),
        })
        .step(Step::Click {
            target: selectors::CONTINUE.into(),
        })
        .step(Step::Click {
            target: selectors::FINISH.into(),
        })
        .step(Step::ReadText {
            key: "complete".to_string(),
            target: selectors::COMPLETE_HEADER.into(),
        })
        .check(Check::TextEquals {
            key: "complete".to_string(),
            expected: ORDER_COMPLETE_MESSAGE.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SuiteConfig {
        SuiteConfig::default()
    }

    #[test]
    fn suite_has_four_uniquely_named_scenarios() {
        let scenarios = scenarios(&config());
        assert_eq!(scenarios.len(), 4);
        let mut names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn every_login_goes_through_the_shared_routine() {
        let cfg = config();
        let expected = login_steps(
            &cfg.users.standard,
            LoginExpectation::Success,
            cfg.load_timeout,
        );
        for scenario in [
            login_standard_user(&cfg),
            sort_low_to_high(&cfg),
            checkout_completion(&cfg),
        ] {
            let prefix: Vec<String> = scenario.steps[..expected.len()]
                .iter()
                .map(|s| serde_json::to_string(s).unwrap())
                .collect();
            let expected_json: Vec<String> = expected
                .iter()
                .map(|s| serde_json::to_string(s).unwrap())
                .collect();
            assert_eq!(prefix, expected_json, "scenario {}", scenario.name);
        }
    }

    #[test]
    fn locked_out_login_skips_the_url_wait() {
        let cfg = config();
        let steps = login_steps(
            &cfg.users.locked_out,
            LoginExpectation::Failure,
            cfg.load_timeout,
        );
        assert!(steps
            .iter()
            .all(|s| !matches!(s, Step::WaitUrl { .. })));
    }

    #[test]
    fn standard_login_waits_for_url_and_list() {
        let scenario = login_standard_user(&config());
        assert!(scenario
            .steps
            .iter()
            .any(|s| matches!(s, Step::WaitUrl { pattern, .. } if pattern == INVENTORY_URL_PATTERN)));
        assert!(matches!(
            scenario.steps.last(),
            Some(Step::WaitVisible { .. })
        ));
    }

    #[test]
    fn sort_scenario_uses_fallback_and_stable_wait() {
        let scenario = sort_low_to_high(&config());
        let select = scenario
            .steps
            .iter()
            .find_map(|s| match s {
                Step::SelectOption { target, value } => Some((target, value)),
                _ => None,
            })
            .expect("sort scenario selects an option");
        assert_eq!(select.0.candidates.len(), 2);
        assert_eq!(select.1, SORT_LOW_TO_HIGH);
        assert!(scenario
            .steps
            .iter()
            .any(|s| matches!(s, Step::WaitStableText { .. })));
        assert_eq!(scenario.read_keys(), vec!["prices"]);
    }

    #[test]
    fn checkout_reads_the_completion_header_last() {
        let scenario = checkout_completion(&config());
        assert!(matches!(
            scenario.steps.last(),
            Some(Step::ReadText { key, .. }) if key == "complete"
        ));
        assert!(scenario.checks.iter().any(|c| matches!(
            c,
            Check::TextEquals { expected, .. } if expected == ORDER_COMPLETE_MESSAGE
        )));
    }
}
