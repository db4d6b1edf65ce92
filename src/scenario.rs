//! Scenario model: locators, steps, and post-run checks
//!
//! A scenario is an ordered list of browser steps followed by checks that run
//! in Rust against the text the browser steps read back. Steps execute
//! strictly in order inside one browser context; checks are pure.

use serde::{Deserialize, Serialize};

/// Stable selectors on the storefront pages.
pub mod selectors {
    pub const USERNAME: &str = "#user-name";
    pub const PASSWORD: &str = "#password";
    pub const LOGIN_BUTTON: &str = "#login-button";
    pub const INVENTORY_LIST: &str = ".inventory_list";
    pub const ERROR_MESSAGE: &str = ".error-message-container";
    pub const SORT_CONTAINER: &str = "[data-test=\"product_sort_container\"]";
    pub const SORT_CONTAINER_FALLBACK: &str = "select[class*=\"product_sort_container\"], select";
    pub const ITEM_PRICE: &str = ".inventory_item_price";
    pub const ADD_BACKPACK: &str = "[data-test=\"add-to-cart-sauce-labs-backpack\"]";
    pub const CART_LINK: &str = ".shopping_cart_link";
    pub const CHECKOUT: &str = "[data-test=\"checkout\"]";
    pub const FIRST_NAME: &str = "#first-name";
    pub const LAST_NAME: &str = "#last-name";
    pub const POSTAL_CODE: &str = "#postal-code";
    pub const CONTINUE: &str = "[data-test=\"continue\"]";
    pub const FINISH: &str = "[data-test=\"finish\"]";
    pub const COMPLETE_HEADER: &str = ".complete-header";
}

/// An ordered list of candidate selectors.
///
/// The driver tries each in turn and uses the first with a non-zero match
/// count; if none match, the step fails with an element-resolution error
/// rather than silently acting on nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Locator {
    pub candidates: Vec<String>,
}

impl Locator {
    pub fn new(selector: &str) -> Self {
        Self {
            candidates: vec![selector.to_string()],
        }
    }

    pub fn with_fallback(primary: &str, fallback: &str) -> Self {
        Self {
            candidates: vec![primary.to_string(), fallback.to_string()],
        }
    }

    /// Diagnostic form used in error messages.
    pub fn describe(&self) -> String {
        self.candidates.join(" | ")
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Locator::new(selector)
    }
}

/// A single browser-side step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a path relative to the suite base URL.
    Navigate { path: String },

    /// Fill an input field.
    Fill { target: Locator, value: String },

    /// Click an element.
    Click { target: Locator },

    /// Select an option in a `<select>` by value.
    SelectOption { target: Locator, value: String },

    /// Wait until the element is visible.
    WaitVisible { target: Locator, timeout_ms: u64 },

    /// Wait until the page URL matches a regular expression.
    WaitUrl { pattern: String, timeout_ms: u64 },

    /// Wait until there are no in-flight network requests.
    WaitNetworkIdle { timeout_ms: u64 },

    /// Poll the combined text of all matches until it stops changing
    /// between consecutive reads.
    WaitStableText {
        target: Locator,
        poll_ms: u64,
        timeout_ms: u64,
    },

    /// Read the text content of the first match, stored under `key`.
    /// Zero matches stores an empty read set, not an error; checks over
    /// the key decide whether that fails.
    ReadText { key: String, target: Locator },

    /// Read the text content of every match, stored under `key`.
    ReadAll { key: String, target: Locator },
}

/// A post-run assertion over reads collected by the steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    /// The single read under `key` must contain `needle`. A missing or
    /// empty read fails.
    TextContains { key: String, needle: String },

    /// The single read under `key` must equal `expected` exactly.
    TextEquals { key: String, expected: String },

    /// The reads under `key`, parsed as `$`-prefixed prices, must be a
    /// non-empty non-decreasing sequence.
    PricesAscending { key: String },
}

/// One user journey: browser steps, then Rust-side checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
    pub checks: Vec<Check>,
}

impl Scenario {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Keys every read step stores into.
    pub fn read_keys(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                Step::ReadText { key, .. } | Step::ReadAll { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_fallback_keeps_order() {
        let locator = Locator::with_fallback(
            selectors::SORT_CONTAINER,
            selectors::SORT_CONTAINER_FALLBACK,
        );
        assert_eq!(locator.candidates.len(), 2);
        assert_eq!(locator.candidates[0], selectors::SORT_CONTAINER);
        assert!(locator.describe().contains(" | "));
    }

    #[test]
    fn read_keys_come_from_read_steps_only() {
        let scenario = Scenario::new("sample")
            .step(Step::Navigate {
                path: "/".to_string(),
            })
            .step(Step::ReadText {
                key: "banner".to_string(),
                target: selectors::ERROR_MESSAGE.into(),
            })
            .step(Step::ReadAll {
                key: "prices".to_string(),
                target: selectors::ITEM_PRICE.into(),
            });
        assert_eq!(scenario.read_keys(), vec!["banner", "prices"]);
    }
}
