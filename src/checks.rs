//! Rust-side assertion logic over collected page reads

use crate::driver::PageReads;
use crate::error::{E2eError, E2eResult};
use crate::scenario::Check;

/// Parse one displayed price string ("$29.99") into a number.
///
/// Currency symbols are stripped before parsing; anything that still fails
/// to parse is treated as non-numeric and discarded by the caller.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('$', "");
    let cleaned = cleaned.trim();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse every read under a key, dropping non-numeric entries.
pub fn numeric_prices(raw: &[String]) -> Vec<f64> {
    raw.iter().filter_map(|p| parse_price(p)).collect()
}

/// True when every adjacent pair satisfies `p[i] <= p[i + 1]`.
pub fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Evaluate one check against the reads a scenario collected.
///
/// A key with no stored read means the selector matched nothing in the
/// browser; every check treats that as a failure, never a vacuous pass.
pub fn evaluate(check: &Check, reads: &PageReads) -> E2eResult<()> {
    match check {
        Check::TextContains { key, needle } => {
            let text = require_single(reads, key)?;
            if text.contains(needle) {
                Ok(())
            } else {
                Err(E2eError::AssertionFailed(format!(
                    "read '{key}' does not contain {needle:?}; got {text:?}"
                )))
            }
        }
        Check::TextEquals { key, expected } => {
            let text = require_single(reads, key)?;
            if text == *expected {
                Ok(())
            } else {
                Err(E2eError::AssertionFailed(format!(
                    "read '{key}' expected exactly {expected:?}; got {text:?}"
                )))
            }
        }
        Check::PricesAscending { key } => {
            let raw = reads.all(key).ok_or_else(|| {
                E2eError::AssertionFailed(format!("read '{key}' was never collected"))
            })?;
            let prices = numeric_prices(raw);
            if prices.is_empty() {
                return Err(E2eError::AssertionFailed(format!(
                    "read '{key}' yielded no numeric prices out of {} raw entries",
                    raw.len()
                )));
            }
            if is_non_decreasing(&prices) {
                Ok(())
            } else {
                Err(E2eError::AssertionFailed(format!(
                    "read '{key}' is not sorted ascending: {prices:?}"
                )))
            }
        }
    }
}

fn require_single<'a>(reads: &'a PageReads, key: &str) -> E2eResult<&'a str> {
    match reads.first(key) {
        Some(text) => Ok(text),
        None => Err(E2eError::AssertionFailed(format!(
            "read '{key}' matched no element"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn reads_with(key: &str, values: &[&str]) -> PageReads {
        let mut reads = PageReads::default();
        reads.insert(key, values.iter().map(|v| v.to_string()).collect());
        reads
    }

    #[test_case("$29.99", Some(29.99); "dollar prefix")]
    #[test_case("  $7.99 ", Some(7.99); "surrounding whitespace")]
    #[test_case("15.99", Some(15.99); "bare number")]
    #[test_case("Sold out", None; "non numeric")]
    #[test_case("", None; "empty")]
    #[test_case("$NaN", None; "nan rejected")]
    fn parse_price_cases(raw: &str, expected: Option<f64>) {
        assert_eq!(parse_price(raw), expected);
    }

    #[test]
    fn non_decreasing_accepts_ties_and_singletons() {
        assert!(is_non_decreasing(&[]));
        assert!(is_non_decreasing(&[9.99]));
        assert!(is_non_decreasing(&[7.99, 9.99, 9.99, 15.99]));
        assert!(!is_non_decreasing(&[9.99, 7.99]));
    }

    #[test]
    fn contains_fails_on_missing_read() {
        let check = Check::TextContains {
            key: "error".to_string(),
            needle: "locked out".to_string(),
        };
        let err = evaluate(&check, &PageReads::default()).unwrap_err();
        assert!(err.to_string().contains("matched no element"));
    }

    #[test]
    fn contains_fails_on_empty_text() {
        let check = Check::TextContains {
            key: "error".to_string(),
            needle: "Epic sadface".to_string(),
        };
        let reads = reads_with("error", &[""]);
        assert!(evaluate(&check, &reads).is_err());
    }

    #[test]
    fn contains_passes_on_substring() {
        let check = Check::TextContains {
            key: "error".to_string(),
            needle: "Epic sadface: Sorry, this user has been locked out.".to_string(),
        };
        let reads = reads_with(
            "error",
            &["Epic sadface: Sorry, this user has been locked out."],
        );
        assert!(evaluate(&check, &reads).is_ok());
    }

    #[test]
    fn equals_is_exact_not_substring() {
        let check = Check::TextEquals {
            key: "complete".to_string(),
            expected: "Thank you for your order!".to_string(),
        };
        let exact = reads_with("complete", &["Thank you for your order!"]);
        assert!(evaluate(&check, &exact).is_ok());

        let padded = reads_with("complete", &["Thank you for your order! Come again"]);
        assert!(evaluate(&check, &padded).is_err());
    }

    #[test]
    fn prices_check_rejects_empty_after_filtering() {
        let check = Check::PricesAscending {
            key: "prices".to_string(),
        };
        let reads = reads_with("prices", &["Sold out", "n/a"]);
        let err = evaluate(&check, &reads).unwrap_err();
        assert!(err.to_string().contains("no numeric prices"));
    }

    #[test]
    fn prices_check_ignores_non_numeric_entries() {
        let check = Check::PricesAscending {
            key: "prices".to_string(),
        };
        let reads = reads_with("prices", &["$7.99", "call us", "$9.99", "$15.99"]);
        assert!(evaluate(&check, &reads).is_ok());
    }

    #[test]
    fn prices_check_fails_on_descending_pair() {
        let check = Check::PricesAscending {
            key: "prices".to_string(),
        };
        let reads = reads_with("prices", &["$7.99", "$29.99", "$9.99"]);
        assert!(evaluate(&check, &reads).is_err());
    }
}
