//! SauceDemo E2E suite
//!
//! A Rust-controlled end-to-end test suite for the public SauceDemo
//! storefront. The crate:
//! - Encodes each user journey (login, inventory sorting, checkout) as a
//!   declarative scenario of browser steps plus Rust-side checks
//! - Compiles each scenario into a Playwright script and runs it as a Node
//!   subprocess, one isolated browser context per scenario
//! - Reads page text back over a JSON-line stdout channel and evaluates
//!   assertions (error banner, price ordering, completion header) in Rust
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Suite Runner (Rust)                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  SuiteRunner                                                 │
//! │    ├── preflight() — npx playwright + target probe           │
//! │    ├── run_all(parallel) -> SuiteResult                      │
//! │    └── write_results() -> suite-results.json                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Scenario                                                    │
//! │    ├── steps: navigate / fill / click / select / waits /     │
//! │    │          read_text / read_all                           │
//! │    └── checks: text_contains / text_equals /                 │
//! │               prices_ascending (run in Rust over reads)      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Driver — generated Playwright script per scenario,          │
//! │           JSON-line wire protocol over stdout                │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod checks;
pub mod config;
pub mod driver;
pub mod error;
pub mod runner;
pub mod scenario;
pub mod suite;

pub use config::{Credentials, SuiteConfig, Users};
pub use error::{E2eError, E2eResult};
pub use runner::{SuiteResult, SuiteRunner};
pub use scenario::{Scenario, Step};
