//! Playwright browser automation
//!
//! Each scenario is compiled into one Node script that drives Playwright,
//! runs in its own browser context, and reports back over stdout as tagged
//! JSON lines. Text the Rust side must assert on (banners, price lists) is
//! read in the browser and emitted as `read` messages; the script ends with
//! `done` on success or `error` on the first failing step.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::config::{Browser, SuiteConfig};
use crate::error::{E2eError, E2eResult};
use crate::scenario::{Locator, Scenario, Step};

/// Prefix marking wire lines in the child's stdout. Everything else the
/// child prints (Playwright warnings, console noise) is ignored.
const WIRE_PREFIX: &str = "E2E ";

/// Configuration for the browser driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    /// Default timeout applied to every page action.
    pub action_timeout: Duration,
    /// Overall deadline for one scenario, browser startup included.
    pub scenario_timeout: Duration,
}

impl DriverConfig {
    pub fn from_suite(config: &SuiteConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            browser: config.browser,
            headless: config.headless,
            action_timeout: config.action_timeout,
            scenario_timeout: config.scenario_timeout,
        }
    }
}

/// Text collected by a scenario's read steps, keyed by read name.
///
/// An empty value list means the read's selector matched no element.
#[derive(Debug, Clone, Default)]
pub struct PageReads {
    reads: HashMap<String, Vec<String>>,
}

impl PageReads {
    pub fn insert(&mut self, key: &str, values: Vec<String>) {
        self.reads.insert(key.to_string(), values);
    }

    /// First read under `key`, if the selector matched anything.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.reads
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All reads under `key`, if the read step ran at all.
    pub fn all(&self, key: &str) -> Option<&[String]> {
        self.reads.get(key).map(Vec::as_slice)
    }
}

/// Message emitted by the generated script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireMessage {
    Read { key: String, values: Vec<String> },
    Error { message: String },
    Done,
}

/// Drives one browser context per scenario through a generated script.
pub struct Driver {
    config: DriverConfig,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Verify Playwright is installed for the `node` that will run scripts.
    pub fn check_installed() -> E2eResult<()> {
        let status = std::process::Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Run one scenario in a fresh browser context.
    pub async fn run(&self, scenario: &Scenario) -> E2eResult<PageReads> {
        let script = self.build_script(scenario);

        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, &script)?;

        debug!(scenario = %scenario.name, path = %script_path.display(), "running driver script");

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.config.scenario_timeout, cmd.output())
            .await
            .map_err(|_| {
                E2eError::Timeout(format!(
                    "scenario '{}' exceeded {}s overall deadline",
                    scenario.name,
                    self.config.scenario_timeout.as_secs()
                ))
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (reads, error, done) = parse_wire_output(&stdout)?;

        if let Some(message) = error {
            return Err(classify_failure(&message));
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(E2eError::Driver(format!(
                "driver script exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if !done {
            return Err(E2eError::Driver(
                "driver script ended without reporting completion".to_string(),
            ));
        }

        Ok(reads)
    }

    /// Compile a scenario into a standalone Playwright script.
    pub fn build_script(&self, scenario: &Scenario) -> String {
        let mut script = String::new();

        script.push_str(&format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

const emit = (obj) => console.log('{prefix}' + JSON.stringify(obj));

async function resolveOrNull(page, candidates) {{
  for (const sel of candidates) {{
    const loc = page.locator(sel);
    if (await loc.count() > 0) return loc.first();
  }}
  return null;
}}

async function resolve(page, candidates) {{
  const loc = await resolveOrNull(page, candidates);
  if (loc === null) throw new Error('E2E_NO_MATCH ' + candidates.join(' | '));
  return loc;
}}

async function waitForStableText(page, selector, pollMs, timeoutMs) {{
  const deadline = Date.now() + timeoutMs;
  let prev = null;
  while (Date.now() < deadline) {{
    const texts = (await page.locator(selector).allTextContents()).join(' ');
    if (prev !== null && texts === prev) return;
    prev = texts;
    await page.waitForTimeout(pollMs);
  }}
  throw new Error('Timeout: text did not stabilize for ' + selector);
}}

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext();
  const page = await context.newPage();
  page.setDefaultTimeout({action_timeout});
  const baseUrl = '{base_url}';

  try {{
"#,
            prefix = WIRE_PREFIX,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            action_timeout = self.config.action_timeout.as_millis(),
            base_url = js_str(&self.config.base_url),
        ));

        for (i, step) in scenario.steps.iter().enumerate() {
            script.push_str(&format!("    // step {}: {}\n", i + 1, step_name(step)));
            script.push_str(&step_to_js(step));
            script.push('\n');
        }

        script.push_str(
            r#"    emit({ kind: 'done' });
  } catch (error) {
    emit({ kind: 'error', message: String((error && error.message) || error) });
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        script
    }
}

/// Short step description used in generated-script comments and logs.
pub fn step_name(step: &Step) -> String {
    match step {
        Step::Navigate { path } => format!("navigate:{path}"),
        Step::Fill { target, .. } => format!("fill:{}", target.describe()),
        Step::Click { target } => format!("click:{}", target.describe()),
        Step::SelectOption { target, value } => {
            format!("select:{}={value}", target.describe())
        }
        Step::WaitVisible { target, .. } => format!("wait_visible:{}", target.describe()),
        Step::WaitUrl { pattern, .. } => format!("wait_url:{pattern}"),
        Step::WaitNetworkIdle { .. } => "wait_network_idle".to_string(),
        Step::WaitStableText { target, .. } => format!("wait_stable:{}", target.describe()),
        Step::ReadText { key, .. } => format!("read_text:{key}"),
        Step::ReadAll { key, .. } => format!("read_all:{key}"),
    }
}

fn step_to_js(step: &Step) -> String {
    match step {
        Step::Navigate { path } => {
            format!("    await page.goto(baseUrl + '{}');", js_str(path))
        }
        Step::Fill { target, value } => format!(
            "    await (await resolve(page, {})).fill('{}');",
            candidates_js(target),
            js_str(value)
        ),
        Step::Click { target } => format!(
            "    await (await resolve(page, {})).click();",
            candidates_js(target)
        ),
        Step::SelectOption { target, value } => format!(
            "    await (await resolve(page, {})).selectOption('{}');",
            candidates_js(target),
            js_str(value)
        ),
        Step::WaitVisible { target, timeout_ms } => format!(
            "    await page.waitForSelector('{}', {{ state: 'visible', timeout: {} }});",
            js_str(&union_selector(target)),
            timeout_ms
        ),
        Step::WaitUrl {
            pattern,
            timeout_ms,
        } => format!(
            "    await page.waitForURL(new RegExp('{}'), {{ timeout: {} }});",
            js_str(pattern),
            timeout_ms
        ),
        Step::WaitNetworkIdle { timeout_ms } => format!(
            "    await page.waitForLoadState('networkidle', {{ timeout: {} }});",
            timeout_ms
        ),
        Step::WaitStableText {
            target,
            poll_ms,
            timeout_ms,
        } => format!(
            "    await waitForStableText(page, '{}', {}, {});",
            js_str(&union_selector(target)),
            poll_ms,
            timeout_ms
        ),
        Step::ReadText { key, target } => format!(
            "    {{\n      const loc = await resolveOrNull(page, {});\n      emit({{ kind: 'read', key: '{}', values: loc === null ? [] : [(await loc.textContent()) ?? ''] }});\n    }}",
            candidates_js(target),
            js_str(key)
        ),
        Step::ReadAll { key, target } => format!(
            "    emit({{ kind: 'read', key: '{}', values: await page.locator('{}').allTextContents() }});",
            js_str(key),
            js_str(&union_selector(target))
        ),
    }
}

/// Candidate list as a JS array literal.
fn candidates_js(locator: &Locator) -> String {
    let items: Vec<String> = locator
        .candidates
        .iter()
        .map(|sel| format!("'{}'", js_str(sel)))
        .collect();
    format!("[{}]", items.join(", "))
}

/// Candidates combined into one CSS union, for wait/read-all steps where
/// matching any candidate is acceptable.
fn union_selector(locator: &Locator) -> String {
    locator.candidates.join(", ")
}

/// Escape a value for a single-quoted JS string literal.
fn js_str(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}

/// Pull wire messages out of the child's stdout.
///
/// Returns the collected reads, the first error message (if any), and
/// whether the script reported completion.
fn parse_wire_output(stdout: &str) -> E2eResult<(PageReads, Option<String>, bool)> {
    let line_re = Regex::new(&format!("^{}(\\{{.*\\}})$", regex::escape(WIRE_PREFIX)))
        .expect("wire line regex is valid");

    let mut reads = PageReads::default();
    let mut error = None;
    let mut done = false;

    for line in stdout.lines() {
        let Some(caps) = line_re.captures(line.trim_end()) else {
            continue;
        };
        let message: WireMessage = serde_json::from_str(&caps[1])?;
        match message {
            WireMessage::Read { key, values } => reads.insert(&key, values),
            WireMessage::Error { message } => {
                if error.is_none() {
                    error = Some(message);
                }
            }
            WireMessage::Done => done = true,
        }
    }

    Ok((reads, error, done))
}

/// Map a failure message from the script onto the error taxonomy.
fn classify_failure(message: &str) -> E2eError {
    if let Some(rest) = message.strip_prefix("E2E_NO_MATCH ") {
        return E2eError::ElementResolution(rest.to_string());
    }
    let lowered = message.to_lowercase();
    if lowered.contains("timeout") || lowered.contains("exceeded") {
        return E2eError::Timeout(message.to_string());
    }
    E2eError::Driver(message.to_string())
}
