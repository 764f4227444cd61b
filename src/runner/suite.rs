//! Suite aggregation
//!
//! One session per suite run: started before the first scenario, lent to
//! each scenario in turn, closed after the last one.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Stdio;

use super::scenario::{Scenario, ScenarioRunner};
use super::state::{SuiteResult, Verdict, VerdictLog, VerdictStatus};
use crate::driver::SessionFactory;
use crate::error::HarnessResult;
use crate::report::SuiteReport;
use crate::utils::config::HarnessConfig;

/// Ordered verdicts of one suite run plus their summary
#[derive(Debug, Clone)]
pub struct SuiteOutcome {
    pub suite: String,
    pub verdicts: Vec<Verdict>,
    pub summary: SuiteResult,
}

impl SuiteOutcome {
    pub fn into_report(self) -> SuiteReport {
        SuiteReport::new(&self.suite, self.verdicts)
    }
}

/// Run `scenarios` in order on a single session.
///
/// Only a launch failure is returned as an error; every scenario yields
/// exactly one verdict whatever happens inside it.
pub async fn run_suite(
    factory: &dyn SessionFactory,
    config: &HarnessConfig,
    suite: &str,
    scenarios: &[Scenario],
) -> HarnessResult<SuiteOutcome> {
    println!("\n{} {}", "▶".cyan(), suite.bold());
    log::info!("Starting session against {}", config.base_url);

    let session = factory.start(&config.base_url, &config.session).await?;
    let runner = ScenarioRunner::new(config);
    let mut log = VerdictLog::new();

    for scenario in scenarios {
        let verdict = runner.run(session.as_ref(), scenario).await;
        print_verdict(&verdict);
        log.record(verdict);
    }

    if let Err(e) = session.close().await {
        log::warn!("Failed to close browser session: {}", e);
    }

    let summary = log.summary();
    print_summary(suite, &summary);

    Ok(SuiteOutcome {
        suite: suite.to_string(),
        verdicts: log.into_verdicts(),
        summary,
    })
}

fn print_verdict(verdict: &Verdict) {
    let label = format!("[{}]", verdict.status.label());
    let label = match verdict.status {
        VerdictStatus::Passed => label.green().bold(),
        VerdictStatus::Failed => label.red().bold(),
        VerdictStatus::Skipped => label.yellow().bold(),
    };
    println!(
        "  {} {} - {} {}",
        label,
        verdict.name,
        verdict.detail,
        format!("({}ms)", verdict.duration_ms).dimmed()
    );
}

fn print_summary(suite: &str, summary: &SuiteResult) {
    let line = format!(
        "{}: {} total, {} passed, {} failed, {} skipped",
        suite, summary.total, summary.passed, summary.failed, summary.skipped
    );
    if summary.success() {
        println!("{} {}", "✓".green(), line);
    } else {
        println!("{} {}", "✗".red(), line);
    }
}

/// Run every suite as a child process of this binary, in order.
///
/// Returns the process exit code: 1 if any child exited non-zero.
pub async fn run_all_suites(config: &HarnessConfig, suites: &[&str]) -> Result<i32> {
    let exe = std::env::current_exe().context("Failed to locate the harness binary")?;
    let mut results = Vec::with_capacity(suites.len());

    for suite in suites {
        println!("\n{} Running {}", "[RUN]".cyan().bold(), suite);
        let status = tokio::process::Command::new(&exe)
            .arg("run")
            .arg(suite)
            .envs(config.to_env())
            .stdin(Stdio::null())
            .status()
            .await
            .with_context(|| format!("Failed to start suite {}", suite))?;
        // Killed by a signal: no code
        results.push((suite.to_string(), status.code().unwrap_or(-1)));
    }

    println!("\n{}", "[SUMMARY]".bold());
    for (suite, code) in &results {
        let line = format!("  {}: exit {}", suite, code);
        if *code == 0 {
            println!("{}", line.green());
        } else {
            println!("{}", line.red());
        }
    }

    Ok(summary_exit_code(&results))
}

fn summary_exit_code(results: &[(String, i32)]) -> i32 {
    if results.iter().all(|(_, code)| *code == 0) {
        0
    } else {
        1
    }
}
