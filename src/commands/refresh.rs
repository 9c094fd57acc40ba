//! `impala-refresher` command: refresh one table on every node

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{load_target_file, RefreshFile, RunConfig};
use crate::dispatch::{Dispatcher, RunObserver, RunReport, Target, TargetResult};
use crate::impala::{locate_shell, refresh_operation, DEFAULT_IMPALA_SHELL};
use crate::validation::{validate_table_name, validate_target};

/// Raw command-line input, before the config file is merged in
#[derive(Debug, Clone, Default)]
pub struct RefreshRequest {
    pub table: Option<String>,
    pub nodes: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub max_parallel: Option<usize>,
    pub config: Option<PathBuf>,
    pub nodes_file: Option<PathBuf>,
    pub impala_shell: Option<String>,
}

/// Fully resolved and validated refresh run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPlan {
    pub table: String,
    pub targets: Vec<Target>,
    pub shell: String,
    pub run_config: RunConfig,
}

impl RefreshRequest {
    /// Merge flags, nodes file and config file (flags win) and validate the result
    pub fn resolve(self) -> Result<RefreshPlan> {
        let file = match &self.config {
            Some(path) => RefreshFile::load(path)?,
            None => RefreshFile::default(),
        };

        let table = self
            .table
            .or_else(|| file.table.clone())
            .context("No table given. Pass it as the first argument or set `table` in the config file")?;
        validate_table_name(&table)?;

        let mut addresses: Vec<String> = self.nodes;
        if let Some(path) = &self.nodes_file {
            addresses.extend(
                load_target_file(path)?
                    .into_iter()
                    .map(|t| t.address().to_string()),
            );
        }
        addresses.extend(file.nodes.iter().cloned());

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for address in addresses {
            validate_target(&address)?;
            if seen.insert(address.clone()) {
                targets.push(Target::new(address));
            }
        }
        if targets.is_empty() {
            bail!("No nodes given. Pass them as arguments, with --nodes-file, or in the config file");
        }

        let mut run_config = file.apply_to(RunConfig::default());
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                bail!("--timeout must be at least 1 second");
            }
            run_config = run_config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(limit) = self.max_parallel {
            run_config = run_config.with_concurrency_limit(limit);
        }

        let shell = self
            .impala_shell
            .or(file.impala_shell)
            .unwrap_or_else(|| DEFAULT_IMPALA_SHELL.to_string());

        Ok(RefreshPlan {
            table,
            targets,
            shell,
            run_config,
        })
    }
}

/// Execute the refresh command.
///
/// Returns whether every node refreshed; the caller turns that into the
/// exit code.
pub fn execute(request: RefreshRequest) -> Result<bool> {
    let plan = request.resolve()?;
    let shell = locate_shell(&plan.shell)?;
    let operation = refresh_operation(&shell.to_string_lossy(), &plan.table);

    println!(
        "{} Refreshing '{}' on {} node(s)...\n",
        "→".cyan().bold(),
        plan.table,
        plan.targets.len()
    );

    let dispatcher = Dispatcher::new(Arc::new(operation), plan.run_config.clone());
    let report = dispatcher
        .run_with_observer(&plan.targets, &mut ProgressPrinter)
        .context("Refresh run aborted")?;

    print_summary(&report);
    Ok(report.all_succeeded())
}

/// Prints one line per dispatched node and per completion
struct ProgressPrinter;

impl RunObserver for ProgressPrinter {
    fn on_dispatch(&mut self, _index: usize, target: &Target) {
        println!("Refreshing {target}'s metadata...");
    }

    fn on_completion(&mut self, result: &TargetResult) {
        println!("{}", format_result(result));
    }
}

fn format_result(result: &TargetResult) -> String {
    let took = format!("{:.2?}", result.outcome.duration);
    match &result.outcome.error {
        None => format!(
            "{} {} refreshed successfully! Took: {}",
            "✓".green().bold(),
            result.target,
            took
        ),
        Some(error) if error.is_timeout() => format!(
            "{} Node {} timed out! ({})",
            "✗".yellow().bold(),
            result.target,
            error
        ),
        Some(error) => format!(
            "{} {} failed to refresh: {} (took {})",
            "✗".red().bold(),
            result.target,
            error,
            took
        ),
    }
}

fn print_summary(report: &RunReport) {
    let total = report.results().len();
    let elapsed = format!("{:.2?}", report.elapsed());
    println!();
    if report.all_succeeded() {
        println!(
            "{} All {total} node(s) refreshed in {elapsed}",
            "✓".green().bold()
        );
    } else {
        let failed: Vec<String> = report
            .in_dispatch_order()
            .into_iter()
            .filter(|r| !r.succeeded())
            .map(|r| r.target.to_string())
            .collect();
        println!(
            "{} {} of {total} node(s) failed to refresh ({} timed out) in {elapsed}: {}",
            "✗".red().bold(),
            report.failed_count(),
            report.timed_out_count(),
            failed.join(", ")
        );
    }
}
