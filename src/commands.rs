//! CLI command definitions and dispatch

use std::time::Duration;

use clap::Subcommand;
use colored::Colorize;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::driver::session::BrowserSession;
use crate::scenario::{run_scenario, ScenarioReport};
use crate::{flows, preflight};

/// How long the preflight probe waits for the environment
const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run acceptance scenarios against the configured environment
    Run {
        /// Only scenarios whose name or step tags contain this filter
        #[arg(long)]
        filter: Option<String>,

        /// Override the configured base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Run with a visible browser window
        #[arg(long)]
        headed: bool,

        /// Skip the base-URL reachability probe
        #[arg(long)]
        no_preflight: bool,
    },

    /// List scenarios and their steps without running anything
    List,

    /// Probe the configured environment and browser discovery
    Check {
        /// Override the configured base URL
        #[arg(long)]
        base_url: Option<String>,
    },
}

/// Dispatch a CLI command; returns whether the invocation passed
pub async fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Run {
            filter,
            base_url,
            headed,
            no_preflight,
        } => run(filter, base_url, headed, no_preflight).await,

        Commands::List => {
            for scenario in flows::all() {
                println!("{}", scenario.name.bold());
                for step in &scenario.steps {
                    println!("  {}", step.id());
                }
            }
            Ok(true)
        }

        Commands::Check { base_url } => {
            let mut config = Config::load()?;
            if let Some(url) = base_url {
                config.base_url = url;
            }

            let executable = config.browser.resolve_executable()?;
            println!("Browser: {}", executable.display());

            preflight::check_base_url(&config.base_url, PREFLIGHT_TIMEOUT).await?;
            println!("Environment: {} reachable", config.base_url);
            Ok(true)
        }
    }
}

async fn run(
    filter: Option<String>,
    base_url: Option<String>,
    headed: bool,
    no_preflight: bool,
) -> Result<bool> {
    let mut config = Config::load()?;
    if let Some(url) = base_url {
        config.base_url = url;
    }
    if headed {
        config.browser.headless = false;
    }

    let scenarios = match &filter {
        Some(needle) => flows::matching(needle),
        None => flows::all(),
    };
    if scenarios.is_empty() {
        return Err(Error::Config(format!(
            "no scenario matches '{}'",
            filter.unwrap_or_default()
        )));
    }

    if !no_preflight {
        preflight::check_base_url(&config.base_url, PREFLIGHT_TIMEOUT).await?;
    }

    let session = BrowserSession::launch(&config.browser).await?;

    let mut reports: Vec<ScenarioReport> = Vec::with_capacity(scenarios.len());
    for scenario in &scenarios {
        match run_scenario(&session, scenario, &config).await {
            Ok(report) => reports.push(report),
            Err(err) => {
                // A scenario that could not even start counts as failed but
                // must not take the rest of the suite down with it.
                eprintln!(
                    "  {} scenario '{}' aborted: {}",
                    "✗".red(),
                    scenario.name,
                    err
                );
                reports.push(ScenarioReport {
                    name: scenario.name.to_string(),
                    steps: Vec::new(),
                });
            }
        }
    }

    session.shutdown().await?;

    let failures = reports
        .iter()
        .filter(|report| !report.passed() || report.steps.is_empty())
        .count();

    println!();
    for report in &reports {
        let (passed, failed, skipped) = report.counts();
        let marker = if report.passed() && !report.steps.is_empty() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "{} {}: {} passed, {} failed, {} skipped",
            marker, report.name, passed, failed, skipped
        );
    }

    if failures == 0 {
        println!("\n{}", "Suite passed".green().bold());
        Ok(true)
    } else {
        println!(
            "\n{}",
            format!("{failures} scenario(s) failed").red().bold()
        );
        Ok(false)
    }
}
