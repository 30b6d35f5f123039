//! Scenario execution
//!
//! One page per scenario: opened before the first step, closed after the
//! last regardless of outcome. Steps run strictly in order on that page; a
//! later step may assume whatever URL and storage state the previous step
//! left behind. The first failure stops the scenario, remaining steps are
//! reported as skipped, and the page-close cleanup still executes.

use colored::Colorize;

use crate::common::config::Config;
use crate::common::Result;
use crate::driver::intercept::Interceptor;
use crate::driver::session::BrowserSession;

use super::step::{Scenario, Step, StepBoundary, StepCtx};

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed(String),
    /// Not run because an earlier step failed
    Skipped,
}

/// Report line for one step
#[derive(Debug, Clone)]
pub struct StepReport {
    pub tag: String,
    pub intent: String,
    pub outcome: StepOutcome,
}

/// Full report for one scenario
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.steps
            .iter()
            .all(|step| step.outcome == StepOutcome::Passed)
    }

    /// (passed, failed, skipped)
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for step in &self.steps {
            match step.outcome {
                StepOutcome::Passed => counts.0 += 1,
                StepOutcome::Failed(_) => counts.1 += 1,
                StepOutcome::Skipped => counts.2 += 1,
            }
        }
        counts
    }
}

/// Run one scenario against a fresh page of the shared browser session
pub async fn run_scenario(
    session: &BrowserSession,
    scenario: &Scenario,
    config: &Config,
) -> Result<ScenarioReport> {
    println!(
        "\n{} {}",
        "Running:".blue().bold(),
        scenario.name.white().bold()
    );

    let page = session.new_page().await?;
    let interceptor = Interceptor::install(&page).await?;
    let ctx = StepCtx {
        page: page.clone(),
        interceptor: interceptor.clone(),
        base_url: config.base_url.clone(),
        timeouts: config.timeouts.clone(),
    };

    let steps = run_steps(&ctx, &scenario.steps).await;

    // Cleanup runs on every exit path, assertion failures included.
    if let Err(err) = interceptor.uninstall().await {
        tracing::debug!(%err, "failed to disable interception during teardown");
    }
    if let Err(err) = page.close().await {
        tracing::warn!(%err, "failed to close scenario page");
    }

    Ok(ScenarioReport {
        name: scenario.name.to_string(),
        steps,
    })
}

/// Execute steps serially, stopping at the first failure.
///
/// Generic over the context so ordering semantics stay testable without a
/// browser; the production context is [`StepCtx`].
pub async fn run_steps<C: StepBoundary>(ctx: &C, steps: &[Step<C>]) -> Vec<StepReport> {
    let mut reports = Vec::with_capacity(steps.len());
    let mut failed = false;

    for step in steps {
        if failed {
            println!("  {} {}", "-".dimmed(), step.id().dimmed());
            reports.push(StepReport {
                tag: step.tag.to_string(),
                intent: step.intent.to_string(),
                outcome: StepOutcome::Skipped,
            });
            continue;
        }

        let outcome = match (step.body)(ctx).await {
            Ok(()) => {
                println!("  {} {}", "✓".green(), step.id());
                StepOutcome::Passed
            }
            Err(err) => {
                println!("  {} {}: {}", "✗".red(), step.id(), err);
                failed = true;
                StepOutcome::Failed(err.to_string())
            }
        };
        reports.push(StepReport {
            tag: step.tag.to_string(),
            intent: step.intent.to_string(),
            outcome,
        });

        ctx.end_step().await;
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TestCtx {
        runs: AtomicUsize,
        boundaries: AtomicUsize,
    }

    impl StepBoundary for TestCtx {
        fn end_step(&self) -> BoxFuture<'_, ()> {
            Box::pin(async move {
                self.boundaries.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    fn passing(ctx: &TestCtx) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            ctx.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn failing(ctx: &TestCtx) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            ctx.runs.fetch_add(1, Ordering::SeqCst);
            Err(Error::precondition("boom"))
        })
    }

    #[tokio::test]
    async fn test_all_steps_run_in_order_when_passing() {
        let ctx = TestCtx::default();
        let steps = vec![
            Step::new("T-1", "first", passing),
            Step::new("T-2", "second", passing),
        ];

        let reports = run_steps(&ctx, &steps).await;

        assert_eq!(ctx.runs.load(Ordering::SeqCst), 2);
        assert!(reports.iter().all(|r| r.outcome == StepOutcome::Passed));
    }

    #[tokio::test]
    async fn test_failure_stops_the_scenario_and_skips_the_rest() {
        let ctx = TestCtx::default();
        let steps = vec![
            Step::new("T-1", "first", passing),
            Step::new("T-2", "second", failing),
            Step::new("T-3", "third", passing),
        ];

        let reports = run_steps(&ctx, &steps).await;

        // the step after the failure never ran
        assert_eq!(ctx.runs.load(Ordering::SeqCst), 2);
        assert_eq!(reports[0].outcome, StepOutcome::Passed);
        assert!(matches!(reports[1].outcome, StepOutcome::Failed(_)));
        assert_eq!(reports[2].outcome, StepOutcome::Skipped);

        let report = ScenarioReport {
            name: "test".to_string(),
            steps: reports,
        };
        assert!(!report.passed());
        assert_eq!(report.counts(), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_step_boundary_runs_after_executed_steps_only() {
        let ctx = TestCtx::default();
        let steps = vec![
            Step::new("T-1", "first", failing),
            Step::new("T-2", "second", passing),
        ];

        run_steps(&ctx, &steps).await;

        // boundary hook ran for the failed step but not the skipped one
        assert_eq!(ctx.boundaries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_message_is_preserved() {
        let ctx = TestCtx::default();
        let steps = vec![Step::new("T-1", "only", failing)];

        let reports = run_steps(&ctx, &steps).await;

        match &reports[0].outcome {
            StepOutcome::Failed(message) => assert!(message.contains("boom")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
