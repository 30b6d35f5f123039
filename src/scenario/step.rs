//! Scenario and step types
//!
//! A step is the unit the report speaks in: an acceptance-criteria tag
//! (traceable to the requirement it verifies) plus a free-text intent, and
//! an async body run against the scenario's shared page context. Steps are
//! plain functions returning boxed futures, registered in order.

use std::time::Duration;

use chromiumoxide::Page;
use futures_util::future::BoxFuture;

use crate::common::config::Timeouts;
use crate::common::Result;
use crate::driver::intercept::Interceptor;

/// Context every step receives: the scenario's shared page, its
/// interception engine, and the environment the suite targets.
///
/// The page is an explicitly-owned handle injected by the runner, not an
/// ambient global; cross-step continuity comes from all steps receiving
/// the same one.
#[derive(Clone)]
pub struct StepCtx {
    pub page: Page,
    pub interceptor: Interceptor,
    pub base_url: String,
    pub timeouts: Timeouts,
}

impl StepCtx {
    /// Absolute URL for an application route
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Bound for navigation and generic UI waits
    pub fn ui_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.ui_secs)
    }

    /// Bound for awaiting a matching network response
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.response_secs)
    }

    /// Bound for error-path rendering, which is slower than the happy path
    pub fn error_render_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.error_render_secs)
    }
}

/// A step body: borrows the context for the duration of its future
pub type StepFn<C> = for<'a> fn(&'a C) -> BoxFuture<'a, Result<()>>;

/// A named unit of behavior within a scenario
pub struct Step<C = StepCtx> {
    /// Acceptance-criteria tag, e.g. `E2E-ARC-9`
    pub tag: &'static str,
    /// Free-text intent shown in the report
    pub intent: &'static str,
    pub body: StepFn<C>,
}

impl<C> Step<C> {
    pub fn new(tag: &'static str, intent: &'static str, body: StepFn<C>) -> Self {
        Self { tag, intent, body }
    }

    /// Report identifier: `[tag] intent`
    pub fn id(&self) -> String {
        format!("[{}] {}", self.tag, self.intent)
    }
}

/// An ordered group of steps sharing one browser page
pub struct Scenario<C = StepCtx> {
    pub name: &'static str,
    pub steps: Vec<Step<C>>,
}

/// Hook the runner invokes after every step, pass or fail
pub trait StepBoundary {
    fn end_step(&self) -> BoxFuture<'_, ()>;
}

impl StepBoundary for StepCtx {
    fn end_step(&self) -> BoxFuture<'_, ()> {
        // A rule registered for one step must not leak into the next.
        Box::pin(async move { self.interceptor.clear().await })
    }
}
