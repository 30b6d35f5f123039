//! Request interception
//!
//! A per-page engine on the CDP Fetch domain. Rules are declarative and the
//! most recently registered rule wins; requests matching no rule continue
//! to the network untouched. The scenario runner clears rules at every step
//! boundary so a fault injected for one step never leaks into the next.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, DisableParams, EnableParams, EventRequestPaused,
    FailRequestParams, FulfillRequestParams, HeaderEntry, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
use chromiumoxide::Page;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::RwLock;

use super::pattern::UrlPattern;
use crate::common::{Error, Result};

/// What to do with a matched request
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Let the request through to the network
    Passthrough,
    /// Answer with the given status and optional JSON body
    Fulfill { status: u16, json: Option<Value> },
    /// Answer 200 with the given JSON body
    FulfillJson(Value),
    /// Answer 200 with the given HTML document
    FulfillHtml(String),
    /// Drop the connection. The client sees a network failure rather than
    /// an HTTP error; the application renders different messaging for the
    /// two fault kinds.
    Abort,
}

/// An interception rule: requests matching `pattern` get `behavior`
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: UrlPattern,
    pub behavior: Behavior,
}

/// Per-page interception engine
#[derive(Clone)]
pub struct Interceptor {
    page: Page,
    rules: Arc<RwLock<Vec<Rule>>>,
}

impl Interceptor {
    /// Enable the Fetch domain on the page and start serving rules.
    ///
    /// Every request on the page pauses at the engine from here on; with no
    /// matching rule it is continued unchanged.
    pub async fn install(page: &Page) -> Result<Self> {
        let rules: Arc<RwLock<Vec<Rule>>> = Arc::default();

        let params = EnableParams {
            patterns: Some(vec![RequestPattern {
                url_pattern: Some("*".to_string()),
                resource_type: None,
                request_stage: None,
            }]),
            handle_auth_requests: None,
        };
        page.execute(params).await?;

        let mut paused = page.event_listener::<EventRequestPaused>().await?;
        let worker_page = page.clone();
        let worker_rules = Arc::clone(&rules);
        tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let behavior = {
                    let rules = worker_rules.read().await;
                    rules
                        .iter()
                        .find(|rule| rule.pattern.matches(&event.request.url))
                        .map(|rule| rule.behavior.clone())
                };
                if let Err(err) = resolve(&worker_page, event.as_ref(), behavior).await {
                    tracing::debug!(
                        url = %event.request.url,
                        %err,
                        "failed to resolve paused request"
                    );
                }
            }
        });

        Ok(Self {
            page: page.clone(),
            rules,
        })
    }

    /// Register a rule. Must happen before the action that triggers the
    /// request; the newest registration takes precedence.
    pub async fn register(&self, pattern: UrlPattern, behavior: Behavior) {
        tracing::debug!(pattern = %pattern, "registering interception rule");
        self.rules.write().await.insert(0, Rule { pattern, behavior });
    }

    /// Drop all rules; requests already matched keep their behavior
    pub async fn clear(&self) {
        self.rules.write().await.clear();
    }

    /// Disable the Fetch domain entirely (page teardown)
    pub async fn uninstall(&self) -> Result<()> {
        self.clear().await;
        self.page.execute(DisableParams::default()).await?;
        Ok(())
    }
}

async fn resolve(
    page: &Page,
    event: &EventRequestPaused,
    behavior: Option<Behavior>,
) -> Result<()> {
    match behavior.unwrap_or(Behavior::Passthrough) {
        Behavior::Passthrough => {
            page.execute(ContinueRequestParams::new(event.request_id.clone()))
                .await?;
        }
        Behavior::Abort => {
            page.execute(FailRequestParams::new(
                event.request_id.clone(),
                ErrorReason::ConnectionAborted,
            ))
            .await?;
        }
        Behavior::Fulfill { status, json } => {
            let body = json.map(|value| serde_json::to_vec(&value)).transpose()?;
            fulfill(page, event, status, "application/json", body).await?;
        }
        Behavior::FulfillJson(value) => {
            let body = serde_json::to_vec(&value)?;
            fulfill(page, event, 200, "application/json", Some(body)).await?;
        }
        Behavior::FulfillHtml(html) => {
            fulfill(page, event, 200, "text/html", Some(html.into_bytes())).await?;
        }
    }
    Ok(())
}

async fn fulfill(
    page: &Page,
    event: &EventRequestPaused,
    status: u16,
    content_type: &str,
    body: Option<Vec<u8>>,
) -> Result<()> {
    let mut builder = FulfillRequestParams::builder()
        .request_id(event.request_id.clone())
        .response_code(i64::from(status))
        .response_header(HeaderEntry::new("content-type", content_type))
        // Substituted responses must still pass the page's CORS checks.
        .response_header(HeaderEntry::new("access-control-allow-origin", "*"));

    if let Some(bytes) = body {
        builder = builder.body(BASE64.encode(bytes));
    }

    let params = builder.build().map_err(Error::Config)?;
    page.execute(params).await?;
    Ok(())
}
