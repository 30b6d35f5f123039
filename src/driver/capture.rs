//! Network response capture
//!
//! A capture must be armed BEFORE the user action that triggers the call:
//! [`PendingResponse::watch`] subscribes to the page's network events and
//! hands back a pending handle, the caller performs the action, then awaits
//! the handle. Arming after the action races the response and is exactly
//! the class of flaky test this shape rules out.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFinished, EventResponseReceived, GetResponseBodyParams,
};
use chromiumoxide::Page;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::pattern::UrlPattern;
use crate::common::{Error, Result};

/// How long to wait for a matched response body to finish loading before
/// asking for it anyway
const BODY_SETTLE: Duration = Duration::from_secs(5);

/// A response listener armed before the action that triggers the call
pub struct PendingResponse {
    page: Page,
    pattern: UrlPattern,
    responses: BoxStream<'static, Arc<EventResponseReceived>>,
    finished: BoxStream<'static, Arc<EventLoadingFinished>>,
}

impl PendingResponse {
    /// Arm a listener for the first response matching `pattern`.
    ///
    /// Call this before clicking or navigating, then await
    /// [`PendingResponse::json`] afterwards.
    pub async fn watch(page: &Page, pattern: UrlPattern) -> Result<Self> {
        // Network events only flow once the domain is enabled.
        page.execute(EnableParams::default()).await?;
        let responses = page
            .event_listener::<EventResponseReceived>()
            .await?
            .boxed();
        let finished = page.event_listener::<EventLoadingFinished>().await?.boxed();

        Ok(Self {
            page: page.clone(),
            pattern,
            responses,
            finished,
        })
    }

    /// Await the matching response and return its parsed JSON body
    pub async fn json(mut self, timeout: Duration) -> Result<Value> {
        let secs = timeout.as_secs();
        let what = format!("response matching '{}'", self.pattern);
        tokio::time::timeout(timeout, self.next_match())
            .await
            .map_err(|_| Error::timeout(what, secs))?
    }

    /// Await the matching response and deserialize its body
    pub async fn parsed<T: DeserializeOwned>(self, timeout: Duration) -> Result<T> {
        let value = self.json(timeout).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn next_match(&mut self) -> Result<Value> {
        while let Some(event) = self.responses.next().await {
            let url = event.response.url.clone();
            if !self.pattern.matches(&url) {
                continue;
            }
            tracing::debug!(%url, status = event.response.status, "captured response");

            // The body may still be streaming when responseReceived fires;
            // give it a moment to finish before fetching.
            let request_id = event.request_id.clone();
            let settle = async {
                while let Some(done) = self.finished.next().await {
                    if done.request_id == request_id {
                        break;
                    }
                }
            };
            let _ = tokio::time::timeout(BODY_SETTLE, settle).await;

            let body = self
                .page
                .execute(GetResponseBodyParams::new(event.request_id.clone()))
                .await?;

            let raw = if body.base64_encoded {
                let bytes = BASE64.decode(body.body.as_bytes()).map_err(|e| {
                    Error::ResponseDecode {
                        url: url.clone(),
                        detail: e.to_string(),
                    }
                })?;
                String::from_utf8_lossy(&bytes).into_owned()
            } else {
                body.body.clone()
            };

            return serde_json::from_str(&raw)
                .map_err(|source| Error::ResponseParse { url, source });
        }

        Err(Error::precondition(format!(
            "network event stream closed before a response matching '{}' arrived",
            self.pattern
        )))
    }
}
