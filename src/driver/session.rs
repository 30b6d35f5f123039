//! Browser session lifecycle
//!
//! Owns the Chromium process for the lifetime of a suite run. Scenarios
//! borrow pages from here; the session outlives every scenario and is shut
//! down once at the end.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::common::config::BrowserSettings;
use crate::common::{Error, Result};

/// A running browser plus the task pumping its CDP messages
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch Chromium with the configured executable and window size
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let executable = settings.resolve_executable()?;
        tracing::info!(browser = %executable.display(), "launching browser");

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable.as_path())
            .window_size(settings.window_width, settings.window_height);
        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        for arg in &settings.args {
            builder = builder.arg(arg.as_str());
        }
        let config = builder.build().map_err(Error::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // Drive CDP messages until the browser goes away.
        let handler = tokio::spawn(async move {
            while let Some(message) = handler.next().await {
                if message.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    /// Open a fresh blank page; each scenario gets exactly one
    pub async fn new_page(&self) -> Result<Page> {
        Ok(self.browser.new_page("about:blank").await?)
    }

    /// Close the browser and stop the message pump
    pub async fn shutdown(mut self) -> Result<()> {
        self.browser.close().await?;
        let _ = self.browser.wait().await;
        self.handler.abort();
        Ok(())
    }
}
