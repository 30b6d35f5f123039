//! Suite preflight
//!
//! A scenario failing because the environment is down reads like a product
//! regression; probing the base URL first keeps the two kinds of report
//! apart.

use std::time::Duration;

use crate::common::{Error, Result};

/// Probe the environment under test before any scenario runs
pub async fn check_base_url(base_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Preflight(e.to_string()))?;

    let response = client
        .get(base_url)
        .send()
        .await
        .map_err(|e| Error::Preflight(format!("{base_url} is unreachable: {e}")))?;

    let status = response.status();
    if status.is_server_error() {
        return Err(Error::Preflight(format!("{base_url} answered {status}")));
    }

    tracing::info!(%base_url, %status, "environment reachable");
    Ok(())
}
