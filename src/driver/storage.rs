//! Cross-step state channel
//!
//! Steps pass data forward through the page's sessionStorage, the same
//! store the application itself uses. sessionStorage is scoped to the tab:
//! it survives same-tab navigation and reload and is discarded when the
//! scenario's page closes. A missing key is a broken precondition and fails
//! the reading step immediately; nothing is defaulted.

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::{Error, Result};

/// Keys with a documented producer/consumer contract
pub mod keys {
    /// Opt-in flag the application writes after the consent modal is
    /// accepted. Producer: the app. Consumer: the notice list step.
    pub const OPTIN: &str = "OPTIN";

    /// The notice record the application stores when a list entry is
    /// selected. Producer: the app during the list step. Consumer: the
    /// notice detail step.
    pub const PAYMENT_NOTICE: &str = "paymentNotice";

    /// Harness-owned: the event id of the notice row opened by the receipt
    /// detail step, read back by the network-fault step.
    pub const SELECTED_EVENT: &str = "e2e:selectedEventId";
}

/// Typed access to a page's sessionStorage
pub struct StateChannel<'p> {
    page: &'p Page,
}

impl<'p> StateChannel<'p> {
    pub fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// Serialize `value` under `key`
    pub async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        let script = format!(
            "sessionStorage.setItem({}, {})",
            serde_json::to_string(key)?,
            serde_json::to_string(&serialized)?,
        );
        self.page.evaluate(script).await?;
        Ok(())
    }

    /// Raw read; `None` when the key was never written
    pub async fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let script = format!(
            "sessionStorage.getItem({})",
            serde_json::to_string(key)?
        );
        let value: Option<String> = self.page.evaluate(script).await?.into_value()?;
        Ok(value)
    }

    /// Read and deserialize a key an earlier step (or the application)
    /// must have written. Absence fails fast instead of letting the step
    /// continue on defaults.
    pub async fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let raw = self.read_raw(key).await?.ok_or_else(|| {
            Error::precondition(format!(
                "sessionStorage key '{key}' is not set; an earlier step should have produced it"
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::precondition(format!(
                "sessionStorage key '{key}' holds unparseable data: {e}"
            ))
        })
    }

    /// True when the key exists and is non-empty
    pub async fn is_set(&self, key: &str) -> Result<bool> {
        Ok(self
            .read_raw(key)
            .await?
            .is_some_and(|value| !value.is_empty()))
    }
}
