//! DOM-side assertions and response/DOM correlation
//!
//! Every wait is bounded: an expired bound becomes a step failure naming
//! the awaited condition, never a hang. Text queries read `innerText`,
//! which is what the user actually sees. Queries run as JavaScript in the
//! page so they observe the live DOM, framework-rendered content included.

use std::time::Duration;

use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use serde_json::Value;
use tokio::time::{sleep, Instant};

use crate::common::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Assert the page URL equals `expected` within `timeout`
pub async fn expect_url(page: &Page, expected: &str, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        let actual = page.url().await?.unwrap_or_default();
        if actual == expected {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::assertion("page URL", expected, actual));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Wait until the literal `text` is present in the page's visible text
pub async fn wait_for_text(page: &Page, text: &str, timeout: Duration) -> Result<()> {
    let script = format!(
        "!!(document.body && document.body.innerText.includes({}))",
        js_str(text)?
    );
    wait_for_condition(page, &script, &format!("text '{text}'"), timeout).await
}

/// Assert the literal `text` is not currently rendered
pub async fn expect_text_absent(page: &Page, text: &str) -> Result<()> {
    let script = format!(
        "!!(document.body && document.body.innerText.includes({}))",
        js_str(text)?
    );
    if eval_bool(page, &script).await? {
        return Err(Error::assertion(format!("text '{text}'"), "absent", "present"));
    }
    Ok(())
}

/// Wait until an element matching `css` exists and has a visible box
pub async fn wait_for_selector(page: &Page, css: &str, timeout: Duration) -> Result<()> {
    let script = format!(
        "(() => {{ const el = document.querySelector({}); if (!el) return false; \
         const r = el.getBoundingClientRect(); return r.width > 0 && r.height > 0; }})()",
        js_str(css)?
    );
    wait_for_condition(page, &script, &format!("element '{css}'"), timeout).await
}

/// Number of elements currently matching `css`
pub async fn count_elements(page: &Page, css: &str) -> Result<u32> {
    let script = format!("document.querySelectorAll({}).length", js_str(css)?);
    Ok(page.evaluate(script).await?.into_value()?)
}

/// Number of elements matching `scope_css` whose visible text contains `text`
pub async fn text_count_within(page: &Page, scope_css: &str, text: &str) -> Result<u32> {
    let script = format!(
        "Array.from(document.querySelectorAll({})).filter(el => (el.innerText || '').includes({})).length",
        js_str(scope_css)?,
        js_str(text)?
    );
    Ok(page.evaluate(script).await?.into_value()?)
}

/// Assert `text` appears in exactly `expected` elements matching
/// `scope_css`, waiting for rendering to settle.
///
/// The count is exact, not at-least: an amount that should render twice
/// (line item and total) appearing three times is a duplicate-rendering
/// regression.
pub async fn expect_text_count(
    page: &Page,
    scope_css: &str,
    text: &str,
    expected: u32,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        let actual = text_count_within(page, scope_css, text).await?;
        if actual == expected {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::assertion(
                format!("occurrences of '{text}' within '{scope_css}'"),
                expected,
                actual,
            ));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Wait until at least one element matching `scope_css` contains `text`
pub async fn wait_for_text_in(
    page: &Page,
    scope_css: &str,
    text: &str,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if text_count_within(page, scope_css, text).await? > 0 {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::timeout(
                format!("'{text}' within '{scope_css}'"),
                timeout.as_secs(),
            ));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Click the first element matching `css`, waiting for it to appear
pub async fn click(page: &Page, css: &str, timeout: Duration) -> Result<()> {
    wait_for_selector(page, css, timeout).await?;
    let script = format!(
        "(() => {{ const el = document.querySelector({}); if (!el) return false; el.click(); return true; }})()",
        js_str(css)?
    );
    if !eval_bool(page, &script).await? {
        return Err(Error::precondition(format!(
            "element '{css}' disappeared before it could be clicked"
        )));
    }
    Ok(())
}

/// Click the first element matching `scope_css` whose text contains `text`
pub async fn click_text(
    page: &Page,
    scope_css: &str,
    text: &str,
    timeout: Duration,
) -> Result<()> {
    let script = format!(
        "(() => {{ const el = Array.from(document.querySelectorAll({})).find(n => (n.innerText || '').includes({})); \
         if (!el) return false; el.click(); return true; }})()",
        js_str(scope_css)?,
        js_str(text)?
    );
    let deadline = Instant::now() + timeout;
    loop {
        if eval_bool(page, &script).await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::timeout(
                format!("clickable '{text}' within '{scope_css}'"),
                timeout.as_secs(),
            ));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Wait until a button containing `text` is rendered and enabled
pub async fn expect_button_enabled(page: &Page, text: &str, timeout: Duration) -> Result<()> {
    let script = format!(
        "(() => {{ const b = Array.from(document.querySelectorAll('button')).find(n => (n.innerText || '').includes({})); \
         return !!b && !b.disabled; }})()",
        js_str(text)?
    );
    wait_for_condition(page, &script, &format!("enabled button '{text}'"), timeout).await
}

/// Record the URL of the next `window.open` call so a later check can tell
/// whether the application attempted to open a popup, and with what
pub async fn arm_popup_recorder(page: &Page) -> Result<()> {
    page.evaluate(
        "(() => { window.__poppedUrl = null; const open = window.open.bind(window); \
         window.open = (url, ...rest) => { window.__poppedUrl = String(url); return open(url, ...rest); }; \
         return true; })()",
    )
    .await?;
    Ok(())
}

/// URL recorded by [`arm_popup_recorder`], if a popup was opened
pub async fn popped_url(page: &Page) -> Result<Option<String>> {
    Ok(page
        .evaluate("window.__poppedUrl ?? null")
        .await?
        .into_value()?)
}

/// Wait up to `timeout` for a recorded popup; `Ok(None)` when none appears
pub async fn wait_for_popup_url(page: &Page, timeout: Duration) -> Result<Option<String>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(url) = popped_url(page).await? {
            return Ok(Some(url));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Evaluate an expression that yields a promise and return the settled value
pub async fn eval_async(page: &Page, expression: &str) -> Result<Value> {
    let params = EvaluateParams::builder()
        .expression(expression)
        .await_promise(true)
        .return_by_value(true)
        .build()
        .map_err(Error::Config)?;
    let result = page.evaluate(params).await?;
    Ok(result.value().cloned().unwrap_or(Value::Null))
}

/// Assert two identifiers from independent sources agree
pub fn assert_eq_str(what: &str, expected: &str, actual: &str) -> Result<()> {
    if expected != actual {
        return Err(Error::assertion(what, expected, actual));
    }
    Ok(())
}

/// Assert two numeric fields from independent sources agree.
///
/// Both sides come from wire payloads, so this is an exact comparison of
/// numbers, never of locale-formatted strings.
pub fn assert_eq_num(what: &str, expected: f64, actual: f64) -> Result<()> {
    if expected.to_bits() != actual.to_bits() {
        return Err(Error::assertion(what, expected, actual));
    }
    Ok(())
}

async fn wait_for_condition(
    page: &Page,
    script: &str,
    what: &str,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if eval_bool(page, script).await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::timeout(what, timeout.as_secs()));
        }
        sleep(POLL_INTERVAL).await;
    }
}

async fn eval_bool(page: &Page, script: &str) -> Result<bool> {
    Ok(page.evaluate(script).await?.into_value()?)
}

/// Quote a Rust string as a JavaScript string literal
fn js_str(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_str_quotes_and_escapes() {
        assert_eq!(js_str("plain").unwrap(), "\"plain\"");
        assert_eq!(js_str("with \"quotes\"").unwrap(), "\"with \\\"quotes\\\"\"");
    }

    #[test]
    fn test_numeric_comparison_is_exact() {
        assert!(assert_eq_num("amount", 120.0, 120.0).is_ok());
        assert!(assert_eq_num("amount", 120.0, 120.01).is_err());
    }

    #[test]
    fn test_string_comparison_reports_both_sides() {
        let err = assert_eq_str("payee name", "Comune", "Regione").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Comune"));
        assert!(msg.contains("Regione"));
    }
}
