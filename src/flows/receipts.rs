//! Receipts: listing, detail, PDF download and the injected fault paths
//!
//! Serial flow over one page. The detail step leaves the browser on the
//! transaction route and threads the opened event id through the state
//! channel; the download and fault steps build on that state. The receipt
//! retrieval UI has four terminal states, each exercised by one step:
//! success (detail rendering), server error (alert on download), network
//! error (generic banner after an aborted call), empty state (call to
//! action when no notices exist).

use futures_util::future::BoxFuture;
use serde_json::json;

use crate::common::validate;
use crate::common::{Error, Result};
use crate::driver::capture::PendingResponse;
use crate::driver::intercept::Behavior;
use crate::driver::page_assert;
use crate::driver::pattern::UrlPattern;
use crate::driver::storage::{keys, StateChannel};
use crate::model::{NoticeList, TransactionDetail};
use crate::scenario::{Scenario, Step, StepCtx};

const NETWORK_ERROR_BANNER: &str = "Ops! Something went wrong, please try again";
const EMPTY_RECEIPTS_MESSAGE: &str = "Qui vedrai le tue ricevute pagoPA";
const STORICO_ROW: &str = "table[aria-label='Storico table'] > tbody > tr";
const DOWNLOAD_BUTTON: &str = "[data-testid='receipt-download-btn']";

pub fn scenario() -> Scenario {
    Scenario {
        name: "receipts",
        steps: vec![
            Step::new(
                "E2E-ARC-9",
                "open a receipt detail and correlate it with the listing",
                receipt_detail,
            ),
            Step::new(
                "E2E-ARC-10",
                "download the receipt PDF",
                receipt_download,
            ),
            Step::new(
                "E2E-ARC-10B",
                "receipt download surfaces an alert when the server fails",
                receipt_download_server_error,
            ),
            Step::new(
                "E2E-ARC-9B",
                "transaction detail renders the generic banner when the network drops",
                transaction_detail_network_error,
            ),
            Step::new(
                "E2E-ARC-5C",
                "an empty notice list renders the call to action, not an error",
                empty_notice_list,
            ),
        ],
    }
}

fn receipt_detail(ctx: &StepCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = &ctx.page;
        let route = ctx.url("/pagamenti/");

        // The listing call fires on navigation, so the capture is armed
        // before the goto.
        let pending = PendingResponse::watch(page, UrlPattern::new("arc/v1/notices")?).await?;
        page.goto(route.as_str()).await?;
        page_assert::expect_url(page, &route, ctx.ui_timeout()).await?;

        let listing: NoticeList = pending.parsed(ctx.response_timeout()).await?;
        let row = listing
            .notices
            .first()
            .cloned()
            .ok_or_else(|| Error::precondition("no notices available to open"))?;

        // Threaded to the network-fault step, which reloads this route.
        StateChannel::new(page)
            .write(keys::SELECTED_EVENT, &row.event_id)
            .await?;

        let detail_pattern =
            UrlPattern::new(&format!("**/arc/v1/transactions/{}*", row.event_id))?;
        let detail_pending = PendingResponse::watch(page, detail_pattern).await?;

        page_assert::click(page, STORICO_ROW, ctx.ui_timeout()).await?;
        let detail_route = ctx.url(&format!("/pagamenti/transactions/{}", row.event_id));
        page_assert::expect_url(page, &detail_route, ctx.ui_timeout()).await?;

        let detail: TransactionDetail = detail_pending.parsed(ctx.response_timeout()).await?;
        let transaction = &detail.info_transaction;

        // Listing row and transaction record come from two different
        // endpoints; they must describe the same payment.
        page_assert::assert_eq_str(
            "event id vs transaction id",
            &row.event_id,
            &transaction.transaction_id,
        )?;
        page_assert::assert_eq_num("notice amount vs transaction amount", row.amount, transaction.amount)?;
        page_assert::assert_eq_str(
            "notice date vs transaction date",
            &row.notice_date,
            &transaction.transaction_date,
        )?;

        // Single-cart assumption: only carts[0] is correlated today.
        // Multi-cart receipts are a known gap.
        let cart = detail
            .carts
            .first()
            .ok_or_else(|| Error::precondition("transaction has no cart entries"))?;
        page_assert::assert_eq_str("payee name", &row.payee_name, &cart.payee.name)?;

        page_assert::wait_for_text(page, &cart.payee.name, ctx.ui_timeout()).await?;
        page_assert::wait_for_text(page, &cart.payee.tax_code, ctx.ui_timeout()).await?;
        page_assert::wait_for_text(page, &cart.ref_number_value, ctx.ui_timeout()).await?;

        if !validate::is_renderable_amount(transaction.fee) {
            return Err(Error::assertion("transaction fee", "a renderable amount", transaction.fee));
        }
        if !validate::is_renderable_amount(transaction.amount) {
            return Err(Error::assertion(
                "transaction amount",
                "a renderable amount",
                transaction.amount,
            ));
        }
        if !validate::is_valid_date(&transaction.transaction_date) {
            return Err(Error::assertion(
                "transaction date",
                "a parseable date",
                &transaction.transaction_date,
            ));
        }

        page_assert::wait_for_text(page, &transaction.psp_name, ctx.ui_timeout()).await?;
        page_assert::wait_for_text(page, &transaction.rrn, ctx.ui_timeout()).await?;

        // The page shows a truncated identifier, so match on the prefix.
        let prefix: String = transaction.transaction_id.chars().take(7).collect();
        page_assert::wait_for_text(page, &prefix, ctx.ui_timeout()).await?;

        Ok(())
    })
}

fn receipt_download(ctx: &StepCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = &ctx.page;

        page_assert::arm_popup_recorder(page).await?;
        page_assert::click(page, DOWNLOAD_BUTTON, ctx.ui_timeout()).await?;

        match page_assert::wait_for_popup_url(page, ctx.ui_timeout()).await? {
            Some(url) => {
                let blob = regex::Regex::new(
                    r"^blob:https?://(dev\.|uat\.)?cittadini\.pagopa\.it/[a-z0-9-]*",
                )
                .map_err(|e| Error::Config(e.to_string()))?;
                if !blob.is_match(&url) {
                    return Err(Error::assertion(
                        "receipt popup URL",
                        "a cittadini.pagopa.it blob URL",
                        url,
                    ));
                }
            }
            None => {
                // Chromium does not always surface the blob popup to
                // automation; treat the silent outcome as the known
                // limitation rather than a failure.
                tracing::warn!("no popup observed after the download click");
            }
        }

        Ok(())
    })
}

fn receipt_download_server_error(ctx: &StepCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = &ctx.page;

        ctx.interceptor
            .register(
                UrlPattern::new("*/**/arc/v1/transactions/**/receipt*")?,
                Behavior::Fulfill {
                    status: 500,
                    json: None,
                },
            )
            .await;

        page_assert::arm_popup_recorder(page).await?;
        page_assert::click(page, DOWNLOAD_BUTTON, ctx.ui_timeout()).await?;

        page_assert::wait_for_selector(page, "[role='alert']", ctx.ui_timeout()).await?;

        if let Some(url) = page_assert::popped_url(page).await? {
            return Err(Error::assertion("popup after failed download", "none", url));
        }

        Ok(())
    })
}

fn transaction_detail_network_error(ctx: &StepCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = &ctx.page;

        let event_id: String = StateChannel::new(page).require(keys::SELECTED_EVENT).await?;

        // Aborting the call is a different fault than a 500: the client
        // never gets a response at all, and the UI must say so.
        ctx.interceptor
            .register(
                UrlPattern::new("*/**/arc/v1/transactions/*")?,
                Behavior::Abort,
            )
            .await;

        page.execute(chromiumoxide::cdp::browser_protocol::page::ReloadParams::default())
            .await?;

        // Error rendering waits out the app's retry backoff.
        page_assert::wait_for_text(page, NETWORK_ERROR_BANNER, ctx.error_render_timeout())
            .await?;

        let detail_route = ctx.url(&format!("/pagamenti/transactions/{event_id}"));
        page_assert::expect_url(page, &detail_route, ctx.ui_timeout()).await?;

        Ok(())
    })
}

fn empty_notice_list(ctx: &StepCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = &ctx.page;

        ctx.interceptor
            .register(
                UrlPattern::new("**/arc/v1/notices*")?,
                Behavior::FulfillJson(json!({ "notices": [] })),
            )
            .await;

        let route = ctx.url("/pagamenti/transactions");
        page.goto(route.as_str()).await?;
        page_assert::expect_url(page, &route, ctx.ui_timeout()).await?;

        page_assert::wait_for_text(page, EMPTY_RECEIPTS_MESSAGE, ctx.ui_timeout()).await?;
        page_assert::expect_text_absent(page, NETWORK_ERROR_BANNER).await?;

        // Empty state replaces the list control, it does not sit next to it.
        let tables = page_assert::count_elements(page, "table[aria-label='Storico table']").await?;
        if tables != 0 {
            return Err(Error::assertion("rendered list controls", 0, tables));
        }

        Ok(())
    })
}
