//! Payment notices: list and detail
//!
//! Serial flow. The list step pulls the unpaid notices after the consent
//! modal, correlates the rendered list with the captured payload and opens
//! the first entry; the app leaves the selected notice in sessionStorage
//! and the detail step reads its rendering contract back from there.

use futures_util::future::BoxFuture;

use crate::common::{Error, Result};
use crate::driver::capture::PendingResponse;
use crate::driver::page_assert;
use crate::driver::pattern::UrlPattern;
use crate::driver::storage::{keys, StateChannel};
use crate::model::{PaymentNoticeList, SelectedPaymentNotice};
use crate::scenario::{Scenario, Step, StepCtx};

pub fn scenario() -> Scenario {
    Scenario {
        name: "payment-notices",
        steps: vec![
            Step::new(
                "E2E-ARC-5",
                "list the payment notices awaiting payment",
                list_notices,
            ),
            Step::new(
                "E2E-ARC-6",
                "open the detail of the selected payment notice",
                notice_detail,
            ),
        ],
    }
}

fn list_notices(ctx: &StepCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = &ctx.page;
        let route = ctx.url("/pagamenti/payment-notices/");

        page.goto(route.as_str()).await?;
        page_assert::expect_url(page, &route, ctx.ui_timeout()).await?;

        page_assert::wait_for_text(page, "Cerca i tuoi avvisi", ctx.ui_timeout()).await?;

        // Armed before the click chain that triggers the pull.
        let pending =
            PendingResponse::watch(page, UrlPattern::new("**/arc/v1/payment-notices*")?).await?;

        page_assert::click_text(page, "button", "Cerca i tuoi avvisi", ctx.ui_timeout()).await?;

        // The consent modal gates the pull.
        page_assert::wait_for_selector(
            page,
            "#pull-payments-modal .MuiPaper-root",
            ctx.ui_timeout(),
        )
        .await?;
        page_assert::click_text(page, "#pull-payments-modal button", "Consenti", ctx.ui_timeout())
            .await?;

        let listing: PaymentNoticeList = pending.parsed(ctx.response_timeout()).await?;

        // The app records the consent before rendering the list.
        let channel = StateChannel::new(page);
        if !channel.is_set(keys::OPTIN).await? {
            return Err(Error::precondition(
                "the OPTIN flag was not stored after the consent modal",
            ));
        }

        page_assert::wait_for_selector(page, "[role='listbox']", ctx.ui_timeout()).await?;
        let rendered = page_assert::count_elements(page, "[role='option']").await?;
        if rendered == 0 {
            return Err(Error::assertion("rendered notice entries", "> 0", rendered));
        }
        if rendered as usize != listing.payment_notices.len() {
            return Err(Error::assertion(
                "rendered notice entries",
                listing.payment_notices.len(),
                rendered,
            ));
        }

        // First entry exposes a title, a subtitle and its action button.
        page_assert::wait_for_selector(page, "[role='option'] h1", ctx.ui_timeout()).await?;
        page_assert::wait_for_selector(page, "[role='option'] h2", ctx.ui_timeout()).await?;
        page_assert::wait_for_selector(page, "[role='option'] button", ctx.ui_timeout()).await?;

        let first = listing.payment_notices.first().ok_or_else(|| {
            Error::precondition("payment-notices response contains no entries")
        })?;

        page_assert::click(page, "[role='option'] button", ctx.ui_timeout()).await?;
        let detail_route = ctx.url(&format!("/pagamenti/payment-notices/{}", first.iupd));
        page_assert::expect_url(page, &detail_route, ctx.ui_timeout()).await?;

        Ok(())
    })
}

fn notice_detail(ctx: &StepCtx) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let page = &ctx.page;

        // Produced by the app when the list entry was selected; its absence
        // means the previous step did not leave the expected state.
        let stored: SelectedPaymentNotice = StateChannel::new(page)
            .require(keys::PAYMENT_NOTICE)
            .await?;
        let installment = &stored.payment_options.installments;

        // The amount renders twice, as line item and as total. Exactly
        // twice: a third occurrence is a duplicate-rendering regression.
        page_assert::expect_text_count(page, "dd", &installment.amount, 2, ctx.ui_timeout())
            .await?;

        page_assert::wait_for_text_in(page, "dd", &installment.pa_full_name, ctx.ui_timeout())
            .await?;
        page_assert::wait_for_text_in(page, "dd", &installment.description, ctx.ui_timeout())
            .await?;
        page_assert::wait_for_text_in(page, "dd", &installment.iuv, ctx.ui_timeout()).await?;
        page_assert::wait_for_text_in(page, "dd", &installment.pa_tax_code, ctx.ui_timeout())
            .await?;

        page_assert::expect_button_enabled(page, "Paga ora", ctx.ui_timeout()).await?;

        Ok(())
    })
}
