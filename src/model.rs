//! Wire types for the backend API surface consumed by the flows
//!
//! Only the fields the flows assert against are modeled; serde ignores the
//! rest of each payload. Monetary fields are numbers here so correlation
//! compares numbers, never locale-formatted strings.

use serde::{Deserialize, Serialize};

/// `GET **/arc/v1/notices` response: the paid-notice listing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NoticeList {
    pub notices: Vec<Notice>,
}

/// One entry of the paid-notice listing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub event_id: String,
    pub amount: f64,
    pub notice_date: String,
    pub payee_name: String,
}

/// `GET **/arc/v1/payment-notices` response: unpaid notices pulled after
/// the citizen opts in
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNoticeList {
    pub payment_notices: Vec<PaymentNotice>,
}

/// One entry of the unpaid-notice listing; `iupd` addresses the detail route
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentNotice {
    pub iupd: String,
}

/// The notice record the application stores in sessionStorage when a list
/// entry is selected; the detail step reads its rendering contract from here
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPaymentNotice {
    pub payment_options: PaymentOptions,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentOptions {
    pub installments: Installment,
}

/// Installment fields as rendered on the notice detail page. `amount` is
/// the formatted display string here (e.g. "120,00 €") because that is what
/// the stored record carries and what the DOM shows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub amount: String,
    pub pa_full_name: String,
    pub description: String,
    pub iuv: String,
    pub pa_tax_code: String,
}

/// `GET **/arc/v1/transactions/{eventId}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub info_transaction: Transaction,
    pub carts: Vec<Cart>,
}

/// The settled payment record behind a receipt
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub amount: f64,
    pub fee: f64,
    pub transaction_date: String,
    pub psp_name: String,
    pub rrn: String,
}

/// One payee+amount grouping within a transaction
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub payee: Payee,
    pub ref_number_value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub name: String,
    pub tax_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_list_wire_format() {
        let list: NoticeList = serde_json::from_str(
            r#"{"notices": [{
                "eventId": "abc-123",
                "amount": 120.0,
                "noticeDate": "2024-03-01",
                "payeeName": "Comune di Milano",
                "extraField": true
            }]}"#,
        )
        .unwrap();

        assert_eq!(list.notices.len(), 1);
        assert_eq!(list.notices[0].event_id, "abc-123");
        assert_eq!(list.notices[0].amount, 120.0);
    }

    #[test]
    fn test_transaction_detail_wire_format() {
        let detail: TransactionDetail = serde_json::from_str(
            r#"{
                "infoTransaction": {
                    "transactionId": "tx-9876543210",
                    "amount": 120.0,
                    "fee": 0.35,
                    "transactionDate": "2024-03-01T10:30:00Z",
                    "pspName": "Intesa",
                    "rrn": "240300012345"
                },
                "carts": [{
                    "payee": {"name": "Comune di Milano", "taxCode": "01199250158"},
                    "refNumberValue": "302012345678901"
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(detail.info_transaction.transaction_id, "tx-9876543210");
        assert_eq!(detail.carts[0].payee.tax_code, "01199250158");
    }

    #[test]
    fn test_selected_notice_storage_format() {
        let stored: SelectedPaymentNotice = serde_json::from_str(
            r#"{"paymentOptions": {"installments": {
                "amount": "120,00 €",
                "paFullName": "Comune di Milano",
                "description": "TARI 2024",
                "iuv": "302012345678901",
                "paTaxCode": "01199250158"
            }}}"#,
        )
        .unwrap();

        assert_eq!(stored.payment_options.installments.amount, "120,00 €");
    }
}
