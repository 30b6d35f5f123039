//! Integration coverage for the harness surfaces that need no browser:
//! URL patterns, configuration loading, payload models, the scenario
//! registry and report accounting.

use std::fs;

use arc_e2e::common::config::Config;
use arc_e2e::common::validate;
use arc_e2e::driver::pattern::UrlPattern;
use arc_e2e::model::{NoticeList, TransactionDetail};
use arc_e2e::scenario::{ScenarioReport, StepOutcome, StepReport};
use arc_e2e::flows;

#[test]
fn config_round_trips_through_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        base_url = "http://localhost:3000"

        [browser]
        headless = false
        no_sandbox = true

        [timeouts]
        ui_secs = 5
        "#,
    )
    .expect("write config");

    let config = Config::load_from(&path).expect("parse config");
    assert_eq!(config.base_url, "http://localhost:3000");
    assert!(!config.browser.headless);
    assert!(config.browser.no_sandbox);
    assert_eq!(config.timeouts.ui_secs, 5);
    // unspecified values keep their defaults
    assert_eq!(config.timeouts.response_secs, 30);
}

#[test]
fn config_rejects_malformed_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "base_url = [not toml").expect("write config");

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn endpoint_patterns_target_one_endpoint_each() {
    let notices = UrlPattern::new("**/arc/v1/notices*").unwrap();
    let transactions = UrlPattern::new("**/arc/v1/transactions/*").unwrap();
    let receipt = UrlPattern::new("*/**/arc/v1/transactions/**/receipt*").unwrap();

    let notices_url = "https://dev.cittadini.pagopa.it/arc/v1/notices?size=10";
    let transaction_url = "https://dev.cittadini.pagopa.it/arc/v1/transactions/evt-1";
    let receipt_url = "https://dev.cittadini.pagopa.it/arc/v1/transactions/evt-1/receipt";

    assert!(notices.matches(notices_url));
    assert!(!notices.matches(transaction_url));

    assert!(transactions.matches(transaction_url));
    assert!(!transactions.matches(receipt_url));
    assert!(!transactions.matches(notices_url));

    assert!(receipt.matches(receipt_url));
    assert!(!receipt.matches(transaction_url));
}

#[test]
fn substring_patterns_ignore_host_and_query() {
    let pattern = UrlPattern::new("arc/v1/notices").unwrap();
    assert!(pattern.matches("https://uat.cittadini.pagopa.it/arc/v1/notices"));
    assert!(pattern.matches("http://localhost:3000/arc/v1/notices?page=3"));
    assert!(!pattern.matches("http://localhost:3000/arc/v1/payment-notices"));
}

#[test]
fn payload_models_accept_real_shapes() {
    let listing: NoticeList = serde_json::from_str(
        r#"{"notices": [
            {"eventId": "e1", "amount": 120.0, "noticeDate": "2024-03-01", "payeeName": "Comune"},
            {"eventId": "e2", "amount": 0.5, "noticeDate": "2024-04-01", "payeeName": "Regione"}
        ]}"#,
    )
    .expect("notice list");
    assert_eq!(listing.notices.len(), 2);

    let detail: TransactionDetail = serde_json::from_str(
        r#"{
            "infoTransaction": {
                "transactionId": "e1",
                "amount": 120.0,
                "fee": 0.35,
                "transactionDate": "2024-03-01",
                "pspName": "Intesa",
                "rrn": "rrn-1"
            },
            "carts": [{"payee": {"name": "Comune", "taxCode": "123"}, "refNumberValue": "ref-1"}]
        }"#,
    )
    .expect("transaction detail");

    // correlation invariants the detail step relies on
    assert_eq!(listing.notices[0].event_id, detail.info_transaction.transaction_id);
    assert_eq!(listing.notices[0].amount, detail.info_transaction.amount);
    assert!(validate::is_valid_date(&detail.info_transaction.transaction_date));
}

#[test]
fn registry_exposes_every_acceptance_tag() {
    let scenarios = flows::all();
    assert_eq!(scenarios.len(), 2);

    let tags: Vec<&str> = scenarios
        .iter()
        .flat_map(|scenario| scenario.steps.iter().map(|step| step.tag))
        .collect();

    for expected in [
        "E2E-ARC-5",
        "E2E-ARC-6",
        "E2E-ARC-9",
        "E2E-ARC-10",
        "E2E-ARC-10B",
        "E2E-ARC-9B",
        "E2E-ARC-5C",
    ] {
        assert!(tags.contains(&expected), "missing tag {expected}");
    }
}

#[test]
fn registry_filter_matches_names_and_tags() {
    assert_eq!(flows::matching("receipts").len(), 1);
    assert_eq!(flows::matching("e2e-arc-6").len(), 1);
    assert_eq!(flows::matching("E2E-ARC").len(), 2);
    assert!(flows::matching("nonexistent").is_empty());
}

#[test]
fn report_accounting() {
    let report = ScenarioReport {
        name: "receipts".to_string(),
        steps: vec![
            StepReport {
                tag: "E2E-ARC-9".to_string(),
                intent: "detail".to_string(),
                outcome: StepOutcome::Passed,
            },
            StepReport {
                tag: "E2E-ARC-10".to_string(),
                intent: "download".to_string(),
                outcome: StepOutcome::Failed("boom".to_string()),
            },
            StepReport {
                tag: "E2E-ARC-10B".to_string(),
                intent: "server error".to_string(),
                outcome: StepOutcome::Skipped,
            },
        ],
    };

    assert!(!report.passed());
    assert_eq!(report.counts(), (1, 1, 1));

    let all_passed = ScenarioReport {
        name: "payment-notices".to_string(),
        steps: vec![StepReport {
            tag: "E2E-ARC-5".to_string(),
            intent: "list".to_string(),
            outcome: StepOutcome::Passed,
        }],
    };
    assert!(all_passed.passed());
}
