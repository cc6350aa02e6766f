use bocfix_core::CorrectionCommand;
use bocfix_ledger::{FireflyClient, Ledger};
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn command() -> CorrectionCommand {
    let at = Utc.with_ymd_and_hms(2024, 10, 2, 12, 0, 0).unwrap();
    CorrectionCommand {
        journal_id: 321,
        description: "Wolt".to_string(),
        date: at,
        payment_date: at,
        tags: vec!["Processed by BoC fixer".to_string()],
    }
}

#[tokio::test]
async fn test_update_transaction_puts_correction() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/transactions/321"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("accept", "application/vnd.api+json"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "apply_rules": true,
            "fire_webhooks": true,
            "transactions": [{
                "transaction_journal_id": 321,
                "description": "Wolt",
                "date": "2024-10-02T12:00:00Z",
                "payment_date": "2024-10-02T12:00:00Z",
                "tags": ["Processed by BoC fixer"]
            }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = FireflyClient::new(&server.uri(), "secret-token").unwrap();
    client.update_transaction(&command()).await.unwrap();
}

#[tokio::test]
async fn test_non_success_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(422).set_body_string(r#"{"message":"date invalid"}"#))
        .mount(&server)
        .await;

    let client = FireflyClient::new(&server.uri(), "secret-token").unwrap();
    let err = client.update_transaction(&command()).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("422"), "{msg}");
    assert!(msg.contains("date invalid"), "{msg}");
}
