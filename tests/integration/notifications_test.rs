//! Notification ledger integration tests

use assert_matches::assert_matches;
use epilink::app::notifications::{NotificationError, NotificationLedger};
use epilink::shared::error::ApiError;
use epilink::shared::notification::NotificationKind;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{notification_json, TestApi};

async fn loaded_ledger(api: &TestApi) -> NotificationLedger {
    Mock::given(method("GET"))
        .and(path("/notifications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            notification_json("n3", "reply", false),
            notification_json("n1", "follow", true),
            notification_json("n2", "like", false)
        ])))
        .mount(&api.server)
        .await;
    let ledger = NotificationLedger::new(api.client.clone());
    ledger.load().await.unwrap();
    ledger
}

fn ids(ledger: &NotificationLedger) -> Vec<String> {
    ledger.notifications().into_iter().map(|n| n.id).collect()
}

#[tokio::test]
async fn test_load_preserves_server_order() {
    let api = TestApi::signed_in().await;
    let ledger = loaded_ledger(&api).await;

    assert_eq!(ids(&ledger), vec!["n3", "n1", "n2"]);
    assert_eq!(ledger.unread_count(), 2);
    let reply = ledger.get("n3").unwrap();
    assert_eq!(reply.kind, NotificationKind::Reply);
    assert_eq!(reply.message, "reply from u2");
}

#[tokio::test]
async fn test_mark_read_flips_only_that_entry() {
    let api = TestApi::signed_in().await;
    let ledger = loaded_ledger(&api).await;
    Mock::given(method("PUT"))
        .and(path("/notifications/n2/read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&api.server)
        .await;

    ledger.mark_read("n2").await.unwrap();

    assert!(ledger.get("n2").unwrap().read);
    assert!(!ledger.get("n3").unwrap().read);
    assert_eq!(ledger.unread_count(), 1);
    assert_eq!(ids(&ledger), vec!["n3", "n1", "n2"]);
}

#[tokio::test]
async fn test_mark_read_failure_leaves_flag() {
    let api = TestApi::signed_in().await;
    let ledger = loaded_ledger(&api).await;
    Mock::given(method("PUT"))
        .and(path("/notifications/n3/read"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&api.server)
        .await;

    let result = ledger.mark_read("n3").await;
    assert_matches!(
        result,
        Err(NotificationError::Api(ApiError::ServerError { status: 500, .. }))
    );
    assert!(!ledger.get("n3").unwrap().read);
    assert_eq!(ledger.unread_count(), 2);
}

#[tokio::test]
async fn test_mark_unknown_id_makes_no_call() {
    let api = TestApi::signed_in().await;
    let ledger = loaded_ledger(&api).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api.server)
        .await;

    assert_eq!(
        ledger.mark_read("n404").await,
        Err(NotificationError::Unknown("n404".to_string()))
    );
}

#[tokio::test]
async fn test_reset_during_load_discards_response() {
    let api = TestApi::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/notifications/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([notification_json("n1", "like", false)]))
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&api.server)
        .await;
    let ledger = NotificationLedger::new(api.client.clone());

    let (loaded, _) = tokio::join!(ledger.load(), async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        ledger.reset();
    });
    assert!(loaded.unwrap().is_empty());
    assert!(ledger.notifications().is_empty());
}

#[tokio::test]
async fn test_overlapping_loads_keep_the_newest() {
    let api = TestApi::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/notifications/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([notification_json("old", "like", false)]))
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&api.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notifications/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([notification_json("new", "follow", false)])),
        )
        .mount(&api.server)
        .await;
    let ledger = NotificationLedger::new(api.client.clone());

    let (first, second) = tokio::join!(ledger.load(), async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        ledger.load().await
    });

    assert_eq!(second.unwrap().len(), 1);
    assert_eq!(ids(&ledger), vec!["new"]);
    let first: Vec<String> = first.unwrap().into_iter().map(|n| n.id).collect();
    assert_eq!(first, vec!["new"]);
}
