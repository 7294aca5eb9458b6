// tests for emergency alert delivery and formatting

use chrono::{Local, TimeZone, Utc};
use sahayak::{
    ChatTurn, DEFAULT_ALERT_TIMEOUT, EmergencyAlert, Error, LogNotifier, Notifier, Output,
    WebhookNotifier, clean_response,
};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alert() -> EmergencyAlert {
    EmergencyAlert {
        to: "+911234567890".to_string(),
        contact_name: "Ravi".to_string(),
        patient: "Asha".to_string(),
        symptoms: vec!["chest pain".to_string(), "confusion".to_string()],
    }
}

#[test]
fn test_summary() {
    assert_eq!(
        alert().summary(),
        "Emergency alert for Ravi (+911234567890) about Asha's symptoms: chest pain, confusion"
    );
}

#[test]
fn test_summary_without_keywords() {
    let alert = EmergencyAlert {
        symptoms: vec![],
        ..alert()
    };
    assert!(alert.summary().ends_with("urgent symptoms"));
}

#[tokio::test]
async fn test_log_notifier_never_fails() {
    assert!(LogNotifier.send(&alert()).await.is_ok());
}

#[tokio::test]
async fn test_webhook_posts_alert() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(body_json(json!({
            "to": "+911234567890",
            "contact_name": "Ravi",
            "patient": "Asha",
            "symptoms": ["chest pain", "confusion"]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let notifier =
        WebhookNotifier::new(format!("{}/alerts", server.uri()), DEFAULT_ALERT_TIMEOUT).unwrap();
    notifier.send(&alert()).await.unwrap();
}

#[tokio::test]
async fn test_webhook_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(server.uri(), DEFAULT_ALERT_TIMEOUT).unwrap();
    let err = notifier.send(&alert()).await.unwrap_err();
    assert!(matches!(err, Error::Notify(_)));
}

#[tokio::test]
async fn test_webhook_gives_up_on_hung_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3600)))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(server.uri(), Duration::from_millis(200)).unwrap();
    let started = Instant::now();
    let result = notifier.send(&alert()).await;

    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_clean_response_strips_bold() {
    assert_eq!(
        clean_response("**Drink water** and **rest**."),
        "Drink water and rest."
    );
    // unpaired markers stay
    assert_eq!(clean_response("2 ** 3"), "2 ** 3");
}

#[test]
fn test_render_uses_local_time() {
    let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 23, 45, 0).unwrap();
    let turn = ChatTurn {
        id: "t1".to_string(),
        user_id: "u1".to_string(),
        message: "chest pain".to_string(),
        response: "**Call** for help now.".to_string(),
        timestamp,
        is_red_flag: true,
    };

    let text = Output::render(&turn);
    let local = timestamp.with_timezone(&Local).format("%H:%M").to_string();

    assert!(text.contains("!! Health Alert"));
    assert!(text.contains("assistant: Call for help now."));
    assert!(text.ends_with(&format!("{local}\n")));
}
