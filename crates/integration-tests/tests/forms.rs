//! Lead-capture forms: schema caching, validation, uploads and the pricing
//! wizard.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use lensway_integration_tests::{TestApp, envelope};

fn support_config() -> Value {
    json!({
        "title": "Contact support",
        "success_message": "Ticket received",
        "fields": [
            { "id": "name", "label": "Name", "type": "text", "required": true },
            {
                "id": "email", "label": "Email", "type": "email", "required": true,
                "pattern": "^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$",
                "message": "Please enter a valid email address"
            },
            { "id": "message", "label": "Message", "type": "textarea", "required": true, "min_length": 10 },
            { "id": "screenshot", "label": "Screenshot", "type": "file", "accept": "image/*,text/plain" }
        ]
    })
}

fn pricing_config() -> Value {
    json!({
        "title": "Request pricing",
        "fields": [
            { "id": "company", "label": "Company", "type": "text", "required": true, "step": 0 },
            { "id": "email", "label": "Email", "type": "email", "required": true, "step": 0 },
            {
                "id": "locations", "label": "Locations", "type": "select", "required": true, "step": 1,
                "options": ["1", "2-5", { "value": "6+", "label": "Six or more" }]
            }
        ]
    })
}

async fn mount_config(app: &TestApp, kind: &str, config: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/forms/{kind}/config")))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(config)))
        .expect(1)
        .mount(&app.backend)
        .await;
}

fn multipart(parts: &[(&str, Option<(&str, &str)>, &str)]) -> (String, String) {
    let boundary = "lensway-test-boundary".to_string();
    let mut body = String::new();

    for (name, file, content) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match file {
            Some((filename, content_type)) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                ));
                body.push_str(&format!("Content-Type: {content_type}\r\n\r\n"));
            }
            None => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                ));
            }
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    (boundary, body)
}

#[tokio::test]
async fn test_config_is_cached() {
    let app = TestApp::start().await;
    mount_config(&app, "support", support_config()).await;

    let first = app.get("/forms/support/config").await;
    let second = app.get("/forms/support/config").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["fields"][3]["type"], "file");
    assert_eq!(second.data(), first.data());
}

#[tokio::test]
async fn test_json_submission_is_validated_then_posted() {
    let app = TestApp::start().await;
    mount_config(&app, "demo", json!({
        "fields": [
            { "id": "email", "label": "Email", "type": "email", "required": true },
            { "id": "practice", "label": "Practice name", "type": "text", "required": true }
        ]
    }))
    .await;

    Mock::given(method("POST"))
        .and(path("/forms/demo/submit"))
        .and(body_partial_json(json!({
            "values": { "email": "dr@eyes.test", "practice": "Clear Sight" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "We'll call you within a day"
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let invalid = app
        .post("/forms/demo", &json!({ "values": { "email": "dr@eyes.test" } }))
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(invalid.data()["practice"], "Practice name is required");

    let accepted = app
        .post(
            "/forms/demo",
            &json!({ "values": { "email": "dr@eyes.test", "practice": "Clear Sight" } }),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.body["message"], "We'll call you within a day");
}

#[tokio::test]
async fn test_upload_inlines_files_as_base64() {
    let app = TestApp::start().await;
    mount_config(&app, "support", support_config()).await;

    Mock::given(method("POST"))
        .and(path("/forms/support/submit"))
        .and(body_partial_json(json!({
            "values": { "name": "Ada", "email": "ada@example.com" },
            "attachments": [{
                "field_id": "screenshot",
                "filename": "steps.txt",
                "content_type": "text/plain",
                "size": 5,
                "data": "aGVsbG8="
            }]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.backend)
        .await;

    let (boundary, body) = multipart(&[
        ("name", None, "Ada"),
        ("email", None, "ada@example.com"),
        ("message", None, "My lenses arrived scratched."),
        ("screenshot", Some(("steps.txt", "text/plain")), "hello"),
    ]);

    let request = Request::post("/forms/support/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK, "{response:?}");
    // Empty backend body falls back to the schema's message
    assert_eq!(response.body["message"], "Ticket received");
}

#[tokio::test]
async fn test_upload_over_body_limit_is_rejected() {
    let app = TestApp::with_config(|config| config.max_upload_bytes = 256).await;

    Mock::given(method("POST"))
        .and(path("/forms/support/submit"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.backend)
        .await;

    let big = "x".repeat(4096);
    let (boundary, body) = multipart(&[("screenshot", Some(("big.txt", "text/plain")), &big)]);

    let request = Request::post("/forms/support/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.send(request).await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_pricing_wizard_validates_one_step_at_a_time() {
    let app = TestApp::start().await;
    mount_config(&app, "pricing", pricing_config()).await;

    // Step 0 ignores step 1's required field
    let contact = app
        .post(
            "/forms/pricing/step",
            &json!({ "step": 0, "values": { "company": "Clear Sight", "email": "a@b.co" } }),
        )
        .await;
    assert_eq!(contact.status, StatusCode::OK);
    assert_eq!(contact.data()["step"], "requirements");
    assert_eq!(contact.data()["step_index"], 1);
    assert_eq!(contact.data()["complete"], false);

    let missing = app
        .post("/forms/pricing/step", &json!({ "step": 1, "values": {} }))
        .await;
    assert_eq!(missing.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(missing.data()["locations"], "Locations is required");

    let done = app
        .post(
            "/forms/pricing/step",
            &json!({ "step": 1, "values": { "locations": "2-5" } }),
        )
        .await;
    assert_eq!(done.data()["complete"], true);

    let beyond = app
        .post("/forms/pricing/step", &json!({ "step": 2, "values": {} }))
        .await;
    assert_eq!(beyond.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_single_step_pricing_form_completes_at_once() {
    let app = TestApp::start().await;
    mount_config(&app, "pricing", json!({
        "fields": [
            { "id": "email", "label": "Email", "type": "email", "required": true, "step": 0 }
        ]
    }))
    .await;

    let response = app
        .post(
            "/forms/pricing/step",
            &json!({ "step": 0, "values": { "email": "a@b.co" } }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["step_index"], 0);
    assert_eq!(response.data()["complete"], true);
}

#[tokio::test]
async fn test_attachments_only_for_support_and_jobs() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path("/forms/demo/config"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;

    let response = app
        .post(
            "/forms/demo",
            &json!({
                "values": {},
                "attachments": [{
                    "field_id": "deck", "filename": "deck.pdf",
                    "content_type": "application/pdf", "size": 1, "data": "AA=="
                }]
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_kind_and_stepless_forms() {
    let app = TestApp::start().await;

    let unknown = app.get("/forms/newsletter/config").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let stepless = app
        .post("/forms/demo/step", &json!({ "step": 0, "values": {} }))
        .await;
    assert_eq!(stepless.status, StatusCode::BAD_REQUEST);
}
