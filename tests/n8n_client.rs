//! n8n client against a mock n8n server
//!
//! Covers auth headers, list response shapes, error mapping and the
//! creation payload sent on the wire.

use serde_json::json;
use std::time::Duration;
use whatsai_workflows::n8n::{NewCredential, NewWorkflow, Variables};
use whatsai_workflows::{N8nClient, N8nConfig, N8nError, WorkflowApi};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_key_client(server: &MockServer) -> N8nClient {
    N8nClient::new(N8nConfig::new(server.uri()).with_api_key("test-key")).unwrap()
}

#[tokio::test]
async fn test_list_accepts_all_known_shapes() {
    let bodies = [
        json!([{"id": "1", "name": "Pizzaria", "active": true}]),
        json!({"data": [{"id": "1", "name": "Pizzaria", "active": true}], "nextCursor": null}),
        json!({"workflows": [{"id": "1", "name": "Pizzaria", "active": true}]}),
    ];

    for body in bodies {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workflows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let workflows = api_key_client(&server).list_workflows().await.unwrap();
        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0].name, "Pizzaria");
        assert!(workflows[0].active);
    }
}

#[tokio::test]
async fn test_list_unknown_shape_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let workflows = api_key_client(&server).list_workflows().await.unwrap();
    assert!(workflows.is_empty());
}

#[tokio::test]
async fn test_api_key_header_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/wf1"))
        .and(header("X-N8N-API-KEY", "test-key"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "wf1", "name": "Generico"})))
        .expect(1)
        .mount(&server)
        .await;

    let workflow = api_key_client(&server).get_workflow("wf1").await.unwrap();
    assert_eq!(workflow.id, "wf1");
}

#[tokio::test]
async fn test_basic_auth_fallback() {
    let server = MockServer::start().await;
    // base64("admin:secret")
    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/wf1/activate"))
        .and(header("Authorization", "Basic YWRtaW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "wf1", "active": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = N8nClient::new(N8nConfig::new(server.uri()).with_basic_auth("admin", "secret")).unwrap();
    client.activate_workflow("wf1").await.unwrap();
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = N8nClient::new(N8nConfig::new(server.uri())).unwrap();
    let err = client.list_workflows().await.unwrap_err();
    assert!(matches!(err, N8nError::Configuration(_)));
}

#[tokio::test]
async fn test_non_success_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/workflows/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = api_key_client(&server).delete_workflow("missing").await.unwrap_err();
    match err {
        N8nError::Api { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_sends_minimal_payload() {
    let server = MockServer::start().await;
    let mut variables = Variables::new();
    variables.insert("empresa".into(), json!("Acme"));

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows"))
        .and(body_json(json!({
            "name": "Atendimento - Acme",
            "nodes": [],
            "connections": {},
            "settings": {"variables": {"empresa": "Acme"}}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "new1", "name": "Atendimento - Acme", "active": false})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = NewWorkflow::new("Atendimento - Acme").with_variables(variables);
    let created = api_key_client(&server).create_workflow(&payload).await.unwrap();
    assert_eq!(created.id, "new1");
}

#[tokio::test]
async fn test_request_timeout_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = N8nConfig::new(server.uri())
        .with_api_key("test-key")
        .with_timeout(Duration::from_millis(50));
    let err = N8nClient::new(config).unwrap().list_workflows().await.unwrap_err();
    assert!(matches!(err, N8nError::Transport(_)));
}

#[tokio::test]
async fn test_create_webhook_returns_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/webhooks"))
        .and(body_json(json!({
            "workflowId": "wf1",
            "webhookName": "whatsapp",
            "method": "POST",
            "path": "/wf1/whatsapp"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"url": "https://n8n.example.com/webhook/wf1/whatsapp"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = api_key_client(&server).create_webhook("wf1", "whatsapp").await.unwrap();
    assert_eq!(url, "https://n8n.example.com/webhook/wf1/whatsapp");
}

#[tokio::test]
async fn test_execute_workflow_wraps_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/wf1/execute"))
        .and(body_json(json!({"data": {"message": "oi"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"executionId": "e1"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = api_key_client(&server)
        .execute_workflow("wf1", Some(json!({"message": "oi"})))
        .await
        .unwrap();
    assert_eq!(result["executionId"], json!("e1"));
}

#[tokio::test]
async fn test_credentials_crud() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "c1", "name": "WhatsApp", "type": "whatsAppApi", "data": {}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/credentials"))
        .and(body_json(json!({"name": "OpenAI", "type": "openAiApi", "data": {"apiKey": "sk"}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "c2", "name": "OpenAI", "type": "openAiApi"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/credentials/c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let listed = client.list_credentials().await.unwrap();
    assert_eq!(listed[0].credential_type, "whatsAppApi");

    let mut data = serde_json::Map::new();
    data.insert("apiKey".into(), json!("sk"));
    let created = client
        .create_credential(&NewCredential {
            name: "OpenAI".into(),
            credential_type: "openAiApi".into(),
            data,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "c2");

    client.delete_credential("c1").await.unwrap();
}

#[tokio::test]
async fn test_update_credential() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/credentials/c1"))
        .and(header("X-N8N-API-KEY", "test-key"))
        .and(body_json(json!({"name": "WhatsApp Loja", "type": "whatsAppApi", "data": {"token": "novo"}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "c1", "name": "WhatsApp Loja", "type": "whatsAppApi"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut data = serde_json::Map::new();
    data.insert("token".into(), json!("novo"));
    let updated = api_key_client(&server)
        .update_credential(
            "c1",
            &NewCredential {
                name: "WhatsApp Loja".into(),
                credential_type: "whatsAppApi".into(),
                data,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, "c1");
    assert_eq!(updated.name, "WhatsApp Loja");
}

#[tokio::test]
async fn test_webhook_call_is_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/pizzaria"))
        .and(body_json(json!({"message": "oi"})))
        .and(|req: &wiremock::Request| !req.headers.contains_key("X-N8N-API-KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "Olá!"})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/webhook/pizzaria", server.uri());
    let reply = api_key_client(&server)
        .test_webhook(&url, &json!({"message": "oi"}))
        .await
        .unwrap();
    assert_eq!(reply["reply"], json!("Olá!"));
}

#[tokio::test]
async fn test_webhook_error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/pizzaria"))
        .respond_with(ResponseTemplate::new(404).set_body_string("webhook not registered"))
        .mount(&server)
        .await;

    let url = format!("{}/webhook/pizzaria", server.uri());
    let err = api_key_client(&server)
        .test_webhook(&url, &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        N8nError::Api { status: 404, ref body } if body == "webhook not registered"
    ));
}
