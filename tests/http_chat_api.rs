//! `HttpChatApi` against a throwaway Axum endpoint.

use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use pantry_chat::chat::{ChatApi, ChatRequest, HttpChatApi, Payload, RequestFailed, Role, WireMessage};
use serde_json::{Value, json};
use url::Url;

#[derive(Clone)]
struct Fake {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<ChatRequest>>>,
}

async fn fake_chat(State(fake): State<Fake>, Json(req): Json<ChatRequest>) -> (StatusCode, String) {
    fake.seen.lock().unwrap().push(req);
    (fake.status, fake.body.clone())
}

/// Serve `body` with `status` on an ephemeral port and return the endpoint URL.
async fn spawn_fake(status: StatusCode, body: Value) -> (Url, Arc<Mutex<Vec<ChatRequest>>>) {
    spawn_fake_raw(status, body.to_string()).await
}

async fn spawn_fake_raw(status: StatusCode, body: String) -> (Url, Arc<Mutex<Vec<ChatRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/v1/chat", post(fake_chat))
        .with_state(Fake {
            status,
            body,
            seen: Arc::clone(&seen),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let url = Url::parse(&format!("http://{addr}/api/v1/chat")).unwrap();
    (url, seen)
}

fn transcript() -> Vec<WireMessage> {
    vec![
        WireMessage {
            role: Role::User,
            content: "冷蔵庫の中身は?".to_string(),
        },
        WireMessage {
            role: Role::Assistant,
            content: "確認します".to_string(),
        },
        WireMessage {
            role: Role::User,
            content: "お願い".to_string(),
        },
    ]
}

#[tokio::test]
async fn test_posts_full_transcript() {
    let (url, seen) = spawn_fake(StatusCode::OK, json!({"message": "ok"})).await;
    let api = HttpChatApi::new(url);

    let reply = api.send(transcript()).await.unwrap();
    assert_eq!(reply.message, "ok");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].messages, transcript());
}

#[tokio::test]
async fn test_parses_recipes() {
    let (url, _) = spawn_fake(
        StatusCode::OK,
        json!({
            "message": "レシピです",
            "recipes": [{
                "id": 3,
                "name": "味噌汁",
                "ingredients": [{"name": "豆腐", "quantity": 0.5, "unit": "丁"}],
                "instructions": [{"step": 1, "description": "出汁を取る"}],
                "url": "https://example.com/miso",
                "source": "Example",
                "last_cooked": "2024-04-01"
            }]
        }),
    )
    .await;

    let reply = HttpChatApi::new(url).send(transcript()).await.unwrap();
    let (_, payload) = reply.into_parts();
    let Some(Payload::Recipes(recipes)) = payload else {
        panic!("expected recipes");
    };
    assert_eq!(recipes[0].id, "3");
    assert_eq!(recipes[0].ingredients[0].name, "豆腐");
}

#[tokio::test]
async fn test_error_status_fails() {
    let (url, _) = spawn_fake(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "boom"})).await;

    let err = HttpChatApi::new(url).send(transcript()).await.unwrap_err();
    assert!(matches!(err, RequestFailed::Status(500)));
}

#[tokio::test]
async fn test_malformed_body_fails() {
    let (url, _) = spawn_fake_raw(StatusCode::OK, "not json".to_string()).await;

    let err = HttpChatApi::new(url).send(transcript()).await.unwrap_err();
    assert!(matches!(err, RequestFailed::Decode(_)));
}

#[tokio::test]
async fn test_missing_message_fails() {
    let (url, _) = spawn_fake(StatusCode::OK, json!({"ingredients": []})).await;

    let err = HttpChatApi::new(url).send(transcript()).await.unwrap_err();
    assert!(matches!(err, RequestFailed::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_fails() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{addr}/api/v1/chat")).unwrap();
    let err = HttpChatApi::new(url).send(transcript()).await.unwrap_err();
    assert!(matches!(err, RequestFailed::Transport(_)));
}
