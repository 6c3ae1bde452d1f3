use chat_api::{ChatApiClient, ChatApiConfig, ChatApiError, CreateThreadResponse};
use serde_json::{json, Value};

fn client() -> ChatApiClient {
    ChatApiClient::new(ChatApiConfig::new("http://backend:8000").with_graph_id("research"))
        .expect("client")
}

fn body_json(request: &reqwest::Request) -> Value {
    let bytes = request
        .body()
        .and_then(|body| body.as_bytes())
        .expect("request body should be buffered");
    serde_json::from_slice(bytes).expect("json body")
}

#[test]
fn create_thread_request_posts_graph_id() {
    let request = client()
        .build_create_thread_request()
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(request.method(), "POST");
    assert_eq!(request.url().as_str(), "http://backend:8000/threads");
    assert_eq!(body_json(&request), json!({"graph_id": "research"}));
}

#[test]
fn message_request_asks_for_a_stream() {
    let request = client()
        .build_message_request("backend-1", "hello")
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(
        request.url().as_str(),
        "http://backend:8000/threads/backend-1/messages"
    );
    assert_eq!(
        request.headers()["accept"].to_str().expect("header"),
        "text/event-stream"
    );
    assert_eq!(
        body_json(&request),
        json!({"message": "hello", "thread_id": "backend-1", "stream": true})
    );
}

#[test]
fn invalid_base_url_fails_client_construction() {
    let error = ChatApiClient::new(ChatApiConfig::new("::::")).expect_err("must fail");

    assert!(matches!(error, ChatApiError::InvalidBaseUrl(_)));
}

#[test]
fn thread_id_is_resolved_from_every_response_shape() {
    let nested: CreateThreadResponse =
        serde_json::from_value(json!({"thread": {"id": "t-1"}})).expect("nested");
    let flat: CreateThreadResponse = serde_json::from_value(json!({"id": "t-2"})).expect("flat");
    let legacy: CreateThreadResponse =
        serde_json::from_value(json!({"thread_id": "t-3"})).expect("legacy");
    let empty: CreateThreadResponse = serde_json::from_value(json!({"id": " "})).expect("empty");

    assert_eq!(nested.resolved_id(), Some("t-1"));
    assert_eq!(flat.resolved_id(), Some("t-2"));
    assert_eq!(legacy.resolved_id(), Some("t-3"));
    assert_eq!(empty.resolved_id(), None);
}
