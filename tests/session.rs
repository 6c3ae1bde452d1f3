
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use agent_chat::chat_api::{ChatApiClient, ChatApiConfig, ChatEvent};
use agent_chat::chat_mock::{generate, ReplayTiming};
use agent_chat::chat_types::{Attachment, ToolCall, ToolCallStatus};
use agent_chat::thread_store::{Role, SharedThreadStore, ThreadStore};
use agent_chat::{ChatSession, ReplySource, ReplyUpdate, EMPTY_REPLY_FALLBACK};
use fixture::{records, Backend, Reply};
use pretty_assertions::assert_eq;

const REMOTE_THREAD: &str = "remote-1";

fn session_for(base_url: &str) -> ChatSession {
    let client = ChatApiClient::new(ChatApiConfig::new(base_url)).expect("client");
    ChatSession::new(SharedThreadStore::new(ThreadStore::in_memory()), client)
        .with_timing(ReplayTiming::instant())
}

fn live_script() -> Vec<String> {
    let mut lines = records(&[
        ChatEvent::AgentStart {
            agent_name: "researcher".to_string(),
        },
        ChatEvent::content("Looking", Some("researcher")),
        ChatEvent::ToolCall {
            call: ToolCall::new("t1", "search", Default::default()),
            agent_name: Some("researcher".to_string()),
        },
        ChatEvent::ToolCall {
            call: ToolCall::new("t1", "search", Default::default()).completed("3 hits"),
            agent_name: Some("researcher".to_string()),
        },
    ]);
    lines.push("data: {not json\n".to_string());
    lines.extend(records(&[
        ChatEvent::AgentCall {
            from_agent: "researcher".to_string(),
            to_agent: "writer".to_string(),
            agent_name: None,
        },
        ChatEvent::content(" done.", Some("writer")),
    ]));
    lines.push("data: [DONE]\n".to_string());
    lines
}

#[tokio::test]
async fn live_stream_is_reduced_into_the_assistant_message() {
    let backend = Backend::start(|request| match request.path.as_str() {
        "/threads" => Reply::json(r#"{"thread":{"id":"remote-1"}}"#),
        "/threads/remote-1/messages" => Reply::stream(&live_script()),
        _ => Reply::error(404, r#"{"detail":"not found"}"#),
    })
    .await;
    let session = session_for(&backend.base_url);

    let outcome = session
        .send_message(None, "find the forecast", Vec::new(), None)
        .await;

    assert_eq!(outcome.source, ReplySource::Live);
    assert!(!outcome.cancelled);

    let thread = session.store().thread(&outcome.thread_id).expect("thread");
    assert_eq!(thread.title, "find the forecast");
    assert_eq!(thread.backend_thread_id.as_deref(), Some(REMOTE_THREAD));
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[0].role, Role::User);

    let reply = &thread.messages[1];
    assert_eq!(reply.id, outcome.assistant_message_id);
    assert_eq!(reply.content, "Looking done.");
    let blocks = reply.agent_blocks.as_ref().expect("blocks");
    let owners: Vec<&str> = blocks.iter().map(|b| b.agent_name.as_str()).collect();
    assert_eq!(owners, vec!["researcher", "writer"]);
    let tools = reply.tool_calls.as_ref().expect("tools");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].status, ToolCallStatus::Completed);
    assert_eq!(reply.agent_calls.as_ref().map(Vec::len), Some(1));

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].body.contains(r#""stream":true"#));
    assert!(!session.store().with(|store| store.is_loading()));
    assert_eq!(session.in_flight_count(), 0);
}

#[tokio::test]
async fn existing_backend_thread_is_reused() {
    let backend = Backend::start(|request| match request.path.as_str() {
        "/threads/remote-1/messages" => Reply::stream(&records(&[ChatEvent::content("hi", None)])),
        _ => Reply::error(500, "unexpected"),
    })
    .await;
    let session = session_for(&backend.base_url);
    let thread_id = session.store().with(|store| {
        let id = store.create_thread(None);
        store.set_backend_thread_id(&id, REMOTE_THREAD);
        id
    });

    let outcome = session
        .send_message(Some(&thread_id), "hello", Vec::new(), None)
        .await;

    assert_eq!(outcome.thread_id, thread_id);
    assert_eq!(outcome.source, ReplySource::Live);
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn empty_live_stream_stores_fallback_text() {
    let backend = Backend::start(|request| match request.path.as_str() {
        "/threads" => Reply::json(r#"{"id":"remote-1"}"#),
        _ => Reply::stream(&["data: [DONE]\n".to_string()]),
    })
    .await;
    let session = session_for(&backend.base_url);

    let outcome = session.send_message(None, "ping", Vec::new(), None).await;

    let reply = session
        .store()
        .message(&outcome.thread_id, &outcome.assistant_message_id)
        .expect("reply");
    assert_eq!(outcome.source, ReplySource::Live);
    assert_eq!(reply.content, EMPTY_REPLY_FALLBACK);
}

#[tokio::test]
async fn thread_creation_failure_replays_canned_reply() {
    let backend = Backend::start(|_| Reply::error(503, r#"{"detail":"warming up"}"#)).await;
    let session = session_for(&backend.base_url);
    let text = "what's the weather today?";

    let outcome = session.send_message(None, text, Vec::new(), None).await;

    assert!(outcome.source.is_fallback());
    assert!(!outcome.cancelled);
    let canned = generate(text);
    let reply = session
        .store()
        .message(&outcome.thread_id, &outcome.assistant_message_id)
        .expect("reply");
    assert_eq!(reply.content, canned.content);
    let ids: Vec<&str> = reply
        .tool_calls
        .as_ref()
        .expect("tools")
        .iter()
        .map(|call| call.id.as_str())
        .collect();
    assert_eq!(ids, vec!["tool_weather_001"]);
    assert_eq!(
        session
            .store()
            .thread(&outcome.thread_id)
            .and_then(|thread| thread.backend_thread_id),
        None
    );
}

#[tokio::test]
async fn stream_failure_resets_message_before_replay() {
    let backend = Backend::start(|request| match request.path.as_str() {
        "/threads" => Reply::json(r#"{"thread_id":"remote-1"}"#),
        _ => Reply::error(500, r#"{"error":{"message":"graph crashed"}}"#),
    })
    .await;
    let session = session_for(&backend.base_url);

    let outcome = session.send_message(None, "hello there", Vec::new(), None).await;

    match &outcome.source {
        ReplySource::Fallback { reason } => assert!(reason.contains("graph crashed"), "{reason}"),
        ReplySource::Live => panic!("expected fallback"),
    }
    let reply = session
        .store()
        .message(&outcome.thread_id, &outcome.assistant_message_id)
        .expect("reply");
    assert_eq!(reply.content, generate("hello there").content);
    assert_eq!(reply.tool_calls, Some(Vec::new()));
}

#[tokio::test]
async fn failed_upload_keeps_local_reference() {
    let backend = Backend::start(|request| match request.path.as_str() {
        "/threads" => Reply::json(r#"{"thread":{"id":"remote-1"}}"#),
        "/upload" => Reply::error(500, "disk full"),
        _ => Reply::stream(&records(&[ChatEvent::content("received", None)])),
    })
    .await;
    let session = session_for(&backend.base_url);
    let dir = std::env::temp_dir().join(format!("agent-chat-upload-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("dir");
    let path = dir.join("notes.txt");
    std::fs::write(&path, "hello").expect("write");
    let attachment = Attachment::local("notes.txt", 5, "text/plain", &path);

    let outcome = session
        .send_message(None, "see attached", vec![attachment], None)
        .await;

    let user = session
        .store()
        .message(&outcome.thread_id, &outcome.user_message_id)
        .expect("user message");
    let attachments = user.attachments.expect("attachments");
    assert_eq!(attachments[0].url, None);
    assert_eq!(attachments[0].local_handle.as_deref(), Some(path.as_path()));
    assert_eq!(outcome.source, ReplySource::Live);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn successful_upload_records_url() {
    let backend = Backend::start(|request| match request.path.as_str() {
        "/threads" => Reply::json(r#"{"thread":{"id":"remote-1"}}"#),
        "/upload" => Reply::json(r#"{"url":"https://files.example/notes.txt"}"#),
        _ => Reply::stream(&records(&[ChatEvent::content("received", None)])),
    })
    .await;
    let session = session_for(&backend.base_url);
    let dir = std::env::temp_dir().join(format!("agent-chat-upload-ok-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("dir");
    let path = dir.join("notes.txt");
    std::fs::write(&path, "hello").expect("write");

    let outcome = session
        .send_message(
            None,
            "see attached",
            vec![Attachment::local("notes.txt", 5, "text/plain", &path)],
            None,
        )
        .await;

    let user = session
        .store()
        .message(&outcome.thread_id, &outcome.user_message_id)
        .expect("user message");
    let attachments = user.attachments.expect("attachments");
    assert_eq!(attachments[0].url.as_deref(), Some("https://files.example/notes.txt"));
    assert_eq!(attachments[0].local_handle, None);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn pre_cancelled_send_leaves_empty_reply() {
    let backend = Backend::start(|_| Reply::json(r#"{"id":"remote-1"}"#)).await;
    let session = session_for(&backend.base_url);
    let signal = Arc::new(AtomicBool::new(true));

    let outcome = session
        .send_message(None, "never mind", Vec::new(), Some(signal))
        .await;

    assert!(outcome.cancelled);
    let reply = session
        .store()
        .message(&outcome.thread_id, &outcome.assistant_message_id)
        .expect("reply");
    assert_eq!(reply.content, "");
    assert_eq!(session.in_flight_count(), 0);
}

#[test]
fn cancel_without_in_flight_stream_reports_nothing() {
    let session = session_for("http://127.0.0.1:9");

    assert!(!session.cancel("thread_x", "msg_x"));
    assert_eq!(session.cancel_thread("thread_x"), 0);
}

#[tokio::test]
async fn overlapping_sends_keep_the_store_loading_until_both_finish() {
    let backend = Backend::start(|_| Reply::error(503, r#"{"detail":"offline"}"#)).await;
    let store = SharedThreadStore::new(ThreadStore::in_memory());
    let client = ChatApiClient::new(ChatApiConfig::new(&backend.base_url)).expect("client");
    let slow = ChatSession::new(store.clone(), client.clone()).with_timing(ReplayTiming {
        start_delay: Duration::from_millis(400),
        ..ReplayTiming::instant()
    });
    let fast = ChatSession::new(store.clone(), client).with_timing(ReplayTiming::instant());

    let slow_send = slow.send_message(None, "first", Vec::new(), None);
    let fast_send = async {
        while store.with(|store| store.active_streams()) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let outcome = fast.send_message(None, "second", Vec::new(), None).await;
        let loading = store.with(|store| store.is_loading());
        (outcome, loading, slow.in_flight_count())
    };
    let (slow_outcome, (fast_outcome, loading_after_fast, slow_in_flight)) =
        tokio::join!(slow_send, fast_send);

    assert!(fast_outcome.source.is_fallback());
    assert_eq!(slow_in_flight, 1);
    assert!(loading_after_fast);
    assert!(slow_outcome.source.is_fallback());
    assert!(!store.with(|store| store.is_loading()));
    assert_eq!(store.with(|store| store.active_streams()), 0);
}

#[tokio::test]
async fn observer_sees_fallback_notice_then_reply_patches() {
    let backend = Backend::start(|_| Reply::error(503, r#"{"detail":"offline"}"#)).await;
    let session = session_for(&backend.base_url);
    let text = "search for rust news";

    let mut notices = Vec::new();
    let mut last_content = None;
    let outcome = session
        .send_message_observed(None, text, Vec::new(), None, |update| match update {
            ReplyUpdate::Fallback { reason } => notices.push(reason.to_string()),
            ReplyUpdate::Patch(patch) => {
                if let Some(content) = &patch.content {
                    last_content = Some(content.clone());
                }
            }
        })
        .await;

    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("503"), "{}", notices[0]);
    assert_eq!(last_content, Some(generate(text).content));
    let stored = session
        .store()
        .message(&outcome.thread_id, &outcome.assistant_message_id)
        .expect("reply");
    assert_eq!(Some(stored.content), last_content);
}
