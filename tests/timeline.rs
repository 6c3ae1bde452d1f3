use agent_chat::chat_api::ChatEvent;
use agent_chat::chat_types::{AgentBlock, ToolCall};
use agent_chat::thread_store::{NewMessage, ThreadStore};
use agent_chat::{build_timeline, message_timeline, StreamReducer, TimelineItem};
use pretty_assertions::assert_eq;

fn block(agent: &str, timestamp: u64) -> AgentBlock {
    AgentBlock {
        agent_name: agent.to_string(),
        content: format!("{agent}@{timestamp}"),
        timestamp,
    }
}

fn tool(id: &str, timestamp: Option<u64>) -> ToolCall {
    let mut call = ToolCall::new(id, "tool", Default::default());
    call.timestamp = timestamp;
    call
}

fn shape(items: &[TimelineItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            TimelineItem::Agent(block) => block.agent_name.clone(),
            TimelineItem::ToolGroup(calls) => calls
                .iter()
                .map(|call| call.id.as_str())
                .collect::<Vec<_>>()
                .join("+"),
        })
        .collect()
}

#[test]
fn adjacent_tool_calls_coalesce_between_blocks() {
    let blocks = [block("A", 0), block("B", 3), block("A", 5)];
    let tools = [tool("t1", Some(1)), tool("t2", Some(2)), tool("t3", Some(4))];

    let timeline = build_timeline(&blocks, &tools);

    assert_eq!(shape(&timeline), vec!["A", "t1+t2", "B", "t3", "A"]);
}

#[test]
fn blocks_are_never_grouped() {
    let blocks = [block("A", 0), block("A", 1)];

    let timeline = build_timeline(&blocks, &[]);

    assert_eq!(shape(&timeline), vec!["A", "A"]);
}

#[test]
fn unstamped_tools_trail_and_input_order_breaks_ties() {
    let blocks = [block("A", 1)];
    let tools = [tool("late", None), tool("first", Some(0)), tool("tie", Some(1))];

    let timeline = build_timeline(&blocks, &tools);

    assert_eq!(shape(&timeline), vec!["first", "A", "tie+late"]);
}

#[test]
fn empty_inputs_give_empty_timeline() {
    assert!(build_timeline(&[], &[]).is_empty());
}

#[test]
fn stored_reply_round_trips_into_render_order() {
    let mut reducer = StreamReducer::new();
    for event in [
        ChatEvent::content("plan", Some("planner")),
        ChatEvent::ToolCall {
            call: ToolCall::new("t1", "search", Default::default()),
            agent_name: None,
        },
        ChatEvent::ToolCall {
            call: ToolCall::new("t2", "fetch", Default::default()),
            agent_name: None,
        },
        ChatEvent::content("answer", Some("writer")),
    ] {
        reducer.apply(event);
    }

    let mut store = ThreadStore::in_memory();
    let thread_id = store.create_thread(None);
    let message_id = store
        .add_message(&thread_id, NewMessage::assistant(""))
        .expect("message")
        .id;
    store.update_message(&thread_id, &message_id, reducer.finish());

    let message = store.message(&thread_id, &message_id).expect("stored");
    assert_eq!(shape(&message_timeline(message)), vec!["planner", "t1+t2", "writer"]);
}
