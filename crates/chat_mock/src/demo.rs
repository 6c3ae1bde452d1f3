use chat_api::{classify_record, ChatEvent, DATA_PREFIX};
use serde_json::json;

const RESEARCHER: &str = "researcher";
const ANALYST: &str = "analyst";
const SEARCH_CALL_ID: &str = "tool_1758026923145_d8e4c086a";

/// Wire records of a two-agent exchange: the researcher runs a search whose
/// arguments arrive as a JSON string, reports, then hands off to the analyst.
/// The trailing `complete` record is not an event and is ignored on decode.
pub fn multi_agent_demo_records() -> Vec<String> {
    let search_args = r#"{"search_query": "Nanchang weather tomorrow"}"#;
    let search_result = r#"{"organic": [{"title": "Forecast - Nanchang", "snippet": "17th (tomorrow) sunny then cloudy 36/26℃ <force 3"}]}"#;

    [
        json!({ "type": "agent_start", "agent_name": RESEARCHER }),
        json!({
            "type": "tool_call",
            "agent_name": RESEARCHER,
            "toolCall": {
                "id": SEARCH_CALL_ID,
                "name": "Search the internet with Serper",
                "args": search_args,
                "result": null,
                "status": "pending"
            }
        }),
        json!({
            "type": "tool_call",
            "agent_name": RESEARCHER,
            "toolCall": {
                "id": SEARCH_CALL_ID,
                "name": "Search the internet with Serper",
                "args": search_args,
                "result": search_result,
                "status": "completed"
            }
        }),
        json!({ "type": "content", "agent_name": RESEARCHER, "content": "Tomorrow (" }),
        json!({ "type": "content", "agent_name": RESEARCHER, "content": "Wednesday, Sep 17" }),
        json!({
            "type": "content",
            "agent_name": RESEARCHER,
            "content": ") Nanchang will be sunny turning cloudy, high 36℃, low 26℃, wind under force 3."
        }),
        json!({
            "type": "agent_call",
            "agentCall": { "from_agent": RESEARCHER, "to_agent": ANALYST }
        }),
        json!({ "type": "agent_start", "agent_name": ANALYST }),
        json!({
            "type": "content",
            "agent_name": ANALYST,
            "content": "Based on the researcher's data, here is my analysis:\n"
        }),
        json!({
            "type": "content",
            "agent_name": ANALYST,
            "content": "1. 36℃ counts as a heat day\n2. The day/night spread is wide (10℃)\n3. Little wind, so the air stays still"
        }),
        json!({ "type": "agent_end", "agent_name": ANALYST }),
        json!({ "type": "agent_end", "agent_name": RESEARCHER }),
        json!({ "type": "complete" }),
    ]
    .into_iter()
    .map(|value| format!("{DATA_PREFIX} {value}"))
    .collect()
}

/// Decoded form of [`multi_agent_demo_records`].
pub fn multi_agent_demo() -> Vec<ChatEvent> {
    multi_agent_demo_records()
        .iter()
        .filter_map(|record| classify_record(record).into_event())
        .collect()
}
