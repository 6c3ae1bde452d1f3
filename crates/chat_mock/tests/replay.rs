use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chat_api::ChatEvent;
use chat_mock::{generate, replay, replay_events, ReplayOutcome, ReplayTiming};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn replay_events_emits_tools_before_text() {
    let response = generate("calculate 100+50");
    let mut kinds = Vec::new();
    let mut text = String::new();

    let outcome = replay_events(&response, &ReplayTiming::instant(), None, |event| {
        kinds.push(event.kind());
        if let ChatEvent::Content { content, .. } = event {
            text.push_str(&content);
        }
    })
    .await;

    assert_eq!(outcome, ReplayOutcome::Completed);
    assert_eq!(kinds[0], "tool_call");
    assert!(kinds[1..].iter().all(|kind| *kind == "content"));
    assert_eq!(kinds.len(), 1 + response.content.chars().count());
    assert_eq!(text, response.content);
}

#[tokio::test]
async fn replay_reports_tools_once_then_accumulated_text() {
    let response = generate("create a component");
    let mut updates: Vec<(String, usize)> = Vec::new();

    let outcome = replay(&response, &ReplayTiming::instant(), None, |content, tools| {
        updates.push((content.to_string(), tools.len()));
    })
    .await;

    assert_eq!(outcome, ReplayOutcome::Completed);
    assert_eq!(updates[0], (String::new(), 2));
    assert_eq!(updates.len(), 1 + response.content.chars().count());
    assert_eq!(updates.last().map(|(c, _)| c.as_str()), Some(response.content.as_str()));
    assert!(updates
        .windows(2)
        .skip(1)
        .all(|pair| pair[1].0.starts_with(&pair[0].0)));
}

#[tokio::test]
async fn replay_without_tools_skips_tool_update() {
    let response = generate("hello");
    let mut first = None;

    replay(&response, &ReplayTiming::instant(), None, |content, tools| {
        if first.is_none() {
            first = Some((content.to_string(), tools.len()));
        }
    })
    .await;

    assert_eq!(first, Some(("H".to_string(), 0)));
}

#[tokio::test]
async fn pre_cancelled_replay_emits_nothing() {
    let response = generate("weather");
    let signal = Arc::new(AtomicBool::new(true));
    let mut emitted = 0;

    let outcome = replay_events(&response, &ReplayTiming::default(), Some(&signal), |_| {
        emitted += 1;
    })
    .await;

    assert_eq!(outcome, ReplayOutcome::Cancelled);
    assert_eq!(emitted, 0);
}

#[tokio::test]
async fn cancelling_mid_replay_stops_emission() {
    let response = generate("weather");
    let signal = Arc::new(AtomicBool::new(false));
    let timing = ReplayTiming {
        start_delay: Duration::ZERO,
        tool_delay: Duration::ZERO,
        min_char_delay: Duration::from_millis(1),
        max_char_delay: Duration::from_millis(1),
    };
    let mut emitted = 0;

    let outcome = replay_events(&response, &timing, Some(&signal), |event| {
        emitted += 1;
        if matches!(event, ChatEvent::Content { .. }) && emitted == 5 {
            signal.store(true, Ordering::Release);
        }
    })
    .await;

    assert_eq!(outcome, ReplayOutcome::Cancelled);
    assert_eq!(emitted, 5);
}

#[test]
fn default_timing_matches_documented_pacing() {
    let timing = ReplayTiming::default();

    assert_eq!(timing.start_delay, Duration::from_millis(300));
    assert_eq!(timing.tool_delay, Duration::from_millis(500));
    assert_eq!(timing.min_char_delay, Duration::from_millis(10));
    assert_eq!(timing.max_char_delay, Duration::from_millis(40));
}
