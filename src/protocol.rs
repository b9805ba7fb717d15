//! External narrative inputs.
//!
//! Two transports drive the step counter: key presses forwarded by the host
//! (web-style key names) and cross-context messages from the surrounding
//! presentation tool. Malformed messages are dropped with a log line; they
//! are an expected part of sharing a message channel, not an error.

use serde::Deserialize;

use crate::narrative::StepEvent;

/// Map a key name to a narrative event.
///
/// `x` and the forward page/arrow keys advance; the backward ones retreat.
/// Every other key is ignored.
pub fn step_for_key(key: &str) -> Option<StepEvent> {
    match key {
        "x" | "PageDown" | "ArrowRight" | "ArrowDown" => Some(StepEvent::Advance),
        "PageUp" | "ArrowLeft" | "ArrowUp" => Some(StepEvent::Retreat),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct RevealMessage {
    namespace: String,
    #[serde(rename = "eventName")]
    event_name: String,
}

/// Decode an inbound presentation message.
///
/// Only the `reveal` namespace is recognized; its `fragmentshown`,
/// `fragmenthidden`, and `reset` events map to narrative events. Anything
/// else - unknown namespaces, unknown events, or undecodable payloads - is
/// dropped without error.
pub fn step_for_message(payload: &str) -> Option<StepEvent> {
    let message: RevealMessage = match serde_json::from_str(payload) {
        Ok(message) => message,
        Err(err) => {
            log::warn!("dropping malformed narrative message: {err}");
            return None;
        }
    };

    if message.namespace != "reveal" {
        log::debug!("ignoring message namespace '{}'", message.namespace);
        return None;
    }

    match message.event_name.as_str() {
        "fragmentshown" => Some(StepEvent::Advance),
        "fragmenthidden" => Some(StepEvent::Retreat),
        "reset" => Some(StepEvent::Reset),
        other => {
            log::debug!("ignoring reveal event '{other}'");
            None
        }
    }
}
