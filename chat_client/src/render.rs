use chrono::{DateTime, Local};

use crate::transcript::{ChatMessage, ChatState};

const WELCOME: [&str; 2] = [
    "Welcome to the AI chat!",
    "Start a conversation by typing a message below.",
];
const TYPING: &str = "[AI] ...";

fn time_of_day(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(time) => time.with_timezone(&Local).format("%H:%M:%S").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

fn message_lines(message: &ChatMessage) -> impl Iterator<Item = String> + '_ {
    let header = format!(
        "[{}] {}",
        message.sender.label(),
        time_of_day(&message.timestamp)
    );
    std::iter::once(header).chain(message.text.lines().map(|line| format!("  {}", line)))
}

/// Renders the transcript as at most `rows` lines. When it does not fit,
/// the oldest lines are cut so the newest entry is always visible.
pub fn render(state: &ChatState, rows: usize) -> Vec<String> {
    let mut lines: Vec<String> = if state.messages().is_empty() {
        WELCOME.iter().map(|l| l.to_string()).collect()
    } else {
        state.messages().iter().flat_map(message_lines).collect()
    };
    if state.is_pending() {
        lines.push(TYPING.to_string());
    }
    let skip = lines.len().saturating_sub(rows);
    lines.split_off(skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay_client::ChatReply;

    #[test]
    fn empty_transcript_shows_welcome() {
        let state = ChatState::new();
        assert_eq!(render(&state, 10), WELCOME.to_vec());
    }

    #[test]
    fn pending_shows_typing_indicator() {
        let mut state = ChatState::new();
        state.set_input("Hello");
        state.submit();

        let lines = render(&state, 10);
        assert!(lines[0].starts_with("[You] "));
        assert_eq!(lines[1], "  Hello");
        assert_eq!(lines.last().map(String::as_str), Some(TYPING));
    }

    #[test]
    fn overflow_keeps_newest_lines() {
        let mut state = ChatState::new();
        for i in 0..5 {
            state.set_input(format!("question {}", i));
            state.submit();
            state.settle(Ok(ChatReply {
                message: format!("answer {}", i),
                timestamp: "2024-05-01T10:00:00.000Z".to_string(),
            }));
        }

        let lines = render(&state, 3);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("[AI] "));
        assert_eq!(lines[2], "  answer 4");
    }

    #[test]
    fn unparsable_timestamp_is_shown_raw() {
        assert_eq!(time_of_day("yesterday"), "yesterday");
    }
}
