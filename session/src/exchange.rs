//! One question/answer round trip: what is sent, how it ends, what is kept.

use crate::answer::AskRequest;
use crate::model::{ConversationId, Message};
use crate::store::Route;

pub const ERROR_REPLY: &str = "Sorry, I couldn't process your request. Please try again.";
pub const INTERRUPTED_REPLY: &str = "Response interrupted. Ask again whenever you're ready.";

/// Identifies one in-flight send. A completion carrying a ticket the session
/// no longer holds is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub conversation: ConversationId,
    pub first_exchange: bool,
    pub(crate) serial: u64,
}

/// Everything the coordinator needs once the user message is in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub ticket: Ticket,
    pub route: Route,
    pub request: AskRequest,
    /// Message list including the new user message, to be persisted.
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Answered(String),
    Failed,
    Cancelled,
}

impl Outcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, Outcome::Answered(_))
    }
}

/// What has to be written back after a send finished.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    pub route: Route,
    pub conversation: ConversationId,
    pub messages: Vec<Message>,
    /// Set only after the first successful exchange.
    pub title: Option<String>,
}

/// Drops whitespace up to and including the last newline before the text,
/// and from the first newline after it. Spaces on the first and last line
/// and every inner line break are kept.
pub fn strip_blank_lines(input: &str) -> &str {
    let content_start = input
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    let start = input[..content_start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let content_end = input
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(start);
    let end = input[content_end..]
        .find('\n')
        .map(|i| content_end + i)
        .unwrap_or(input.len());

    if start >= end {
        ""
    } else {
        &input[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_and_trailing_blank_lines() {
        assert_eq!(strip_blank_lines("\n\n  What is bail?\n\n"), "  What is bail?");
        assert_eq!(strip_blank_lines("line one\nline two"), "line one\nline two");
        assert_eq!(
            strip_blank_lines(" \n\nfirst\n\nsecond  \n \n"),
            "first\n\nsecond  "
        );
    }

    #[test]
    fn keeps_spaces_without_newlines() {
        assert_eq!(strip_blank_lines("  hello  "), "  hello  ");
    }

    #[test]
    fn blank_input_becomes_empty() {
        assert_eq!(strip_blank_lines(""), "");
        assert_eq!(strip_blank_lines("\n \n\t\n"), "");
        // no line break to strip; the caller's trim decides
        assert_eq!(strip_blank_lines("   "), "   ");
    }
}
