//! Conversation titles derived from the first exchange.

use crate::model::DEFAULT_TITLE;

const MIN_SENTENCE: usize = 3;
const MAX_SENTENCE: usize = 50;
const MAX_FIRST_LINE: usize = 40;

/// Picks a title from the first user message and the first bot reply.
///
/// The reply's first sentence wins when it is between 3 and 50 characters
/// long. Otherwise the first line of the user message is used, cut to 40
/// characters with a trailing `...`.
pub fn synthesize(user_text: &str, reply: &str) -> String {
    let sentence = first_sentence(reply);
    let length = sentence.chars().count();
    if (MIN_SENTENCE..=MAX_SENTENCE).contains(&length) {
        return sentence.to_owned();
    }

    let first_line = user_text.split('\n').next().unwrap_or_default().trim();
    if first_line.chars().count() > MAX_FIRST_LINE {
        let cut: String = first_line.chars().take(MAX_FIRST_LINE).collect();
        return format!("{cut}...");
    }
    if first_line.is_empty() {
        DEFAULT_TITLE.to_owned()
    } else {
        first_line.to_owned()
    }
}

/// Text before the first `.`, `!` or `?` that is followed by whitespace.
fn first_sentence(text: &str) -> &str {
    let mut chars = text.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some((_, next)) = chars.peek() {
                if next.is_whitespace() {
                    return &text[..index];
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_first_sentence_of_reply() {
        let title = synthesize(
            "What is a contract?",
            "A contract is a legally binding agreement. It needs offer and acceptance.",
        );
        assert_eq!(title, "A contract is a legally binding agreement");
    }

    #[test]
    fn question_and_exclamation_end_sentences() {
        assert_eq!(synthesize("q", "Good question! Here it is."), "Good question");
        assert_eq!(synthesize("q", "Is it legal? Mostly."), "Is it legal");
    }

    #[test]
    fn punctuation_without_whitespace_does_not_split() {
        assert_eq!(synthesize("q", "Section 3.2 applies"), "Section 3.2 applies");
    }

    #[test]
    fn falls_back_to_user_line_when_sentence_too_long() {
        let reply = "This reply opens with a very long sentence that goes well past fifty characters. Then more.";
        assert_eq!(synthesize("Tenant rights\nmore detail", reply), "Tenant rights");
    }

    #[test]
    fn falls_back_when_sentence_too_short() {
        assert_eq!(synthesize("  Bail rules  ", "No. It depends."), "Bail rules");
    }

    #[test]
    fn truncates_long_user_line() {
        let user = "Can my landlord keep the whole deposit for normal wear and tear?";
        let title = synthesize(user, "");
        assert_eq!(title, "Can my landlord keep the whole deposit f...");
        assert_eq!(title.chars().count(), 43);
    }

    #[test]
    fn empty_inputs_give_default_title() {
        assert_eq!(synthesize("", ""), DEFAULT_TITLE);
        assert_eq!(synthesize("\nsecond line", "ok"), DEFAULT_TITLE);
    }
}
