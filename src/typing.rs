use leptos::logging::warn;
use leptos::*;
use std::time::Duration;

/// Cycles through the phrases shown while a reply is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingRotation {
    phrases: Vec<String>,
    index: usize,
}

impl TypingRotation {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases, index: 0 }
    }

    pub fn current(&self) -> &str {
        self.phrases
            .get(self.index)
            .map(String::as_str)
            .unwrap_or("Bot is typing")
    }

    pub fn advance(&mut self) {
        if !self.phrases.is_empty() {
            self.index = (self.index + 1) % self.phrases.len();
        }
    }
}

/// Only mounted while a send is in flight; unmounting clears the timer.
#[component]
pub fn Typing(phrases: Vec<String>, interval_ms: u32) -> impl IntoView {
    let rotation = create_rw_signal(TypingRotation::new(phrases));
    match set_interval_with_handle(
        move || rotation.update(TypingRotation::advance),
        Duration::from_millis(interval_ms.into()),
    ) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(err) => warn!("Typing indicator timer failed: {err:?}"),
    }
    view! {
        <div class="flex items-center m-5 gap-2.5 text-sm text-gray-500 dark:text-gray-400">
            <span class="flex gap-1">
                <span class="w-2 h-2 rounded-full bg-gray-400 animate-bounce" />
                <span class="w-2 h-2 rounded-full bg-gray-400 animate-bounce [animation-delay:150ms]" />
                <span class="w-2 h-2 rounded-full bg-gray-400 animate-bounce [animation-delay:300ms]" />
            </span>
            <span>{move || rotation.with(|r| r.current().to_owned())}...</span>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_around() {
        let mut rotation = TypingRotation::new(vec![
            "Reviewing the statutes".to_owned(),
            "Checking precedents".to_owned(),
        ]);
        assert_eq!(rotation.current(), "Reviewing the statutes");
        rotation.advance();
        assert_eq!(rotation.current(), "Checking precedents");
        rotation.advance();
        assert_eq!(rotation.current(), "Reviewing the statutes");
    }

    #[test]
    fn empty_rotation_has_a_fallback() {
        let mut rotation = TypingRotation::new(vec![]);
        rotation.advance();
        assert_eq!(rotation.current(), "Bot is typing");
    }
}
