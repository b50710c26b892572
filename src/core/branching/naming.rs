use crate::core::message::Message;
use chrono::{DateTime, Local};
use unicode_segmentation::UnicodeSegmentation;

pub const MAX_CHECKPOINT_NAME_LEN: usize = 50;
pub const EMPTY_CHECKPOINT_NAME: &str = "Empty checkpoint";
const ELLIPSIS: &str = "...";

/// Suggest a checkpoint name from the most recent user message.
pub fn generate_checkpoint_name(messages: &[Message]) -> String {
    generate_checkpoint_name_at(messages, Local::now())
}

/// `name` when it has visible text, otherwise a generated one.
pub fn checkpoint_name_or_generated(name: Option<&str>, messages: &[Message]) -> String {
    match name.filter(|n| !n.trim().is_empty()) {
        Some(name) => name.to_string(),
        None => generate_checkpoint_name(messages),
    }
}

pub(crate) fn generate_checkpoint_name_at(messages: &[Message], now: DateTime<Local>) -> String {
    if messages.is_empty() {
        return EMPTY_CHECKPOINT_NAME.to_string();
    }

    let last_user = messages
        .iter()
        .rev()
        .find(|msg| msg.is_user())
        .map(|msg| msg.content.as_str())
        .unwrap_or_default();

    if last_user.is_empty() {
        return format!("Checkpoint at {}", now.format("%H:%M"));
    }

    truncate_name(last_user, MAX_CHECKPOINT_NAME_LEN)
}

/// Cut `text` to at most `max` grapheme clusters, ending in "..." when cut.
fn truncate_name(text: &str, max: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut name: String = graphemes[..keep].concat();
    name.push_str(ELLIPSIS);
    name
}
