//! Buddy personalities: a voice layered over the configured system prompt
//! and buddy name.

use serde::Deserialize;
use std::sync::OnceLock;

pub const DEFAULT_PERSONALITY_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Personality {
    pub id: String,
    pub name: String,
    pub description: String,
    pub emoji: String,
    #[serde(default)]
    pub system_prompt_prefix: String,
    #[serde(default)]
    pub system_prompt_suffix: String,
    pub greeting: String,
    #[serde(default)]
    pub thinking_messages: Vec<String>,
    #[serde(default)]
    pub typing_indicator: String,
    #[serde(default)]
    pub name_prefix: String,
    #[serde(default)]
    pub name_suffix: String,
}

impl Personality {
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_PERSONALITY_ID
    }

    /// Wrap `prompt` in this personality's prefix and suffix.
    pub fn apply_to_system_prompt(&self, prompt: &str) -> String {
        format!(
            "{}{}{}",
            self.system_prompt_prefix, prompt, self.system_prompt_suffix
        )
    }

    /// Decorate `name`, e.g. "Cap'n Pete the Magnificent".
    pub fn apply_to_buddy_name(&self, name: &str) -> String {
        format!("{}{}{}", self.name_prefix, name, self.name_suffix)
    }

    /// Pick a thinking message; `seed` selects one so callers control variety.
    pub fn thinking_message(&self, seed: usize) -> &str {
        if self.thinking_messages.is_empty() {
            return "Thinking...";
        }
        &self.thinking_messages[seed % self.thinking_messages.len()]
    }
}

#[derive(Debug, Deserialize)]
struct BuiltinPersonalityConfig {
    personalities: Vec<Personality>,
}

fn load_builtin_personalities() -> Vec<Personality> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/personalities.toml");
    let config: BuiltinPersonalityConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/personalities.toml");
    config.personalities
}

/// All built-in personalities, default first.
pub fn personalities() -> &'static [Personality] {
    static PERSONALITIES: OnceLock<Vec<Personality>> = OnceLock::new();
    PERSONALITIES.get_or_init(load_builtin_personalities)
}

pub fn default_personality() -> &'static Personality {
    &personalities()[0]
}

/// Look up a personality by id, case-insensitively. Unknown or empty ids
/// give the default personality.
pub fn find_personality(id: &str) -> &'static Personality {
    let id = id.trim();
    personalities()
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id))
        .unwrap_or_else(default_personality)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_has_expected_builtins() {
        let ids: Vec<&str> = personalities().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "default",
                "pirate",
                "knight",
                "hacker",
                "zen",
                "coach",
                "chef",
                "robot",
                "wizard",
                "detective"
            ]
        );
        assert!(default_personality().is_default());
    }

    #[test]
    fn unknown_ids_fall_back_to_default() {
        assert!(find_personality("ninja").is_default());
        assert!(find_personality("").is_default());
        assert_eq!(find_personality("PIRATE").id, "pirate");
    }

    #[test]
    fn default_leaves_prompt_and_name_alone() {
        let default = default_personality();
        assert_eq!(default.apply_to_system_prompt("Be nice."), "Be nice.");
        assert_eq!(default.apply_to_buddy_name("Pete"), "Pete");
    }

    #[test]
    fn affixes_wrap_prompt_and_name() {
        let pirate = find_personality("pirate");
        let prompt = pirate.apply_to_system_prompt("CORE");
        assert!(prompt.starts_with("You are a helpful AI assistant who speaks like a pirate."));
        assert!(prompt.contains(" CORE Remember to say 'arr'"));
        assert_eq!(
            pirate.apply_to_buddy_name("Pete"),
            "Cap'n Pete the Magnificent"
        );
        assert_eq!(find_personality("robot").apply_to_buddy_name("Pete"), "Pete-BOT");
    }

    #[test]
    fn thinking_message_cycles() {
        let zen = find_personality("zen");
        let count = zen.thinking_messages.len();
        assert!(count > 1);
        assert_eq!(zen.thinking_message(0), zen.thinking_message(count));
        assert_ne!(zen.thinking_message(0), zen.thinking_message(1));
    }

    #[test]
    fn every_personality_has_a_greeting() {
        assert!(personalities().iter().all(|p| !p.greeting.is_empty()));
    }
}
