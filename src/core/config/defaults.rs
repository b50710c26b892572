use crate::core::config::data::Config;

pub const DEFAULT_BUDDY_NAME: &str = "AI";
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful AI assistant.";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_PERSONALITY: &str = "default";

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    pub fn buddy_name(&self) -> &str {
        non_empty(&self.buddy_name).unwrap_or(DEFAULT_BUDDY_NAME)
    }

    pub fn system_message(&self) -> &str {
        non_empty(&self.system_message).unwrap_or(DEFAULT_SYSTEM_MESSAGE)
    }

    pub fn model(&self) -> &str {
        non_empty(&self.model).unwrap_or(DEFAULT_MODEL)
    }

    pub fn personality(&self) -> &str {
        non_empty(&self.personality).unwrap_or(DEFAULT_PERSONALITY)
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save.unwrap_or(false)
    }

    /// True until the user has named their buddy; the interactive front end
    /// uses this to decide whether to run onboarding.
    pub fn needs_onboarding(&self) -> bool {
        non_empty(&self.buddy_name).is_none()
    }
}
