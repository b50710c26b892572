//! Registry of setting handlers.

use std::collections::HashMap;

use super::error::SettingError;
use super::handlers::{
    auto_save_handler, buddy_name_handler, retro_theme_handler, system_message_handler,
    theme_handler, ModelHandler, PersonalityHandler, TemplateHandler,
};
use super::SettingHandler;
use crate::core::config::data::Config;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `lil-guy config` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        // Register handlers in display order
        registry.register(Box::new(buddy_name_handler()));
        registry.register(Box::new(system_message_handler()));
        registry.register(Box::new(TemplateHandler));
        registry.register(Box::new(ModelHandler));
        registry.register(Box::new(PersonalityHandler));
        registry.register(Box::new(auto_save_handler()));
        registry.register(Box::new(theme_handler()));
        registry.register(Box::new(retro_theme_handler()));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Get a handler by key, or the error to report for an unknown one.
    pub fn handler(&self, key: &str) -> Result<&dyn SettingHandler, SettingError> {
        self.get(key)
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }

    /// One formatted line per setting, in display order.
    pub fn format_all(&self, config: &Config) -> Vec<String> {
        self.display_order
            .iter()
            .filter_map(|key| self.get(key))
            .map(|handler| handler.format(config))
            .collect()
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
