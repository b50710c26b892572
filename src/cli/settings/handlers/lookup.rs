//! Settings whose values come from the built-in registries.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{validate_personality, validate_template};
use crate::cli::settings::SettingHandler;
use crate::core::config::data::Config;
use crate::core::config::defaults::DEFAULT_PERSONALITY;
use crate::core::templates::templates;

/// Handler for the `personality` setting.
pub struct PersonalityHandler;

impl SettingHandler for PersonalityHandler {
    fn key(&self) -> &'static str {
        "personality"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To choose a personality, specify its id:",
                example: "lil-guy set personality pirate",
            });
        }

        let personality = validate_personality(&args.join(" "))?;
        config.personality = Some(personality.id.clone());
        Ok(format!(
            "✅ Set personality to: {} {} ({})",
            personality.emoji, personality.name, personality.id
        ))
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.personality = None;
        Ok(format!(
            "✅ Unset personality (will use default: {DEFAULT_PERSONALITY})"
        ))
    }

    fn format(&self, config: &Config) -> String {
        match &config.personality {
            Some(id) => format!("  personality: {id}"),
            None => format!("  personality: (unset, default: {DEFAULT_PERSONALITY})"),
        }
    }
}

/// Handler for `template`: copies a template's prompt and buddy name into
/// `system-message` and `buddy-name`.
pub struct TemplateHandler;

impl SettingHandler for TemplateHandler {
    fn key(&self) -> &'static str {
        "template"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To apply a template, give its name:",
                example: "lil-guy set template Coding Expert",
            });
        }

        let template = validate_template(&args.join(" "))?;
        config.system_message = Some(template.prompt.clone());
        config.buddy_name = Some(template.buddy_name.clone());
        Ok(format!(
            "✅ Applied template '{}' (buddy-name: {})",
            template.name, template.buddy_name
        ))
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.system_message = None;
        config.buddy_name = None;
        Ok("✅ Unset template (system-message and buddy-name reset)".to_string())
    }

    fn format(&self, config: &Config) -> String {
        let active = config.system_message.as_deref().and_then(|prompt| {
            templates()
                .iter()
                .find(|t| t.prompt == prompt)
                .map(|t| t.name.as_str())
        });
        match active {
            Some(name) => format!("  template: {name}"),
            None => "  template: (none)".to_string(),
        }
    }
}
