//! String setting handlers for free-text settings.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{success_set, success_unset, truncate_with_ellipsis};
use crate::cli::settings::SettingHandler;
use crate::core::config::data::Config;
use crate::core::config::defaults::{DEFAULT_BUDDY_NAME, DEFAULT_MODEL, DEFAULT_SYSTEM_MESSAGE};
use crate::core::models::find_model;
use tracing::debug;

const DISPLAY_WIDTH: usize = 50;

/// Data-driven handler for settings that hold a line of text.
pub struct StringHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: Option<&'static str>,
    get: fn(&Config) -> Option<&String>,
    set_field: fn(&mut Config, Option<String>),
}

impl SettingHandler for StringHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let value = args.join(" ");
        if value.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let message = success_set(self.key, &truncate_with_ellipsis(&value, DISPLAY_WIDTH));
        (self.set_field)(config, Some(value));
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        (self.set_field)(config, None);
        Ok(match self.default_display {
            Some(default) => format!("✅ Unset {} (will use default: {default})", self.key),
            None => success_unset(self.key),
        })
    }

    fn format(&self, config: &Config) -> String {
        match ((self.get)(config), self.default_display) {
            (Some(value), _) => {
                let flat = value.replace('\n', " ");
                format!(
                    "  {}: {}",
                    self.key,
                    truncate_with_ellipsis(&flat, DISPLAY_WIDTH)
                )
            }
            (None, Some(default)) => format!(
                "  {}: (unset, default: {})",
                self.key,
                truncate_with_ellipsis(default, 40)
            ),
            (None, None) => format!("  {}: (unset)", self.key),
        }
    }
}

pub fn buddy_name_handler() -> StringHandler {
    StringHandler {
        key: "buddy-name",
        hint: "To name your buddy, provide the name:",
        example: "lil-guy set buddy-name Pete",
        default_display: Some(DEFAULT_BUDDY_NAME),
        get: |c| c.buddy_name.as_ref(),
        set_field: |c, v| c.buddy_name = v,
    }
}

pub fn system_message_handler() -> StringHandler {
    StringHandler {
        key: "system-message",
        hint: "To set the system message, provide the prompt text:",
        example: "lil-guy set system-message \"You are a terse assistant\"",
        default_display: Some(DEFAULT_SYSTEM_MESSAGE),
        get: |c| c.system_message.as_ref(),
        set_field: |c, v| c.system_message = v,
    }
}

/// Handler for the `model` setting. Models outside the catalog are allowed
/// but are priced at zero.
pub struct ModelHandler;

impl SettingHandler for ModelHandler {
    fn key(&self) -> &'static str {
        "model"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let model = args.join(" ").trim().to_string();
        if model.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To choose a model, specify its id:",
                example: "lil-guy set model gpt-4o-mini",
            });
        }

        let mut message = success_set("model", &model);
        if find_model(&model).is_none() {
            debug!(model = %model, "model not in catalog");
            message.push_str(" (not in the catalog; cost tracking will show $0)");
        }
        config.model = Some(model);
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.model = None;
        Ok(format!("✅ Unset model (will use default: {DEFAULT_MODEL})"))
    }

    fn format(&self, config: &Config) -> String {
        match &config.model {
            Some(model) => format!("  model: {model}"),
            None => format!("  model: (unset, default: {DEFAULT_MODEL})"),
        }
    }
}

pub fn theme_handler() -> StringHandler {
    StringHandler {
        key: "theme",
        hint: "To set the colour theme, provide its name:",
        example: "lil-guy set theme dark",
        default_display: None,
        get: |c| c.theme.as_ref(),
        set_field: |c, v| c.theme = v,
    }
}

pub fn retro_theme_handler() -> StringHandler {
    StringHandler {
        key: "retro-theme",
        hint: "To set the retro theme, provide its name:",
        example: "lil-guy set retro-theme amber",
        default_display: None,
        get: |c| c.retro_theme.as_ref(),
        set_field: |c, v| c.retro_theme = v,
    }
}
