//! Settings management for CLI set/unset commands.
//!
//! Each configuration key has a handler; the registry dispatches `set`,
//! `unset` and display formatting to it:
//!
//! - String settings (e.g., `buddy-name`, `model`)
//! - Boolean settings (e.g., `auto-save`)
//! - Registry-backed settings (e.g., `personality`, `template`)

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Config;

/// Trait for handling a configuration setting.
///
/// Handlers edit the in-memory `Config`; the caller persists it.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the configuration value from the words after the key.
    ///
    /// # Returns
    /// A success message to display, or an error.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    /// Unset (clear) the configuration value.
    fn unset(&self, config: &mut Config) -> Result<String, SettingError>;

    /// Format the current value for display in `lil-guy config` output.
    fn format(&self, config: &Config) -> String;
}
