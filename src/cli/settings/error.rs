use std::fmt;

/// Why a `set` or `unset` did not go through.
#[derive(Debug)]
pub enum SettingError {
    UnknownKey(String),
    /// A personality or template name with no match in its catalog.
    /// `list_command` is the subcommand that shows the valid names.
    UnknownItem {
        kind: &'static str,
        input: String,
        list_command: &'static str,
    },
    InvalidBoolean(String),
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
    /// Reading or writing `config.toml` failed.
    Persist(String),
}

impl SettingError {
    /// Follow-up line printed under the error, if any.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            SettingError::UnknownKey(_) => {
                Some("'lil-guy config' shows every key you can set.".to_string())
            }
            SettingError::UnknownItem { list_command, .. } => {
                Some(format!("See 'lil-guy {list_command}' for the names you can use."))
            }
            SettingError::InvalidBoolean(_) => {
                Some("Try on/off, true/false or yes/no.".to_string())
            }
            SettingError::MissingArgs { example, .. } => Some(format!("e.g. {example}")),
            SettingError::Persist(_) => None,
        }
    }

    pub fn print(&self) {
        let marker = match self {
            SettingError::MissingArgs { .. } => "⚠️ ",
            _ => "❌",
        };
        eprintln!("{marker} {self}");
        if let Some(suggestion) = self.suggestion() {
            eprintln!("   {suggestion}");
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "No setting called '{key}'"),
            SettingError::UnknownItem { kind, input, .. } => {
                write!(f, "No {kind} named '{input}'")
            }
            SettingError::InvalidBoolean(input) => write!(f, "'{input}' is not on or off"),
            SettingError::MissingArgs { hint, .. } => f.write_str(hint),
            SettingError::Persist(msg) => write!(f, "Could not update config.toml: {msg}"),
        }
    }
}

impl std::error::Error for SettingError {}
