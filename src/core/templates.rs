use serde::Deserialize;
use std::sync::OnceLock;

/// A ready-made system prompt with a matching buddy name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub buddy_name: String,
}

#[derive(Debug, Deserialize)]
struct BuiltinTemplateConfig {
    templates: Vec<Template>,
}

fn load_builtin_templates() -> Vec<Template> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/templates.toml");
    let config: BuiltinTemplateConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/templates.toml");
    config.templates
}

pub fn templates() -> &'static [Template] {
    static TEMPLATES: OnceLock<Vec<Template>> = OnceLock::new();
    TEMPLATES.get_or_init(load_builtin_templates)
}

/// Case-insensitive lookup by template name.
pub fn find_template(name: &str) -> Option<&'static Template> {
    let name = name.trim();
    templates()
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_has_expected_builtins() {
        let names: Vec<&str> = templates().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"General Assistant"));
        assert!(names.contains(&"Coding Expert"));
        assert!(names.contains(&"Chef"));
    }

    #[test]
    fn lookup_ignores_case() {
        let template = find_template("coding expert").unwrap();
        assert_eq!(template.buddy_name, "CodeMaster");
        assert!(find_template("Astronaut").is_none());
    }
}
