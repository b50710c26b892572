//! Supported models and token cost accounting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;
/// Price applied to unlisted `claude*` models.
const FALLBACK_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }
}

/// Guess the provider from a model id.
pub fn provider_for_model(model: &str) -> Provider {
    match find_model(model) {
        Some(info) => info.provider,
        None if model.starts_with("claude") => Provider::Anthropic,
        None => Provider::OpenAi,
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry. Prices are USD per million tokens.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub provider: Provider,
    pub input_price: f64,
    pub output_price: f64,
}

impl ModelInfo {
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_price + output_tokens as f64 * self.output_price)
            / TOKENS_PER_PRICE_UNIT
    }
}

#[derive(Debug, Deserialize)]
struct BuiltinModelConfig {
    models: Vec<ModelInfo>,
}

fn load_builtin_models() -> Vec<ModelInfo> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/models.toml");
    let config: BuiltinModelConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/models.toml");
    config.models
}

pub fn models() -> &'static [ModelInfo] {
    static MODELS: OnceLock<Vec<ModelInfo>> = OnceLock::new();
    MODELS.get_or_init(load_builtin_models)
}

pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    models().iter().find(|m| m.id == id)
}

/// USD cost of a call. Unknown OpenAI-style models cost nothing; unknown
/// Claude models are priced like Sonnet.
pub fn calculate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    let info = find_model(model).or_else(|| match provider_for_model(model) {
        Provider::Anthropic => find_model(FALLBACK_CLAUDE_MODEL),
        Provider::OpenAi => None,
    });
    info.map_or(0.0, |info| info.cost(input_tokens, output_tokens))
}

/// Running token and cost totals for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub estimated_cost: f64,
    pub request_count: u64,
}

impl TokenUsage {
    pub fn record(&mut self, model: &str, prompt_tokens: u64, completion_tokens: u64) {
        self.prompt_tokens += prompt_tokens;
        self.completion_tokens += completion_tokens;
        self.total_tokens += prompt_tokens + completion_tokens;
        self.estimated_cost += calculate_cost(model, prompt_tokens, completion_tokens);
        self.request_count += 1;
    }
}
