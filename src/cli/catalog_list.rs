//! Listings of the built-in personalities, templates and models.

use std::error::Error;

use crate::core::config::Config;
use crate::core::models::models;
use crate::core::personality::personalities;
use crate::core::templates::templates;
use crate::utils::text::{column_width, pad_to_width};

fn current_mark(is_current: bool) -> &'static str {
    if is_current {
        "*"
    } else {
        " "
    }
}

pub fn list_personalities(config: &Config) -> Result<(), Box<dyn Error>> {
    let current = config.personality();
    let width = column_width(personalities().iter().map(|p| p.id.as_str()));

    println!("Available personalities:\n");
    for p in personalities() {
        println!(
            "  {} {} {} - {}",
            current_mark(p.id.eq_ignore_ascii_case(current)),
            pad_to_width(&p.id, width),
            p.emoji,
            p.description
        );
    }
    println!("\nCurrent: {current}");
    Ok(())
}

pub fn list_templates() -> Result<(), Box<dyn Error>> {
    let width = column_width(templates().iter().map(|t| t.name.as_str()));

    println!("Available templates:\n");
    for t in templates() {
        println!(
            "  {}  {} (buddy: {})",
            pad_to_width(&t.name, width),
            t.description,
            t.buddy_name
        );
    }
    println!("\nApply one with: lil-guy set template <name>");
    Ok(())
}

pub fn list_models(config: &Config) -> Result<(), Box<dyn Error>> {
    let current = config.model();
    let width = column_width(models().iter().map(|m| m.id.as_str()));

    println!("🤖 Supported models (USD per 1M tokens, input / output)\n");
    for m in models() {
        println!(
            "  {} {}  {:<9}  ${:>6.2} / ${:>6.2}",
            current_mark(m.id == current),
            pad_to_width(&m.id, width),
            m.provider.as_str(),
            m.input_price,
            m.output_price
        );
    }
    println!("\nCurrent: {current}");
    Ok(())
}
