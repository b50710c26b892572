use std::error::Error;

use chrono::Local;

use crate::core::config::data::path_display;
use crate::storage::{search_chats, search_trees, HistoryStore, TreeStore};
use crate::utils::text::{column_width, pad_to_width, snippet};

const SNIPPET_CHARS: usize = 70;

pub fn list_chats(store: &HistoryStore) -> Result<(), Box<dyn Error>> {
    let files = store.list()?;
    if files.is_empty() {
        println!("No saved chats.");
        return Ok(());
    }

    println!("💬 Saved chats:\n");
    let width = column_width(files.iter().map(String::as_str));
    for file in &files {
        match store.load(file) {
            Ok(history) => println!(
                "  {}  {} messages with {} ({})",
                pad_to_width(file, width),
                history.messages.len(),
                history.buddy_name,
                history.model
            ),
            Err(err) => println!("  {}  ⚠️  {err}", pad_to_width(file, width)),
        }
    }
    Ok(())
}

pub fn show_chat(store: &HistoryStore, chat: &str) -> Result<(), Box<dyn Error>> {
    let history = store.load(chat)?;
    println!("💬 Chat with {} ({})\n", history.buddy_name, history.model);
    for msg in &history.messages {
        let time = msg.timestamp.with_timezone(&Local).format("%H:%M");
        let speaker = if msg.is_user() {
            "You"
        } else if msg.is_system() {
            "System"
        } else {
            history.buddy_name.as_str()
        };
        println!("[{time}] {speaker}: {}\n", msg.content);
    }
    Ok(())
}

pub fn export_chat(store: &HistoryStore, chat: &str) -> Result<(), Box<dyn Error>> {
    let history = store.load(chat)?;
    let filename = store.export_markdown(&history)?;
    println!(
        "✅ Exported {chat} to {}",
        path_display(store.dir().join(filename))
    );
    Ok(())
}

pub fn search_chat_files(store: &HistoryStore, query: &str) -> Result<(), Box<dyn Error>> {
    let hits = search_chats(store, query)?;
    if hits.is_empty() {
        println!("No matches for '{query}'.");
        return Ok(());
    }

    println!("🔎 {} matches for '{query}':\n", hits.len());
    for hit in hits {
        println!(
            "  {}  [{}] {}",
            hit.file,
            hit.message.role.as_str(),
            snippet(&hit.message.content, SNIPPET_CHARS)
        );
    }
    Ok(())
}

pub fn search_tree_files(store: &TreeStore, query: &str) -> Result<(), Box<dyn Error>> {
    let hits = search_trees(store, query)?;
    if hits.is_empty() {
        println!("No checkpoint matches for '{query}'.");
        return Ok(());
    }

    println!("🔎 {} checkpoint matches for '{query}':\n", hits.len());
    for hit in hits {
        println!(
            "  {}  {} ({})  [{}] {}",
            hit.file,
            hit.checkpoint_name,
            hit.checkpoint_id,
            hit.message.role.as_str(),
            snippet(&hit.message.content, SNIPPET_CHARS)
        );
    }
    Ok(())
}
