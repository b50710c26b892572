//! Tree commands: create, inspect, checkpoint, fork, switch and restore.
//!
//! Every mutating command loads the tree, applies one operation, and saves
//! it back under the same name.

use std::error::Error;

use chrono::{DateTime, Local, Utc};

use crate::core::branching::{checkpoint_name_or_generated, Branch, ConversationTree};
use crate::core::config::Config;
use crate::core::error::{ChatError, EntityKind};
use crate::storage::{ChatHistory, HistoryStore, TreeStore};
use crate::utils::text::{column_width, pad_to_width};

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

pub fn new_tree(store: &TreeStore, file: Option<&str>) -> Result<(), Box<dyn Error>> {
    if let Some(file) = file {
        if store.exists(file)? {
            return Err(format!("Tree '{file}' already exists").into());
        }
    }
    let filename = store.save(&ConversationTree::new(), file.unwrap_or(""))?;
    println!("✅ Created tree {filename}");
    Ok(())
}

pub fn list_trees(store: &TreeStore) -> Result<(), Box<dyn Error>> {
    let files = store.list()?;
    if files.is_empty() {
        println!("No saved trees. Create one with 'lil-guy tree new'.");
        return Ok(());
    }

    println!("🌳 Saved trees:\n");
    let width = column_width(files.iter().map(String::as_str));
    for file in &files {
        match store.load(file) {
            Ok(tree) => {
                let latest = tree
                    .current_branch()
                    .ok()
                    .and_then(|branch| branch.latest_checkpoint())
                    .map(|cp| format!(", at '{}'", cp.name))
                    .unwrap_or_default();
                println!(
                    "  {}  {} branches, {} checkpoints, updated {}{latest}",
                    pad_to_width(file, width),
                    tree.branch_count(),
                    tree.checkpoint_count(),
                    local_time(tree.updated_at())
                )
            }
            Err(err) => println!("  {}  ⚠️  {err}", pad_to_width(file, width)),
        }
    }
    Ok(())
}

fn print_branch(tree: &ConversationTree, branch: &Branch) {
    let mark = if branch.id == tree.current_branch_id() {
        "*"
    } else {
        " "
    };
    println!("{mark} {} ({})", branch.name, branch.id);
    if !branch.description.is_empty() {
        println!("    {}", branch.description);
    }
    if let Some(from) = branch.forked_from() {
        let origin = tree
            .checkpoint(from)
            .map(|cp| cp.name.as_str())
            .unwrap_or("missing checkpoint");
        println!("    forked from: {origin} ({from})");
    }
    for checkpoint in &branch.checkpoints {
        println!(
            "    - {}  {}  [{} messages, {}]",
            checkpoint.id,
            checkpoint.name,
            checkpoint.message_count(),
            local_time(checkpoint.created_at)
        );
    }
}

pub fn show_tree(store: &TreeStore, file: &str) -> Result<(), Box<dyn Error>> {
    let tree = store.load(file)?;
    println!("🌳 {file}");
    println!(
        "Created {}, updated {}\n",
        local_time(tree.created_at()),
        local_time(tree.updated_at())
    );
    for branch in tree.branches() {
        print_branch(&tree, branch);
    }
    Ok(())
}

pub fn checkpoint_chat(
    trees: &TreeStore,
    chats: &HistoryStore,
    file: &str,
    chat: &str,
    name: Option<&str>,
    description: &str,
) -> Result<(), Box<dyn Error>> {
    let mut tree = trees.load(file)?;
    let history = chats.load(chat)?;
    let name = checkpoint_name_or_generated(name, &history.messages);

    let checkpoint = tree.create_checkpoint(name, description, &history.messages)?;
    let (id, name) = (checkpoint.id.clone(), checkpoint.name.clone());
    trees.save(&tree, file)?;
    println!("✅ Created checkpoint '{name}' ({id})");
    Ok(())
}

pub fn list_checkpoints(store: &TreeStore, file: &str) -> Result<(), Box<dyn Error>> {
    let tree = store.load(file)?;
    let checkpoints = tree.list_checkpoints();
    if checkpoints.is_empty() {
        println!("No checkpoints in {file}.");
        return Ok(());
    }

    let width = column_width(checkpoints.iter().map(|cp| cp.name.as_str()));
    for checkpoint in checkpoints {
        let branch = tree
            .branch_of(&checkpoint.id)
            .map(|b| b.name.as_str())
            .unwrap_or_default();
        println!(
            "{}  {}  {:>3} msgs  {}  {}",
            checkpoint.id,
            pad_to_width(&checkpoint.name, width),
            checkpoint.message_count(),
            local_time(checkpoint.created_at),
            branch
        );
    }
    Ok(())
}

pub fn fork(
    store: &TreeStore,
    file: &str,
    checkpoint: &str,
    name: &str,
    description: &str,
    switch: bool,
) -> Result<(), Box<dyn Error>> {
    let mut tree = store.load(file)?;
    let branch_id = tree.create_branch(checkpoint, name, description)?.id.clone();
    if switch {
        tree.switch_branch(&branch_id)?;
    }
    store.save(&tree, file)?;

    if switch {
        println!("✅ Created and switched to branch '{name}' ({branch_id})");
    } else {
        println!("✅ Created branch '{name}' ({branch_id})");
    }
    Ok(())
}

/// Match a branch by id, or by name when exactly one branch has it.
pub fn resolve_branch<'a>(tree: &'a ConversationTree, input: &str) -> Result<&'a Branch, ChatError> {
    if let Some(branch) = tree.branch(input) {
        return Ok(branch);
    }
    let mut named = tree.branches().into_iter().filter(|b| b.name == input);
    match (named.next(), named.next()) {
        (Some(branch), None) => Ok(branch),
        _ => Err(ChatError::not_found(EntityKind::Branch, input)),
    }
}

pub fn switch(store: &TreeStore, file: &str, branch: &str) -> Result<(), Box<dyn Error>> {
    let mut tree = store.load(file)?;
    let (id, name) = {
        let target = resolve_branch(&tree, branch)?;
        (target.id.clone(), target.name.clone())
    };
    tree.switch_branch(&id)?;
    store.save(&tree, file)?;
    println!("✅ Switched to branch '{name}' ({id})");
    Ok(())
}

pub fn restore(
    trees: &TreeStore,
    chats: &HistoryStore,
    config: &Config,
    file: &str,
    checkpoint: &str,
) -> Result<(), Box<dyn Error>> {
    let tree = trees.load(file)?;
    let messages = tree.load_from_checkpoint(checkpoint)?;
    let model = messages
        .iter()
        .rev()
        .find_map(|m| m.model.clone())
        .unwrap_or_else(|| config.model().to_string());

    let mut history = ChatHistory::new(messages, config.buddy_name(), model);
    let filename = chats.save(&mut history)?;
    println!("✅ Restored checkpoint {checkpoint} to chat {filename}");
    Ok(())
}
