//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and runs one command per
//! invocation against the saved trees, chats and preferences.

pub mod catalog_list;
pub mod chat_commands;
pub mod settings;
pub mod tree_commands;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::cli::settings::{SettingError, SettingRegistry};
use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::storage::{HistoryStore, TreeStore};
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "lil-guy")]
#[command(version)]
#[command(about = "Branching conversation history for your chat buddy")]
#[command(
    long_about = "lil-guy keeps chat conversations as trees of checkpoints. Snapshot a chat \
into a tree, fork alternative branches from any checkpoint, and restore a checkpoint back \
into a chat file to continue from there.\n\n\
Storage:\n\
  ~/.lil_guy_branches   Conversation trees (tree_*.json)\n\
  ~/.lil_guy_chats      Linear chat histories and markdown exports\n\n\
Environment Variables:\n\
  LIL_GUY_DATA_DIR      Directory used instead of your home directory for storage\n\
  LIL_GUY_CONFIG_DIR    Directory holding config.toml\n\
  LIL_GUY_LOG           Log filter for diagnostics on stderr (default: warn)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Print debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, list and inspect conversation trees
    Tree {
        #[command(subcommand)]
        command: TreeCommands,
    },
    /// Snapshot a saved chat onto the active branch of a tree
    Checkpoint {
        /// Tree file name
        file: String,
        /// Chat file to snapshot
        #[arg(long)]
        chat: String,
        /// Checkpoint name (generated from the chat when omitted)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List every checkpoint in a tree, newest first
    Checkpoints {
        /// Tree file name
        file: String,
    },
    /// Start a new branch from a checkpoint
    Fork {
        /// Tree file name
        file: String,
        /// Checkpoint id to fork from
        checkpoint: String,
        /// Name of the new branch
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Make the new branch active
        #[arg(long)]
        switch: bool,
    },
    /// Make a branch the active one
    Switch {
        /// Tree file name
        file: String,
        /// Branch id or unique branch name
        branch: String,
    },
    /// Write a checkpoint's messages out as a new chat file
    Restore {
        /// Tree file name
        file: String,
        /// Checkpoint id
        checkpoint: String,
    },
    /// List saved chats
    Chats,
    /// Print a saved chat
    ShowChat {
        /// Chat file name
        chat: String,
    },
    /// Export a saved chat as markdown
    Export {
        /// Chat file name
        chat: String,
    },
    /// Search saved chats (or trees) for text
    Search {
        /// Text to look for, case-insensitively
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Search checkpoints in saved trees instead of chats
        #[arg(long)]
        trees: bool,
    },
    /// Show current configuration
    Config,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// List buddy personalities
    Personalities,
    /// List system prompt templates
    Templates,
    /// List supported models and their prices
    Models,
}

#[derive(Subcommand)]
pub enum TreeCommands {
    /// Create an empty tree
    New {
        /// File name (defaults to tree_<timestamp>.json)
        file: Option<String>,
    },
    /// List saved trees
    List,
    /// Show branches and checkpoints of a tree
    Show {
        /// Tree file name
        file: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(args.command)
}

pub fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Tree { command } => {
            let trees = TreeStore::open_default()?;
            match command {
                TreeCommands::New { file } => tree_commands::new_tree(&trees, file.as_deref()),
                TreeCommands::List => tree_commands::list_trees(&trees),
                TreeCommands::Show { file } => tree_commands::show_tree(&trees, &file),
            }
        }
        Commands::Checkpoint {
            file,
            chat,
            name,
            description,
        } => tree_commands::checkpoint_chat(
            &TreeStore::open_default()?,
            &HistoryStore::open_default()?,
            &file,
            &chat,
            name.as_deref(),
            &description,
        ),
        Commands::Checkpoints { file } => {
            tree_commands::list_checkpoints(&TreeStore::open_default()?, &file)
        }
        Commands::Fork {
            file,
            checkpoint,
            name,
            description,
            switch,
        } => tree_commands::fork(
            &TreeStore::open_default()?,
            &file,
            &checkpoint,
            &name,
            &description,
            switch,
        ),
        Commands::Switch { file, branch } => {
            tree_commands::switch(&TreeStore::open_default()?, &file, &branch)
        }
        Commands::Restore { file, checkpoint } => tree_commands::restore(
            &TreeStore::open_default()?,
            &HistoryStore::open_default()?,
            &Config::load()?,
            &file,
            &checkpoint,
        ),
        Commands::Chats => chat_commands::list_chats(&HistoryStore::open_default()?),
        Commands::ShowChat { chat } => {
            chat_commands::show_chat(&HistoryStore::open_default()?, &chat)
        }
        Commands::Export { chat } => {
            chat_commands::export_chat(&HistoryStore::open_default()?, &chat)
        }
        Commands::Search { query, trees } => {
            let query = query.join(" ");
            if trees {
                chat_commands::search_tree_files(&TreeStore::open_default()?, &query)
            } else {
                chat_commands::search_chat_files(&HistoryStore::open_default()?, &query)
            }
        }
        Commands::Config => {
            print_config(&Config::load()?);
            Ok(())
        }
        Commands::Set { key, value } => exit_on_setting_error(apply_setting(|registry, config| {
            registry.handler(&key)?.set(&value, config)
        })),
        Commands::Unset { key } => exit_on_setting_error(apply_setting(|registry, config| {
            registry.handler(&key)?.unset(config)
        })),
        Commands::Personalities => catalog_list::list_personalities(&Config::load()?),
        Commands::Templates => catalog_list::list_templates(),
        Commands::Models => catalog_list::list_models(&Config::load()?),
    }
}

fn print_config(config: &Config) {
    let registry = SettingRegistry::new();
    println!("⚙️  Current configuration:");
    for line in registry.format_all(config) {
        println!("{line}");
    }
    if let Ok(path) = Config::config_path() {
        println!();
        println!("Config file: {}", path_display(&path));
    }
}

/// Run a handler against the stored configuration and persist the result.
fn apply_setting<F>(apply: F) -> Result<String, SettingError>
where
    F: FnOnce(&SettingRegistry, &mut Config) -> Result<String, SettingError>,
{
    let registry = SettingRegistry::new();
    Config::mutate(|config| apply(&registry, config).map_err(|e| Box::new(e) as Box<dyn Error>))
        .map_err(|err| match err.downcast::<SettingError>() {
            Ok(setting_err) => *setting_err,
            Err(other) => SettingError::Persist(other.to_string()),
        })
}

fn exit_on_setting_error(result: Result<String, SettingError>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests;
