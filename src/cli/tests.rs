use super::*;
use crate::core::config::io::CONFIG_DIR_ENV;
use crate::core::error::ChatError;
use crate::core::message::Message;
use crate::storage::paths::DATA_DIR_ENV;
use crate::storage::ChatHistory;
use crate::utils::test_utils::{create_test_messages, TestEnvVarGuard};
use tempfile::TempDir;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }

    /// Point data and config at a scratch directory for the guard's lifetime.
    pub(super) fn isolated_env() -> (TempDir, TestEnvVarGuard) {
        let temp = TempDir::new().expect("temp dir");
        let mut guard = TestEnvVarGuard::new();
        guard.set_var(DATA_DIR_ENV, temp.path().join("data"));
        guard.set_var(CONFIG_DIR_ENV, temp.path().join("config"));
        (temp, guard)
    }

    pub(super) fn stores(temp: &TempDir) -> (TreeStore, HistoryStore) {
        let data = temp.path().join("data");
        (
            TreeStore::open(data.join(".lil_guy_branches")).expect("tree store"),
            HistoryStore::open(data.join(".lil_guy_chats")).expect("chat store"),
        )
    }

    pub(super) fn save_chat(chats: &HistoryStore, name: &str) {
        let mut history = ChatHistory::new(create_test_messages(), "Buddy", "gpt-4o");
        chats.save_as(&mut history, name).expect("save chat");
    }
}

use test_helpers::{isolated_env, parse_args, save_chat, stores};

#[test]
fn tree_subcommands_parse() {
    match parse_args(&["lil-guy", "tree", "new"]).command {
        Commands::Tree {
            command: TreeCommands::New { file: None },
        } => {}
        _ => panic!("expected tree new without a file"),
    }
    match parse_args(&["lil-guy", "tree", "show", "tree_a.json"]).command {
        Commands::Tree {
            command: TreeCommands::Show { file },
        } => assert_eq!(file, "tree_a.json"),
        _ => panic!("expected tree show"),
    }
}

#[test]
fn fork_flags_parse() {
    let argv = [
        "lil-guy",
        "fork",
        "tree_a.json",
        "checkpoint_1",
        "alt",
        "--description",
        "try again",
        "--switch",
    ];
    match parse_args(&argv).command {
        Commands::Fork {
            file,
            checkpoint,
            name,
            description,
            switch,
        } => {
            assert_eq!(file, "tree_a.json");
            assert_eq!(checkpoint, "checkpoint_1");
            assert_eq!(name, "alt");
            assert_eq!(description, "try again");
            assert!(switch);
        }
        _ => panic!("expected fork for argv={argv:?}"),
    }
}

#[test]
fn checkpoint_requires_chat_flag() {
    assert!(Args::try_parse_from(["lil-guy", "checkpoint", "tree_a.json"]).is_err());
    match parse_args(&["lil-guy", "checkpoint", "tree_a.json", "--chat", "c.json"]).command {
        Commands::Checkpoint {
            name, description, ..
        } => {
            assert_eq!(name, None);
            assert_eq!(description, "");
        }
        _ => panic!("expected checkpoint"),
    }
}

#[test]
fn set_joins_multi_word_values_and_verbose_is_global() {
    let args = parse_args(&["lil-guy", "set", "system-message", "Be", "-brief"]);
    match args.command {
        Commands::Set { key, value } => {
            assert_eq!(key, "system-message");
            assert_eq!(value, vec!["Be", "-brief"]);
        }
        _ => panic!("expected set"),
    }
    assert!(parse_args(&["lil-guy", "chats", "--verbose"]).verbose);
}

#[test]
fn search_needs_a_query() {
    assert!(Args::try_parse_from(["lil-guy", "search"]).is_err());
    match parse_args(&["lil-guy", "search", "rust", "lifetimes", "--trees"]).command {
        Commands::Search { query, trees } => {
            assert_eq!(query, vec!["rust", "lifetimes"]);
            assert!(trees);
        }
        _ => panic!("expected search"),
    }
}

#[test]
fn checkpoint_fork_switch_restore_flow() {
    let (temp, _env) = isolated_env();
    let (trees, chats) = stores(&temp);
    save_chat(&chats, "chat_source.json");

    run(parse_args(&["lil-guy", "tree", "new", "tree_flow.json"]).command).unwrap();
    run(parse_args(&[
        "lil-guy",
        "checkpoint",
        "tree_flow.json",
        "--chat",
        "chat_source.json",
    ])
    .command)
    .unwrap();

    let tree = trees.load("tree_flow.json").unwrap();
    let checkpoint = tree.list_checkpoints()[0].clone();
    // generated from the last user message
    assert_eq!(checkpoint.name, "How are you?");
    assert_eq!(checkpoint.messages, create_test_messages());

    run(parse_args(&[
        "lil-guy",
        "fork",
        "tree_flow.json",
        &checkpoint.id,
        "alt",
        "--switch",
    ])
    .command)
    .unwrap();
    let tree = trees.load("tree_flow.json").unwrap();
    assert_eq!(tree.branch_count(), 2);
    assert_eq!(tree.current_branch().unwrap().name, "alt");

    run(parse_args(&["lil-guy", "switch", "tree_flow.json", "main"]).command).unwrap();
    let tree = trees.load("tree_flow.json").unwrap();
    assert_eq!(tree.current_branch_id(), tree.root_branch_id());

    run(parse_args(&["lil-guy", "restore", "tree_flow.json", &checkpoint.id]).command).unwrap();
    let restored: Vec<String> = chats
        .list()
        .unwrap()
        .into_iter()
        .filter(|name| name != "chat_source.json")
        .collect();
    assert_eq!(restored.len(), 1);
    let history = chats.load(&restored[0]).unwrap();
    assert_eq!(history.messages, create_test_messages());
    assert_eq!(history.model, "gpt-4o");
}

#[test]
fn tree_new_refuses_to_overwrite() {
    let (temp, _env) = isolated_env();
    let (trees, _) = stores(&temp);
    let mut tree = crate::core::branching::ConversationTree::new();
    tree.create_checkpoint("keep", "", &[Message::user("keep me")])
        .unwrap();
    trees.save(&tree, "tree_keep.json").unwrap();

    let err = run(parse_args(&["lil-guy", "tree", "new", "tree_keep.json"]).command).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(trees.load("tree_keep.json").unwrap().checkpoint_count(), 1);
}

#[test]
fn unnamed_tree_new_keeps_trees_from_the_same_second() {
    let (temp, _env) = isolated_env();
    let (trees, _) = stores(&temp);
    let mut tree = crate::core::branching::ConversationTree::new();
    tree.create_checkpoint("keep", "", &[Message::user("keep me")])
        .unwrap();
    let kept = trees.save(&tree, "").unwrap();

    run(parse_args(&["lil-guy", "tree", "new"]).command).unwrap();

    assert_eq!(trees.load(&kept).unwrap().checkpoint_count(), 1);
    assert_eq!(trees.list().unwrap().len(), 2);
}

#[test]
fn repeated_restores_write_separate_chats() {
    let (temp, _env) = isolated_env();
    let (trees, chats) = stores(&temp);
    let mut tree = crate::core::branching::ConversationTree::new();
    let id = tree
        .create_checkpoint("A", "", &create_test_messages())
        .unwrap()
        .id
        .clone();
    trees.save(&tree, "tree_r.json").unwrap();

    for _ in 0..2 {
        run(parse_args(&["lil-guy", "restore", "tree_r.json", &id]).command).unwrap();
    }
    assert_eq!(chats.list().unwrap().len(), 2);
}

#[test]
fn unknown_checkpoint_surfaces_not_found() {
    let (temp, _env) = isolated_env();
    let (trees, _) = stores(&temp);
    trees
        .save(&crate::core::branching::ConversationTree::new(), "tree_a.json")
        .unwrap();

    let err = run(parse_args(&["lil-guy", "fork", "tree_a.json", "checkpoint_nope", "x"]).command)
        .unwrap_err();
    let chat_err = err.downcast_ref::<ChatError>().expect("chat error");
    assert!(chat_err.is_not_found());
    assert_eq!(trees.load("tree_a.json").unwrap().branch_count(), 1);
}

#[test]
fn switch_by_name_requires_a_unique_match() {
    let mut tree = crate::core::branching::ConversationTree::new();
    let id = tree
        .create_checkpoint("A", "", &[Message::user("hi")])
        .unwrap()
        .id
        .clone();
    let first = tree.create_branch(&id, "twin", "").unwrap().id.clone();
    tree.create_branch(&id, "twin", "").unwrap();

    assert_eq!(tree_commands::resolve_branch(&tree, &first).unwrap().id, first);
    assert!(tree_commands::resolve_branch(&tree, "twin")
        .unwrap_err()
        .is_not_found());
    assert_eq!(
        tree_commands::resolve_branch(&tree, "main").unwrap().id,
        tree.root_branch_id()
    );
}

#[test]
fn set_and_unset_persist_config() {
    let (_temp, _env) = isolated_env();

    run(parse_args(&["lil-guy", "set", "personality", "Zen"]).command).unwrap();
    run(parse_args(&["lil-guy", "set", "buddy-name", "Little", "Guy"]).command).unwrap();
    let config = Config::load().unwrap();
    assert_eq!(config.personality.as_deref(), Some("zen"));
    assert_eq!(config.buddy_name.as_deref(), Some("Little Guy"));

    run(parse_args(&["lil-guy", "unset", "buddy-name"]).command).unwrap();
    let config = Config::load().unwrap();
    assert_eq!(config.buddy_name, None);
    assert_eq!(config.personality.as_deref(), Some("zen"));
}

#[test]
fn apply_setting_reports_unknown_keys_without_saving() {
    let (_temp, _env) = isolated_env();
    let result = apply_setting(|registry, config| {
        registry
            .handler("colour")?
            .set(&["blue".to_string()], config)
    });
    assert!(matches!(result, Err(SettingError::UnknownKey(_))));
    assert!(!Config::config_path().unwrap().exists());
}

#[test]
fn export_writes_markdown_next_to_chats() {
    let (temp, _env) = isolated_env();
    let (_, chats) = stores(&temp);
    save_chat(&chats, "chat_x.json");

    run(parse_args(&["lil-guy", "export", "chat_x.json"]).command).unwrap();
    let exported = std::fs::read_dir(chats.dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".md"))
        .count();
    assert_eq!(exported, 1);
}
