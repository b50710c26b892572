//! A live chat: the message store plus the tree it checkpoints into.

use crate::core::branching::{checkpoint_name_or_generated, Checkpoint, ConversationTree};
use crate::core::config::Config;
use crate::core::error::ChatError;
use crate::core::message::{Message, MessageStore, Role};
use crate::core::models::TokenUsage;
use crate::core::personality::{find_personality, Personality};
use crate::storage::{ChatHistory, HistoryStore, TreeStore};
use tracing::{debug, warn};

pub struct ChatSession {
    messages: MessageStore,
    tree: ConversationTree,
    tree_file: Option<String>,
    chat_file: Option<String>,
    chat_history: Option<ChatHistory>,
    buddy_name: String,
    model: String,
    system_message: String,
    auto_save: bool,
    personality: &'static Personality,
    usage: TokenUsage,
}

impl ChatSession {
    pub fn new(config: &Config) -> Self {
        Self {
            messages: MessageStore::new(),
            tree: ConversationTree::new(),
            tree_file: None,
            chat_file: None,
            chat_history: None,
            buddy_name: config.buddy_name().to_string(),
            model: config.model().to_string(),
            system_message: config.system_message().to_string(),
            auto_save: config.auto_save(),
            personality: find_personality(config.personality()),
            usage: TokenUsage::default(),
        }
    }

    /// Continue working on a saved tree; later [`Self::save_tree`] calls
    /// overwrite the same file.
    pub fn open_tree(&mut self, store: &TreeStore, filename: &str) -> Result<(), ChatError> {
        self.tree = store.load(filename)?;
        self.tree_file = Some(filename.to_string());
        Ok(())
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn tree(&self) -> &ConversationTree {
        &self.tree
    }

    pub fn tree_file(&self) -> Option<&str> {
        self.tree_file.as_deref()
    }

    pub fn chat_file(&self) -> Option<&str> {
        self.chat_file.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn personality(&self) -> &'static Personality {
        self.personality
    }

    pub fn usage(&self) -> &TokenUsage {
        &self.usage
    }

    /// The buddy name as shown, with personality decoration.
    pub fn display_name(&self) -> String {
        self.personality.apply_to_buddy_name(&self.buddy_name)
    }

    pub fn greeting(&self) -> &str {
        &self.personality.greeting
    }

    pub fn system_prompt(&self) -> String {
        let base = format!("{} named {}.", self.system_message, self.display_name());
        self.personality.apply_to_system_prompt(&base)
    }

    /// The system prompt followed by the conversation, ready to send.
    pub fn request_messages(&self) -> Vec<Message> {
        let mut request = Vec::with_capacity(self.messages.len() + 1);
        request.push(Message::system(self.system_prompt()));
        request.extend(self.messages.iter().cloned());
        request
    }

    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages
            .push(Message::new(role, content).with_model(self.model.clone()));
    }

    pub fn record_usage(&mut self, prompt_tokens: u64, completion_tokens: u64) {
        self.usage.record(&self.model, prompt_tokens, completion_tokens);
    }

    /// Snapshot the live conversation onto the active branch. A missing or
    /// blank name is generated from the conversation.
    pub fn checkpoint(
        &mut self,
        name: Option<&str>,
        description: &str,
    ) -> Result<&Checkpoint, ChatError> {
        let name = checkpoint_name_or_generated(name, self.messages.as_slice());
        self.tree
            .create_checkpoint(name, description, self.messages.as_slice())
    }

    /// Replace the live conversation with a checkpoint's messages. The
    /// active branch does not change.
    pub fn restore(&mut self, checkpoint_id: &str) -> Result<(), ChatError> {
        let messages = self.tree.load_from_checkpoint(checkpoint_id)?;
        self.messages.replace(messages);
        Ok(())
    }

    /// Fork a branch at `checkpoint_id` and return its id. With `switch`,
    /// the new branch becomes active and its seed is loaded.
    pub fn fork(
        &mut self,
        checkpoint_id: &str,
        name: &str,
        description: &str,
        switch: bool,
    ) -> Result<String, ChatError> {
        let branch_id = self
            .tree
            .create_branch(checkpoint_id, name, description)?
            .id
            .clone();
        if switch {
            self.tree.switch_branch(&branch_id)?;
            let seed = self.tree.current_branch()?.seed().map(|cp| cp.id.clone());
            if let Some(seed_id) = seed {
                self.restore(&seed_id)?;
            }
        }
        Ok(branch_id)
    }

    pub fn save_tree(&mut self, store: &TreeStore) -> Result<String, ChatError> {
        let requested = self.tree_file.as_deref().unwrap_or("");
        let filename = store.save(&self.tree, requested)?;
        self.tree_file = Some(filename.clone());
        Ok(filename)
    }

    pub fn save_chat(&mut self, store: &HistoryStore) -> Result<String, ChatError> {
        let history = self.chat_history.get_or_insert_with(|| {
            ChatHistory::new(Vec::new(), self.buddy_name.clone(), self.model.clone())
        });
        history.messages = self.messages.to_vec();
        history.model = self.model.clone();

        let filename = match &self.chat_file {
            Some(filename) => {
                store.save_as(history, filename)?;
                filename.clone()
            }
            None => store.save(history)?,
        };
        self.chat_file = Some(filename.clone());
        Ok(filename)
    }

    /// Save the chat when auto-save is on and there is something worth
    /// keeping. Returns whether a save happened.
    pub fn maybe_auto_save(&mut self, store: &HistoryStore) -> bool {
        if !self.auto_save || self.messages.len() <= 1 {
            return false;
        }
        match self.save_chat(store) {
            Ok(filename) => {
                debug!(file = %filename, "auto-saved chat");
                true
            }
            Err(err) => {
                warn!(error = %err, "auto-save failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> Config {
        Config {
            buddy_name: Some("Pete".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            ..Config::default()
        }
    }

    fn chatting(session: &mut ChatSession) {
        session.add_message(Role::User, "hi");
        session.add_message(Role::Assistant, "hello");
    }

    #[test]
    fn system_prompt_uses_defaults_and_buddy_name() {
        let session = ChatSession::new(&config());
        assert_eq!(
            session.system_prompt(),
            "You are a helpful AI assistant. named Pete."
        );
        assert_eq!(session.greeting(), "Hello! How can I help you today?");
    }

    #[test]
    fn personality_decorates_prompt_and_name() {
        let mut cfg = config();
        cfg.personality = Some("knight".to_string());
        cfg.system_message = Some("Be brief".to_string());
        let session = ChatSession::new(&cfg);

        assert_eq!(session.display_name(), "Sir Pete the Brave");
        let prompt = session.system_prompt();
        assert!(prompt.contains("Be brief named Sir Pete the Brave."));
        assert!(prompt.starts_with("You are a helpful AI assistant who speaks like a medieval knight."));
        assert!(prompt.ends_with("providing assistance."));
    }

    #[test]
    fn added_messages_carry_the_model() {
        let mut session = ChatSession::new(&config());
        chatting(&mut session);
        assert_eq!(session.messages().len(), 2);
        assert!(session
            .messages()
            .iter()
            .all(|m| m.model.as_deref() == Some("gpt-4o-mini")));

        let request = session.request_messages();
        assert_eq!(request.len(), 3);
        assert!(request[0].is_system());
    }

    #[test]
    fn blank_checkpoint_name_is_generated() {
        let mut session = ChatSession::new(&config());
        chatting(&mut session);
        let name = session.checkpoint(Some("  "), "").unwrap().name.clone();
        assert_eq!(name, "hi");
        let named = session.checkpoint(Some("mine"), "d").unwrap();
        assert_eq!(named.name, "mine");
        assert_eq!(named.description, "d");
    }

    #[test]
    fn restore_replaces_live_messages_only() {
        let mut session = ChatSession::new(&config());
        chatting(&mut session);
        let id = session.checkpoint(None, "").unwrap().id.clone();
        session.add_message(Role::User, "later");
        let branch = session.tree().current_branch_id().to_string();

        session.restore(&id).unwrap();
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.tree().current_branch_id(), branch);
        assert!(session.restore("checkpoint_missing").unwrap_err().is_not_found());
    }

    #[test]
    fn fork_with_switch_loads_seed_messages() {
        let mut session = ChatSession::new(&config());
        chatting(&mut session);
        let id = session.checkpoint(Some("A"), "").unwrap().id.clone();
        session.add_message(Role::User, "diverging");

        let quiet = session.fork(&id, "side", "", false).unwrap();
        assert_ne!(session.tree().current_branch_id(), quiet);
        assert_eq!(session.messages().len(), 3);

        let alt = session.fork(&id, "alt", "", true).unwrap();
        assert_eq!(session.tree().current_branch_id(), alt);
        let contents: Vec<&str> = session.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "hello"]);
    }

    #[test]
    fn save_tree_remembers_file_name() {
        let temp = TempDir::new().unwrap();
        let store = TreeStore::open(temp.path()).unwrap();
        let mut session = ChatSession::new(&config());
        chatting(&mut session);
        session.checkpoint(None, "").unwrap();

        let first = session.save_tree(&store).unwrap();
        session.checkpoint(Some("again"), "").unwrap();
        let second = session.save_tree(&store).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list().unwrap().len(), 1);

        let mut reopened = ChatSession::new(&config());
        reopened.open_tree(&store, &first).unwrap();
        assert_eq!(reopened.tree().checkpoint_count(), 2);
        assert_eq!(reopened.tree_file(), Some(first.as_str()));
    }

    #[test]
    fn auto_save_reuses_one_file() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::open(temp.path()).unwrap();
        let mut cfg = config();
        cfg.auto_save = Some(true);
        let mut session = ChatSession::new(&cfg);

        session.add_message(Role::User, "just one");
        assert!(!session.maybe_auto_save(&store));
        assert!(store.list().unwrap().is_empty());

        session.add_message(Role::Assistant, "two");
        assert!(session.maybe_auto_save(&store));
        let file = session.chat_file().unwrap().to_string();

        session.add_message(Role::User, "three");
        assert!(session.maybe_auto_save(&store));
        assert_eq!(store.list().unwrap(), vec![file.clone()]);
        assert_eq!(store.load(&file).unwrap().messages.len(), 3);
    }

    #[test]
    fn auto_save_off_does_nothing() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::open(temp.path()).unwrap();
        let mut session = ChatSession::new(&config());
        chatting(&mut session);
        assert!(!session.maybe_auto_save(&store));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn usage_is_priced_by_session_model() {
        let mut session = ChatSession::new(&config());
        session.record_usage(1_000_000, 0);
        assert_eq!(session.usage().request_count, 1);
        assert!((session.usage().estimated_cost - 0.15).abs() < 1e-9);
    }
}
