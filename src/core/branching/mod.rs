//! Checkpoints, branches and the conversation tree that owns them.

pub mod checkpoint;
pub mod naming;
pub mod tree;


pub use checkpoint::{Branch, Checkpoint};
pub use naming::checkpoint_name_or_generated;
pub use tree::ConversationTree;
