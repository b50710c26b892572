//! The conversation tree: every branch, every checkpoint, and which branch
//! is active.
//!
//! The tree is the only owner of branch and checkpoint identity. Checkpoint
//! lookups go through a secondary index (`checkpoint id -> branch id +
//! position`) that is updated on every insert and rebuilt whenever a tree is
//! decoded, so finding a checkpoint never scans the branches.

use crate::core::branching::checkpoint::{Branch, Checkpoint};
use crate::core::error::{ChatError, EntityKind};
use crate::core::message::Message;
use chrono::{DateTime, Utc};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

pub const ROOT_BRANCH_NAME: &str = "main";
pub const ROOT_BRANCH_DESCRIPTION: &str = "Main conversation branch";
pub const FORK_SEED_NAME: &str = "Branch start";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckpointLocation {
    branch_id: String,
    position: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "TreeRecord")]
pub struct ConversationTree {
    root_branch: String,
    branches: BTreeMap<String, Branch>,
    current_branch: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    index: HashMap<String, CheckpointLocation>,
}

impl Default for ConversationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationTree {
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    fn new_at(now: DateTime<Utc>) -> Self {
        let root = Branch::new(ROOT_BRANCH_NAME, ROOT_BRANCH_DESCRIPTION, now);
        let root_id = root.id.clone();
        let mut branches = BTreeMap::new();
        branches.insert(root_id.clone(), root);
        Self {
            root_branch: root_id.clone(),
            branches,
            current_branch: root_id,
            created_at: now,
            updated_at: now,
            index: HashMap::new(),
        }
    }

    /// Snapshot `messages` onto the active branch.
    pub fn create_checkpoint(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        messages: &[Message],
    ) -> Result<&Checkpoint, ChatError> {
        let now = Utc::now();
        let branch = self
            .branches
            .get_mut(&self.current_branch)
            .ok_or_else(|| ChatError::not_found(EntityKind::Branch, &self.current_branch))?;

        let checkpoint = Checkpoint::new(name, description, messages.to_vec(), now);
        let id = checkpoint.id.clone();
        let position = branch.push_checkpoint(checkpoint);
        self.index.insert(
            id.clone(),
            CheckpointLocation {
                branch_id: branch.id.clone(),
                position,
            },
        );
        self.updated_at = now.max(self.created_at);
        debug!(checkpoint = %id, branch = %branch.id, "created checkpoint");

        Ok(&branch.checkpoints[position])
    }

    /// Fork a new branch seeded with a copy of `from_checkpoint`'s messages.
    ///
    /// The active branch is left alone; call [`Self::switch_branch`] to move
    /// onto the new one.
    pub fn create_branch(
        &mut self,
        from_checkpoint: &str,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<&Branch, ChatError> {
        let source = self
            .checkpoint(from_checkpoint)
            .ok_or_else(|| ChatError::not_found(EntityKind::Checkpoint, from_checkpoint))?;
        let seed_description = format!("Branched from checkpoint '{}'", source.name);
        let seed_messages = source.messages.clone();

        let now = Utc::now();
        let mut branch = Branch::new(name, description, now);
        let mut seed = Checkpoint::new(FORK_SEED_NAME, seed_description, seed_messages, now);
        seed.branch_from = Some(from_checkpoint.to_string());
        let seed_id = seed.id.clone();
        let position = branch.push_checkpoint(seed);

        let branch_id = branch.id.clone();
        self.index.insert(
            seed_id,
            CheckpointLocation {
                branch_id: branch_id.clone(),
                position,
            },
        );
        self.branches.insert(branch_id.clone(), branch);
        self.updated_at = now.max(self.created_at);
        debug!(branch = %branch_id, from = %from_checkpoint, "forked branch");

        self.branches
            .get(&branch_id)
            .ok_or_else(|| ChatError::not_found(EntityKind::Branch, branch_id))
    }

    /// Make `branch_id` the active branch. On failure the pointer is unchanged.
    pub fn switch_branch(&mut self, branch_id: &str) -> Result<(), ChatError> {
        if !self.branches.contains_key(branch_id) {
            return Err(ChatError::not_found(EntityKind::Branch, branch_id));
        }
        self.current_branch = branch_id.to_string();
        self.updated_at = Utc::now().max(self.created_at);
        Ok(())
    }

    pub fn current_branch(&self) -> Result<&Branch, ChatError> {
        self.branches
            .get(&self.current_branch)
            .ok_or_else(|| ChatError::not_found(EntityKind::Branch, &self.current_branch))
    }

    /// A copy of the checkpoint's messages, independent of the tree.
    pub fn load_from_checkpoint(&self, checkpoint_id: &str) -> Result<Vec<Message>, ChatError> {
        self.checkpoint(checkpoint_id)
            .map(|checkpoint| checkpoint.messages.clone())
            .ok_or_else(|| ChatError::not_found(EntityKind::Checkpoint, checkpoint_id))
    }

    /// Every checkpoint in the tree, newest first.
    ///
    /// Equal timestamps keep branch order (oldest branch first) and then
    /// insertion order within a branch.
    pub fn list_checkpoints(&self) -> Vec<&Checkpoint> {
        let mut checkpoints: Vec<&Checkpoint> = self
            .branches()
            .into_iter()
            .flat_map(|branch| branch.checkpoints.iter())
            .collect();
        checkpoints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        checkpoints
    }

    pub fn checkpoint(&self, checkpoint_id: &str) -> Option<&Checkpoint> {
        let location = self.index.get(checkpoint_id)?;
        self.branches
            .get(&location.branch_id)?
            .checkpoints
            .get(location.position)
    }

    /// The branch that holds `checkpoint_id`.
    pub fn branch_of(&self, checkpoint_id: &str) -> Option<&Branch> {
        let location = self.index.get(checkpoint_id)?;
        self.branches.get(&location.branch_id)
    }

    pub fn branch(&self, branch_id: &str) -> Option<&Branch> {
        self.branches.get(branch_id)
    }

    /// Branches ordered by creation time, ties broken by id.
    pub fn branches(&self) -> Vec<&Branch> {
        let mut branches: Vec<&Branch> = self.branches.values().collect();
        branches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        branches
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn checkpoint_count(&self) -> usize {
        self.index.len()
    }

    pub fn root_branch(&self) -> Option<&Branch> {
        self.branches.get(&self.root_branch)
    }

    pub fn root_branch_id(&self) -> &str {
        &self.root_branch
    }

    pub fn current_branch_id(&self) -> &str {
        &self.current_branch
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The checkpoint followed by each checkpoint it descends from through
    /// forks, nearest first.
    ///
    /// A checkpoint's parent is its own `branch_from`, or else the
    /// `branch_from` of its branch's seed. The walk stops quietly at a
    /// reference that no longer resolves.
    pub fn lineage(&self, checkpoint_id: &str) -> Result<Vec<&Checkpoint>, ChatError> {
        let start = self
            .checkpoint(checkpoint_id)
            .ok_or_else(|| ChatError::not_found(EntityKind::Checkpoint, checkpoint_id))?;

        let mut chain = vec![start];
        let mut seen: HashSet<&str> = HashSet::from([start.id.as_str()]);
        let mut current = start;
        while let Some(parent_id) = self.parent_of(current) {
            let Some(parent) = self.checkpoint(parent_id) else {
                debug!(checkpoint = %current.id, parent = %parent_id, "dangling branch_from");
                break;
            };
            if !seen.insert(parent.id.as_str()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }

    fn parent_of<'a>(&'a self, checkpoint: &'a Checkpoint) -> Option<&'a str> {
        if let Some(parent) = checkpoint.branch_from.as_deref() {
            return Some(parent);
        }
        self.branch_of(&checkpoint.id)
            .and_then(Branch::seed)
            .filter(|seed| seed.id != checkpoint.id)
            .and_then(|seed| seed.branch_from.as_deref())
    }
}

/// On-disk layout. `root_branch` carries the full root branch object.
#[derive(Serialize)]
struct TreeRecordRef<'a> {
    root_branch: &'a Branch,
    branches: &'a BTreeMap<String, Branch>,
    current_branch: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TreeRecord {
    root_branch: Option<Branch>,
    #[serde(default)]
    branches: Option<BTreeMap<String, Branch>>,
    current_branch: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Serialize for ConversationTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let root = self
            .root_branch()
            .ok_or_else(|| S::Error::custom(format!("root branch {} missing", self.root_branch)))?;
        TreeRecordRef {
            root_branch: root,
            branches: &self.branches,
            current_branch: &self.current_branch,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}

impl TryFrom<TreeRecord> for ConversationTree {
    type Error = String;

    fn try_from(record: TreeRecord) -> Result<Self, Self::Error> {
        let root = record
            .root_branch
            .ok_or_else(|| "conversation tree has no root branch".to_string())?;
        let mut branches = record.branches.unwrap_or_default();

        for (key, branch) in &branches {
            if key != &branch.id {
                return Err(format!(
                    "branch key {key} does not match branch id {}",
                    branch.id
                ));
            }
        }

        let root_id = root.id.clone();
        branches.entry(root_id.clone()).or_insert(root);

        if !branches.contains_key(&record.current_branch) {
            return Err(format!(
                "current branch {} is not in the tree",
                record.current_branch
            ));
        }

        let mut index = HashMap::new();
        for branch in branches.values() {
            for (position, checkpoint) in branch.checkpoints.iter().enumerate() {
                let location = CheckpointLocation {
                    branch_id: branch.id.clone(),
                    position,
                };
                if index.insert(checkpoint.id.clone(), location).is_some() {
                    return Err(format!("duplicate checkpoint id {}", checkpoint.id));
                }
            }
        }

        Ok(Self {
            root_branch: root_id,
            branches,
            current_branch: record.current_branch,
            created_at: record.created_at,
            updated_at: record.updated_at,
            index,
        })
    }
}

#[cfg(test)]
impl ConversationTree {
    /// Re-stamp a checkpoint so ordering tests do not depend on clock speed.
    pub(crate) fn set_checkpoint_time(&mut self, checkpoint_id: &str, at: DateTime<Utc>) {
        let location = self.index[checkpoint_id].clone();
        if let Some(branch) = self.branches.get_mut(&location.branch_id) {
            branch.checkpoints[location.position].created_at = at;
        }
    }

    pub(crate) fn set_branch_time(&mut self, branch_id: &str, at: DateTime<Utc>) {
        if let Some(branch) = self.branches.get_mut(branch_id) {
            branch.created_at = at;
            branch.updated_at = at;
        }
    }
}
