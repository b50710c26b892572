use crate::core::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Immutable snapshot of a conversation at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    /// Checkpoint this one was forked from. Historical annotation only: it
    /// is never re-validated after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_from: Option<String>,
}

/// One timeline: checkpoints in the order they were taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checkpoints: Vec<Checkpoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// Older files may carry `null` where an empty list is meant.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Checkpoint {
    pub(crate) fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        messages: Vec<Message>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id("checkpoint"),
            name: name.into(),
            description: description.into(),
            messages,
            created_at,
            branch_from: None,
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_fork_seed(&self) -> bool {
        self.branch_from.is_some()
    }
}

impl Branch {
    pub(crate) fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id("branch"),
            name: name.into(),
            description: description.into(),
            checkpoints: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Append and return the position of the new checkpoint.
    pub(crate) fn push_checkpoint(&mut self, checkpoint: Checkpoint) -> usize {
        let at = checkpoint.created_at;
        self.checkpoints.push(checkpoint);
        self.touch(at);
        self.checkpoints.len() - 1
    }

    /// `updated_at` never moves behind `created_at`, even if the wall clock
    /// steps backwards.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    pub fn latest_checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }

    /// The checkpoint a forked branch was seeded with.
    pub fn seed(&self) -> Option<&Checkpoint> {
        self.checkpoints.first()
    }

    /// Id of the checkpoint this branch was forked from, if any.
    pub fn forked_from(&self) -> Option<&str> {
        self.seed().and_then(|seed| seed.branch_from.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::base_time;
    use chrono::Duration;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = new_id("checkpoint");
        let b = new_id("checkpoint");
        assert!(a.starts_with("checkpoint_"));
        assert_ne!(a, b);
    }

    #[test]
    fn touch_keeps_updated_at_monotonic_against_creation() {
        let created = base_time();
        let mut branch = Branch::new("main", "", created);
        branch.touch(created - Duration::minutes(5));
        assert_eq!(branch.updated_at, created);
        branch.touch(created + Duration::minutes(5));
        assert!(branch.updated_at > branch.created_at);
    }

    #[test]
    fn seed_is_first_and_latest_is_last() {
        let mut branch = Branch::new("main", "", base_time());
        assert!(branch.latest_checkpoint().is_none());

        branch.push_checkpoint(Checkpoint::new("first", "", Vec::new(), base_time()));
        let at = branch.push_checkpoint(Checkpoint::new(
            "second",
            "",
            Vec::new(),
            base_time() + Duration::minutes(1),
        ));
        assert_eq!(at, 1);
        assert_eq!(branch.seed().unwrap().name, "first");
        assert_eq!(branch.latest_checkpoint().unwrap().name, "second");
        assert_eq!(branch.forked_from(), None);
    }

    #[test]
    fn null_lists_deserialize_as_empty() {
        let json = r#"{
            "id": "checkpoint_1719000000000000000",
            "name": "legacy",
            "description": "",
            "messages": null,
            "created_at": "2024-06-21T12:00:00.123456789+02:00"
        }"#;
        let checkpoint: Checkpoint = serde_json::from_str(json).unwrap();
        assert!(checkpoint.messages.is_empty());
        assert_eq!(checkpoint.branch_from, None);
    }

    #[test]
    fn absent_branch_from_is_not_written() {
        let checkpoint = Checkpoint::new("a", "", Vec::new(), base_time());
        let json = serde_json::to_value(&checkpoint).unwrap();
        assert!(json.get("branch_from").is_none());
        assert!(!checkpoint.is_fork_seed());
    }
}
