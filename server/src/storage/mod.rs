//! Persistent per-user assistant conversations.

use std::path::Path;

use anyhow::{Context, Result};
use momento_assistant::{ChatMessage, Feedback, MessageId, Role, UserId};

/// Append-only conversation storage consumed by the chat pipeline.
pub trait MessageStore: Send + Sync {
    /// Stores a new message and returns it with its assigned id and timestamp.
    fn append(
        &self,
        user_id: &UserId,
        role: Role,
        content: &str,
        image_url: Option<String>,
    ) -> Result<ChatMessage>;

    /// All messages of a user, oldest first.
    fn history(&self, user_id: &UserId) -> Result<Vec<ChatMessage>>;

    /// The `limit` most recent messages of a user, oldest first.
    fn recent_history(&self, user_id: &UserId, limit: usize) -> Result<Vec<ChatMessage>>;

    /// Updates the rating of a message owned by `user_id`.
    ///
    /// Returns `None` when no such message exists for that user.
    fn set_feedback(
        &self,
        user_id: &UserId,
        message_id: &MessageId,
        feedback: Option<Feedback>,
    ) -> Result<Option<ChatMessage>>;

    /// Deletes a user's conversation, returning how many messages were removed.
    fn clear(&self, user_id: &UserId) -> Result<usize>;
}

/// sled-backed [`MessageStore`].
///
/// Messages live in one tree under `user_id ++ 0x00 ++ sequence`, where the
/// sequence is sled's monotonic id, so a prefix scan yields creation order.
#[derive(Clone)]
pub struct SledMessageStore {
    db: sled::Db,
}

impl SledMessageStore {
    const TREE: &'static str = "messages";
    const INDEX_TREE: &'static str = "message_index";

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create storage directory {:?}", path))?;
        let db = sled::open(path)
            .with_context(|| format!("failed to open sled database at {:?}", path))?;
        Ok(Self { db })
    }

    /// Opens a throwaway database removed on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .context("failed to open temporary sled database")?;
        Ok(Self { db })
    }

    fn tree(&self) -> sled::Result<sled::Tree> {
        self.db.open_tree(Self::TREE)
    }

    fn index_tree(&self) -> sled::Result<sled::Tree> {
        self.db.open_tree(Self::INDEX_TREE)
    }

    fn user_prefix(user_id: &UserId) -> Vec<u8> {
        let mut prefix = user_id.as_str().as_bytes().to_vec();
        prefix.push(0);
        prefix
    }

    fn decode(value: &[u8]) -> Result<ChatMessage> {
        bincode::deserialize(value).context("stored message could not be decoded")
    }
}

impl MessageStore for SledMessageStore {
    fn append(
        &self,
        user_id: &UserId,
        role: Role,
        content: &str,
        image_url: Option<String>,
    ) -> Result<ChatMessage> {
        let tree = self.tree()?;
        let index = self.index_tree()?;

        let message = ChatMessage::new(user_id.clone(), role, content, image_url);
        let mut key = Self::user_prefix(user_id);
        key.extend_from_slice(&self.db.generate_id()?.to_be_bytes());

        let encoded = bincode::serialize(&message)?;
        tree.insert(key.as_slice(), encoded)?;
        index.insert(message.id.0.as_bytes(), key.as_slice())?;
        self.db.flush()?;
        Ok(message)
    }

    fn history(&self, user_id: &UserId) -> Result<Vec<ChatMessage>> {
        let tree = self.tree()?;
        let mut messages = Vec::new();
        for entry in tree.scan_prefix(Self::user_prefix(user_id)) {
            let (_, value) = entry?;
            messages.push(Self::decode(&value)?);
        }
        Ok(messages)
    }

    fn recent_history(&self, user_id: &UserId, limit: usize) -> Result<Vec<ChatMessage>> {
        let tree = self.tree()?;
        let mut messages = Vec::with_capacity(limit);
        for entry in tree.scan_prefix(Self::user_prefix(user_id)).rev().take(limit) {
            let (_, value) = entry?;
            messages.push(Self::decode(&value)?);
        }
        messages.reverse();
        Ok(messages)
    }

    fn set_feedback(
        &self,
        user_id: &UserId,
        message_id: &MessageId,
        feedback: Option<Feedback>,
    ) -> Result<Option<ChatMessage>> {
        let tree = self.tree()?;
        let index = self.index_tree()?;

        let Some(key) = index.get(message_id.0.as_bytes())? else {
            return Ok(None);
        };
        if !key.starts_with(&Self::user_prefix(user_id)) {
            return Ok(None);
        }
        let Some(existing) = tree.get(&key)? else {
            return Ok(None);
        };

        let mut message = Self::decode(&existing)?;
        message.feedback = feedback;
        tree.insert(&key, bincode::serialize(&message)?)?;
        tree.flush()?;
        Ok(Some(message))
    }

    fn clear(&self, user_id: &UserId) -> Result<usize> {
        let tree = self.tree()?;
        let index = self.index_tree()?;

        let mut removed = 0;
        for entry in tree.scan_prefix(Self::user_prefix(user_id)) {
            let (key, value) = entry?;
            let message = Self::decode(&value)?;
            index.remove(message.id.0.as_bytes())?;
            tree.remove(key)?;
            removed += 1;
        }
        self.db.flush()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SledMessageStore {
        SledMessageStore::temporary().unwrap()
    }

    #[test]
    fn history_is_ordered_and_scoped_to_user() {
        let store = store();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        store.append(&alice, Role::User, "first", None).unwrap();
        store.append(&bob, Role::User, "other", None).unwrap();
        store
            .append(&alice, Role::Assistant, "second", Some("https://x/i.png".into()))
            .unwrap();

        let history = store.history(&alice).unwrap();
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
        assert_eq!(history[1].image_url.as_deref(), Some("https://x/i.png"));
        assert_eq!(store.history(&bob).unwrap().len(), 1);
    }

    #[test]
    fn user_prefixes_do_not_overlap() {
        let store = store();
        store.append(&UserId::new("ann"), Role::User, "a", None).unwrap();
        store.append(&UserId::new("anna"), Role::User, "b", None).unwrap();

        assert_eq!(store.history(&UserId::new("ann")).unwrap().len(), 1);
    }

    #[test]
    fn recent_history_returns_latest_in_ascending_order() {
        let store = store();
        let user = UserId::new("u");
        for i in 0..25 {
            store.append(&user, Role::User, &format!("m{i}"), None).unwrap();
        }

        let recent = store.recent_history(&user, 10).unwrap();
        let contents: Vec<_> = recent.iter().map(|m| m.content.clone()).collect();
        let expected: Vec<_> = (15..25).map(|i| format!("m{i}")).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn feedback_requires_ownership() {
        let store = store();
        let owner = UserId::new("owner");
        let message = store.append(&owner, Role::Assistant, "hi", None).unwrap();

        let denied = store
            .set_feedback(&UserId::new("intruder"), &message.id, Some(Feedback::Up))
            .unwrap();
        assert!(denied.is_none());

        let updated = store
            .set_feedback(&owner, &message.id, Some(Feedback::Down))
            .unwrap()
            .unwrap();
        assert_eq!(updated.feedback, Some(Feedback::Down));
        assert_eq!(updated.content, "hi");
        assert_eq!(store.history(&owner).unwrap()[0].feedback, Some(Feedback::Down));

        assert!(store
            .set_feedback(&owner, &MessageId::new(), Some(Feedback::Up))
            .unwrap()
            .is_none());
    }

    #[test]
    fn clear_removes_only_that_user() {
        let store = store();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        let gone = store.append(&alice, Role::User, "one", None).unwrap();
        store.append(&alice, Role::Assistant, "two", None).unwrap();
        store.append(&bob, Role::User, "kept", None).unwrap();

        assert_eq!(store.clear(&alice).unwrap(), 2);
        assert!(store.history(&alice).unwrap().is_empty());
        assert_eq!(store.history(&bob).unwrap().len(), 1);
        assert!(store.set_feedback(&alice, &gone.id, None).unwrap().is_none());
    }
}
