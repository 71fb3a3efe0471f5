use super::ConversationStore;
use crate::error::Error;
use crate::identity::AuthUser;
use crate::model::{Conversation, ConversationId, Message};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Conversations kept in memory, one list per owner. Ids are `<prefix>-N`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    prefix: String,
    counter: Cell<u64>,
    owners: RefCell<HashMap<String, Vec<Conversation>>>,
}

impl MemoryStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn clear(&self) {
        self.owners.borrow_mut().clear();
    }

    fn with_conversation<R>(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
        f: impl FnOnce(&mut Conversation) -> R,
    ) -> Result<R, Error> {
        let mut owners = self.owners.borrow_mut();
        owners
            .get_mut(&owner.uid)
            .and_then(|list| list.iter_mut().find(|c| &c.id == id))
            .map(f)
            .ok_or_else(|| Error::MissingConversation(id.clone()))
    }
}

#[async_trait(?Send)]
impl ConversationStore for MemoryStore {
    async fn list(&self, owner: &AuthUser) -> Result<Vec<Conversation>, Error> {
        Ok(self
            .owners
            .borrow()
            .get(&owner.uid)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, owner: &AuthUser, now: DateTime<Utc>) -> Result<Conversation, Error> {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        let conversation = Conversation::new(ConversationId::new(format!("{}-{n}", self.prefix)), now);
        self.owners
            .borrow_mut()
            .entry(owner.uid.clone())
            .or_default()
            .insert(0, conversation.clone());
        Ok(conversation)
    }

    async fn load_messages(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
    ) -> Result<Vec<Message>, Error> {
        self.with_conversation(owner, id, |c| c.messages.clone())
    }

    async fn save_messages(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
        messages: &[Message],
        at: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.with_conversation(owner, id, |c| {
            c.messages = messages.to_vec();
            c.last_updated = at;
        })
    }

    async fn rename(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
        title: &str,
    ) -> Result<(), Error> {
        self.with_conversation(owner, id, |c| c.title = title.to_owned())
    }

    async fn delete(&self, owner: &AuthUser, id: &ConversationId) -> Result<(), Error> {
        if let Some(list) = self.owners.borrow_mut().get_mut(&owner.uid) {
            list.retain(|c| &c.id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = MemoryStore::new("m");
        let alice = AuthUser::new("alice");
        let bob = AuthUser::new("bob");
        let conversation = store.create(&alice, Utc::now()).await.unwrap();

        assert!(store.list(&bob).await.unwrap().is_empty());
        assert!(matches!(
            store.load_messages(&bob, &conversation.id).await,
            Err(Error::MissingConversation(_))
        ));
    }

    #[tokio::test]
    async fn rename_and_delete() {
        let store = MemoryStore::new("m");
        let owner = AuthUser::new("alice");
        let conversation = store.create(&owner, Utc::now()).await.unwrap();

        store.rename(&owner, &conversation.id, "Leases").await.unwrap();
        assert_eq!(store.list(&owner).await.unwrap()[0].title, "Leases");

        store.delete(&owner, &conversation.id).await.unwrap();
        store.delete(&owner, &conversation.id).await.unwrap();
        assert!(store.list(&owner).await.unwrap().is_empty());
    }
}
