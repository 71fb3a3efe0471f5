//! Conversation persistence, routed by who the session is acting for.
//!
//! Signed in users write through to a remote [`ConversationStore`], guests
//! write to an in-memory store that lives as long as the page, and
//! temporary chats are never written anywhere.

mod firestore;
mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::Error;
use crate::identity::{AuthUser, Identity};
use crate::model::{sort_by_recency, Conversation, ConversationId, Message};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;

const GUEST_PREFIX: &str = "guest-conv";
const GUEST_OWNER: &str = "guest";

#[async_trait(?Send)]
pub trait ConversationStore {
    async fn list(&self, owner: &AuthUser) -> Result<Vec<Conversation>, Error>;

    /// Creates an empty conversation; the store picks the id.
    async fn create(&self, owner: &AuthUser, now: DateTime<Utc>) -> Result<Conversation, Error>;

    async fn load_messages(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
    ) -> Result<Vec<Message>, Error>;

    /// Overwrites the message list and `lastUpdated`.
    async fn save_messages(
        &self,
        owner: &AuthUser,
        id: &ConversationId,
        messages: &[Message],
        at: DateTime<Utc>,
    ) -> Result<(), Error>;

    async fn rename(&self, owner: &AuthUser, id: &ConversationId, title: &str)
        -> Result<(), Error>;

    async fn delete(&self, owner: &AuthUser, id: &ConversationId) -> Result<(), Error>;
}

/// Where writes for the current identity go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Remote(AuthUser),
    Guest,
    Discard,
}

impl From<&Identity> for Route {
    fn from(identity: &Identity) -> Self {
        match identity {
            Identity::Authenticated(user) => Route::Remote(user.clone()),
            Identity::Guest => Route::Guest,
            Identity::Temporary(_) => Route::Discard,
        }
    }
}

pub struct Conversations<S> {
    pub(crate) remote: Option<S>,
    guest: MemoryStore,
    guest_owner: AuthUser,
}

impl<S: ConversationStore> Conversations<S> {
    pub fn new(remote: Option<S>) -> Self {
        Self {
            remote,
            guest: MemoryStore::new(GUEST_PREFIX),
            guest_owner: AuthUser::new(GUEST_OWNER),
        }
    }

    fn remote(&self) -> Result<&S, Error> {
        self.remote.as_ref().ok_or(Error::StorageUnavailable)
    }

    pub async fn list(&self, route: &Route) -> Result<Vec<Conversation>, Error> {
        let mut conversations = match route {
            Route::Remote(user) => self.remote()?.list(user).await?,
            Route::Guest => self.guest.list(&self.guest_owner).await?,
            Route::Discard => vec![],
        };
        sort_by_recency(&mut conversations);
        debug!("Listed {} conversations", conversations.len());
        Ok(conversations)
    }

    pub async fn create(&self, route: &Route, now: DateTime<Utc>) -> Result<Conversation, Error> {
        match route {
            Route::Remote(user) => self.remote()?.create(user, now).await,
            Route::Guest => self.guest.create(&self.guest_owner, now).await,
            Route::Discard => {
                let id = ConversationId::new(format!("temp-{}", uuid::Uuid::new_v4()));
                Ok(Conversation::new(id, now))
            }
        }
    }

    pub async fn load_messages(
        &self,
        route: &Route,
        id: &ConversationId,
    ) -> Result<Vec<Message>, Error> {
        match route {
            Route::Remote(user) => self.remote()?.load_messages(user, id).await,
            Route::Guest => self.guest.load_messages(&self.guest_owner, id).await,
            Route::Discard => Ok(vec![]),
        }
    }

    pub async fn save_messages(
        &self,
        route: &Route,
        id: &ConversationId,
        messages: &[Message],
        at: DateTime<Utc>,
    ) -> Result<(), Error> {
        match route {
            Route::Remote(user) => self.remote()?.save_messages(user, id, messages, at).await,
            Route::Guest => {
                self.guest
                    .save_messages(&self.guest_owner, id, messages, at)
                    .await
            }
            Route::Discard => Ok(()),
        }
    }

    pub async fn rename(&self, route: &Route, id: &ConversationId, title: &str) -> Result<(), Error> {
        match route {
            Route::Remote(user) => self.remote()?.rename(user, id, title).await,
            Route::Guest => self.guest.rename(&self.guest_owner, id, title).await,
            Route::Discard => Ok(()),
        }
    }

    pub async fn delete(&self, route: &Route, id: &ConversationId) -> Result<(), Error> {
        match route {
            Route::Remote(user) => self.remote()?.delete(user, id).await,
            Route::Guest => self.guest.delete(&self.guest_owner, id).await,
            Route::Discard => Ok(()),
        }
    }

    /// Forgets everything written by guests on this page.
    pub fn clear_guest(&self) {
        self.guest.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn guest_route_uses_memory_ids() {
        let store: Conversations<MemoryStore> = Conversations::new(None);
        let first = store.create(&Route::Guest, at(1)).await.unwrap();
        let second = store.create(&Route::Guest, at(2)).await.unwrap();
        assert_eq!(first.id.as_str(), "guest-conv-1");
        assert_eq!(second.id.as_str(), "guest-conv-2");

        let listed = store.list(&Route::Guest).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["guest-conv-2", "guest-conv-1"]);
    }

    #[tokio::test]
    async fn list_is_sorted_by_last_update() {
        let store = Conversations::new(Some(MemoryStore::new("remote")));
        let route = Route::Remote(AuthUser::new("u1"));
        let first = store.create(&route, at(1)).await.unwrap();
        store.create(&route, at(2)).await.unwrap();
        store
            .save_messages(&route, &first.id, &[Message::user("hi", at(3))], at(3))
            .await
            .unwrap();

        let listed = store.list(&route).await.unwrap();
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn saving_twice_is_idempotent() {
        let store = Conversations::new(Some(MemoryStore::new("remote")));
        let route = Route::Remote(AuthUser::new("u1"));
        let conversation = store.create(&route, at(1)).await.unwrap();
        let messages = vec![Message::user("hi", at(2)), Message::bot("hello", at(2))];

        store
            .save_messages(&route, &conversation.id, &messages, at(2))
            .await
            .unwrap();
        let once = store.list(&route).await.unwrap();
        store
            .save_messages(&route, &conversation.id, &messages, at(2))
            .await
            .unwrap();
        let twice = store.list(&route).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice[0].messages, messages);
    }

    #[tokio::test]
    async fn temporary_route_writes_nowhere() {
        let store: Conversations<MemoryStore> = Conversations::new(None);
        let temp = store.create(&Route::Discard, at(1)).await.unwrap();
        assert!(temp.id.as_str().starts_with("temp-"));
        store
            .save_messages(&Route::Discard, &temp.id, &[Message::user("x", at(1))], at(1))
            .await
            .unwrap();
        assert!(store.list(&Route::Discard).await.unwrap().is_empty());
        assert!(store.list(&Route::Guest).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_route_without_store_is_unavailable() {
        let store: Conversations<MemoryStore> = Conversations::new(None);
        let route = Route::Remote(AuthUser::new("u1"));
        assert!(matches!(
            store.list(&route).await,
            Err(Error::StorageUnavailable)
        ));
    }

    #[test]
    fn routes_follow_identity() {
        let user = AuthUser::new("u1");
        assert_eq!(
            Route::from(&Identity::Authenticated(user.clone())),
            Route::Remote(user.clone())
        );
        assert_eq!(Route::from(&Identity::Guest), Route::Guest);
        assert_eq!(Route::from(&Identity::Temporary(user)), Route::Discard);
    }
}
