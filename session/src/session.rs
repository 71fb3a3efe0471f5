//! The whole client state as one value: who we are acting for, their
//! conversations, which one is open and whether a message is in flight.

use crate::answer::AskRequest;
use crate::error::Error;
use crate::exchange::{
    strip_blank_lines, Outbound, Outcome, Settled, Ticket, ERROR_REPLY, INTERRUPTED_REPLY,
};
use crate::identity::{AuthUser, Identity};
use crate::model::{sort_by_recency, Conversation, ConversationId, Message};
use crate::store::Route;
use crate::title;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatList {
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
}

impl ChatList {
    fn position(&self, id: &ConversationId) -> Option<usize> {
        self.conversations.iter().position(|c| &c.id == id)
    }

    fn get_mut(&mut self, id: &ConversationId) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| &c.id == id)
    }

    fn active(&self) -> Option<&Conversation> {
        let id = self.active.as_ref()?;
        self.conversations.iter().find(|c| &c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Authenticated {
        user: AuthUser,
        chats: ChatList,
    },
    Guest {
        chats: ChatList,
    },
    /// The saved list is kept underneath so the user can go back to it.
    Temporary {
        user: AuthUser,
        chats: ChatList,
        chat: Conversation,
    },
}

impl Mode {
    fn fresh(auth: Option<AuthUser>) -> Self {
        match auth {
            Some(user) => Mode::Authenticated {
                user,
                chats: ChatList::default(),
            },
            None => Mode::Guest {
                chats: ChatList::default(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SendState {
    #[default]
    Idle,
    Sending(Ticket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChange {
    Unchanged,
    /// Same user, new credentials.
    Refreshed,
    /// A different identity; conversations must be reloaded.
    Switched,
}

/// Undo information for an optimistic rename.
#[derive(Debug, Clone, PartialEq)]
pub struct Rename {
    pub id: ConversationId,
    pub previous: String,
    pub title: String,
}

/// Undo information for an optimistic delete.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub index: usize,
    pub conversation: Conversation,
    pub was_active: bool,
}

/// What the thread area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Welcome,
    SelectConversation,
    EmptyConversation,
    Thread,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    mode: Mode,
    send: SendState,
    serial: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Session {
    pub fn new(auth: Option<AuthUser>) -> Self {
        Self {
            mode: Mode::fresh(auth),
            send: SendState::Idle,
            serial: 0,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn identity(&self) -> Identity {
        match &self.mode {
            Mode::Authenticated { user, .. } => Identity::Authenticated(user.clone()),
            Mode::Guest { .. } => Identity::Guest,
            Mode::Temporary { user, .. } => Identity::Temporary(user.clone()),
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match &self.mode {
            Mode::Authenticated { user, .. } | Mode::Temporary { user, .. } => Some(user),
            Mode::Guest { .. } => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self.mode, Mode::Guest { .. })
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self.mode, Mode::Temporary { .. })
    }

    /// Where writes for the open conversation go.
    pub fn route(&self) -> Route {
        Route::from(&self.identity())
    }

    /// Where the saved conversation list lives, temporary chat or not.
    pub fn list_route(&self) -> Route {
        match self.user() {
            Some(user) => Route::Remote(user.clone()),
            None => Route::Guest,
        }
    }

    /// Where writes for conversation `id` go. Saved conversations stay
    /// reachable while a temporary chat is open.
    pub fn route_for(&self, id: &ConversationId) -> Route {
        match &self.mode {
            Mode::Temporary { chat, .. } if &chat.id == id => Route::Discard,
            _ => self.list_route(),
        }
    }

    fn owns(&self, route: &Route) -> bool {
        match (route, self.user()) {
            (Route::Remote(owner), Some(user)) => owner.uid == user.uid,
            (Route::Guest, None) => true,
            _ => false,
        }
    }

    fn chats(&self) -> &ChatList {
        match &self.mode {
            Mode::Authenticated { chats, .. }
            | Mode::Guest { chats }
            | Mode::Temporary { chats, .. } => chats,
        }
    }

    fn chats_mut(&mut self) -> &mut ChatList {
        match &mut self.mode {
            Mode::Authenticated { chats, .. }
            | Mode::Guest { chats }
            | Mode::Temporary { chats, .. } => chats,
        }
    }

    /// The saved conversations; a temporary chat is never among them.
    pub fn conversations(&self) -> &[Conversation] {
        &self.chats().conversations
    }

    pub fn active_id(&self) -> Option<&ConversationId> {
        match &self.mode {
            Mode::Temporary { chat, .. } => Some(&chat.id),
            _ => self.chats().active.as_ref(),
        }
    }

    pub fn active(&self) -> Option<&Conversation> {
        match &self.mode {
            Mode::Temporary { chat, .. } => Some(chat),
            _ => self.chats().active(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.active()
            .map(|c| c.messages.as_slice())
            .unwrap_or_default()
    }

    fn conversation_mut(&mut self, id: &ConversationId) -> Option<&mut Conversation> {
        let temporary = matches!(&self.mode, Mode::Temporary { chat, .. } if &chat.id == id);
        match &mut self.mode {
            Mode::Temporary { chat, .. } if temporary => Some(chat),
            Mode::Authenticated { chats, .. }
            | Mode::Guest { chats }
            | Mode::Temporary { chats, .. } => chats.get_mut(id),
        }
    }

    fn active_mut(&mut self) -> Option<&mut Conversation> {
        let id = self.active_id()?.clone();
        self.conversation_mut(&id)
    }

    pub fn send_state(&self) -> &SendState {
        &self.send
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.send, SendState::Sending(_))
    }

    pub fn sending_into(&self, id: &ConversationId) -> bool {
        matches!(&self.send, SendState::Sending(ticket) if &ticket.conversation == id)
    }

    /// Follows the auth provider. A different identity replaces the whole
    /// state and abandons any send in flight.
    pub fn apply_auth(&mut self, auth: Option<AuthUser>) -> AuthChange {
        let same_owner = match (&auth, self.user()) {
            (Some(next), Some(user)) => next.uid == user.uid,
            (None, None) => true,
            _ => false,
        };
        if !same_owner {
            self.mode = Mode::fresh(auth);
            self.send = SendState::Idle;
            return AuthChange::Switched;
        }
        let Some(next) = auth else {
            return AuthChange::Unchanged;
        };
        match &mut self.mode {
            Mode::Authenticated { user, .. } | Mode::Temporary { user, .. } if *user != next => {
                *user = next;
                AuthChange::Refreshed
            }
            _ => AuthChange::Unchanged,
        }
    }

    /// Installs a freshly listed set of conversations. Results for an owner
    /// the session no longer acts for are dropped. The conversation a
    /// message is being sent into keeps its local messages.
    pub fn replace_conversations(&mut self, route: &Route, mut list: Vec<Conversation>) -> bool {
        if !self.owns(route) {
            return false;
        }
        sort_by_recency(&mut list);
        if let SendState::Sending(ticket) = &self.send {
            let local = self
                .chats()
                .conversations
                .iter()
                .find(|c| c.id == ticket.conversation)
                .cloned();
            if let Some(local) = local {
                if let Some(fetched) = list.iter_mut().find(|c| c.id == local.id) {
                    *fetched = local;
                }
            }
        }
        let chats = self.chats_mut();
        let keep = chats
            .active
            .as_ref()
            .filter(|id| list.iter().any(|c| &c.id == *id))
            .cloned();
        chats.active = keep.or_else(|| list.first().map(|c| c.id.clone()));
        chats.conversations = list;
        true
    }

    /// Where a new saved conversation would be created.
    pub fn creation_route(&self) -> Result<Route, Error> {
        if self.is_temporary() && self.is_sending() {
            return Err(Error::Busy);
        }
        Ok(self.list_route())
    }

    /// Puts a new conversation at the head of the list and opens it,
    /// leaving a temporary chat if there is one.
    pub fn insert_conversation(&mut self, conversation: Conversation) -> Result<(), Error> {
        if self.is_temporary() {
            if self.is_sending() {
                return Err(Error::Busy);
            }
            self.leave_temporary();
        }
        let chats = self.chats_mut();
        chats.active = Some(conversation.id.clone());
        chats.conversations.insert(0, conversation);
        Ok(())
    }

    fn leave_temporary(&mut self) {
        let placeholder = Mode::Guest {
            chats: ChatList::default(),
        };
        self.mode = match std::mem::replace(&mut self.mode, placeholder) {
            Mode::Temporary { user, chats, .. } => Mode::Authenticated { user, chats },
            mode => mode,
        };
    }

    /// Opens a saved conversation. Returns whether anything changed.
    pub fn select(&mut self, id: &ConversationId) -> Result<bool, Error> {
        let mut changed = false;
        if let Mode::Temporary { chat, .. } = &self.mode {
            if &chat.id == id {
                return Ok(false);
            }
            if self.is_sending() {
                return Err(Error::Busy);
            }
            self.leave_temporary();
            changed = true;
        }
        let chats = self.chats_mut();
        if chats.position(id).is_none() {
            return Err(Error::MissingConversation(id.clone()));
        }
        if chats.active.as_ref() != Some(id) {
            chats.active = Some(id.clone());
            changed = true;
        }
        Ok(changed)
    }

    /// Opens an off the record chat for a signed in user. Starting one while
    /// already in a temporary chat replaces it with an empty one.
    pub fn start_temporary(&mut self, chat: Conversation) -> Result<(), Error> {
        if self.is_guest() {
            return Err(Error::NotSignedIn);
        }
        if self.is_sending() {
            return Err(Error::Busy);
        }
        let placeholder = Mode::Guest {
            chats: ChatList::default(),
        };
        self.mode = match std::mem::replace(&mut self.mode, placeholder) {
            Mode::Authenticated { user, chats } | Mode::Temporary { user, chats, .. } => {
                Mode::Temporary { user, chats, chat }
            }
            mode => mode,
        };
        Ok(())
    }

    /// Renames locally. Blank titles and no-op renames return `None`.
    pub fn rename(&mut self, id: &ConversationId, title: &str) -> Result<Option<Rename>, Error> {
        let title = title.trim();
        let conversation = self
            .conversation_mut(id)
            .ok_or_else(|| Error::MissingConversation(id.clone()))?;
        if title.is_empty() || conversation.title == title {
            return Ok(None);
        }
        let previous = std::mem::replace(&mut conversation.title, title.to_owned());
        Ok(Some(Rename {
            id: id.clone(),
            previous,
            title: title.to_owned(),
        }))
    }

    pub fn revert_rename(&mut self, rename: &Rename) {
        if let Some(conversation) = self.conversation_mut(&rename.id) {
            if conversation.title == rename.title {
                conversation.title = rename.previous.clone();
            }
        }
    }

    /// Removes a saved conversation. When it was open the most recent
    /// remaining one opens instead, or nothing.
    pub fn remove(&mut self, id: &ConversationId) -> Result<Removal, Error> {
        let chats = self.chats_mut();
        let index = chats
            .position(id)
            .ok_or_else(|| Error::MissingConversation(id.clone()))?;
        let conversation = chats.conversations.remove(index);
        let was_active = chats.active.as_ref() == Some(id);
        if was_active {
            chats.active = chats.conversations.first().map(|c| c.id.clone());
        }
        Ok(Removal {
            index,
            conversation,
            was_active,
        })
    }

    pub fn restore(&mut self, removal: Removal) {
        let chats = self.chats_mut();
        if chats.position(&removal.conversation.id).is_some() {
            return;
        }
        let index = removal.index.min(chats.conversations.len());
        if removal.was_active {
            chats.active = Some(removal.conversation.id.clone());
        }
        chats.conversations.insert(index, removal.conversation);
    }

    /// Replaces messages with what the store returned, unless a send into
    /// that conversation is in flight: local optimistic state wins.
    pub fn set_messages(&mut self, id: &ConversationId, messages: Vec<Message>) -> bool {
        if self.sending_into(id) {
            return false;
        }
        match self.conversation_mut(id) {
            Some(conversation) => {
                conversation.messages = messages;
                true
            }
            None => false,
        }
    }

    /// Appends the user message to the open conversation and marks the
    /// session as sending. Input that is blank once stripped is dropped and
    /// the session stays idle.
    pub fn begin_send(&mut self, input: &str, now: DateTime<Utc>) -> Result<Option<Outbound>, Error> {
        if self.is_sending() {
            return Err(Error::Busy);
        }
        let text = strip_blank_lines(input);
        if text.trim().is_empty() {
            return Ok(None);
        }
        let route = self.route();
        let conversation = self.active_mut().ok_or(Error::NoActiveConversation)?;
        let first_exchange = conversation.messages.is_empty();
        conversation.messages.push(Message::user(text, now));
        conversation.last_updated = now;
        let id = conversation.id.clone();
        let messages = conversation.messages.clone();

        self.serial += 1;
        let ticket = Ticket {
            conversation: id.clone(),
            first_exchange,
            serial: self.serial,
        };
        self.send = SendState::Sending(ticket.clone());
        Ok(Some(Outbound {
            ticket,
            route,
            request: AskRequest {
                query: text.trim().to_owned(),
                conversation_id: id.to_string(),
                is_new_conversation: first_exchange,
            },
            messages,
        }))
    }

    /// Merges the outcome of a send and returns the session to idle. Returns
    /// `None` for abandoned tickets and for conversations deleted meanwhile.
    pub fn finish_send(
        &mut self,
        ticket: &Ticket,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Option<Settled> {
        if !self.abandon_send(ticket) {
            return None;
        }
        let route = self.route();
        let conversation = self.conversation_mut(&ticket.conversation)?;
        let mut title = None;
        let reply = match outcome {
            Outcome::Answered(reply) => {
                if ticket.first_exchange {
                    let question = conversation
                        .messages
                        .first()
                        .map(|m| m.text.as_str())
                        .unwrap_or_default();
                    let synthesized = title::synthesize(question, &reply);
                    conversation.title = synthesized.clone();
                    title = Some(synthesized);
                }
                Message::bot(reply, now)
            }
            Outcome::Failed => Message::failure(ERROR_REPLY, now),
            Outcome::Cancelled => Message::bot(INTERRUPTED_REPLY, now),
        };
        conversation.messages.push(reply);
        conversation.last_updated = now;
        Some(Settled {
            route,
            conversation: ticket.conversation.clone(),
            messages: conversation.messages.clone(),
            title,
        })
    }

    /// Returns to idle if `ticket` is the send in flight.
    pub fn abandon_send(&mut self, ticket: &Ticket) -> bool {
        if matches!(&self.send, SendState::Sending(current) if current == ticket) {
            self.send = SendState::Idle;
            true
        } else {
            false
        }
    }

    pub fn landing(&self) -> Landing {
        let any_history = self.conversations().iter().any(Conversation::has_messages);
        match self.active() {
            Some(c) if c.has_messages() => Landing::Thread,
            _ if !any_history => Landing::Welcome,
            None => Landing::SelectConversation,
            Some(_) => Landing::EmptyConversation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap()
    }

    fn conversation(id: &str, minute: u32) -> Conversation {
        Conversation::new(ConversationId::new(id), at(minute))
    }

    fn id(id: &str) -> ConversationId {
        ConversationId::new(id)
    }

    fn signed_in(list: Vec<Conversation>) -> Session {
        let user = AuthUser::new("u1");
        let mut session = Session::new(Some(user.clone()));
        session.replace_conversations(&Route::Remote(user), list);
        session
    }

    #[test]
    fn blank_input_is_dropped_silently() {
        let mut session = Session::default();
        session.insert_conversation(conversation("g1", 0)).unwrap();
        assert_eq!(session.begin_send("  \n\n ", at(1)).unwrap(), None);
        assert!(!session.is_sending());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn sending_needs_an_open_conversation() {
        let mut session = Session::default();
        assert!(matches!(
            session.begin_send("hi", at(1)),
            Err(Error::NoActiveConversation)
        ));
        assert!(!session.is_sending());
    }

    #[test]
    fn success_adds_reply_and_title_once() {
        let mut session = Session::default();
        session.insert_conversation(conversation("g1", 0)).unwrap();

        let outbound = session
            .begin_send("\nWhat is a contract?\n", at(1))
            .unwrap()
            .unwrap();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text, "What is a contract?");
        assert!(outbound.request.is_new_conversation);
        assert_eq!(outbound.route, Route::Guest);
        assert!(matches!(session.begin_send("again", at(1)), Err(Error::Busy)));

        let settled = session
            .finish_send(
                &outbound.ticket,
                Outcome::Answered("A contract is a legally binding agreement. More.".to_owned()),
                at(2),
            )
            .unwrap();
        assert_eq!(
            settled.title.as_deref(),
            Some("A contract is a legally binding agreement")
        );
        assert_eq!(settled.messages.len(), 2);
        assert!(!session.is_sending());

        let second = session.begin_send("And a deed?", at(3)).unwrap().unwrap();
        assert!(!second.request.is_new_conversation);
        let settled = session
            .finish_send(&second.ticket, Outcome::Answered("A deed is different.".to_owned()), at(4))
            .unwrap();
        assert_eq!(settled.title, None);
        assert_eq!(
            session.active().unwrap().title,
            "A contract is a legally binding agreement"
        );
        assert_eq!(session.messages().len(), 4);
    }

    #[test]
    fn failure_appends_error_reply() {
        let mut session = Session::default();
        session.insert_conversation(conversation("g1", 0)).unwrap();
        let outbound = session.begin_send("Hello", at(1)).unwrap().unwrap();
        let settled = session
            .finish_send(&outbound.ticket, Outcome::Failed, at(2))
            .unwrap();

        let last = settled.messages.last().unwrap();
        assert!(last.error);
        assert_eq!(last.text, ERROR_REPLY);
        assert_eq!(settled.title, None);
        assert_eq!(session.active().unwrap().title, crate::model::DEFAULT_TITLE);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut session = signed_in(vec![conversation("c1", 0)]);
        let outbound = session.begin_send("Hi", at(1)).unwrap().unwrap();

        assert_eq!(session.apply_auth(None), AuthChange::Switched);
        assert!(!session.is_sending());
        assert_eq!(
            session.finish_send(&outbound.ticket, Outcome::Answered("late".to_owned()), at(2)),
            None
        );
        assert!(session.conversations().is_empty());
    }

    #[test]
    fn reply_lands_in_the_conversation_it_was_sent_from() {
        let mut session = signed_in(vec![conversation("c1", 2), conversation("c2", 1)]);
        let outbound = session.begin_send("Question", at(3)).unwrap().unwrap();
        assert_eq!(outbound.ticket.conversation, id("c1"));

        assert!(session.select(&id("c2")).unwrap());
        session
            .finish_send(&outbound.ticket, Outcome::Answered("Answer.".to_owned()), at(4))
            .unwrap();
        assert!(session.messages().is_empty());
        assert_eq!(session.conversations()[0].messages.len(), 2);
    }

    #[test]
    fn deleted_conversation_drops_reply() {
        let mut session = signed_in(vec![conversation("c1", 0)]);
        let outbound = session.begin_send("Question", at(1)).unwrap().unwrap();
        session.remove(&id("c1")).unwrap();
        assert_eq!(
            session.finish_send(&outbound.ticket, Outcome::Failed, at(2)),
            None
        );
        assert!(!session.is_sending());
    }

    #[test]
    fn deleting_only_open_conversation_shows_welcome() {
        let mut session = signed_in(vec![conversation("c1", 0)]);
        assert_eq!(session.active_id(), Some(&id("c1")));

        let removal = session.remove(&id("c1")).unwrap();
        assert!(removal.was_active);
        assert_eq!(session.active_id(), None);
        assert!(session.messages().is_empty());
        assert_eq!(session.landing(), Landing::Welcome);

        session.restore(removal);
        assert_eq!(session.active_id(), Some(&id("c1")));
    }

    #[test]
    fn deleting_open_conversation_opens_the_next() {
        let mut session = signed_in(vec![conversation("c1", 2), conversation("c2", 1)]);
        session.remove(&id("c1")).unwrap();
        assert_eq!(session.active_id(), Some(&id("c2")));
    }

    #[test]
    fn rename_and_revert() {
        let mut session = signed_in(vec![conversation("c1", 0)]);
        assert_eq!(session.rename(&id("c1"), "   ").unwrap(), None);

        let rename = session.rename(&id("c1"), "  Leases ").unwrap().unwrap();
        assert_eq!(rename.previous, crate::model::DEFAULT_TITLE);
        assert_eq!(session.conversations()[0].title, "Leases");

        session.revert_rename(&rename);
        assert_eq!(session.conversations()[0].title, crate::model::DEFAULT_TITLE);
        assert!(matches!(
            session.rename(&id("nope"), "x"),
            Err(Error::MissingConversation(_))
        ));
    }

    #[test]
    fn temporary_chat_is_discarded_on_switch() {
        let mut session = signed_in(vec![conversation("c1", 0)]);
        session.start_temporary(conversation("temp-1", 1)).unwrap();
        assert!(session.is_temporary());
        assert_eq!(session.route(), Route::Discard);
        assert_eq!(session.active_id(), Some(&id("temp-1")));

        let outbound = session.begin_send("Off the record", at(2)).unwrap().unwrap();
        assert!(matches!(session.select(&id("c1")), Err(Error::Busy)));
        session
            .finish_send(&outbound.ticket, Outcome::Answered("Sure.".to_owned()), at(3))
            .unwrap();
        assert_eq!(session.messages().len(), 2);
        assert!(session.conversations().iter().all(|c| c.id != id("temp-1")));

        assert!(session.select(&id("c1")).unwrap());
        assert!(!session.is_temporary());
        assert_eq!(session.active_id(), Some(&id("c1")));

        session.start_temporary(conversation("temp-2", 4)).unwrap();
        assert!(session.messages().is_empty());
    }

    #[test]
    fn saved_conversations_keep_their_route_during_temporary_chat() {
        let mut session = signed_in(vec![conversation("c1", 0)]);
        session.start_temporary(conversation("temp-1", 1)).unwrap();
        let remote = Route::Remote(AuthUser::new("u1"));
        assert_eq!(session.route_for(&id("c1")), remote);
        assert_eq!(session.route_for(&id("temp-1")), Route::Discard);

        session.select(&id("c1")).unwrap();
        assert_eq!(session.route_for(&id("c1")), remote);
    }

    #[test]
    fn new_conversation_leaves_temporary_chat() {
        let mut session = signed_in(vec![]);
        session.start_temporary(conversation("temp-1", 0)).unwrap();
        assert_eq!(session.creation_route().unwrap(), Route::Remote(AuthUser::new("u1")));
        session.insert_conversation(conversation("c9", 1)).unwrap();
        assert!(!session.is_temporary());
        assert_eq!(session.active_id(), Some(&id("c9")));
    }

    #[test]
    fn guests_cannot_start_temporary_chats() {
        let mut session = Session::default();
        assert!(matches!(
            session.start_temporary(conversation("temp-1", 0)),
            Err(Error::NotSignedIn)
        ));
    }

    #[test]
    fn token_refresh_keeps_state() {
        let mut session = signed_in(vec![conversation("c1", 0)]);
        session.start_temporary(conversation("temp-1", 1)).unwrap();
        let refreshed = AuthUser {
            id_token: Some("new".to_owned()),
            ..AuthUser::new("u1")
        };
        assert_eq!(session.apply_auth(Some(refreshed.clone())), AuthChange::Refreshed);
        assert_eq!(session.apply_auth(Some(refreshed)), AuthChange::Unchanged);
        assert!(session.is_temporary());
        assert_eq!(session.conversations().len(), 1);

        assert_eq!(
            session.apply_auth(Some(AuthUser::new("u2"))),
            AuthChange::Switched
        );
        assert!(session.conversations().is_empty());
        assert!(!session.is_temporary());
    }

    #[test]
    fn stale_listing_is_dropped() {
        let mut session = Session::default();
        let applied = session.replace_conversations(
            &Route::Remote(AuthUser::new("u1")),
            vec![conversation("c1", 0)],
        );
        assert!(!applied);
        assert!(session.conversations().is_empty());
    }

    #[test]
    fn listing_keeps_optimistic_messages() {
        let mut session = signed_in(vec![conversation("c1", 0)]);
        session.begin_send("Pending question", at(1)).unwrap();
        let route = session.list_route();
        session.replace_conversations(&route, vec![conversation("c1", 0), conversation("c2", 5)]);

        assert_eq!(session.active_id(), Some(&id("c1")));
        assert_eq!(session.messages().len(), 1);
        assert!(!session.set_messages(&id("c1"), vec![]));
        assert!(session.set_messages(&id("c2"), vec![Message::user("x", at(6))]));
    }

    #[test]
    fn landing_follows_history() {
        let mut session = signed_in(vec![conversation("c1", 1), conversation("c2", 0)]);
        assert_eq!(session.landing(), Landing::Welcome);

        session.set_messages(&id("c2"), vec![Message::user("Earlier", at(2))]);
        assert_eq!(session.landing(), Landing::EmptyConversation);

        session.select(&id("c2")).unwrap();
        assert_eq!(session.landing(), Landing::Thread);

        session.remove(&id("c2")).unwrap();
        session.remove(&id("c1")).unwrap();
        assert_eq!(session.landing(), Landing::Welcome);
    }
}
