//! Drives [`Session`] through the async parts of the client: storage round
//! trips and the question answering call.
//!
//! State is only ever touched inside short closures passed to a
//! [`SessionCell`], never across an await, so the UI can render every
//! intermediate step (the optimistic user message, the typing indicator).

use crate::answer::AnswerService;
use crate::error::Error;
use crate::exchange::{Outcome, Settled, Ticket};
use crate::identity::AuthUser;
use crate::model::{ConversationId, DEFAULT_TITLE};
use crate::session::{AuthChange, Session};
use crate::store::{ConversationStore, Conversations, Route};
use chrono::Utc;
use futures::future::{AbortHandle, Abortable};
use log::{debug, info, warn};
use std::cell::RefCell;

/// Shared, mutable access to the session.
pub trait SessionCell {
    /// Runs `f` on the session. `None` once the session is gone.
    fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R>;

    fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> Option<R>;
}

impl SessionCell for RefCell<Session> {
    fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }

    fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> Option<R> {
        Some(f(&self.borrow()))
    }
}

fn update<C: SessionCell, R>(cell: &C, f: impl FnOnce(&mut Session) -> R) -> Result<R, Error> {
    cell.update(f).ok_or(Error::Detached)
}

fn read<C: SessionCell, R>(cell: &C, f: impl FnOnce(&Session) -> R) -> Result<R, Error> {
    cell.read(f).ok_or(Error::Detached)
}

/// The abort handle of the send in flight, tagged with its ticket serial.
type Inflight = RefCell<Option<(u64, AbortHandle)>>;

/// Clears `inflight` unless a later send has replaced the handle.
fn release(inflight: &Inflight, serial: u64) {
    let mut slot = inflight.borrow_mut();
    if matches!(&*slot, Some((current, _)) if *current == serial) {
        slot.take();
    }
}

/// Returns the session to idle if a send is dropped before it settles.
struct SendGuard<'a, C: SessionCell> {
    cell: &'a C,
    inflight: &'a Inflight,
    serial: u64,
    ticket: Option<Ticket>,
}

impl<'a, C: SessionCell> SendGuard<'a, C> {
    fn settle(mut self, outcome: Outcome) -> Option<Settled> {
        let ticket = self.ticket.take()?;
        self.cell
            .update(|s| s.finish_send(&ticket, outcome, Utc::now()))
            .flatten()
    }
}

impl<C: SessionCell> Drop for SendGuard<'_, C> {
    fn drop(&mut self) {
        release(self.inflight, self.serial);
        if let Some(ticket) = self.ticket.take() {
            warn!("Send into {} dropped before settling", ticket.conversation);
            self.cell.update(|s| s.abandon_send(&ticket));
        }
    }
}

pub struct SessionManager<S, A> {
    store: Conversations<S>,
    answers: A,
    inflight: Inflight,
}

impl<S: ConversationStore, A: AnswerService> SessionManager<S, A> {
    /// `remote` is `None` when no remote storage is configured; only guest
    /// and temporary sessions work then.
    pub fn new(remote: Option<S>, answers: A) -> Self {
        Self {
            store: Conversations::new(remote),
            answers,
            inflight: RefCell::new(None),
        }
    }

    /// Follows the auth provider. A new identity cancels the send in flight
    /// and reloads conversations.
    pub async fn auth_changed<C: SessionCell>(
        &self,
        cell: &C,
        auth: Option<AuthUser>,
    ) -> Result<(), Error> {
        let signed_out = auth.is_none();
        match update(cell, |s| s.apply_auth(auth))? {
            AuthChange::Switched => {
                info!("Identity changed");
                self.cancel();
                if signed_out {
                    self.store.clear_guest();
                }
                self.refresh(cell).await
            }
            AuthChange::Refreshed => {
                debug!("Credentials refreshed");
                Ok(())
            }
            AuthChange::Unchanged => Ok(()),
        }
    }

    /// Reloads the saved conversation list and the open conversation's
    /// messages. Guests always end up with at least one conversation.
    pub async fn refresh<C: SessionCell>(&self, cell: &C) -> Result<(), Error> {
        let route = read(cell, Session::list_route)?;
        let conversations = self.store.list(&route).await?;
        let empty = conversations.is_empty();
        if !update(cell, |s| s.replace_conversations(&route, conversations))? {
            debug!("Dropping a listing for a previous identity");
            return Ok(());
        }
        if empty && route == Route::Guest {
            self.new_conversation(cell).await?;
            return Ok(());
        }
        self.load_active(cell).await;
        Ok(())
    }

    async fn load_active<C: SessionCell>(&self, cell: &C) {
        let Ok(Some((route, id))) = read(cell, |s| Some((s.route(), s.active_id()?.clone())))
        else {
            return;
        };
        match self.store.load_messages(&route, &id).await {
            Ok(messages) => {
                cell.update(|s| s.set_messages(&id, messages));
            }
            Err(err) => warn!("Failed to load messages for {id}: {err}"),
        }
    }

    /// Creates a conversation, puts it at the head of the list and opens it.
    pub async fn new_conversation<C: SessionCell>(&self, cell: &C) -> Result<ConversationId, Error> {
        let route = read(cell, Session::creation_route)??;
        let conversation = self.store.create(&route, Utc::now()).await?;
        let id = conversation.id.clone();
        update(cell, |s| s.insert_conversation(conversation))??;
        info!("Opened new conversation {id}");
        Ok(id)
    }

    /// Opens a saved conversation, leaving a temporary chat if needed.
    pub async fn open<C: SessionCell>(&self, cell: &C, id: &ConversationId) -> Result<(), Error> {
        if update(cell, |s| s.select(id))?? {
            self.load_active(cell).await;
        }
        Ok(())
    }

    /// Starts an off the record chat. Nothing about it is ever stored.
    pub async fn start_temporary<C: SessionCell>(&self, cell: &C) -> Result<ConversationId, Error> {
        let chat = self.store.create(&Route::Discard, Utc::now()).await?;
        let id = chat.id.clone();
        update(cell, |s| s.start_temporary(chat))??;
        info!("Started temporary chat {id}");
        Ok(id)
    }

    /// Renames locally first, then remotely; undone if the remote write
    /// fails.
    pub async fn rename<C: SessionCell>(
        &self,
        cell: &C,
        id: &ConversationId,
        title: &str,
    ) -> Result<(), Error> {
        let Some((rename, route)) =
            update(cell, |s| s.rename(id, title).map(|r| r.map(|r| (r, s.route_for(id)))))??
        else {
            return Ok(());
        };
        if let Err(err) = self.store.rename(&route, id, &rename.title).await {
            warn!("Rename of {id} failed, reverting: {err}");
            cell.update(|s| s.revert_rename(&rename));
            return Err(err);
        }
        Ok(())
    }

    /// Deletes locally first, then remotely; restored if the remote delete
    /// fails.
    pub async fn delete<C: SessionCell>(&self, cell: &C, id: &ConversationId) -> Result<(), Error> {
        let (removal, route) = update(cell, |s| s.remove(id).map(|r| (r, s.list_route())))??;
        let reopened = removal.was_active;
        if let Err(err) = self.store.delete(&route, id).await {
            warn!("Delete of {id} failed, restoring: {err}");
            cell.update(|s| s.restore(removal));
            return Err(err);
        }
        info!("Deleted conversation {id}");
        if reopened {
            self.load_active(cell).await;
        }
        Ok(())
    }

    /// Sends one message and merges the reply.
    ///
    /// Returns `Ok(None)` when the input was blank, otherwise how the send
    /// ended. Send failures are not errors: they become an error reply in
    /// the conversation. Persistence failures are logged and ignored.
    pub async fn send<C: SessionCell>(&self, cell: &C, input: &str) -> Result<Option<Outcome>, Error> {
        let Some(outbound) = update(cell, |s| s.begin_send(input, Utc::now()))?? else {
            return Ok(None);
        };
        // Registered before the first write so Stop works from the moment
        // the question is shown.
        let (handle, registration) = AbortHandle::new_pair();
        let serial = outbound.ticket.serial;
        *self.inflight.borrow_mut() = Some((serial, handle));
        let guard = SendGuard {
            cell,
            inflight: &self.inflight,
            serial,
            ticket: Some(outbound.ticket.clone()),
        };
        let id = &outbound.ticket.conversation;
        let exchange = async {
            if let Err(err) = self
                .store
                .save_messages(&outbound.route, id, &outbound.messages, Utc::now())
                .await
            {
                warn!("Failed to save the question in {id}: {err}");
            }
            self.answers.ask(&outbound.request).await
        };
        let outcome = match Abortable::new(exchange, registration).await {
            Ok(Ok(reply)) => Outcome::Answered(reply),
            Ok(Err(err)) => {
                warn!("Answer service failed for {id}: {err}");
                Outcome::Failed
            }
            Err(_aborted) => {
                info!("Send into {id} cancelled");
                Outcome::Cancelled
            }
        };

        if let Some(settled) = guard.settle(outcome.clone()) {
            self.persist(settled).await;
        }
        Ok(Some(outcome))
    }

    async fn persist(&self, settled: Settled) {
        let Settled {
            route,
            conversation,
            messages,
            title,
        } = settled;
        if let Err(err) = self
            .store
            .save_messages(&route, &conversation, &messages, Utc::now())
            .await
        {
            warn!("Failed to save the reply in {conversation}: {err}");
        }
        if let Some(title) = title.filter(|t| t != DEFAULT_TITLE) {
            if let Err(err) = self.store.rename(&route, &conversation, &title).await {
                warn!("Failed to save the title of {conversation}: {err}");
            }
        }
    }

    /// Aborts the request in flight, if any.
    pub fn cancel(&self) -> bool {
        match self.inflight.borrow_mut().take() {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}
