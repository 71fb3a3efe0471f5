use leptos::*;
use nomos_session::{
    FirestoreStore, HttpAnswerService, Session, SessionCell, SessionManager,
};
use std::rc::Rc;

pub type Manager = Rc<SessionManager<FirestoreStore, HttpAnswerService>>;

/// The session as a reactive signal, shared through context.
#[derive(Debug, Clone, Copy)]
pub struct SessionSignal(RwSignal<Session>);

impl SessionSignal {
    pub fn new() -> Self {
        Self(create_rw_signal(Session::default()))
    }

    /// Tracked read, for use inside views and effects.
    pub fn with<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        self.0.with(f)
    }
}

impl SessionCell for SessionSignal {
    fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.0.try_update(f)
    }

    fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> Option<R> {
        self.0.try_with_untracked(f)
    }
}

pub fn use_manager() -> Manager {
    expect_context::<Manager>()
}

pub fn use_session() -> SessionSignal {
    expect_context::<SessionSignal>()
}
