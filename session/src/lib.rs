//! Conversation state and services behind the Nomos chat client.
//!
//! Everything here is independent of the browser so it can be tested
//! natively; the UI crate only renders a [`Session`] and forwards user
//! actions to a [`SessionManager`].

pub mod answer;
pub mod config;
pub mod error;
pub mod exchange;
pub mod identity;
pub mod manager;
pub mod model;
pub mod session;
pub mod store;
pub mod title;

pub use answer::{AnswerService, HttpAnswerService};
pub use config::Config;
pub use error::Error;
pub use exchange::Outcome;
pub use identity::{AuthUser, Identity};
pub use manager::{SessionCell, SessionManager};
pub use model::{Conversation, ConversationId, Message, Sender};
pub use session::{Landing, Session};
pub use store::{ConversationStore, FirestoreStore, MemoryStore};
