use crate::model::ConversationId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("A message is already being sent")]
    Busy,

    #[error("No conversation is selected")]
    NoActiveConversation,

    #[error("Conversation {0} is missing")]
    MissingConversation(ConversationId),

    #[error("Temporary chats require a signed in user")]
    NotSignedIn,

    #[error("Remote storage is not configured")]
    StorageUnavailable,

    #[error("Session is no longer mounted")]
    Detached,

    #[error("Answer service error {0}")]
    Answer(String),

    #[error("Storage returned {status}: {body}")]
    Storage { status: u16, body: String },

    #[error("Malformed document {0}")]
    Document(String),

    #[error("Invalid configuration {0}")]
    Config(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
