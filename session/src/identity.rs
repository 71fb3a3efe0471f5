use serde::{Deserialize, Serialize};

/// A signed in user as reported by the auth provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Who the session is acting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(AuthUser),
    Guest,
    /// A signed in user chatting off the record.
    Temporary(AuthUser),
}

impl Identity {
    /// Maps the auth provider's signal onto an identity. Temporary chats are
    /// only ever entered explicitly, never resolved from auth state.
    pub fn resolve(auth: Option<AuthUser>) -> Self {
        match auth {
            Some(user) => Identity::Authenticated(user),
            None => Identity::Guest,
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Identity::Authenticated(user) | Identity::Temporary(user) => Some(user),
            Identity::Guest => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Identity::Temporary(_))
    }
}
