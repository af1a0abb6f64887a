use std::sync::Arc;

use crate::{
    error::{FeedError, Result},
    models::{
        session::{Session, decode_subject},
        user::{Owned, UserId},
    },
    repositories::session::SessionStore,
};

/// Gates feed operations behind a stored credential.
#[derive(Clone)]
pub struct SessionGate {
    store: Arc<dyn SessionStore>,
}

impl SessionGate {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The current session, or `None` when the credential is missing,
    /// unreadable or undecodable.
    pub async fn get_session(&self) -> Option<Session> {
        let token = match self.store.load().await {
            Ok(token) => token?,
            Err(e) => {
                tracing::warn!("❌ Failed to read session store: {}", e);
                return None;
            }
        };

        let session = Session::from_token(token);
        if session.is_none() {
            tracing::warn!("❌ Stored credential could not be decoded");
        }
        session
    }

    /// The current session, or [`FeedError::SessionAbsent`] which callers
    /// resolve by redirecting to sign-in.
    pub async fn require_session(&self) -> Result<Session> {
        match self.get_session().await {
            Some(session) => {
                tracing::debug!("✅ Session for user {}", session.subject());
                Ok(session)
            }
            None => {
                tracing::debug!("🔐 No session, sign-in required");
                Err(FeedError::SessionAbsent)
            }
        }
    }
}

/// The user a credential was issued to, or `None` if it does not decode.
pub fn identity_of(token: &str) -> Option<UserId> {
    decode_subject(token)
}

/// Whether the caller owns `entity`. Always false without a session.
pub fn is_owner<E: Owned + ?Sized>(entity: &E, session: Option<&Session>) -> bool {
    session.is_some_and(|s| entity.owner_id() == s.subject())
}
