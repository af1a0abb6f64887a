use thiserror::Error;

/// Route the caller is sent to when no session is available.
pub const SIGN_IN_ROUTE: &str = "/login";

/// The client's error type.
#[derive(Error, Debug)]
pub enum FeedError {
    /// No valid credential is stored. Resolved by redirecting to sign-in.
    #[error("No active session")]
    SessionAbsent,

    /// The remote API answered with an error status or could not be reached.
    ///
    /// Raw form produced by the transport; call sites turn it into a
    /// user-facing variant with [`FeedError::with_fallback`].
    #[error("Remote API error (status {:?}): {}", .status, .server_message.as_deref().unwrap_or("no details"))]
    Remote {
        status: Option<u16>,
        server_message: Option<String>,
    },

    /// A remote failure, carrying the message to show.
    #[error("Remote API unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote API refused an edit or delete the caller does not own.
    #[error("Mutation rejected: {0}")]
    UnauthorizedMutation(String),

    /// A local, pre-network check failed.
    #[error("Validation error: {0}")]
    ValidationRejected(String),

    /// The targeted post or comment is not part of the local feed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] sonic_rs::Error),

    /// An I/O error from the session store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A `Result` type that uses `FeedError` as the error type.
pub type Result<T> = std::result::Result<T, FeedError>;

impl FeedError {
    /// Builds the raw remote error.
    pub fn remote(status: Option<u16>, server_message: Option<String>) -> Self {
        FeedError::Remote {
            status,
            server_message: server_message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// The server-provided error text, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            FeedError::Remote { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }

    /// Converts a raw remote error into its user-facing form, preferring the
    /// server text and falling back to `fallback`. Other variants pass
    /// through untouched.
    pub fn with_fallback(self, fallback: &str) -> Self {
        match self {
            FeedError::Remote {
                status,
                server_message,
            } => {
                let message = server_message.unwrap_or_else(|| fallback.to_string());
                match status {
                    Some(401) | Some(403) => FeedError::UnauthorizedMutation(message),
                    _ => FeedError::RemoteUnavailable(message),
                }
            }
            FeedError::Decode(ref e) => {
                tracing::error!("Decode error: {}", e);
                FeedError::RemoteUnavailable(fallback.to_string())
            }
            other => other,
        }
    }

    /// The route to navigate to instead of showing this error inline.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            FeedError::SessionAbsent => Some(SIGN_IN_ROUTE),
            _ => None,
        }
    }

    /// Logs the error and returns the text to show the user, or `None` when
    /// the error is handled by a redirect.
    pub fn user_message(&self) -> Option<String> {
        match self {
            FeedError::SessionAbsent => {
                tracing::debug!("Session absent, redirecting to {}", SIGN_IN_ROUTE);
                None
            }

            FeedError::Remote { server_message, .. } => {
                tracing::error!("Remote error: {}", self);
                Some(
                    server_message
                        .clone()
                        .unwrap_or_else(|| "Something went wrong. Please try again.".to_string()),
                )
            }

            FeedError::RemoteUnavailable(msg) => {
                tracing::error!("Remote API unavailable: {}", msg);
                Some(msg.clone())
            }

            // Surfaced exactly like any other remote failure.
            FeedError::UnauthorizedMutation(msg) => {
                tracing::warn!("Mutation rejected: {}", msg);
                Some(msg.clone())
            }

            FeedError::ValidationRejected(msg) => {
                tracing::debug!("Validation error: {}", msg);
                Some(msg.clone())
            }

            FeedError::NotFound(what) => {
                tracing::debug!("Not found: {}", what);
                Some(format!("{} is no longer available", what))
            }

            FeedError::Decode(e) => {
                tracing::error!("Decode error: {}", e);
                Some("Something went wrong. Please try again.".to_string())
            }

            FeedError::Io(e) => {
                tracing::error!("IO error: {}", e);
                Some("Could not access the local session".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_prefers_server_text() {
        let err = FeedError::remote(Some(500), Some("post not found".into()))
            .with_fallback("Failed to load post.");
        assert!(matches!(err, FeedError::RemoteUnavailable(ref m) if m == "post not found"));
    }

    #[test]
    fn fallback_used_without_server_text() {
        let err = FeedError::remote(None, Some("   ".into())).with_fallback("Failed to load post.");
        assert!(matches!(err, FeedError::RemoteUnavailable(ref m) if m == "Failed to load post."));
    }

    #[test]
    fn forbidden_maps_to_unauthorized_mutation() {
        let err = FeedError::remote(Some(403), None).with_fallback("Failed to delete comment.");
        assert!(matches!(err, FeedError::UnauthorizedMutation(_)));
        assert_eq!(err.user_message().as_deref(), Some("Failed to delete comment."));
    }

    #[test]
    fn session_absent_redirects_silently() {
        let err = FeedError::SessionAbsent;
        assert_eq!(err.redirect(), Some(SIGN_IN_ROUTE));
        assert!(err.user_message().is_none());
    }
}
