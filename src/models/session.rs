use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::Deserialize;
use std::fmt;
use zeroize::Zeroizing;

use crate::models::user::UserId;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Token payloads are base64url; some issuers use the standard alphabet.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

#[derive(Deserialize)]
struct TokenClaims {
    #[serde(default)]
    user: Option<String>,
}

/// Extracts the subject from a `header.payload.signature` token.
///
/// Returns `None` for a wrong segment count, undecodable base64, a payload
/// that is not a JSON object, or a missing `user` claim.
pub fn decode_subject(token: &str) -> Option<UserId> {
    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
        .ok()?;

    let claims: TokenClaims = sonic_rs::from_slice(&bytes).ok()?;
    claims
        .user
        .filter(|user| !user.is_empty())
        .map(UserId::new)
}

/// An authenticated caller.
///
/// Only constructed from a credential whose subject decodes, so holding a
/// `Session` implies a known identity.
#[derive(Clone)]
pub struct Session {
    token: Zeroizing<String>,
    subject: UserId,
}

impl Session {
    /// Builds a session from a stored credential, or `None` if the credential
    /// is empty or undecodable.
    pub fn from_token(token: impl Into<String>) -> Option<Self> {
        let token = Zeroizing::new(token.into());
        if token.trim().is_empty() {
            return None;
        }
        let subject = decode_subject(&token)?;
        Some(Self { token, subject })
    }

    /// The bearer credential sent with every authenticated call.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The decoded user identifier.
    pub fn subject(&self) -> &UserId {
        &self.subject
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}
