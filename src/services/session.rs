//! # Session Token Service
//!
//! Session credentials travel as HS256 JSON Web Tokens whose `sub` claim is
//! the server-side session id. The token only proves the id was issued by us;
//! whether the session is still alive is decided by the [`UserStore`].
//!
//! [`UserStore`]: crate::services::store::UserStore

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::models::SessionId;
use crate::utils::constant::SESSION_TOKEN_EXPIRY;

/// Errors that can occur during session token operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// JWT claims of a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (session id)
    pub sub: String,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Signs and validates session tokens
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionService {
    pub fn new(encoding_key: EncodingKey, decoding_key: DecodingKey) -> Self {
        Self {
            encoding_key,
            decoding_key,
        }
    }

    /// Builds a service using the same HMAC secret for signing and validation.
    pub fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self::new(
            EncodingKey::from_secret(bytes),
            DecodingKey::from_secret(bytes),
        )
    }

    /// Issues a signed token for the session.
    #[instrument(skip_all)]
    pub fn issue_token(&self, session_id: &SessionId) -> Result<String, SessionError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| SessionError::InvalidToken)?
            .as_secs();

        let claims = Claims {
            sub: session_id.to_string(),
            exp: now + SESSION_TOKEN_EXPIRY.as_secs(),
            iat: now,
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        trace!("Session token issued");
        Ok(token)
    }

    /// Validates a session token and returns the session id it carries.
    ///
    /// # Errors
    ///
    /// - [`SessionError::TokenExpired`] - Token has expired
    /// - [`SessionError::InvalidToken`] - Token is malformed or has invalid signature
    #[instrument(skip_all, fields(token_length = token.len()))]
    pub fn validate_token(&self, token: &str) -> Result<SessionId, SessionError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) if !token_data.claims.sub.is_empty() => {
                trace!("Session token validated successfully");
                Ok(SessionId::new(token_data.claims.sub))
            }
            Ok(_) => {
                debug!("Session token has an empty subject");
                Err(SessionError::InvalidToken)
            }
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                debug!("Session token expired");
                Err(SessionError::TokenExpired)
            }
            Err(e) => {
                debug!(error = %e, "Invalid session token");
                Err(SessionError::InvalidToken)
            }
        }
    }
}
