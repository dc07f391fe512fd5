/*
 * Responsibility
 * - Token signing / parsing / strict claim check errors (TokenError)
 * - Keep jsonwebtoken / serde_json errors as sources so callers can log them
 */
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TokenError>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("missing '{0}' claim")]
    MissingClaim(&'static str),

    #[error("invalid 'sub' (expected UUID)")]
    InvalidSubject,

    #[error("no token in context")]
    MissingToken,

    #[error("no token manager in context")]
    MissingTokenManager,

    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}
