/*
 * Responsibility
 * - Explicit view of what a request carries (token + token manager)
 * - Strict subject checks so handlers under test can reject incomplete tokens
 */
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::context::Context;
use crate::error::{Result, TokenError};
use crate::login::jwt_from_context;
use crate::token::{Token, TokenManager, read_token_manager_from_context};

/// Credentials read out of a context.
///
/// Prefer passing this to the unit under test over handing it a whole `Context`.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    pub token: Option<Token>,
    pub token_manager: Option<Arc<dyn TokenManager>>,
}

impl RequestCredentials {
    pub fn from_context(ctx: &Context) -> Self {
        Self {
            token: jwt_from_context(ctx).cloned(),
            token_manager: read_token_manager_from_context(ctx),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_service_account(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| t.claims.is_service_account())
    }

    /// `sub` promoted to a UUID.
    ///
    /// - no token / no `sub` => `MissingClaim("sub")`
    /// - empty or non-UUID `sub` => `InvalidSubject`
    pub fn subject_id(&self) -> Result<Uuid> {
        let sub = self
            .token
            .as_ref()
            .and_then(|t| t.claims.sub.as_deref())
            .ok_or(TokenError::MissingClaim("sub"))?;

        Uuid::parse_str(sub.trim()).map_err(|_| {
            debug!(sub = %sub, "subject is not a UUID");
            TokenError::InvalidSubject
        })
    }

    /// Sign the carried token with the carried manager.
    pub fn signed_token(&self) -> Result<String> {
        let token = self.token.as_ref().ok_or(TokenError::MissingToken)?;
        if let Some(raw) = &token.raw {
            return Ok(raw.clone());
        }
        let manager = self
            .token_manager
            .as_ref()
            .ok_or(TokenError::MissingTokenManager)?;

        manager.sign(token)?.raw.ok_or(TokenError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::login::{with_identity, with_incomplete_identity, with_jwt};
    use crate::token::{Claims, JwtTokenManager, context_with_token_manager};
    use jsonwebtoken::Algorithm;

    fn manager() -> Arc<dyn TokenManager> {
        Arc::new(JwtTokenManager::from_secret(b"creds", "kid", "http://auth.test"))
    }

    #[test]
    fn test_empty_context_has_no_credentials() {
        let creds = RequestCredentials::from_context(&Context::background());
        assert!(!creds.is_authenticated());
        assert!(creds.token_manager.is_none());
        assert!(matches!(
            creds.subject_id(),
            Err(TokenError::MissingClaim("sub"))
        ));
    }

    #[test]
    fn test_subject_id_from_full_identity() {
        let ident = Identity::random();
        let ctx = with_identity(&Context::background(), &ident);
        let creds = RequestCredentials::from_context(&ctx);

        assert!(creds.is_authenticated());
        assert!(!creds.is_service_account());
        assert_eq!(creds.subject_id().unwrap(), ident.id);
    }

    #[test]
    fn test_incomplete_identity_is_rejected() {
        let ident = Identity::random();
        let ctx = with_incomplete_identity(&Context::background(), &ident);
        let err = RequestCredentials::from_context(&ctx).subject_id().unwrap_err();
        assert!(matches!(err, TokenError::MissingClaim("sub")));
    }

    #[test]
    fn test_non_uuid_subject_is_invalid() {
        let claims = Claims {
            sub: Some("abc-123".to_string()),
            ..Claims::issued_now()
        };
        let ctx = with_jwt(&Context::background(), Token::new(Algorithm::RS256, claims));
        let err = RequestCredentials::from_context(&ctx).subject_id().unwrap_err();
        assert!(matches!(err, TokenError::InvalidSubject));
    }

    #[test]
    fn test_signed_token_roundtrips_through_manager() {
        let manager = manager();
        let ident = Identity::random();
        let ctx = with_identity(&Context::background(), &ident);
        let ctx = context_with_token_manager(&ctx, manager.clone());

        let raw = RequestCredentials::from_context(&ctx).signed_token().unwrap();
        let parsed = manager.parse(&raw).unwrap();
        assert_eq!(parsed.claims.uuid, Some(ident.id.to_string()));
    }

    #[test]
    fn test_signed_token_needs_manager() {
        let ctx = with_identity(&Context::background(), &Identity::random());
        let err = RequestCredentials::from_context(&ctx).signed_token().unwrap_err();
        assert!(matches!(err, TokenError::MissingTokenManager));
    }

    #[test]
    fn test_signed_token_needs_token() {
        let ctx = context_with_token_manager(&Context::background(), manager());
        let err = RequestCredentials::from_context(&ctx).signed_token().unwrap_err();
        assert!(matches!(err, TokenError::MissingToken));
    }
}
