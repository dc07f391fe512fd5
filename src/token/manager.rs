use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::context::{Context, ContextKey};
use crate::error::{Result, TokenError};
use crate::token::claims::{Claims, Token};

/// Scope granted to service account tokens.
pub const SERVICE_ACCOUNT_SCOPE: &str = "uma_protection";

/// Issuing / verifying authority as seen by code under test.
///
/// Callers only rely on this trait; `JwtTokenManager` is one implementation.
/// `parse` checks the signature but makes no assumption about `exp`.
pub trait TokenManager: Send + Sync + fmt::Debug {
    /// Unsigned token for a service account (`sub` = account id).
    fn generate_unsigned_service_account_token(
        &self,
        account_id: &str,
        account_name: &str,
    ) -> Token;

    /// Sign `token`, returning a copy that carries its compact form in `raw`.
    fn sign(&self, token: &Token) -> Result<Token>;

    /// Verify and decode a compact JWT.
    fn parse(&self, raw: &str) -> Result<Token>;
}

/// jsonwebtoken-backed token manager.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtTokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    key_id: String,
    issuer: String,
}

impl fmt::Debug for JwtTokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenManager")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtTokenManager {
    /// HS256 manager over a shared secret.
    pub fn from_secret(secret: &[u8], key_id: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            key_id: key_id.into(),
            issuer: issuer.into(),
        }
    }

    /// EdDSA manager. `private_key_pem` must be an Ed25519 private key in PKCS#8 PEM format.
    pub fn from_ed_pem(
        private_key_pem: &str,
        public_key_pem: &str,
        key_id: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Result<Self> {
        let encoding_key = EncodingKey::from_ed_pem(private_key_pem.as_bytes()).map_err(|e| {
            warn!(error = %e, "failed to parse private key PEM (expected Ed25519 PKCS#8 PEM)");
            TokenError::InvalidKey(e.to_string())
        })?;
        let decoding_key = DecodingKey::from_ed_pem(public_key_pem.as_bytes()).map_err(|e| {
            warn!(error = %e, "failed to parse public key PEM (expected Ed25519 PEM)");
            TokenError::InvalidKey(e.to_string())
        })?;

        Ok(Self {
            algorithm: Algorithm::EdDSA,
            encoding_key,
            decoding_key,
            key_id: key_id.into(),
            issuer: issuer.into(),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        // Fabricated tokens have no `exp` / `aud`.
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation
    }
}

impl TokenManager for JwtTokenManager {
    fn generate_unsigned_service_account_token(
        &self,
        account_id: &str,
        account_name: &str,
    ) -> Token {
        let claims = Claims {
            sub: Some(account_id.to_string()),
            jti: Some(Uuid::new_v4().to_string()),
            iss: Some(self.issuer.clone()),
            service_accountname: Some(account_name.to_string()),
            scopes: Some(vec![SERVICE_ACCOUNT_SCOPE.to_string()]),
            ..Claims::issued_now()
        };

        let mut token = Token::new(self.algorithm, claims);
        token.header.kid = Some(self.key_id.clone());

        debug!(
            account_id = %account_id,
            account_name = %account_name,
            "generated unsigned service account token"
        );
        token
    }

    fn sign(&self, token: &Token) -> Result<Token> {
        let mut header = token.header.clone();
        header.alg = self.algorithm;
        if header.kid.is_none() {
            header.kid = Some(self.key_id.clone());
        }

        let raw = jsonwebtoken::encode(&header, &token.claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            TokenError::from(e)
        })?;

        Ok(Token {
            header,
            claims: token.claims.clone(),
            raw: Some(raw),
        })
    }

    fn parse(&self, raw: &str) -> Result<Token> {
        let data = jsonwebtoken::decode::<Claims>(raw, &self.decoding_key, &self.validation())
            .map_err(|e| {
                debug!(error = %e, "JWT parsing failed");
                TokenError::from(e)
            })?;

        Ok(Token {
            header: data.header,
            claims: data.claims,
            raw: Some(raw.to_string()),
        })
    }
}

/// Context slot holding the token manager.
pub struct TokenManagerKey;

impl ContextKey for TokenManagerKey {
    type Value = Arc<dyn TokenManager>;
}

pub fn context_with_token_manager(ctx: &Context, manager: Arc<dyn TokenManager>) -> Context {
    ctx.with::<TokenManagerKey>(manager)
}

/// The manager previously attached with [`context_with_token_manager`], if any.
pub fn read_token_manager_from_context(ctx: &Context) -> Option<Arc<dyn TokenManager>> {
    ctx.get::<TokenManagerKey>().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::login::build_claims;
    use crate::token::test_keys::{ED25519_PRIVATE_KEY_PEM, ED25519_PUBLIC_KEY_PEM};

    fn manager() -> JwtTokenManager {
        JwtTokenManager::from_secret(b"unit-secret", "kid-1", "http://auth.test")
    }

    #[test]
    fn test_service_account_token_claims() {
        let token = manager().generate_unsigned_service_account_token("acc-1", "tenant");

        assert_eq!(token.header.kid.as_deref(), Some("kid-1"));
        assert_eq!(token.claims.sub.as_deref(), Some("acc-1"));
        assert_eq!(token.claims.service_accountname.as_deref(), Some("tenant"));
        assert_eq!(token.claims.iss.as_deref(), Some("http://auth.test"));
        assert_eq!(
            token.claims.scopes,
            Some(vec![SERVICE_ACCOUNT_SCOPE.to_string()])
        );
        assert!(token.claims.jti.is_some());
        assert!(token.claims.uuid.is_none());
        assert!(token.claims.is_service_account());
        assert!(!token.is_signed());
    }

    #[test]
    fn test_sign_then_parse_keeps_claims() {
        let manager = manager();
        let unsigned = manager.generate_unsigned_service_account_token("acc-2", "svc");

        let signed = manager.sign(&unsigned).unwrap();
        assert!(signed.is_signed());
        assert_eq!(signed.header.alg, Algorithm::HS256);

        let parsed = manager.parse(signed.raw.as_deref().unwrap()).unwrap();
        assert_eq!(parsed.claims, unsigned.claims);
        assert_eq!(parsed.header.kid.as_deref(), Some("kid-1"));
    }

    #[test]
    fn test_parse_rejects_other_secret() {
        let signer = manager();
        let other = JwtTokenManager::from_secret(b"other-secret", "kid-1", "http://auth.test");

        let signed = signer
            .sign(&signer.generate_unsigned_service_account_token("acc", "svc"))
            .unwrap();
        let err = other.parse(signed.raw.as_deref().unwrap()).unwrap_err();
        assert!(matches!(err, TokenError::Jwt(_)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(manager().parse("not-a-jwt").is_err());
    }

    #[test]
    fn test_accessors_report_configuration() {
        let manager = manager();
        assert_eq!(manager.algorithm(), Algorithm::HS256);
        assert_eq!(manager.key_id(), "kid-1");
        assert_eq!(manager.issuer(), "http://auth.test");
    }

    #[test]
    fn test_eddsa_sign_then_parse_keeps_claims() {
        let manager = JwtTokenManager::from_ed_pem(
            ED25519_PRIVATE_KEY_PEM,
            ED25519_PUBLIC_KEY_PEM,
            "ed-kid",
            "http://auth.test",
        )
        .unwrap();
        assert_eq!(manager.algorithm(), Algorithm::EdDSA);

        let ident = Identity::random().with_profile("Ed User", "http://img/ed.png");
        let unsigned = build_claims(&ident);
        // built tokens carry RS256 until signed
        assert_eq!(unsigned.header.alg, Algorithm::RS256);

        let signed = manager.sign(&unsigned).unwrap();
        assert_eq!(signed.header.alg, Algorithm::EdDSA);
        assert_eq!(signed.header.kid.as_deref(), Some("ed-kid"));

        let parsed = manager.parse(signed.raw.as_deref().unwrap()).unwrap();
        assert_eq!(parsed.header.alg, Algorithm::EdDSA);
        assert_eq!(parsed.claims, unsigned.claims);
    }

    #[test]
    fn test_eddsa_rejects_hs256_token() {
        let eddsa = JwtTokenManager::from_ed_pem(
            ED25519_PRIVATE_KEY_PEM,
            ED25519_PUBLIC_KEY_PEM,
            "ed-kid",
            "http://auth.test",
        )
        .unwrap();
        let hs = manager();

        let signed = hs.sign(&build_claims(&Identity::random())).unwrap();
        assert!(eddsa.parse(signed.raw.as_deref().unwrap()).is_err());
    }

    #[test]
    fn test_invalid_pem_is_rejected() {
        let err = JwtTokenManager::from_ed_pem("nope", "nope", "kid", "iss").unwrap_err();
        assert!(matches!(err, TokenError::InvalidKey(_)));
    }

    #[test]
    fn test_debug_hides_keys() {
        let printed = format!("{:?}", manager());
        assert!(printed.contains("kid-1"));
        assert!(!printed.contains("unit-secret"));
    }

    #[test]
    fn test_manager_slot_returns_same_instance() {
        let manager: Arc<dyn TokenManager> = Arc::new(manager());
        let base = Context::background();
        let ctx = context_with_token_manager(&base, manager.clone());

        let read = read_token_manager_from_context(&ctx).unwrap();
        assert!(Arc::ptr_eq(&manager, &read));
        assert!(read_token_manager_from_context(&base).is_none());
    }
}
