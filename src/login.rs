//! Fabricate tokens from test identities and put them into a context.
//!
//! Tokens built here are unsigned; pass them through
//! [`TokenManager::sign`](crate::token::TokenManager::sign) when the code
//! under test needs a compact JWT.

use jsonwebtoken::Algorithm;
use tracing::debug;

use crate::context::{Context, ContextKey};
use crate::identity::Identity;
use crate::token::{Claims, Token, TokenManager};

/// Algorithm written to the header of locally built tokens.
pub const DEFAULT_SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Context slot holding the authentication token.
pub struct JwtKey;

impl ContextKey for JwtKey {
    type Value = Token;
}

/// Attach `token` to a derived context.
pub fn with_jwt(ctx: &Context, token: Token) -> Context {
    ctx.with::<JwtKey>(token)
}

/// The token in the authentication slot, if any.
pub fn jwt_from_context(ctx: &Context) -> Option<&Token> {
    ctx.get::<JwtKey>()
}

/// Token with `sub`, `uuid`, `fullName`, `imageURL` and `iat` filled from `ident`.
pub fn build_claims(ident: &Identity) -> Token {
    let id = ident.id.to_string();
    let claims = Claims {
        sub: Some(id.clone()),
        uuid: Some(id),
        full_name: Some(ident.user.full_name.clone()),
        image_url: Some(ident.user.image_url.clone()),
        ..Claims::issued_now()
    };
    Token::new(DEFAULT_SIGNING_ALGORITHM, claims)
}

/// Same as [`build_claims`] but without `sub`/`uuid` (and `fullName`).
pub fn build_incomplete_claims(ident: &Identity) -> Token {
    let claims = Claims {
        image_url: Some(ident.user.image_url.clone()),
        ..Claims::issued_now()
    };
    Token::new(DEFAULT_SIGNING_ALGORITHM, claims)
}

/// Service account token for `ident`, generated by `manager`.
///
/// `ident.id` must already be set; see [`Identity::with_generated_id_if_nil`].
pub fn build_service_account_claims(manager: &dyn TokenManager, ident: &Identity) -> Token {
    manager.generate_unsigned_service_account_token(&ident.id.to_string(), &ident.username)
}

pub fn with_identity(ctx: &Context, ident: &Identity) -> Context {
    debug!(identity_id = %ident.id, username = %ident.username, "injecting identity token");
    with_jwt(ctx, build_claims(ident))
}

pub fn with_incomplete_identity(ctx: &Context, ident: &Identity) -> Context {
    debug!(identity_id = %ident.id, "injecting incomplete identity token");
    with_jwt(ctx, build_incomplete_claims(ident))
}

/// Attach a service account token. A nil `ident.id` is replaced by a fresh v4 id first.
pub fn with_service_account_authz(
    ctx: &Context,
    manager: &dyn TokenManager,
    ident: &Identity,
) -> Context {
    let ident = ident.clone().with_generated_id_if_nil();
    debug!(
        identity_id = %ident.id,
        username = %ident.username,
        "injecting service account token"
    );
    with_jwt(ctx, build_service_account_claims(manager, &ident))
}
