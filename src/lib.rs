//! # auth-testkit
//!
//! Test support for the auth service: fabricate JWTs from test identities and
//! inject them, together with a token manager, into an immutable request
//! context so the code under test sees an authenticated request.
//!
//! ```
//! use auth_testkit::{Identity, service_as_user};
//! use uuid::Uuid;
//!
//! let alice = Identity::new(Uuid::new_v4(), "alice").with_profile("Alice A", "http://img/a.png");
//! let svc = service_as_user("users", &alice);
//!
//! let creds = svc.credentials();
//! assert_eq!(creds.subject_id().unwrap(), alice.id);
//! ```
mod config;
mod context;
mod credentials;
mod error;
mod identity;
mod login;
mod service;
mod subscription;
mod telemetry;
mod token;

pub use config::{ConfigError, SigningKeyConfig, TestkitConfig};
pub use context::{Context, ContextKey};
pub use credentials::RequestCredentials;
pub use error::{Result, TokenError};
pub use identity::{Identity, User};
pub use login::{
    DEFAULT_SIGNING_ALGORITHM, JwtKey, build_claims, build_incomplete_claims,
    build_service_account_claims, jwt_from_context, with_identity, with_incomplete_identity,
    with_jwt, with_service_account_authz,
};
pub use service::{
    Service, ServiceFactory, service_as_service_account_user, service_as_user,
    service_as_user_with_incomplete_claims, unsecured_service,
};
pub use subscription::{
    DummySubscriptionStatusProvider, OAuthToken, SubscriptionError, SubscriptionStatusProvider,
};
pub use telemetry::init_test_tracing;
pub use token::{
    Claims, JwtTokenManager, SERVICE_ACCOUNT_SCOPE, Token, TokenManager, TokenManagerKey,
    build_token_manager, context_with_token_manager, default_token_manager,
    read_token_manager_from_context,
};
