//! Factory: build a `TokenManager` from `TestkitConfig`.
use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::config::{ConfigError, SigningKeyConfig, TestkitConfig};
use crate::error::Result;
use crate::token::manager::{JwtTokenManager, TokenManager};

pub fn build_token_manager(config: &TestkitConfig) -> Result<Arc<dyn TokenManager>> {
    let issuer = config.auth_service_url.as_str().trim_end_matches('/');

    let manager = match &config.signing_key {
        SigningKeyConfig::Secret(secret) => {
            JwtTokenManager::from_secret(secret.as_bytes(), config.key_id.clone(), issuer)
        }
        SigningKeyConfig::Ed25519Pem {
            private_key_pem,
            public_key_pem,
        } => JwtTokenManager::from_ed_pem(
            private_key_pem,
            public_key_pem,
            config.key_id.clone(),
            issuer,
        )?,
    };

    Ok(Arc::new(manager))
}

static DEFAULT_TOKEN_MANAGER: OnceLock<Arc<dyn TokenManager>> = OnceLock::new();

/// Process-wide token manager used by the service constructors.
///
/// Built once from the environment; a broken environment falls back to the
/// built-in defaults so tests still get a working manager.
pub fn default_token_manager() -> Arc<dyn TokenManager> {
    DEFAULT_TOKEN_MANAGER
        .get_or_init(|| token_manager_or_default(TestkitConfig::from_env()))
        .clone()
}

/// Manager for `config`, or the built-in default one when the config was
/// rejected or its keys don't load.
fn token_manager_or_default(
    config: std::result::Result<TestkitConfig, ConfigError>,
) -> Arc<dyn TokenManager> {
    let config = config.unwrap_or_else(|e| {
        warn!(error = %e, "testkit configuration rejected, using defaults");
        TestkitConfig::default()
    });

    build_token_manager(&config).unwrap_or_else(|e| {
        warn!(error = %e, "failed to build token manager, using default secret");
        build_token_manager(&TestkitConfig::default())
            .expect("default testkit config signs with a shared secret")
    })
}
