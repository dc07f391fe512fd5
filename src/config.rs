/*
 * Responsibility
 * - Read testkit settings from the environment (.env is honoured)
 * - Validate values up front so a broken setup fails before any token is built
 */
use std::fmt;

use url::Url;

const DEFAULT_AUTH_SERVICE_URL: &str = "http://localhost:8089";
const DEFAULT_JWT_SECRET: &str = "testkit-secret";
const DEFAULT_KEY_ID: &str = "test-key";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Key material the token manager signs with.
#[derive(Clone)]
pub enum SigningKeyConfig {
    /// HS256 shared secret.
    Secret(String),
    /// EdDSA. Ed25519 keys in PEM format (private key as PKCS#8).
    Ed25519Pem {
        private_key_pem: String,
        public_key_pem: String,
    },
}

impl fmt::Debug for SigningKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            SigningKeyConfig::Secret(_) => f.write_str("Secret(..)"),
            SigningKeyConfig::Ed25519Pem { .. } => f.write_str("Ed25519Pem(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TestkitConfig {
    // `iss` of service account tokens
    pub auth_service_url: Url,
    pub signing_key: SigningKeyConfig,
    // `kid` header of generated tokens
    pub key_id: String,
}

impl Default for TestkitConfig {
    fn default() -> Self {
        Self {
            auth_service_url: Url::parse(DEFAULT_AUTH_SERVICE_URL)
                .expect("default auth service url is valid"),
            signing_key: SigningKeyConfig::Secret(DEFAULT_JWT_SECRET.to_string()),
            key_id: DEFAULT_KEY_ID.to_string(),
        }
    }
}

impl TestkitConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env, map in tests, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_service_url = lookup("TESTKIT_AUTH_SERVICE_URL")
            .unwrap_or_else(|| DEFAULT_AUTH_SERVICE_URL.to_string());
        let auth_service_url = Url::parse(auth_service_url.trim())
            .map_err(|_| ConfigError::Invalid("TESTKIT_AUTH_SERVICE_URL"))?;

        let signing_key = match lookup("TESTKIT_JWT_PRIVATE_KEY_PEM") {
            Some(pem) if !pem.trim().is_empty() => {
                let public_key_pem = lookup("TESTKIT_JWT_PUBLIC_KEY_PEM")
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(ConfigError::Missing("TESTKIT_JWT_PUBLIC_KEY_PEM"))?;
                SigningKeyConfig::Ed25519Pem {
                    private_key_pem: pem.replace("\\n", "\n"),
                    public_key_pem: public_key_pem.replace("\\n", "\n"),
                }
            }
            _ => {
                let secret =
                    lookup("TESTKIT_JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
                if secret.is_empty() {
                    return Err(ConfigError::Missing("TESTKIT_JWT_SECRET"));
                }
                SigningKeyConfig::Secret(secret)
            }
        };

        let key_id = lookup("TESTKIT_KEY_ID")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_KEY_ID.to_string());

        Ok(Self {
            auth_service_url,
            signing_key,
            key_id,
        })
    }
}
