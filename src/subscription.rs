//! Subscription status lookup interface and a canned implementation for tests.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::Context;

/// Errors a subscription status lookup can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("subscription backend error: {0}")]
    Backend(String),
    #[error("subscription not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
}

/// OAuth2 token handed to the subscription backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl OAuthToken {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait SubscriptionStatusProvider: Send + Sync {
    async fn load_subscription_status(
        &self,
        ctx: &Context,
        token: &OAuthToken,
    ) -> Result<String, SubscriptionError>;
}

/// Returns `status`, or `err` when set, whatever the input.
#[derive(Debug, Clone, Default)]
pub struct DummySubscriptionStatusProvider {
    pub status: String,
    pub err: Option<SubscriptionError>,
}

impl DummySubscriptionStatusProvider {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            err: None,
        }
    }

    pub fn failing(err: SubscriptionError) -> Self {
        Self {
            status: String::new(),
            err: Some(err),
        }
    }
}

#[async_trait]
impl SubscriptionStatusProvider for DummySubscriptionStatusProvider {
    async fn load_subscription_status(
        &self,
        _ctx: &Context,
        _token: &OAuthToken,
    ) -> Result<String, SubscriptionError> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(self.status.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_configured_status() {
        let provider = DummySubscriptionStatusProvider::with_status("signup_complete");
        let status = provider
            .load_subscription_status(&Context::background(), &OAuthToken::bearer("t"))
            .await
            .unwrap();
        assert_eq!(status, "signup_complete");
    }

    #[tokio::test]
    async fn test_returns_configured_error() {
        let provider = DummySubscriptionStatusProvider::failing(SubscriptionError::NotFound);
        let err = provider
            .load_subscription_status(&Context::background(), &OAuthToken::default())
            .await
            .unwrap_err();
        assert_eq!(err, SubscriptionError::NotFound);
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let provider: Box<dyn SubscriptionStatusProvider> =
            Box::new(DummySubscriptionStatusProvider::with_status("provisioned"));
        let status = provider
            .load_subscription_status(&Context::background(), &OAuthToken::bearer("t"))
            .await
            .unwrap();
        assert_eq!(status, "provisioned");
    }

    #[test]
    fn test_bearer_token_shape() {
        let token = OAuthToken::bearer("abc");
        assert_eq!(token.token_type, "Bearer");
        assert!(token.refresh_token.is_none());
    }
}
