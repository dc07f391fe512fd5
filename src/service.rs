//! Ready-made mock service handles for test call sites.
//!
//! Each constructor starts from a fresh named [`Service`] and layers the
//! identity / service account token first, then the token manager.

use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::credentials::RequestCredentials;
use crate::identity::Identity;
use crate::login::{with_identity, with_incomplete_identity, with_service_account_authz};
use crate::token::{TokenManager, context_with_token_manager, default_token_manager};

/// A named service carrying its request context.
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub context: Context,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: Context::background(),
        }
    }

    pub fn credentials(&self) -> RequestCredentials {
        RequestCredentials::from_context(&self.context)
    }
}

/// Service constructors bound to one token manager.
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    manager: Arc<dyn TokenManager>,
}

impl ServiceFactory {
    pub fn new(manager: Arc<dyn TokenManager>) -> Self {
        Self { manager }
    }

    pub fn token_manager(&self) -> &Arc<dyn TokenManager> {
        &self.manager
    }

    /// Service whose context holds a complete token for `ident`.
    pub fn as_user(&self, name: &str, ident: &Identity) -> Service {
        let mut svc = Service::new(name);
        svc.context = with_identity(&svc.context, ident);
        svc.context = context_with_token_manager(&svc.context, self.manager.clone());
        debug!(service = %name, identity_id = %ident.id, "built service as user");
        svc
    }

    /// Like [`ServiceFactory::as_user`], with an incomplete token on top.
    pub fn as_user_with_incomplete_claims(&self, name: &str, ident: &Identity) -> Service {
        let mut svc = self.as_user(name, ident);
        svc.context = with_incomplete_identity(&svc.context, ident);
        svc
    }

    /// Token manager only, no identity.
    pub fn unsecured(&self, name: &str) -> Service {
        let mut svc = Service::new(name);
        svc.context = context_with_token_manager(&svc.context, self.manager.clone());
        debug!(service = %name, "built unsecured service");
        svc
    }

    /// Minimal service that passes as a service account.
    pub fn as_service_account_user(&self, name: &str, ident: &Identity) -> Service {
        let mut svc = Service::new(name);
        svc.context = with_service_account_authz(&svc.context, self.manager.as_ref(), ident);
        svc.context = context_with_token_manager(&svc.context, self.manager.clone());
        debug!(service = %name, username = %ident.username, "built service as service account");
        svc
    }
}

impl Default for ServiceFactory {
    fn default() -> Self {
        Self::new(default_token_manager())
    }
}

pub fn service_as_user(name: &str, ident: &Identity) -> Service {
    ServiceFactory::default().as_user(name, ident)
}

pub fn service_as_user_with_incomplete_claims(name: &str, ident: &Identity) -> Service {
    ServiceFactory::default().as_user_with_incomplete_claims(name, ident)
}

pub fn unsecured_service(name: &str) -> Service {
    ServiceFactory::default().unsecured(name)
}

pub fn service_as_service_account_user(name: &str, ident: &Identity) -> Service {
    ServiceFactory::default().as_service_account_user(name, ident)
}
