use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile data of a test user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub full_name: String,
    pub image_url: String,
}

/// A test user or service account used to parameterize token construction.
///
/// - `id` is `Uuid::nil()` when unset
/// - builders accept any value; empty fields end up as empty claims
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub user: User,
}

impl Identity {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            user: User::default(),
        }
    }

    pub fn with_profile(mut self, full_name: impl Into<String>, image_url: impl Into<String>) -> Self {
        self.user = User {
            full_name: full_name.into(),
            image_url: image_url.into(),
        };
        self
    }

    /// Random v4 id, random-ish username. Handy when the test doesn't care who it is.
    pub fn random() -> Self {
        let id = Uuid::new_v4();
        Self::new(id, format!("testuser-{}", id.simple()))
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_nil()
    }

    /// Return a copy with a fresh v4 id if `id` is nil, unchanged otherwise.
    pub fn with_generated_id_if_nil(mut self) -> Self {
        if self.id.is_nil() {
            self.id = Uuid::new_v4();
        }
        self
    }
}
