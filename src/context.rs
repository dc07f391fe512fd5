//! Immutable, chainable request context.
//!
//! Every `with` call returns a new `Context` that points at its parent; the
//! parent is never touched, so several derived contexts can share one base
//! and be handed to different threads.
//!
//! Slots are addressed by types implementing [`ContextKey`], which fixes the
//! value type at compile time:
//!
//! ```
//! use auth_testkit::{Context, ContextKey};
//!
//! struct RequestId;
//! impl ContextKey for RequestId {
//!     type Value = String;
//! }
//!
//! let base = Context::background();
//! let ctx = base.with::<RequestId>("req-1".to_string());
//! assert_eq!(ctx.get::<RequestId>().map(String::as_str), Some("req-1"));
//! assert!(base.get::<RequestId>().is_none());
//! ```
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Typed key for a context slot.
pub trait ContextKey: 'static {
    type Value: Send + Sync + 'static;
}

struct Layer {
    key: TypeId,
    key_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Layer>>,
}

#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Layer>>,
}

impl Context {
    /// Empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a new context with `value` stored under `K`.
    ///
    /// A later layer shadows an earlier one for the same key.
    pub fn with<K: ContextKey>(&self, value: K::Value) -> Self {
        self.with_shared::<K>(Arc::new(value))
    }

    /// Same as [`Context::with`] for a value that is already shared.
    pub fn with_shared<K: ContextKey>(&self, value: Arc<K::Value>) -> Self {
        Self {
            head: Some(Arc::new(Layer {
                key: TypeId::of::<K>(),
                key_name: std::any::type_name::<K>(),
                value,
                parent: self.head.clone(),
            })),
        }
    }

    pub fn get<K: ContextKey>(&self) -> Option<&K::Value> {
        self.find(TypeId::of::<K>())
            .and_then(|layer| layer.value.downcast_ref::<K::Value>())
    }

    /// Shared handle to the value under `K` (pointer-equal to what was stored).
    pub fn get_shared<K: ContextKey>(&self) -> Option<Arc<K::Value>> {
        self.find(TypeId::of::<K>())
            .and_then(|layer| layer.value.clone().downcast::<K::Value>().ok())
    }

    pub fn contains<K: ContextKey>(&self) -> bool {
        self.find(TypeId::of::<K>()).is_some()
    }

    /// Number of layers in the chain, shadowed ones included.
    pub fn depth(&self) -> usize {
        self.layers().count()
    }

    fn find(&self, key: TypeId) -> Option<&Layer> {
        self.layers().find(|layer| layer.key == key)
    }

    fn layers(&self) -> impl Iterator<Item = &Layer> {
        std::iter::successors(self.head.as_deref(), |layer| layer.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values are opaque; print the key chain only.
        f.debug_list()
            .entries(self.layers().map(|layer| layer.key_name))
            .finish()
    }
}
