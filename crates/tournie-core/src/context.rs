//! Pipeline context with heterogeneous, append-only storage.

use crate::message::Message;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-safe context key wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(String);

impl ContextKey {
    /// Creates a new ContextKey.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContextKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ContextKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ContextKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ContextKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

type Value = Arc<dyn Any + Send + Sync>;

/// The data bag threaded through a pipeline.
///
/// A context starts from the inbound [`Message`] and accumulates fields as
/// steps succeed. Fields are never removed. Cloning is cheap: values are
/// shared, and a clone only diverges from its origin where a step inserts.
///
/// # Examples
///
/// ```
/// use tournie_core::{Context, Message};
///
/// let mut ctx = Context::new(Message::text("U1", "whoami"));
/// ctx.insert("attempts", 1u32);
/// ctx.insert("name", "alice".to_string());
///
/// assert_eq!(ctx.get::<u32>("attempts"), Some(&1));
/// assert_eq!(ctx.get::<String>("name").map(String::as_str), Some("alice"));
///
/// // Wrong type returns None
/// assert_eq!(ctx.get::<String>("attempts"), None);
/// assert_eq!(ctx.message().sender, "U1");
/// ```
#[derive(Clone)]
pub struct Context {
    message: Arc<Message>,
    data: HashMap<ContextKey, Value>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.data.keys().map(ContextKey::as_str).collect::<Vec<_>>();
        keys.sort_unstable();
        f.debug_struct("Context")
            .field("message", &self.message)
            .field("keys", &keys)
            .finish()
    }
}

impl Context {
    /// Creates a context for the given inbound message.
    pub fn new(message: Message) -> Self {
        Self {
            message: Arc::new(message),
            data: HashMap::new(),
        }
    }

    /// Returns the inbound message the pipeline was started with.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Inserts a value with the given key.
    ///
    /// If the key already exists, the previous value is replaced.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<ContextKey>, value: T) {
        self.data.insert(key.into(), Arc::new(value));
    }

    /// Builder form of [`Context::insert`].
    pub fn with<T: Any + Send + Sync>(mut self, key: impl Into<ContextKey>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns a reference to the value for the given key.
    ///
    /// Returns `None` if the key doesn't exist or the type doesn't match.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Returns `true` if the context contains a value for the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns an iterator over all keys in the context.
    pub fn keys(&self) -> impl Iterator<Item = &ContextKey> {
        self.data.keys()
    }

    /// Returns the number of fields in the context.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no field has been added yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the fields this context gained or replaced relative to `base`.
    ///
    /// `self` is expected to descend from `base` by clone-and-insert. A field
    /// belongs to the fragment when it is new or when its value is not the
    /// very value `base` holds.
    pub fn changes_since(&self, base: &Context) -> Fragment {
        let entries = self
            .data
            .iter()
            .filter(|(key, value)| match base.data.get(key.as_str()) {
                Some(original) => !Arc::ptr_eq(original, *value),
                None => true,
            })
            .map(|(key, value)| (key.clone(), Arc::clone(value)))
            .collect();
        Fragment { entries }
    }

    /// Applies a fragment on top of this context, overwriting colliding keys.
    pub fn merge(&mut self, fragment: Fragment) {
        self.data.extend(fragment.entries);
    }
}

/// The fields a step added to a context.
///
/// Produced by [`Context::changes_since`] and applied with
/// [`Context::merge`].
#[derive(Clone, Default)]
pub struct Fragment {
    entries: Vec<(ContextKey, Value)>,
}

impl Fragment {
    /// Returns the keys carried by the fragment.
    pub fn keys(&self) -> impl Iterator<Item = &ContextKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Returns `true` if the step added nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
