use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

pub(crate) type KeyId = u64;

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(0);

/// A typed handle under which a value can be stored in a [`Context`](crate::Context).
///
/// Keys are process-unique opaque tokens: two keys are equal only if one is a
/// clone of the other, regardless of their names or value types. The name is
/// purely diagnostic.
///
/// A key may carry a default, returned by [`Context::get`](crate::Context::get)
/// when no frame on the chain holds a value:
///
/// ```
/// use render_context::{create_key, Context};
///
/// let limit = create_key::<usize>("limit").with_default(32);
/// let ctx = Context::new();
/// assert_eq!(ctx.get(&limit).as_deref(), Some(&32));
/// ```
pub struct Key<T> {
    id: KeyId,
    name: &'static str,
    default: Option<Rc<T>>,
}

/// Creates a new key with the given diagnostic name.
///
/// Every call returns a distinct key, even for the same name and value type.
pub fn create_key<T>(name: &'static str) -> Key<T> {
    Key {
        id: NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed),
        name,
        default: None,
    }
}

impl<T> Key<T> {
    /// Attaches a default value, returned by lookups when no frame holds an
    /// entry for this key.
    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(Rc::new(value));
        self
    }

    /// The diagnostic name this key was created with.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn id(&self) -> KeyId {
        self.id
    }

    pub(crate) fn default(&self) -> Option<Rc<T>> {
        self.default.clone()
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Key {
            id: self.id,
            name: self.name,
            default: self.default.clone(),
        }
    }
}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}
