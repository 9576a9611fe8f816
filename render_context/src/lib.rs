#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Hierarchical key-value state shared down a render tree.
//!
//! A [`Context`] is a chain of frames: reading walks the chain towards the
//! root, writing stores into the current frame only. Forking creates a child
//! frame, so values provided higher in a tree are visible lower down, while a
//! child's writes stay invisible to its parent and siblings — the same
//! variable-scope shape that context systems in component frameworks use.
//!
//! ```
//! use render_context::{create_key, Context};
//!
//! let theme = create_key::<String>("theme");
//!
//! let root = Context::new();
//! root.set(&theme, "dark".to_string());
//!
//! // the child sees the parent's value...
//! let child = root.fork();
//! assert_eq!(child.get(&theme).as_deref().map(String::as_str), Some("dark"));
//!
//! // ...but its own writes stay local
//! child.set(&theme, "light".to_string());
//! assert_eq!(root.get(&theme).as_deref().map(String::as_str), Some("dark"));
//! ```

mod key;

pub use key::{create_key, Key};

use key::KeyId;
use rustc_hash::FxHashMap;
use std::{
    any::Any,
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// A frame in a context chain.
///
/// Values are stored type-erased; the typed [`Key`] recovers them on lookup.
struct Frame {
    parent: Option<Rc<Frame>>,
    values: RefCell<FxHashMap<KeyId, Rc<dyn Any>>>,
    modified: Cell<bool>,
}

/// A handle to one frame of a context chain.
///
/// Cloning the handle shares the frame; use [`Context::fork`] to create a
/// child frame with its own isolated writes.
#[derive(Clone)]
pub struct Context {
    frame: Rc<Frame>,
}

impl Context {
    /// Creates a new root context with no parent and no values.
    pub fn new() -> Self {
        Context {
            frame: Rc::new(Frame {
                parent: None,
                values: RefCell::new(FxHashMap::default()),
                modified: Cell::new(false),
            }),
        }
    }

    /// Creates a child frame whose parent is the current frame.
    ///
    /// The child sees every value visible to its parent; values the child
    /// sets are invisible to the parent and to other forks.
    pub fn fork(&self) -> Self {
        Context {
            frame: Rc::new(Frame {
                parent: Some(Rc::clone(&self.frame)),
                values: RefCell::new(FxHashMap::default()),
                modified: Cell::new(false),
            }),
        }
    }

    /// Looks up the value for `key`, walking the frame chain towards the
    /// root. Returns the key's default, if any, when no frame has an entry.
    pub fn get<T: 'static>(&self, key: &Key<T>) -> Option<Rc<T>> {
        let mut current = &self.frame;
        loop {
            if let Some(value) = current.values.borrow().get(&key.id()).cloned() {
                return value.downcast::<T>().ok();
            }
            match &current.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        key.default()
    }

    /// Stores `value` for `key` in the current frame and marks the frame
    /// modified. Values in ancestor frames are shadowed, not overwritten.
    pub fn set<T: 'static>(&self, key: &Key<T>, value: T) {
        self.frame
            .values
            .borrow_mut()
            .insert(key.id(), Rc::new(value));
        self.frame.modified.set(true);
    }

    /// Whether any value has been set through this handle's frame.
    ///
    /// Lets a caller that forked speculatively drop the child frame again
    /// when nothing was written to it, keeping chains shallow.
    pub fn was_modified(&self) -> bool {
        self.frame.modified.get()
    }

    /// Whether two handles refer to the same frame.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.frame, &other.frame)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0usize;
        let mut current = &self.frame;
        while let Some(parent) = &current.parent {
            depth += 1;
            current = parent;
        }
        f.debug_struct("Context")
            .field("depth", &depth)
            .field("entries", &self.frame.values.borrow().len())
            .field("modified", &self.frame.modified.get())
            .finish()
    }
}
