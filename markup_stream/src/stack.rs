//! Stacks: named redirection channels that teleport content.
//!
//! Content pushed onto a stack anywhere in the document is accumulated in
//! the stack's sink and materialized at the location of the matching
//! outlet, in the order the push markers are visited. This is how `<head>`
//! content produced deep in a tree lands at the top of the document without
//! giving up streaming.

use crate::node::Node;
use rustc_hash::FxHashMap;
use std::{
    borrow::Cow,
    cell::RefCell,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_STACK_ID: AtomicU64 = AtomicU64::new(0);

/// The process-unique identity of a [`Stack`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StackId(u64);

/// A named redirection channel.
///
/// `push` markers feed the stack's sink; the single `outlet` marker drains
/// it. A stack may be pushed to any number of times, but drained by at most
/// one outlet per render.
#[derive(Clone, Debug)]
pub struct Stack {
    id: StackId,
    name: Cow<'static, str>,
}

impl Stack {
    /// Mints a stack with a fresh identity. The name is diagnostic only;
    /// two stacks with the same name are still distinct channels.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Stack {
            id: StackId(NEXT_STACK_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
        }
    }

    /// This stack's identity.
    pub fn id(&self) -> StackId {
        self.id
    }

    /// The diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds a marker that redirects `content` into this stack's sink.
    pub fn push(&self, content: impl Into<Node>) -> Node {
        Node::StackPush(Rc::new(StackPushNode {
            stack: self.clone(),
            content: content.into(),
        }))
    }

    /// Builds the marker at which this stack's accumulated content is
    /// materialized.
    pub fn outlet(&self) -> Node {
        Node::StackOut(StackOutNode {
            stack: self.clone(),
        })
    }
}

/// A stack-push marker node.
#[derive(Clone, Debug)]
pub struct StackPushNode {
    pub(crate) stack: Stack,
    pub(crate) content: Node,
}

/// A stack-out marker node.
#[derive(Clone, Debug)]
pub struct StackOutNode {
    pub(crate) stack: Stack,
}

/// One chunk accumulated in a sink: rendered text, or a reference to
/// another stack's sink materialized inside this one.
#[derive(Clone, Debug)]
pub(crate) enum SinkChunk {
    Text(String),
    Sink(StackId),
}

/// The per-render map from stack identity to sink, created lazily on first
/// reference. Shared between the stream buffer and the root context.
#[derive(Clone, Debug, Default)]
pub struct StackRegistry {
    sinks: Rc<RefCell<FxHashMap<StackId, Vec<SinkChunk>>>>,
}

impl StackRegistry {
    pub(crate) fn append(&self, id: StackId, chunk: SinkChunk) {
        self.sinks.borrow_mut().entry(id).or_default().push(chunk);
    }

    /// Empties and returns the sink for `id`.
    pub(crate) fn take(&self, id: StackId) -> Vec<SinkChunk> {
        self.sinks
            .borrow_mut()
            .get_mut(&id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Recursively resolves sink references and appends all text to `out`.
    /// Sinks are drained as they are flattened, so a sink reachable through
    /// two paths contributes its content only once.
    pub(crate) fn flatten_into(&self, chunks: Vec<SinkChunk>, out: &mut String) {
        for chunk in chunks {
            match chunk {
                SinkChunk::Text(text) => out.push_str(&text),
                SinkChunk::Sink(id) => {
                    let inner = self.take(id);
                    self.flatten_into(inner, out);
                }
            }
        }
    }
}
