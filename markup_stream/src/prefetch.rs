//! The prefetch scheduler.
//!
//! Ahead of the walker, a parallel traversal invokes every content function
//! it can reach so that data loading overlaps with the rendering of earlier
//! parts of the document. Prefetching is strictly an optimization: the
//! walker produces identical output whether it ran or not. Failures are
//! swallowed here — the walker re-invokes the function and surfaces the
//! canonical error.

use crate::node::{DeferredNode, Node, Rendered, SharedNodeFuture};
use async_recursion::async_recursion;
use futures::{future::join_all, FutureExt};
use render_context::Context;
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};

/// Identity of a content function: the address of its `Rc` allocation.
pub(crate) type FnIdentity = usize;

#[derive(Clone)]
pub(crate) enum PrefetchEntry {
    /// The function returned a future that has not resolved yet. The
    /// walker awaits the same shared future instead of re-invoking.
    InFlight {
        future: SharedNodeFuture,
        /// The context the function was invoked with.
        forked: Context,
        /// The context the fork was taken from; used when the fork stays
        /// unmodified.
        ambient: Context,
    },
    /// The function's content, plus the context to walk it under.
    Ready { node: Node, context: Context },
}

/// Per-render cache of prefetched content, keyed by function identity.
/// Written by the scheduler, read (and completed) by the walker.
#[derive(Clone, Default)]
pub(crate) struct PrefetchCache {
    entries: Rc<RefCell<FxHashMap<FnIdentity, PrefetchEntry>>>,
}

impl PrefetchCache {
    pub(crate) fn lookup(&self, id: FnIdentity) -> Option<PrefetchEntry> {
        self.entries.borrow().get(&id).cloned()
    }

    pub(crate) fn contains(&self, id: FnIdentity) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    pub(crate) fn insert_in_flight(
        &self,
        id: FnIdentity,
        future: SharedNodeFuture,
        forked: Context,
        ambient: Context,
    ) {
        self.entries.borrow_mut().insert(
            id,
            PrefetchEntry::InFlight {
                future,
                forked,
                ambient,
            },
        );
    }

    pub(crate) fn insert_ready(&self, id: FnIdentity, node: Node, context: Context) {
        self.entries
            .borrow_mut()
            .insert(id, PrefetchEntry::Ready { node, context });
    }

    pub(crate) fn remove(&self, id: FnIdentity) {
        self.entries.borrow_mut().remove(&id);
    }
}

/// Fans out over the tree, invoking content functions eagerly.
///
/// Once-markers and stack markers are not descended into: their semantics
/// depend on walker state (the once-set and the redirect sinks), so their
/// content waits for the walker.
#[async_recursion(?Send)]
pub(crate) async fn prefetch_node(node: &Node, ctx: &Context, cache: &PrefetchCache) {
    match node {
        Node::Sequence(children) => {
            join_all(
                children
                    .iter()
                    .map(|child| prefetch_node(child, ctx, cache)),
            )
            .await;
        }
        Node::Element(el) => {
            join_all(
                el.content
                    .iter()
                    .map(|child| prefetch_node(child, ctx, cache)),
            )
            .await;
        }
        Node::Pending(pending) => {
            if let Ok(resolved) = pending.future.clone().await {
                prefetch_node(&resolved, ctx, cache).await;
            }
        }
        Node::Deferred(deferred) => prefetch_deferred(deferred, ctx, cache).await,
        _ => {}
    }
}

async fn prefetch_deferred(deferred: &DeferredNode, ctx: &Context, cache: &PrefetchCache) {
    let id = deferred.identity();
    if cache.contains(id) {
        return;
    }
    let forked = ctx.fork();
    let rendered = match (*deferred.func)(forked.clone()) {
        Ok(rendered) => rendered,
        Err(_) => return,
    };
    match rendered {
        Rendered::Node(node) => {
            let context = if forked.was_modified() {
                forked
            } else {
                ctx.clone()
            };
            cache.insert_ready(id, node.clone(), context.clone());
            prefetch_node(&node, &context, cache).await;
        }
        Rendered::Future(future) => {
            let shared = future.shared();
            cache.insert_in_flight(id, shared.clone(), forked.clone(), ctx.clone());
            match shared.await {
                Ok(node) => {
                    let context = if forked.was_modified() {
                        forked
                    } else {
                        ctx.clone()
                    };
                    cache.insert_ready(id, node.clone(), context.clone());
                    prefetch_node(&node, &context, cache).await;
                }
                Err(_) => cache.remove(id),
            }
        }
    }
}
