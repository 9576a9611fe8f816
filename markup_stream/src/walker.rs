//! Depth-first traversal of the node tree, in document order.

use crate::{
    attribute::{escape, is_void_element, write_attributes},
    error::{Cause, ContentError, ErrorKind, RenderError},
    node::{ComponentNode, DeferredNode, ElementNode, Node, Rendered},
    once::OnceKey,
    prefetch::{PrefetchCache, PrefetchEntry},
    render::{component_instantiator_key, RenderMode},
    stream_buffer::StreamBuffer,
};
use async_recursion::async_recursion;
use futures::FutureExt;
use render_context::Context;
use rustc_hash::FxHashSet;
use std::borrow::Cow;

/// Per-render traversal state: the output pipe, the once-set, and the
/// component stack used to locate failures.
pub(crate) struct Walker {
    buffer: StreamBuffer,
    mode: RenderMode,
    prefetch: PrefetchCache,
    once_seen: FxHashSet<OnceKey>,
    names: Vec<Cow<'static, str>>,
}

impl Walker {
    pub(crate) fn new(buffer: StreamBuffer, mode: RenderMode, prefetch: PrefetchCache) -> Self {
        Walker {
            buffer,
            mode,
            prefetch,
            once_seen: FxHashSet::default(),
            names: Vec::new(),
        }
    }

    /// Builds a [`RenderError`] carrying the component stack at the
    /// failure site.
    fn error(&self, kind: ErrorKind, cause: Cause) -> RenderError {
        RenderError::new(kind, self.names.clone(), cause)
    }

    #[async_recursion(?Send)]
    pub(crate) async fn walk(&mut self, node: &Node, ctx: &Context) -> Result<(), RenderError> {
        match node {
            Node::Unit | Node::Bool(_) => Ok(()),
            Node::Text(text) => {
                self.buffer.add(&escape(text));
                Ok(())
            }
            Node::Int(n) => {
                self.buffer.add(&n.to_string());
                Ok(())
            }
            Node::Float(x) => {
                self.buffer.add(&x.to_string());
                Ok(())
            }
            Node::Raw(markup) => {
                self.buffer.add(markup);
                Ok(())
            }
            Node::Dynamic(value) => {
                self.buffer.add(&escape(&value.to_string()));
                Ok(())
            }
            Node::Sequence(children) => {
                for child in children.iter() {
                    self.walk(child, ctx).await?;
                }
                Ok(())
            }
            Node::Element(el) => {
                if let Some(name) = &el.display_name {
                    self.names.push(name.clone());
                }
                let result = self.walk_element(el, ctx).await;
                if el.display_name.is_some() {
                    self.names.pop();
                }
                result
            }
            Node::Deferred(deferred) => {
                if let Some(name) = &deferred.display_name {
                    self.names.push(name.clone());
                }
                let result = self.walk_deferred(deferred, ctx).await;
                if deferred.display_name.is_some() {
                    self.names.pop();
                }
                result
            }
            Node::Component(component) => {
                self.names.push(component.display_name.clone());
                let result = self.walk_component(component, ctx).await;
                self.names.pop();
                result
            }
            Node::Pending(pending) => {
                self.buffer.yield_now();
                match pending.future.clone().await {
                    Ok(resolved) => self.walk(&resolved, ctx).await,
                    Err(cause) => Err(self.error(ErrorKind::ContentPromise, cause)),
                }
            }
            Node::Once(once) => {
                if self.once_seen.insert(once.key.clone()) {
                    self.walk(&once.content, ctx).await
                } else {
                    Ok(())
                }
            }
            Node::StackPush(push) => {
                self.buffer.yield_now();
                self.buffer.begin_redirect(&push.stack);
                let result = self.walk(&push.content, ctx).await;
                self.buffer.end_redirect();
                result
            }
            Node::StackOut(out) => self
                .buffer
                .emit_redirected_content(&out.stack)
                .map_err(|cause| self.error(ErrorKind::InvalidContent, cause.into())),
            Node::Foreign(foreign) => Err(self.error(
                ErrorKind::InvalidContent,
                ContentError::ForeignElement {
                    marker: foreign.marker.to_string(),
                }
                .into(),
            )),
        }
    }

    async fn walk_element(&mut self, el: &ElementNode, ctx: &Context) -> Result<(), RenderError> {
        let mut closing = None;
        if let Some(tag) = &el.tag {
            let is_void = self.mode == RenderMode::Html && is_void_element(tag);
            if is_void && !el.content.is_empty() {
                return Err(self.error(
                    ErrorKind::AttributeType,
                    ContentError::VoidElementWithChildren {
                        tag: tag.to_string(),
                    }
                    .into(),
                ));
            }
            let self_closing = self.mode == RenderMode::Xml && el.content.is_empty();
            let mut open = String::with_capacity(tag.len() + 2);
            open.push('<');
            open.push_str(tag);
            write_attributes(&mut open, &el.attributes, self.mode)
                .map_err(|cause| self.error(ErrorKind::AttributeType, cause.into()))?;
            if self_closing {
                open.push_str(" />");
            } else {
                open.push('>');
            }
            self.buffer.add(&open);
            if is_void || self_closing {
                return Ok(());
            }
            closing = Some(tag);
        }
        for child in &el.content {
            self.walk(child, ctx).await?;
        }
        if let Some(tag) = closing {
            self.buffer.add("</");
            self.buffer.add(tag);
            self.buffer.add(">");
        }
        Ok(())
    }

    /// Evaluates a content function, consulting the prefetch cache first.
    async fn walk_deferred(
        &mut self,
        deferred: &DeferredNode,
        ctx: &Context,
    ) -> Result<(), RenderError> {
        let id = deferred.identity();
        match self.prefetch.lookup(id) {
            Some(PrefetchEntry::Ready { node, context }) => {
                return self.walk(&node, &context).await;
            }
            Some(PrefetchEntry::InFlight {
                future,
                forked,
                ambient,
            }) => {
                self.buffer.yield_now();
                match future.await {
                    Ok(node) => {
                        let context = if forked.was_modified() { forked } else { ambient };
                        self.prefetch.insert_ready(id, node.clone(), context.clone());
                        return self.walk(&node, &context).await;
                    }
                    // the scheduler swallows failures; re-invoke the
                    // function so the canonical error is raised here
                    Err(_) => self.prefetch.remove(id),
                }
            }
            None => {}
        }
        let forked = ctx.fork();
        let rendered = (*deferred.func)(forked.clone())
            .map_err(|cause| self.error(ErrorKind::ContentFunction, cause))?;
        // cache what we evaluate so the scheduler never re-invokes a
        // function whose result already exists
        match rendered {
            Rendered::Node(node) => {
                let context = if forked.was_modified() {
                    forked
                } else {
                    ctx.clone()
                };
                self.prefetch.insert_ready(id, node.clone(), context.clone());
                self.walk(&node, &context).await
            }
            Rendered::Future(future) => {
                let shared = future.shared();
                self.prefetch
                    .insert_in_flight(id, shared.clone(), forked.clone(), ctx.clone());
                self.buffer.yield_now();
                match shared.await {
                    Ok(node) => {
                        let context = if forked.was_modified() {
                            forked
                        } else {
                            ctx.clone()
                        };
                        self.prefetch.insert_ready(id, node.clone(), context.clone());
                        self.walk(&node, &context).await
                    }
                    Err(cause) => {
                        self.prefetch.remove(id);
                        Err(self.error(ErrorKind::ContentFunctionPromise, cause))
                    }
                }
            }
        }
    }

    /// Resolves a component reference through the instantiator callback and
    /// renders it like a content function.
    async fn walk_component(
        &mut self,
        component: &ComponentNode,
        ctx: &Context,
    ) -> Result<(), RenderError> {
        let instantiator = match ctx.get(&component_instantiator_key()) {
            Some(instantiator) => instantiator,
            None => {
                return Err(self.error(
                    ErrorKind::ContentFunction,
                    Cause::msg("no component instantiator in context"),
                ));
            }
        };
        let instance = (**instantiator)(component.reference.as_ref())
            .map_err(|cause| self.error(ErrorKind::ContentFunction, cause))?;
        let forked = ctx.fork();
        let rendered = instance
            .render(forked.clone())
            .map_err(|cause| self.error(ErrorKind::ContentFunction, cause))?;
        self.finish_deferred(rendered, forked, ctx).await
    }

    /// Walks a content function's result under the right context: the fork
    /// if the function wrote to it, otherwise the ambient frame, keeping
    /// chains shallow across read-only components.
    async fn finish_deferred(
        &mut self,
        rendered: Rendered,
        forked: Context,
        ctx: &Context,
    ) -> Result<(), RenderError> {
        match rendered {
            Rendered::Node(node) => {
                let context = if forked.was_modified() {
                    forked
                } else {
                    ctx.clone()
                };
                self.walk(&node, &context).await
            }
            Rendered::Future(future) => {
                self.buffer.yield_now();
                let node = future
                    .await
                    .map_err(|cause| self.error(ErrorKind::ContentFunctionPromise, cause))?;
                let context = if forked.was_modified() {
                    forked
                } else {
                    ctx.clone()
                };
                self.walk(&node, &context).await
            }
        }
    }
}
