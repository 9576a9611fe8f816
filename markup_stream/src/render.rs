//! Render entry points and options.

use crate::{
    error::{Cause, RenderError},
    node::{Component, ComponentInstantiator, Node},
    prefetch::{prefetch_node, PrefetchCache},
    stack::StackRegistry,
    stream_buffer::StreamBuffer,
    walker::Walker,
};
use futures::{future::LocalBoxFuture, FutureExt, Stream, StreamExt};
use render_context::{create_key, Context, Key};
use std::{
    any::Any,
    fmt,
    pin::Pin,
    rc::Rc,
    task::{Context as TaskContext, Poll},
};

/// The output flavor of a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// HTML: void elements, bare boolean attributes, no self-closing tags.
    #[default]
    Html,
    /// XML: no void elements or boolean attributes; childless elements
    /// self-close.
    Xml,
}

/// Configuration for one render.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// The output flavor. Defaults to HTML.
    pub mode: RenderMode,
    /// The context to fork the render's root context from. A fresh context
    /// is created when omitted.
    pub context: Option<Context>,
    /// Whether to run the prefetch scheduler alongside the walker. On by
    /// default; turning it off changes timing, never output.
    pub prefetch: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            mode: RenderMode::default(),
            context: None,
            prefetch: true,
        }
    }
}

thread_local! {
    static COMPONENT_INSTANTIATOR: Key<ComponentInstantiator> =
        create_key::<ComponentInstantiator>("component-instantiator")
            .with_default(Rc::new(default_instantiator));
    static STACK_REGISTRY: Key<StackRegistry> = create_key("stack-registry");
}

/// The key under which the component-instantiator callback lives.
///
/// The default callback resolves references built with
/// [`ComponentNode::from_instance`](crate::ComponentNode::from_instance); an
/// IoC container replaces it by setting this key on the context it passes
/// in [`RenderOptions::context`].
pub fn component_instantiator_key() -> Key<ComponentInstantiator> {
    COMPONENT_INSTANTIATOR.with(Clone::clone)
}

/// The key under which the per-render stack registry is installed.
pub fn stack_registry_key() -> Key<StackRegistry> {
    STACK_REGISTRY.with(Clone::clone)
}

fn default_instantiator(reference: &dyn Any) -> Result<Rc<dyn Component>, Cause> {
    reference
        .downcast_ref::<Rc<dyn Component>>()
        .cloned()
        .ok_or_else(|| Cause::msg("component reference was not registered with any instantiator"))
}

/// Renders `node` to a stream of markup chunks.
///
/// The returned stream owns the whole pipeline: polling it drives the
/// walker and the prefetch scheduler cooperatively on the current task, so
/// it works under any executor that can poll a `!Send` stream.
#[tracing::instrument(level = "trace", skip_all)]
pub fn render_to_stream(node: impl Into<Node>, options: RenderOptions) -> RenderStream {
    let root = Rc::new(node.into());
    let registry = StackRegistry::default();
    let buffer = StreamBuffer::new(registry.clone());

    let ctx = match &options.context {
        Some(supplied) => supplied.fork(),
        None => Context::new(),
    };
    ctx.set(&stack_registry_key(), registry);

    let cache = PrefetchCache::default();
    let prefetch = options.prefetch.then(|| {
        let root = Rc::clone(&root);
        let ctx = ctx.clone();
        let cache = cache.clone();
        async move { prefetch_node(&root, &ctx, &cache).await }.boxed_local()
    });

    let driver = {
        let buffer = buffer.clone();
        let mode = options.mode;
        async move {
            let mut walker = Walker::new(buffer.clone(), mode, cache);
            match walker.walk(&root, &ctx).await {
                Ok(()) => buffer.complete(),
                Err(error) => buffer.fail(error),
            }
        }
        .boxed_local()
    };

    RenderStream {
        buffer,
        driver: Some(driver),
        prefetch,
    }
}

/// Renders `node` to a single string.
#[tracing::instrument(level = "trace", skip_all)]
pub async fn render(node: impl Into<Node>, options: RenderOptions) -> Result<String, RenderError> {
    let mut stream = render_to_stream(node, options);
    let mut out = String::new();
    while let Some(chunk) = stream.next().await {
        out.push_str(&chunk?);
    }
    Ok(out)
}

/// A stream of rendered markup chunks.
///
/// A render failure is yielded as an `Err` item after the chunks that were
/// already finished, and the stream ends.
pub struct RenderStream {
    buffer: StreamBuffer,
    driver: Option<LocalBoxFuture<'static, ()>>,
    prefetch: Option<LocalBoxFuture<'static, ()>>,
}

impl fmt::Debug for RenderStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderStream").finish_non_exhaustive()
    }
}

impl Stream for RenderStream {
    type Item = Result<String, RenderError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.driver.is_some() {
            if let Some(prefetch) = this.prefetch.as_mut() {
                if prefetch.as_mut().poll(cx).is_ready() {
                    this.prefetch = None;
                }
            }
            if let Some(driver) = this.driver.as_mut() {
                if driver.as_mut().poll(cx).is_ready() {
                    this.driver = None;
                    this.prefetch = None;
                }
            }
        }
        this.buffer.poll_chunk(cx)
    }
}
