//! The single-writer, single-reader byte pipe behind a render.
//!
//! The walker appends to a small pending buffer and periodically routes it
//! with [`StreamBuffer::yield_now`]; the consumer pulls finished chunks via
//! [`StreamBuffer::poll_chunk`]. Stacks hook in as a tree of redirect
//! sinks, and the first top-level outlet flips the buffer into deferred
//! mode so that stack content can stream ahead of the rest of the document.

use crate::{
    error::{ContentError, RenderError},
    stack::{SinkChunk, Stack, StackId, StackRegistry},
};
use rustc_hash::FxHashSet;
use std::{
    cell::RefCell,
    collections::VecDeque,
    mem,
    rc::Rc,
    task::{Context as TaskContext, Poll, Waker},
};

#[derive(Clone)]
pub(crate) struct StreamBuffer {
    state: Rc<RefCell<BufferState>>,
}

struct BufferState {
    /// Text accumulated since the last routing decision.
    pending: String,
    /// Chunks ready for the consumer.
    ready: VecDeque<String>,
    registry: StackRegistry,
    /// Active redirect sinks, innermost last.
    redirects: Vec<StackId>,
    /// The sink designated by the first top-level outlet. Once set, the
    /// buffer is in deferred mode.
    first_stack: Option<StackId>,
    /// Chunks held back until `complete` while in deferred mode.
    deferred: Vec<SinkChunk>,
    /// Stacks already drained by an outlet.
    materialized: FxHashSet<StackId>,
    /// Single-slot consumer waker.
    waker: Option<Waker>,
    closed: bool,
    error: Option<RenderError>,
}

impl BufferState {
    /// Routes the pending buffer: into the active sink, straight to the
    /// consumer, or onto the deferred list. Returns a waker to invoke once
    /// the state borrow is released.
    fn route_pending(&mut self) -> Option<Waker> {
        if self.pending.is_empty() {
            return None;
        }
        let chunk = mem::take(&mut self.pending);
        match self.redirects.last().copied() {
            // writes into the first stack's sink stream immediately
            Some(id) if Some(id) == self.first_stack => {
                self.ready.push_back(chunk);
                self.waker.take()
            }
            Some(id) => {
                self.registry.append(id, SinkChunk::Text(chunk));
                None
            }
            None if self.first_stack.is_some() => {
                self.deferred.push(SinkChunk::Text(chunk));
                None
            }
            None => {
                self.ready.push_back(chunk);
                self.waker.take()
            }
        }
    }
}

impl StreamBuffer {
    pub(crate) fn new(registry: StackRegistry) -> Self {
        StreamBuffer {
            state: Rc::new(RefCell::new(BufferState {
                pending: String::new(),
                ready: VecDeque::new(),
                registry,
                redirects: Vec::new(),
                first_stack: None,
                deferred: Vec::new(),
                materialized: FxHashSet::default(),
                waker: None,
                closed: false,
                error: None,
            })),
        }
    }

    /// Appends text to the pending buffer without routing it.
    pub(crate) fn add(&self, text: &str) {
        self.state.borrow_mut().pending.push_str(text);
    }

    /// Routes the pending buffer. Called before every suspension point so
    /// that finished output reaches its destination promptly.
    pub(crate) fn yield_now(&self) {
        let waker = self.state.borrow_mut().route_pending();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Makes `stack`'s sink the write destination. The caller routes the
    /// pending buffer first; everything written until the matching
    /// [`end_redirect`](Self::end_redirect) belongs to the sink.
    pub(crate) fn begin_redirect(&self, stack: &Stack) {
        self.state.borrow_mut().redirects.push(stack.id());
    }

    /// Restores the previous write destination, routing what the redirect
    /// produced into its sink first.
    pub(crate) fn end_redirect(&self) {
        let waker = {
            let mut state = self.state.borrow_mut();
            let waker = state.route_pending();
            state.redirects.pop();
            waker
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Materializes `stack`'s accumulated content at the current location.
    ///
    /// Inside a redirect, the sink is spliced into the enclosing sink by
    /// reference. At the top level, the first outlet designates its stack
    /// as the streaming one — its content flushes immediately and the rest
    /// of the document is deferred until completion; later outlets defer
    /// their sinks alongside it.
    pub(crate) fn emit_redirected_content(&self, stack: &Stack) -> Result<(), ContentError> {
        let waker = {
            let mut state = self.state.borrow_mut();
            if !state.materialized.insert(stack.id()) {
                return Err(ContentError::DuplicateStackOutlet {
                    name: stack.name().to_string(),
                });
            }
            let mut waker = state.route_pending();
            match state.redirects.last().copied() {
                Some(enclosing) => {
                    state
                        .registry
                        .append(enclosing, SinkChunk::Sink(stack.id()));
                }
                None if state.first_stack.is_none() => {
                    state.first_stack = Some(stack.id());
                    let accumulated = state.registry.take(stack.id());
                    let mut flat = String::new();
                    state.registry.flatten_into(accumulated, &mut flat);
                    if !flat.is_empty() {
                        state.ready.push_back(flat);
                        waker = waker.or_else(|| state.waker.take());
                    }
                }
                None => state.deferred.push(SinkChunk::Sink(stack.id())),
            }
            waker
        };
        if let Some(waker) = waker {
            waker.wake();
        }
        Ok(())
    }

    /// Flushes the pending buffer, emits deferred chunks (flattening sink
    /// references), and closes the pipe.
    pub(crate) fn complete(&self) {
        let waker = {
            let mut state = self.state.borrow_mut();
            let mut waker = state.route_pending();
            let deferred = mem::take(&mut state.deferred);
            if !deferred.is_empty() {
                let mut flat = String::new();
                state.registry.flatten_into(deferred, &mut flat);
                if !flat.is_empty() {
                    state.ready.push_back(flat);
                }
            }
            state.closed = true;
            waker = waker.or_else(|| state.waker.take());
            waker
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Records a failure and closes the pipe. The pending buffer is
    /// dropped so no partial tag reaches the consumer; the error is
    /// re-thrown on the consumer's next pull.
    pub(crate) fn fail(&self, error: RenderError) {
        let waker = {
            let mut state = self.state.borrow_mut();
            state.error = Some(error);
            state.closed = true;
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// The consumer side: yields finished chunks, then the recorded error
    /// if any, then the end of the stream.
    pub(crate) fn poll_chunk(
        &self,
        cx: &mut TaskContext<'_>,
    ) -> Poll<Option<Result<String, RenderError>>> {
        let mut state = self.state.borrow_mut();
        if let Some(chunk) = state.ready.pop_front() {
            return Poll::Ready(Some(Ok(chunk)));
        }
        if let Some(error) = state.error.take() {
            return Poll::Ready(Some(Err(error)));
        }
        if state.closed {
            return Poll::Ready(None);
        }
        state.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}
