#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! A streaming, context-propagating server-side markup renderer.
//!
//! A declarative tree of [`Node`]s renders to an HTML or XML byte stream in
//! document order. Content functions receive a forked [`Context`] so state
//! flows down the tree without threading it through every call; pending
//! futures suspend only the part of the document that needs them, and a
//! prefetch pass starts every content function early so data loading
//! overlaps with emission. [`once`]-keys deduplicate shared blocks, and
//! [`Stack`]s teleport content (scripts, `<head>` tags) to an outlet
//! elsewhere in the document while preserving the order producers were
//! visited in.
//!
//! ```
//! use markup_stream::{render, ElementNode, RenderOptions};
//!
//! # futures::executor::block_on(async {
//! let view = ElementNode::new("p")
//!     .attr("class", "greeting")
//!     .child("Hello, world!");
//! let html = render(view, RenderOptions::default()).await.unwrap();
//! assert_eq!(html, r#"<p class="greeting">Hello, world!</p>"#);
//! # });
//! ```

mod attribute;
mod class;
mod error;
mod node;
mod once;
mod prefetch;
mod render;
mod response;
mod stack;
mod stream_buffer;
mod style;
mod walker;

pub use attribute::{AttributeValue, IntoAttributeValue, OpaqueValue};
pub use class::ClassValue;
pub use error::{Cause, ContentError, ErrorKind, RenderError};
pub use node::{
    Component, ComponentInstantiator, ComponentNode, DeferredFn, DeferredNode, ElementNode,
    ForeignNode, IntoRendered, Node, NodeFuture, PendingNode, Rendered,
};
pub use once::{once, OnceKey, OnceNode};
pub use render::{
    component_instantiator_key, render, render_to_stream, stack_registry_key, RenderMode,
    RenderOptions, RenderStream,
};
pub use response::{render_to_response, ResponseBody, ResponseOptions};
pub use stack::{Stack, StackId, StackOutNode, StackPushNode, StackRegistry};
pub use style::{StyleMap, StyleValue};

pub use render_context::{create_key, Context, Key};
