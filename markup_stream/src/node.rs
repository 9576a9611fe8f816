//! The markup node model.
//!
//! A [`Node`] is a tagged sum over everything the walker knows how to emit:
//! primitives, raw content, elements, sequences, deferred and pending
//! content, once-markers, stack markers, and two catch-alls (foreign
//! elements and displayable values). Nodes are immutable and cheap to
//! clone; interior collections are reference-counted.

use crate::{
    attribute::{AttributeValue, IntoAttributeValue},
    error::Cause,
    once::OnceNode,
    stack::{StackOutNode, StackPushNode},
};
use futures::{
    future::{LocalBoxFuture, Shared},
    FutureExt,
};
use render_context::Context;
use smallvec::SmallVec;
use std::{any::Any, borrow::Cow, fmt, future::Future, rc::Rc};

/// A boxed future resolving to a node, or failing with a cause.
pub type NodeFuture = LocalBoxFuture<'static, Result<Node, Cause>>;

/// A [`NodeFuture`] that can be awaited from several places; the prefetch
/// scheduler and the walker share one resolution.
pub(crate) type SharedNodeFuture = Shared<NodeFuture>;

/// A content function: receives a forked context, returns content that is
/// ready now or later.
pub type DeferredFn = Rc<dyn Fn(Context) -> Result<Rendered, Cause>>;

/// The callback that turns an opaque component reference into a live
/// instance. Installed in the root context under
/// [`component_instantiator_key`](crate::component_instantiator_key), where
/// an IoC container can replace it.
pub type ComponentInstantiator = Rc<dyn Fn(&dyn Any) -> Result<Rc<dyn Component>, Cause>>;

/// One node of a markup tree.
#[derive(Clone)]
pub enum Node {
    /// Nothing; renders no output.
    Unit,
    /// Booleans render no output.
    Bool(bool),
    /// Text, escaped on emission.
    Text(Cow<'static, str>),
    /// An integer, emitted in decimal form.
    Int(i64),
    /// A floating-point number, emitted in decimal form.
    Float(f64),
    /// Verbatim markup, emitted without escaping.
    Raw(Cow<'static, str>),
    /// An ordered list of nodes.
    Sequence(Rc<Vec<Node>>),
    /// An element (or, with no tag, a fragment).
    Element(Rc<ElementNode>),
    /// A content function, evaluated with a forked context.
    Deferred(DeferredNode),
    /// A class-based component, instantiated through the container callback.
    Component(Rc<ComponentNode>),
    /// Content that resolves later.
    Pending(PendingNode),
    /// Content that renders the first time its key is seen.
    Once(Rc<OnceNode>),
    /// Content redirected into a stack's sink.
    StackPush(Rc<StackPushNode>),
    /// The location where a stack's accumulated content materializes.
    StackOut(StackOutNode),
    /// An element built by a foreign framework; rendering it fails.
    Foreign(Rc<ForeignNode>),
    /// Any displayable value, emitted escaped.
    Dynamic(Rc<dyn fmt::Display>),
}

impl Node {
    /// A text node.
    pub fn text(text: impl Into<Cow<'static, str>>) -> Node {
        Node::Text(text.into())
    }

    /// Verbatim markup that bypasses escaping. The caller vouches for it.
    pub fn raw(markup: impl Into<Cow<'static, str>>) -> Node {
        Node::Raw(markup.into())
    }

    /// An ordered sequence of nodes.
    pub fn sequence(nodes: impl IntoIterator<Item = Node>) -> Node {
        Node::Sequence(Rc::new(nodes.into_iter().collect()))
    }

    /// A content function returning ready or pending content. See
    /// [`DeferredNode::new`] for the fallible form.
    pub fn from_fn<F, R>(f: F) -> Node
    where
        F: Fn(Context) -> R + 'static,
        R: IntoRendered,
    {
        DeferredNode::new(move |ctx| Ok(f(ctx).into_rendered())).into()
    }

    /// A node that resolves later.
    pub fn pending<F, N>(future: F) -> Node
    where
        F: Future<Output = N> + 'static,
        N: Into<Node>,
    {
        Node::Pending(PendingNode {
            future: future
                .map(|node| Ok(node.into()))
                .boxed_local()
                .shared(),
        })
    }

    /// A node that resolves later and may fail; the failure surfaces as a
    /// `content-promise-error`.
    pub fn try_pending<F, N>(future: F) -> Node
    where
        F: Future<Output = Result<N, Cause>> + 'static,
        N: Into<Node>,
    {
        Node::Pending(PendingNode {
            future: future
                .map(|result| result.map(Into::into))
                .boxed_local()
                .shared(),
        })
    }

    /// Any displayable value, rendered escaped.
    pub fn dynamic(value: impl fmt::Display + 'static) -> Node {
        Node::Dynamic(Rc::new(value))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Unit => f.write_str("Unit"),
            Node::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Node::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Node::Raw(markup) => f.debug_tuple("Raw").field(markup).finish(),
            Node::Sequence(children) => {
                f.debug_tuple("Sequence").field(children).finish()
            }
            Node::Element(el) => fmt::Debug::fmt(el, f),
            Node::Deferred(deferred) => f
                .debug_tuple("Deferred")
                .field(&deferred.display_name)
                .finish(),
            Node::Component(component) => f
                .debug_tuple("Component")
                .field(&component.display_name)
                .finish(),
            Node::Pending(_) => f.write_str("Pending(..)"),
            Node::Once(once) => f.debug_tuple("Once").field(&once.key).finish(),
            Node::StackPush(push) => {
                f.debug_tuple("StackPush").field(&push.stack.name()).finish()
            }
            Node::StackOut(out) => {
                f.debug_tuple("StackOut").field(&out.stack.name()).finish()
            }
            Node::Foreign(foreign) => {
                f.debug_tuple("Foreign").field(&foreign.marker).finish()
            }
            Node::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&'static str> for Node {
    fn from(value: &'static str) -> Self {
        Node::Text(Cow::Borrowed(value))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(Cow::Owned(value))
    }
}

impl From<Cow<'static, str>> for Node {
    fn from(value: Cow<'static, str>) -> Self {
        Node::Text(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Int(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Int(value.into())
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Self {
        Node::Int(value.into())
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<()> for Node {
    fn from(_: ()) -> Self {
        Node::Unit
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Sequence(Rc::new(value))
    }
}

impl<T> From<Option<T>> for Node
where
    T: Into<Node>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Node::Unit)
    }
}

/// An element: a tag (or none, for a fragment), attributes in insertion
/// order, content, and a display name used in error component stacks.
#[derive(Clone, Debug)]
pub struct ElementNode {
    pub(crate) tag: Option<Cow<'static, str>>,
    pub(crate) attributes: SmallVec<[(Cow<'static, str>, AttributeValue); 4]>,
    pub(crate) content: Vec<Node>,
    pub(crate) display_name: Option<Cow<'static, str>>,
}

impl ElementNode {
    /// An element with the given tag. The display name defaults to the tag.
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        let tag = tag.into();
        ElementNode {
            display_name: Some(tag.clone()),
            tag: Some(tag),
            attributes: SmallVec::new(),
            content: Vec::new(),
        }
    }

    /// A fragment: children with no enclosing tag.
    pub fn fragment() -> Self {
        ElementNode {
            tag: None,
            attributes: SmallVec::new(),
            content: Vec::new(),
            display_name: None,
        }
    }

    /// Adds an attribute.
    pub fn attr(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl IntoAttributeValue,
    ) -> Self {
        self.attributes
            .push((name.into(), value.into_attribute_value()));
        self
    }

    /// Appends a child node.
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.content.push(node.into());
        self
    }

    /// Appends several child nodes.
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.content.extend(nodes);
        self
    }

    /// Overrides the display name used in error component stacks.
    pub fn display_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

impl From<ElementNode> for Node {
    fn from(value: ElementNode) -> Self {
        Node::Element(Rc::new(value))
    }
}

/// A content function plus an optional display name.
///
/// The function's identity (the allocation behind the `Rc`) keys the
/// prefetch cache, so cloning the node shares one cache entry.
#[derive(Clone)]
pub struct DeferredNode {
    pub(crate) func: DeferredFn,
    pub(crate) display_name: Option<Cow<'static, str>>,
}

impl DeferredNode {
    /// Wraps a fallible content function.
    pub fn new(f: impl Fn(Context) -> Result<Rendered, Cause> + 'static) -> Self {
        DeferredNode {
            func: Rc::new(f),
            display_name: None,
        }
    }

    /// Attaches a display name, pushed onto the component stack while the
    /// function's content renders.
    pub fn with_display_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.func) as *const () as usize
    }
}

impl From<DeferredNode> for Node {
    fn from(value: DeferredNode) -> Self {
        Node::Deferred(value)
    }
}

/// A class-based view component.
///
/// Implementations are instantiated by the container callback in the root
/// context and then behave like a content function.
pub trait Component {
    /// Produces this component's content under the given context.
    fn render(&self, ctx: Context) -> Result<Rendered, Cause>;
}

/// A reference to a class-based component, resolved at render time through
/// the instantiator callback.
pub struct ComponentNode {
    pub(crate) display_name: Cow<'static, str>,
    pub(crate) reference: Rc<dyn Any>,
}

impl ComponentNode {
    /// A component reference the instantiator knows how to resolve:
    /// `reference` typically carries a registered component type plus its
    /// props.
    pub fn new(display_name: impl Into<Cow<'static, str>>, reference: Rc<dyn Any>) -> Self {
        ComponentNode {
            display_name: display_name.into(),
            reference,
        }
    }

    /// Wraps an already-constructed instance; the default instantiator
    /// resolves it without a container. The display name is taken from the
    /// component's type name.
    pub fn from_instance<C>(instance: Rc<C>) -> Self
    where
        C: Component + 'static,
    {
        let display_name = std::any::type_name::<C>()
            .rsplit("::")
            .next()
            .unwrap_or("Component");
        let instance: Rc<dyn Component> = instance;
        ComponentNode {
            display_name: Cow::Borrowed(display_name),
            reference: Rc::new(instance),
        }
    }
}

impl From<ComponentNode> for Node {
    fn from(value: ComponentNode) -> Self {
        Node::Component(Rc::new(value))
    }
}

/// A node that resolves later.
#[derive(Clone)]
pub struct PendingNode {
    pub(crate) future: SharedNodeFuture,
}

/// An element produced by a different framework's factory, carrying its
/// type marker for diagnostics. The walker rejects it as `invalid-content`.
#[derive(Clone, Debug)]
pub struct ForeignNode {
    pub(crate) marker: Cow<'static, str>,
}

impl ForeignNode {
    /// Records a foreign element with the given type marker.
    pub fn new(marker: impl Into<Cow<'static, str>>) -> Self {
        ForeignNode {
            marker: marker.into(),
        }
    }
}

impl From<ForeignNode> for Node {
    fn from(value: ForeignNode) -> Self {
        Node::Foreign(Rc::new(value))
    }
}

/// The outcome of a content function: ready content, or content that
/// resolves later.
pub enum Rendered {
    /// Content that is ready immediately.
    Node(Node),
    /// Content that resolves later; a failure surfaces as a
    /// `content-function-promise-rejection`.
    Future(NodeFuture),
}

impl Rendered {
    /// Ready content.
    pub fn ready(node: impl Into<Node>) -> Self {
        Rendered::Node(node.into())
    }

    /// Content produced by a future.
    pub fn later<F, N>(future: F) -> Self
    where
        F: Future<Output = N> + 'static,
        N: Into<Node>,
    {
        Rendered::Future(future.map(|node| Ok(node.into())).boxed_local())
    }

    /// Content produced by a fallible future.
    pub fn try_later<F, N>(future: F) -> Self
    where
        F: Future<Output = Result<N, Cause>> + 'static,
        N: Into<Node>,
    {
        Rendered::Future(future.map(|result| result.map(Into::into)).boxed_local())
    }
}

/// Conversion into [`Rendered`], for the return position of content
/// functions.
pub trait IntoRendered {
    /// Performs the conversion.
    fn into_rendered(self) -> Rendered;
}

impl IntoRendered for Rendered {
    fn into_rendered(self) -> Rendered {
        self
    }
}

impl IntoRendered for Node {
    fn into_rendered(self) -> Rendered {
        Rendered::Node(self)
    }
}

impl IntoRendered for ElementNode {
    fn into_rendered(self) -> Rendered {
        Rendered::Node(self.into())
    }
}

impl IntoRendered for &'static str {
    fn into_rendered(self) -> Rendered {
        Rendered::Node(self.into())
    }
}

impl IntoRendered for String {
    fn into_rendered(self) -> Rendered {
        Rendered::Node(self.into())
    }
}

impl IntoRendered for Vec<Node> {
    fn into_rendered(self) -> Rendered {
        Rendered::Node(self.into())
    }
}
