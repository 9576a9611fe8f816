//! The renderer's error taxonomy.
//!
//! Everything that can go wrong during a render surfaces as a single
//! [`RenderError`] carrying an [`ErrorKind`] discriminant, the component
//! stack at the failure site, and the original cause.

use itertools::Itertools;
use std::{borrow::Cow, error, fmt, rc::Rc};
use thiserror::Error;

/// A cloneable wrapper for any error raised by user content.
///
/// Content functions and pending nodes report failures as a `Cause`; the
/// renderer attaches it to the [`RenderError`] it raises. Any error type
/// converts into it, and ad-hoc message causes can be built with
/// [`Cause::msg`].
#[derive(Clone)]
pub struct Cause(Rc<dyn error::Error>);

impl Cause {
    /// Wraps a message string as a cause.
    pub fn msg(message: impl Into<String>) -> Self {
        Cause(Rc::new(Message(message.into())))
    }

    /// The wrapped error.
    pub fn inner(&self) -> &(dyn error::Error + 'static) {
        &*self.0
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<T> From<T> for Cause
where
    T: error::Error + 'static,
{
    fn from(value: T) -> Self {
        Cause(Rc::new(value))
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

/// Descriptive errors the renderer raises about the markup itself, attached
/// to a [`RenderError`] as its cause.
#[derive(Debug, Clone, Error)]
pub enum ContentError {
    /// An attribute held a value that can never be written to markup.
    #[error("attribute `{name}` holds {found} value, which cannot be written to markup")]
    UnwritableAttribute {
        /// The attribute name.
        name: String,
        /// A short description of the offending value.
        found: &'static str,
    },
    /// A void element was given children.
    #[error("void element `<{tag}>` cannot have children")]
    VoidElementWithChildren {
        /// The element's tag.
        tag: String,
    },
    /// An element built by a foreign framework was embedded in the tree.
    #[error("cannot render an element created by a foreign framework ({marker})")]
    ForeignElement {
        /// The foreign framework's type marker.
        marker: String,
    },
    /// A stack was drained by more than one outlet in the same render.
    #[error("stack `{name}` was already written out by another outlet")]
    DuplicateStackOutlet {
        /// The stack's diagnostic name.
        name: String,
    },
}

/// Discriminates what went wrong during a render.
///
/// The [`Display`](fmt::Display) form of each kind is a stable kebab-case
/// name suitable for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A content function failed synchronously.
    ContentFunction,
    /// The future returned by a content function failed.
    ContentFunctionPromise,
    /// A pending node's future failed.
    ContentPromise,
    /// An attribute could not be serialized, or a void element had children.
    AttributeType,
    /// The tree contained content the renderer refuses to emit.
    InvalidContent,
}

impl ErrorKind {
    /// The stable kebab-case name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ContentFunction => "content-function-error",
            ErrorKind::ContentFunctionPromise => "content-function-promise-rejection",
            ErrorKind::ContentPromise => "content-promise-error",
            ErrorKind::AttributeType => "attribute-type-error",
            ErrorKind::InvalidContent => "invalid-content",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error type surfaced by every render entry point.
#[derive(Debug, Clone)]
pub struct RenderError {
    kind: ErrorKind,
    component_stack: Vec<Cow<'static, str>>,
    cause: Cause,
}

impl RenderError {
    pub(crate) fn new(
        kind: ErrorKind,
        component_stack: Vec<Cow<'static, str>>,
        cause: Cause,
    ) -> Self {
        RenderError {
            kind,
            component_stack,
            cause,
        }
    }

    /// What kind of failure this is.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The display names of the components enclosing the failure site,
    /// outermost first.
    pub fn component_stack(&self) -> &[Cow<'static, str>] {
        &self.component_stack
    }

    /// The original cause.
    pub fn cause(&self) -> &Cause {
        &self.cause
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.component_stack.is_empty() {
            write!(f, "{}: {}", self.kind, self.cause)
        } else {
            write!(
                f,
                "{} in <{}>: {}",
                self.kind,
                self.component_stack.iter().join("> <"),
                self.cause
            )
        }
    }
}

impl error::Error for RenderError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(self.cause.inner())
    }
}
