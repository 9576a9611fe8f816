//! Escaping and byte-level attribute serialization.

use crate::{class::ClassValue, error::ContentError, render::RenderMode, style::StyleMap};
use std::borrow::Cow;

/// Escapes text for safe emission: `&`, `<`, `>`, and `"` become their named
/// entities. Single quotes are never escaped.
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Attribute names with on/off semantics in HTML: `true` emits the bare
/// name, `false` omits the attribute entirely. Sorted for binary search.
const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "download",
    "formnovalidate",
    "hidden",
    "inert",
    "ismap",
    "itemscope",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "selected",
];

/// Tags that never have children in HTML and are written without a closing
/// tag. Sorted for binary search.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

pub(crate) fn is_boolean_attribute(name: &str) -> bool {
    BOOLEAN_ATTRIBUTES.binary_search(&name).is_ok()
}

pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.binary_search(&tag).is_ok()
}

/// The value of a single element attribute.
#[derive(Clone, Debug)]
pub enum AttributeValue {
    /// No value; the attribute is omitted.
    None,
    /// A flag. In HTML mode, names in the boolean set emit the bare name
    /// for `true` and nothing for `false`; everywhere else this serializes
    /// as the literal strings `"true"` / `"false"`.
    Bool(bool),
    /// A text value, escaped on write.
    Text(Cow<'static, str>),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// An object-valued `style`, run through the style serializer. The
    /// attribute is omitted when the serialized form is empty.
    Style(StyleMap),
    /// An expression-valued `class`, run through the class serializer. The
    /// attribute is omitted when no tokens remain.
    Class(ClassValue),
    /// A value that can never be written to markup; rendering it fails.
    Opaque(OpaqueValue),
}

/// Attribute payloads that exist in markup trees but have no textual form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpaqueValue {
    /// A still-unresolved future.
    Future,
    /// A function value.
    Function,
    /// An opaque token.
    Token,
}

impl OpaqueValue {
    fn description(&self) -> &'static str {
        match self {
            OpaqueValue::Future => "an unresolved future",
            OpaqueValue::Function => "a function",
            OpaqueValue::Token => "an opaque token",
        }
    }
}

/// Conversion into an [`AttributeValue`], implemented for the primitive and
/// serializer types an attribute can carry.
pub trait IntoAttributeValue {
    /// Performs the conversion.
    fn into_attribute_value(self) -> AttributeValue;
}

impl IntoAttributeValue for AttributeValue {
    fn into_attribute_value(self) -> AttributeValue {
        self
    }
}

impl IntoAttributeValue for &'static str {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Text(Cow::Borrowed(self))
    }
}

impl IntoAttributeValue for String {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Text(Cow::Owned(self))
    }
}

impl IntoAttributeValue for Cow<'static, str> {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Text(self)
    }
}

impl IntoAttributeValue for bool {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Bool(self)
    }
}

impl IntoAttributeValue for i64 {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Int(self)
    }
}

impl IntoAttributeValue for i32 {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Int(self.into())
    }
}

impl IntoAttributeValue for u32 {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Int(self.into())
    }
}

impl IntoAttributeValue for usize {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Int(self as i64)
    }
}

impl IntoAttributeValue for f64 {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Float(self)
    }
}

impl IntoAttributeValue for StyleMap {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Style(self)
    }
}

impl IntoAttributeValue for ClassValue {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Class(self)
    }
}

impl<T> IntoAttributeValue for Option<T>
where
    T: IntoAttributeValue,
{
    fn into_attribute_value(self) -> AttributeValue {
        match self {
            Some(value) => value.into_attribute_value(),
            None => AttributeValue::None,
        }
    }
}

/// Writes ` name="value"` pairs for every attribute, honoring the mode's
/// boolean-attribute rules.
pub(crate) fn write_attributes(
    out: &mut String,
    attributes: &[(Cow<'static, str>, AttributeValue)],
    mode: RenderMode,
) -> Result<(), ContentError> {
    for (name, value) in attributes {
        write_attribute(out, name, value, mode)?;
    }
    Ok(())
}

fn write_attribute(
    out: &mut String,
    name: &str,
    value: &AttributeValue,
    mode: RenderMode,
) -> Result<(), ContentError> {
    match value {
        AttributeValue::None => {}
        AttributeValue::Bool(on) => {
            if mode == RenderMode::Html && is_boolean_attribute(name) {
                if *on {
                    out.push(' ');
                    out.push_str(name);
                }
            } else {
                write_pair(out, name, if *on { "true" } else { "false" });
            }
        }
        AttributeValue::Text(text) => write_pair(out, name, &escape(text)),
        AttributeValue::Int(n) => write_pair(out, name, &n.to_string()),
        AttributeValue::Float(x) => write_pair(out, name, &x.to_string()),
        AttributeValue::Style(map) => {
            let css = map.to_css();
            if !css.is_empty() {
                write_pair(out, name, &escape(&css));
            }
        }
        AttributeValue::Class(value) => {
            let tokens = value.to_tokens();
            if !tokens.is_empty() {
                write_pair(out, name, &escape(&tokens));
            }
        }
        AttributeValue::Opaque(kind) => {
            return Err(ContentError::UnwritableAttribute {
                name: name.to_string(),
                found: kind.description(),
            });
        }
    }
    Ok(())
}

fn write_pair(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(value);
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_replaces_exactly_the_four_entities() {
        assert_eq!(
            escape(r#"I'm a little <teapot> "short" & stout"#),
            "I'm a little &lt;teapot&gt; &quot;short&quot; &amp; stout"
        );
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn boolean_and_void_lookups() {
        assert!(is_boolean_attribute("checked"));
        assert!(is_boolean_attribute("allowfullscreen"));
        assert!(!is_boolean_attribute("type"));
        assert!(is_void_element("br"));
        assert!(is_void_element("input"));
        assert!(!is_void_element("div"));
    }
}
