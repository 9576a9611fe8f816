//! Serialization of object-valued `style` attributes.

use indexmap::IndexMap;
use itertools::Itertools;
use std::borrow::Cow;

/// An ordered mapping of CSS properties, serialized to the `style` attribute.
///
/// Property names may be written camel-cased (`backgroundColor`), already
/// hyphenated (`background-color`), or as custom properties (`--accent`);
/// they are normalized on serialization. Bare numbers receive a `px` suffix
/// unless the property is one of the unitless set.
#[derive(Clone, Debug, Default)]
pub struct StyleMap {
    properties: IndexMap<Cow<'static, str>, StyleValue>,
}

impl StyleMap {
    /// Creates an empty style map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, replacing any previous value for the same name.
    pub fn set(
        mut self,
        property: impl Into<Cow<'static, str>>,
        value: impl Into<StyleValue>,
    ) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    /// Serializes to `prop:value;prop:value` form. Properties with no value
    /// are skipped; an empty result means the attribute should be omitted.
    pub(crate) fn to_css(&self) -> String {
        self.properties
            .iter()
            .filter_map(|(property, value)| {
                let name = css_property_name(property);
                let value = match value {
                    StyleValue::None => return None,
                    StyleValue::Text(text) => text.to_string(),
                    StyleValue::Int(n) if needs_px(&name) => format!("{n}px"),
                    StyleValue::Int(n) => n.to_string(),
                    StyleValue::Float(x) if needs_px(&name) => format!("{x}px"),
                    StyleValue::Float(x) => x.to_string(),
                };
                Some(format!("{name}:{value}"))
            })
            .join(";")
    }
}

/// The value of a single CSS property.
#[derive(Clone, Debug)]
pub enum StyleValue {
    /// No value; the property is skipped.
    None,
    /// A literal CSS value, written as-is.
    Text(Cow<'static, str>),
    /// A number, suffixed with `px` unless the property is unitless.
    Int(i64),
    /// A number, suffixed with `px` unless the property is unitless.
    Float(f64),
}

impl From<&'static str> for StyleValue {
    fn from(value: &'static str) -> Self {
        StyleValue::Text(Cow::Borrowed(value))
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(Cow::Owned(value))
    }
}

impl From<i64> for StyleValue {
    fn from(value: i64) -> Self {
        StyleValue::Int(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Int(value.into())
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Float(value)
    }
}

impl<T> From<Option<T>> for StyleValue
where
    T: Into<StyleValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(StyleValue::None)
    }
}

/// Normalizes a property name to its CSS form.
///
/// Custom properties (`--x`) and names that are already hyphenated or fully
/// lowercase pass through verbatim. Otherwise capitals become `-` plus the
/// lowercase letter, and a leading vendor prefix gains a leading `-`.
fn css_property_name(property: &str) -> Cow<'_, str> {
    if property.starts_with("--")
        || property.contains('-')
        || !property.bytes().any(|b| b.is_ascii_uppercase())
    {
        return Cow::Borrowed(property);
    }
    let mut name = String::with_capacity(property.len() + 4);
    if has_vendor_prefix(property) {
        name.push('-');
    }
    for (i, ch) in property.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                name.push('-');
            }
            name.push(ch.to_ascii_lowercase());
        } else {
            name.push(ch);
        }
    }
    Cow::Owned(name)
}

fn has_vendor_prefix(property: &str) -> bool {
    ["Webkit", "Moz", "Ms", "O"].iter().any(|prefix| {
        property
            .strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_uppercase())
    })
}

/// Whether a bare number for this property takes a `px` suffix.
fn needs_px(name: &str) -> bool {
    const UNITLESS: &[&str] = &[
        "animation-iteration-count",
        "aspect-ratio",
        "fill-opacity",
        "flood-opacity",
        "font-weight",
        "line-height",
        "opacity",
        "order",
        "orphans",
        "scale",
        "stop-opacity",
        "widows",
        "z-index",
    ];
    const UNITLESS_FAMILIES: &[&str] = &["flex", "grid-column", "grid-row", "stroke"];

    let name = ["-webkit-", "-moz-", "-ms-", "-o-"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name);
    !(UNITLESS.contains(&name)
        || UNITLESS_FAMILIES
            .iter()
            .any(|family| name.starts_with(family)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_is_hyphenated() {
        assert_eq!(css_property_name("backgroundColor"), "background-color");
        assert_eq!(css_property_name("fontSize"), "font-size");
    }

    #[test]
    fn hyphenated_and_lowercase_names_pass_through() {
        assert_eq!(css_property_name("background-color"), "background-color");
        assert_eq!(css_property_name("color"), "color");
    }

    #[test]
    fn custom_properties_pass_through() {
        assert_eq!(css_property_name("--accent"), "--accent");
        assert_eq!(css_property_name("--myVar"), "--myVar");
    }

    #[test]
    fn vendor_prefixes_gain_a_leading_dash() {
        assert_eq!(css_property_name("WebkitTransform"), "-webkit-transform");
        assert_eq!(css_property_name("MozAppearance"), "-moz-appearance");
        assert_eq!(css_property_name("MsFilter"), "-ms-filter");
        assert_eq!(css_property_name("OTransition"), "-o-transition");
        // a leading capital that is not a vendor prefix stays dashless
        assert_eq!(css_property_name("Color"), "color");
    }

    #[test]
    fn numbers_take_px_unless_unitless() {
        let css = StyleMap::new()
            .set("fontSize", 16)
            .set("opacity", 0.5)
            .set("zIndex", 10)
            .set("flexGrow", 2)
            .set("gridRowStart", 3)
            .set("strokeWidth", 4)
            .set("WebkitLineHeight", 2)
            .to_css();
        assert_eq!(
            css,
            "font-size:16px;opacity:0.5;z-index:10;flex-grow:2;grid-row-start:3;\
             stroke-width:4;-webkit-line-height:2"
        );
    }

    #[test]
    fn none_values_are_skipped() {
        let css = StyleMap::new()
            .set("color", "red")
            .set("margin", StyleValue::None)
            .set("padding", Option::<i64>::None)
            .to_css();
        assert_eq!(css, "color:red");
    }

    #[test]
    fn empty_map_serializes_to_nothing() {
        assert_eq!(StyleMap::new().to_css(), "");
    }

    #[test]
    fn float_values_print_without_trailing_zeroes() {
        let css = StyleMap::new().set("width", 16.0).set("opacity", 0.25).to_css();
        assert_eq!(css, "width:16px;opacity:0.25");
    }
}
