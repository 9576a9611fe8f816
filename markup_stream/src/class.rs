//! Serialization of expression-valued `class` attributes.

use itertools::Itertools;
use std::borrow::Cow;

/// A `class` attribute expression: text, numbers, nested lists, and toggle
/// maps, flattened to a space-separated token list.
///
/// Falsy contributions — empty strings, zero, NaN, `false` toggles — are
/// skipped. Tokens are not deduplicated.
#[derive(Clone, Debug)]
pub enum ClassValue {
    /// No contribution.
    None,
    /// Booleans contribute nothing by themselves; only toggle maps turn
    /// them into class names.
    Bool(bool),
    /// A literal token (or several, if the text contains spaces).
    Text(Cow<'static, str>),
    /// A number, coerced to its decimal form. Zero is skipped.
    Int(i64),
    /// A number, coerced to its decimal form. Zero and NaN are skipped.
    Float(f64),
    /// A nested list, flattened in order.
    List(Vec<ClassValue>),
    /// Named toggles: each name is emitted when its flag is set.
    Toggles(Vec<(Cow<'static, str>, bool)>),
}

impl ClassValue {
    /// Builds a nested list value.
    pub fn list(values: impl IntoIterator<Item = ClassValue>) -> Self {
        ClassValue::List(values.into_iter().collect())
    }

    /// Builds a toggle-map value.
    pub fn toggles(
        toggles: impl IntoIterator<Item = (Cow<'static, str>, bool)>,
    ) -> Self {
        ClassValue::Toggles(toggles.into_iter().collect())
    }

    /// Flattens to the space-separated token list. An empty result means
    /// the attribute should be omitted.
    pub(crate) fn to_tokens(&self) -> String {
        let mut tokens = Vec::new();
        self.collect(&mut tokens);
        tokens.iter().join(" ")
    }

    fn collect(&self, tokens: &mut Vec<String>) {
        match self {
            ClassValue::None | ClassValue::Bool(_) => {}
            ClassValue::Text(text) => {
                if !text.is_empty() {
                    tokens.push(text.to_string());
                }
            }
            ClassValue::Int(n) => {
                if *n != 0 {
                    tokens.push(n.to_string());
                }
            }
            ClassValue::Float(x) => {
                if *x != 0.0 && !x.is_nan() {
                    tokens.push(x.to_string());
                }
            }
            ClassValue::List(values) => {
                for value in values {
                    value.collect(tokens);
                }
            }
            ClassValue::Toggles(toggles) => {
                for (name, on) in toggles {
                    if *on && !name.is_empty() {
                        tokens.push(name.to_string());
                    }
                }
            }
        }
    }
}

impl From<&'static str> for ClassValue {
    fn from(value: &'static str) -> Self {
        ClassValue::Text(Cow::Borrowed(value))
    }
}

impl From<String> for ClassValue {
    fn from(value: String) -> Self {
        ClassValue::Text(Cow::Owned(value))
    }
}

impl From<i64> for ClassValue {
    fn from(value: i64) -> Self {
        ClassValue::Int(value)
    }
}

impl From<Vec<ClassValue>> for ClassValue {
    fn from(values: Vec<ClassValue>) -> Self {
        ClassValue::List(values)
    }
}

impl<T> From<Option<T>> for ClassValue
where
    T: Into<ClassValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ClassValue::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_lists_flatten_in_order() {
        let value = ClassValue::list([
            "btn".into(),
            ClassValue::list(["btn-primary".into(), ClassValue::Int(2)]),
            "active".into(),
        ]);
        assert_eq!(value.to_tokens(), "btn btn-primary 2 active");
    }

    #[test]
    fn toggles_emit_only_set_names() {
        let value = ClassValue::toggles([
            ("visible".into(), true),
            ("hidden".into(), false),
            ("focused".into(), true),
        ]);
        assert_eq!(value.to_tokens(), "visible focused");
    }

    #[test]
    fn falsy_contributions_are_skipped() {
        let value = ClassValue::list([
            ClassValue::None,
            ClassValue::Bool(true),
            ClassValue::Bool(false),
            ClassValue::Text("".into()),
            ClassValue::Int(0),
            ClassValue::Float(f64::NAN),
            "kept".into(),
        ]);
        assert_eq!(value.to_tokens(), "kept");
    }

    #[test]
    fn tokens_are_not_deduplicated() {
        let value = ClassValue::list(["a".into(), "a".into()]);
        assert_eq!(value.to_tokens(), "a a");
    }
}
