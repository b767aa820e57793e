//! The decoded map tree.

use std::collections::BTreeMap;

use crate::scalar::ScalarValue;

/// Attribute key holding the text of leaf elements.
pub const INNER_TEXT: &str = "innerText";

/// One node of a map tree.
///
/// Attribute order carries no meaning; child order does.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    pub name: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "BTreeMap::is_empty")
    )]
    pub attributes: BTreeMap<String, ScalarValue>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<Self>,
    /// Map identifier from the file header. Only set on a decoded root.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub package: Option<String>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute with an explicit value.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds an attribute whose type is inferred from `text`.
    #[must_use]
    pub fn with_text_attr(mut self, key: impl Into<String>, text: &str) -> Self {
        self.attributes.insert(key.into(), ScalarValue::infer(text));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the inner text. Empty text is not stored.
    ///
    /// Text of `solids` and `bg` is stored run-length encoded, anything else
    /// as a raw string.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        let value = if wire::uses_rle(&self.name) {
            ScalarValue::RleBlob(text)
        } else {
            ScalarValue::RawString(text)
        };
        self.attributes.insert(INNER_TEXT.to_owned(), value);
        self
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    #[must_use]
    pub fn attr_value(&self, name: &str) -> Option<&ScalarValue> {
        self.attributes.get(name)
    }

    /// Returns the attribute rendered as text, or `default`.
    #[must_use]
    pub fn attr(&self, name: &str, default: &str) -> String {
        self.attributes
            .get(name)
            .map_or_else(|| default.to_owned(), ToString::to_string)
    }

    /// Returns a boolean attribute. Text values are parsed case-insensitively.
    #[must_use]
    pub fn attr_bool(&self, name: &str, default: bool) -> bool {
        match self.attributes.get(name) {
            Some(ScalarValue::Bool(v)) => *v,
            Some(ScalarValue::Byte(v)) => *v != 0,
            Some(other) => match other.as_str().map(str::trim) {
                Some(s) if s.eq_ignore_ascii_case("true") => true,
                Some(s) if s.eq_ignore_ascii_case("false") => false,
                _ => default,
            },
            None => default,
        }
    }

    /// Returns a numeric attribute as `f32`.
    #[must_use]
    pub fn attr_float(&self, name: &str, default: f32) -> f32 {
        self.attributes.get(name).map_or(default, |value| {
            value
                .as_f32()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .unwrap_or(default)
        })
    }

    /// Returns an integer attribute. Floats are truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn attr_int(&self, name: &str, default: i32) -> i32 {
        self.attributes.get(name).map_or(default, |value| match value {
            ScalarValue::Float32(v) if v.is_finite() => *v as i32,
            _ => value
                .as_i32()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .unwrap_or(default),
        })
    }

    /// Returns the first character of a text attribute.
    #[must_use]
    pub fn attr_char(&self, name: &str, default: char) -> char {
        self.attributes
            .get(name)
            .and_then(|value| value.to_string().chars().next())
            .unwrap_or(default)
    }

    /// Returns the first child called `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the text of a leaf element, if any.
    #[must_use]
    pub fn inner_text(&self) -> Option<&str> {
        self.attributes.get(INNER_TEXT).and_then(ScalarValue::as_str)
    }

    /// Counts this element and all of its descendants.
    #[must_use]
    pub fn count_elements(&self) -> usize {
        1 + self.children.iter().map(Self::count_elements).sum::<usize>()
    }
}
