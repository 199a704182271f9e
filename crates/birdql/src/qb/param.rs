//! Placeholder allocation shared across a statement and its subqueries.

use crate::config::BuildOptions;
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered placeholder → value mapping produced by a build.
///
/// Serializes as a JSON object whose keys keep allocation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value bound to a placeholder such as `"$0"`.
    pub fn get(&self, placeholder: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == placeholder)
            .map(|(_, value)| value)
    }

    /// Iterate `(placeholder, value)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Values in allocation order, for positional engines.
    pub fn values(&self) -> Vec<&Value> {
        self.entries.iter().map(|(_, value)| value).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Placeholder counter plus the values bound so far.
///
/// One context is threaded through the whole build of a top-level statement.
/// Subqueries render against the same context, so numbering stays unique and
/// sequential across nesting levels.
#[derive(Debug, Clone, Default)]
pub struct ParamContext {
    // wide enough that any `usize` start plus every bound value fits
    next: u128,
    params: Params,
    options: BuildOptions,
}

impl ParamContext {
    /// Create a context with default options (placeholders start at `$0`).
    pub fn new() -> Self {
        Self::with_options(BuildOptions::default())
    }

    /// Create a context with explicit options.
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            next: options.first_placeholder as u128,
            params: Params::new(),
            options,
        }
    }

    /// Bind a value and return its placeholder name.
    pub fn add_parameter(&mut self, value: impl Into<Value>) -> String {
        let name = format!("${}", self.next);
        self.next += 1;
        self.params.entries.push((name.clone(), value.into()));
        name
    }

    /// Bind a value under a caller-chosen name; the counter is not advanced.
    pub(crate) fn bind_named(&mut self, name: &str, value: Value) {
        self.params.entries.push((name.to_string(), value));
    }

    /// Values bound so far.
    pub fn parameters(&self) -> &Params {
        &self.params
    }

    /// Consume the context and return its values.
    pub fn into_parameters(self) -> Params {
        self.params
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Number of values bound so far.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_sequential_from_zero() {
        let mut ctx = ParamContext::new();
        assert_eq!(ctx.add_parameter("x"), "$0");
        assert_eq!(ctx.add_parameter(5), "$1");
        assert_eq!(ctx.parameters().get("$0"), Some(&Value::from("x")));
        assert_eq!(ctx.parameters().get("$1"), Some(&Value::Int(5)));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn first_placeholder_is_configurable() {
        let mut ctx = ParamContext::with_options(BuildOptions::new().first_placeholder(1));
        assert_eq!(ctx.add_parameter(true), "$1");
        assert_eq!(ctx.add_parameter(false), "$2");
    }

    #[test]
    fn largest_first_placeholder_keeps_numbering_unique() {
        let options: BuildOptions =
            serde_json::from_value(serde_json::json!({ "first_placeholder": usize::MAX })).unwrap();
        let mut ctx = ParamContext::with_options(options);
        assert_eq!(ctx.add_parameter(1), format!("${}", usize::MAX));
        assert_eq!(ctx.add_parameter(2), format!("${}", usize::MAX as u128 + 1));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn serializes_in_allocation_order() {
        let mut ctx = ParamContext::new();
        for v in 0..12 {
            ctx.add_parameter(v);
        }
        let json = serde_json::to_string(ctx.parameters()).unwrap();
        assert!(json.starts_with(r#"{"$0":0,"$1":1,"$2":2"#));
        assert!(json.ends_with(r#""$10":10,"$11":11}"#));
    }
}
