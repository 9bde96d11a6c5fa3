//! Dotted-path navigation over parsed YAML.
//!
//! Only the handful of shapes the ApplicationSet resolver needs: dotted
//! lookups with numeric sequence indexes, and first-match selection over the
//! template's source entries.

use serde_yaml::Value;

/// Look up a dotted path, treating numeric segments as sequence indexes.
///
/// `scalar_at(doc, "spec.generators.0.clusters.values.targetRevision")`
/// returns the first matching scalar rendered as a string, or `None` when the
/// path is absent or lands on a non-scalar.
pub fn scalar_at(doc: &Value, path: &str) -> Option<String> {
    scalar_string(value_at(doc, path)?)
}

/// Walk a dotted path and return the value it lands on.
pub fn value_at<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = match current {
            Value::Mapping(map) => map.get(Value::String(segment.to_string()))?,
            Value::Sequence(seq) => seq.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a scalar value as a string; `None` for mappings, sequences and null.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Source entries of the manifest's template spec, in document order.
///
/// Handles both the `sources` list form and the singular `source` form; the
/// singular form is returned as a one-element slice-equivalent.
pub fn template_sources(doc: &Value) -> Vec<&Value> {
    if let Some(Value::Sequence(seq)) = value_at(doc, "spec.template.spec.sources") {
        return seq.iter().collect();
    }
    if let Some(source) = value_at(doc, "spec.template.spec.source") {
        return vec![source];
    }
    Vec::new()
}

/// First source entry whose `field` is a non-null scalar, in document order.
pub fn first_source_with<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    template_sources(doc).into_iter().find(|source| {
        value_at(source, field)
            .map(|v| scalar_string(v).is_some())
            .unwrap_or(false)
    })
}
