use serde_json::Value;

use crate::entities::profile::EntityTypeProfile;
use crate::entities::suggestion::SuggestionTriple;
use crate::link::LinkResolver;
use crate::sources::golr::BackendDocument;

/// Reads a display value from a document field.
///
/// Absent and null fields read as `""`. Multi-valued fields contribute their
/// first scalar value.
pub fn field_text(doc: &BackendDocument, field: &str) -> String {
    doc.get(field).map(value_text).unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .find(|v| !matches!(v, Value::Null | Value::Array(_) | Value::Object(_)))
            .map(value_text)
            .unwrap_or_default(),
        Value::Null | Value::Object(_) => String::new(),
    }
}

/// Maps one backend document into its (label, id, link) slot. Never fails.
pub fn map_document(
    doc: &BackendDocument,
    profile: &EntityTypeProfile,
    resolver: &dyn LinkResolver,
) -> SuggestionTriple {
    let id = field_text(doc, profile.id_field);
    let label = field_text(doc, profile.label_field);
    let link = resolver.resolve(&id, profile.link_kind);
    SuggestionTriple { label, id, link }
}
