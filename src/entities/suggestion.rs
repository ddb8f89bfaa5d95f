use serde::Serialize;
use serde::ser::{SerializeTuple, Serializer};

/// One inbound suggestion call, owned by the handler that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub raw_query: Option<String>,
    pub entity_type: String,
}

impl SuggestionRequest {
    pub fn new(entity_type: impl Into<String>, raw_query: Option<&str>) -> Self {
        Self {
            raw_query: raw_query.map(str::to_string),
            entity_type: entity_type.into(),
        }
    }

    pub fn normalized_query(&self) -> String {
        normalize_query(self.raw_query.as_deref())
    }
}

/// Decodes a raw, still percent-encoded path segment into the query term.
///
/// Absent and empty segments become `""`; an empty query is still a valid
/// suggestion request. Malformed UTF-8 is decoded lossily. Whitespace is kept
/// so the echoed query matches what the user typed.
pub fn normalize_query(raw_path_segment: Option<&str>) -> String {
    let Some(raw) = raw_path_segment.filter(|v| !v.is_empty()) else {
        return String::new();
    };
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    String::from_utf8_lossy(&decoded).into_owned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionTriple {
    pub label: String,
    pub id: String,
    pub link: String,
}

/// OpenSearch suggestions payload.
///
/// Serializes as `[query, labels, ids, links]`. The three sequences always
/// have the same length and index `i` of each comes from backend document `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionResponse {
    pub query: String,
    pub labels: Vec<String>,
    pub ids: Vec<String>,
    pub links: Vec<String>,
}

impl SuggestionResponse {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Serialize for SuggestionResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.query)?;
        tuple.serialize_element(&self.labels)?;
        tuple.serialize_element(&self.ids)?;
        tuple.serialize_element(&self.links)?;
        tuple.end()
    }
}

pub fn aggregate<I>(query: impl Into<String>, mapped: I) -> SuggestionResponse
where
    I: IntoIterator<Item = SuggestionTriple>,
{
    let mapped = mapped.into_iter();
    let (lower, _) = mapped.size_hint();
    let mut out = SuggestionResponse {
        query: query.into(),
        labels: Vec::with_capacity(lower),
        ids: Vec::with_capacity(lower),
        links: Vec::with_capacity(lower),
    };
    for triple in mapped {
        out.labels.push(triple.label);
        out.ids.push(triple.id);
        out.links.push(triple.link);
    }
    out
}
