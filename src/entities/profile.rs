//! Per-entity-type search profiles.
//!
//! The table is built at compile time and is read-only for the life of the
//! process, so concurrent lookups need no synchronization.

use serde::Serialize;

use crate::error::OpenSearchError;

pub const TERM: &str = "term";
pub const GENE_PRODUCT: &str = "gene_product";

pub const ENTITY_TYPE_NAMES: &[&str] = &[TERM, GENE_PRODUCT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityTypeProfile {
    /// Route token used in `/<entity_type>/<query>`.
    pub entity_type: &'static str,
    /// Human-readable name for descriptors ("gene product").
    pub readable_name: &'static str,
    /// GOlr personality the weighted query fields come from.
    pub personality: &'static str,
    pub document_category: &'static str,
    pub id_field: &'static str,
    pub label_field: &'static str,
    pub link_kind: &'static str,
    /// Weighted Solr query fields (`qf`) for the personality.
    pub query_fields: &'static [&'static str],
    /// Path of the OpenSearch descriptor advertising this profile.
    pub descriptor_path: &'static str,
}

static PROFILES: &[EntityTypeProfile] = &[
    EntityTypeProfile {
        entity_type: TERM,
        readable_name: "term",
        personality: "ontology",
        document_category: "ontology_class",
        id_field: "annotation_class",
        label_field: "annotation_class_label",
        link_kind: "term",
        query_fields: &[
            "annotation_class^3",
            "annotation_class_label_searchable^5.5",
            "description_searchable^1",
            "comment_searchable^0.5",
            "synonym_searchable^1",
            "alternate_id^1",
            "isa_partof_closure_label_searchable^1",
        ],
        descriptor_path: "/osd_term.xml",
    },
    EntityTypeProfile {
        entity_type: GENE_PRODUCT,
        readable_name: "gene product",
        personality: "bioentity",
        document_category: "bioentity",
        id_field: "bioentity",
        label_field: "bioentity_label",
        link_kind: "gene_product",
        query_fields: &[
            "bioentity^2",
            "bioentity_label_searchable^2",
            "bioentity_name_searchable^1",
            "bioentity_internal_id^1",
            "synonym_searchable^1",
            "isa_partof_closure_label_searchable^1",
            "regulates_closure_label_searchable^1",
            "panther_family_searchable^1",
            "panther_family_label_searchable^1",
            "taxon_label_searchable^1",
        ],
        descriptor_path: "/osd_gp.xml",
    },
];

pub fn profiles() -> &'static [EntityTypeProfile] {
    PROFILES
}

/// Exact-match lookup. Case and surrounding whitespace are significant.
pub fn resolve_profile(entity_type: &str) -> Result<&'static EntityTypeProfile, OpenSearchError> {
    PROFILES
        .iter()
        .find(|profile| profile.entity_type == entity_type)
        .ok_or_else(|| OpenSearchError::UnknownEntityType(entity_type.to_string()))
}
