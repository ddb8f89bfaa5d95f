use std::borrow::Cow;

pub const AMIGO_BASE: &str = "http://amigo.geneontology.org";
pub const AMIGO_BASE_ENV: &str = "AMIGO_URL";

/// Maps an identifier and a link kind to a browsable URL.
pub trait LinkResolver: Send + Sync {
    fn resolve(&self, id: &str, kind: &str) -> String;
}

/// Links into the AmiGO browser (`<base>/amigo/<kind>/<id>`).
#[derive(Debug, Clone)]
pub struct AmigoLinker {
    base: Cow<'static, str>,
}

impl AmigoLinker {
    pub fn new() -> Self {
        Self {
            base: crate::sources::env_base(AMIGO_BASE, AMIGO_BASE_ENV),
        }
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Cow::Owned(base.into()),
        }
    }

    pub fn base(&self) -> &str {
        self.base.as_ref().trim_end_matches('/')
    }

    /// Full-text search page for a query template, as used in descriptors.
    pub fn search_template(&self) -> String {
        format!("{}/amigo/medial_search?q={{searchTerms}}", self.base())
    }
}

impl Default for AmigoLinker {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkResolver for AmigoLinker {
    fn resolve(&self, id: &str, kind: &str) -> String {
        // Identifiers keep their `:` so links stay readable (GO:0006915).
        let id = urlencoding::encode(id).replace("%3A", ":");
        format!("{}/amigo/{}/{}", self.base(), kind, id)
    }
}
