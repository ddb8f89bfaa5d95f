use std::borrow::Cow;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use crate::entities::profile::EntityTypeProfile;
use crate::error::OpenSearchError;

pub const GOLR_BASE: &str = "http://golr.berkeleybop.org/";
pub const GOLR_API: &str = "golr";
pub const GOLR_BASE_ENV: &str = "GOLR_URL";
pub const DEFAULT_ROWS: usize = 10;
const MAX_ROWS: usize = 100;

/// One matched record: field name to JSON value, as GOlr returns it.
pub type BackendDocument = serde_json::Map<String, serde_json::Value>;

/// A faceted-search backend that answers one query with one ordered result set.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        profile: &EntityTypeProfile,
        query: &str,
    ) -> Result<Vec<BackendDocument>, OpenSearchError>;
}

/// Per-request GOlr query. Built fresh for every call and never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GolrQuery {
    personality: &'static str,
    document_category: &'static str,
    query: String,
    query_fields: &'static [&'static str],
    return_fields: Vec<&'static str>,
    rows: usize,
}

impl GolrQuery {
    pub fn new(profile: &EntityTypeProfile, query: &str, rows: usize) -> Self {
        Self {
            personality: profile.personality,
            document_category: profile.document_category,
            query: comfy_query(query),
            query_fields: profile.query_fields,
            return_fields: vec![profile.id_field, profile.label_field, "score"],
            rows: rows.clamp(1, MAX_ROWS),
        }
    }

    pub fn personality(&self) -> &str {
        self.personality
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("defType", "edismax".to_string()),
            ("qt", "standard".to_string()),
            ("wt", "json".to_string()),
            ("indent", "on".to_string()),
            ("start", "0".to_string()),
            ("rows", self.rows.to_string()),
            ("q", self.query.clone()),
            (
                "fq",
                format!("document_category:\"{}\"", self.document_category),
            ),
            ("qf", self.query_fields.join(" ")),
            ("fl", self.return_fields.join(",")),
        ]
    }
}

fn solr_special_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([+\-!(){}\[\]^"~*?:\\/&|])"#).expect("valid solr special-character regex")
    })
}

/// Turns partial user input into a forgiving Solr query.
///
/// A lone token becomes an escaped prefix match (`apopto` -> `apopto*`,
/// `GO:00069` -> `GO\:00069*`). Multi-token input is passed through so users
/// can still write their own Solr syntax. Empty input matches everything.
pub fn comfy_query(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return "*:*".to_string();
    }

    let mut tokens = query.split_whitespace();
    let (Some(token), None) = (tokens.next(), tokens.next()) else {
        return query.to_string();
    };

    let stem = token.strip_suffix('*').unwrap_or(token);
    if stem.is_empty() {
        return "*:*".to_string();
    }
    let escaped = solr_special_re().replace_all(stem, r"\$1");
    format!("{escaped}*")
}

#[derive(Debug, Deserialize)]
struct GolrSelectResponse {
    #[serde(default)]
    response: GolrResultSet,
}

#[derive(Debug, Default, Deserialize)]
struct GolrResultSet {
    #[serde(rename = "numFound")]
    num_found: Option<u64>,
    #[serde(default)]
    docs: Vec<BackendDocument>,
}

#[derive(Debug, Clone)]
pub struct GolrClient {
    client: reqwest::Client,
    base: Cow<'static, str>,
    rows: usize,
}

impl GolrClient {
    pub fn new() -> Result<Self, OpenSearchError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            base: crate::sources::env_base(GOLR_BASE, GOLR_BASE_ENV),
            rows: DEFAULT_ROWS,
        })
    }

    pub fn with_base(base: impl Into<String>) -> Result<Self, OpenSearchError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            base: Cow::Owned(base.into()),
            rows: DEFAULT_ROWS,
        })
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn base(&self) -> &str {
        self.base.as_ref()
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_ref().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn select(&self, query: &GolrQuery) -> Result<Vec<BackendDocument>, OpenSearchError> {
        let url = self.endpoint("select");
        debug!(
            personality = query.personality(),
            q = query.query(),
            %url,
            "golr select"
        );

        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&query.params())
            .send()
            .await?;
        let status = resp.status();
        let bytes = crate::sources::read_limited_body(resp, GOLR_API).await?;
        if !status.is_success() {
            let excerpt = crate::sources::body_excerpt(&bytes);
            return Err(OpenSearchError::Api {
                api: GOLR_API.to_string(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        let parsed: GolrSelectResponse =
            serde_json::from_slice(&bytes).map_err(|source| OpenSearchError::ApiJson {
                api: GOLR_API.to_string(),
                source,
            })?;
        debug!(
            num_found = parsed.response.num_found,
            returned = parsed.response.docs.len(),
            "golr select complete"
        );
        Ok(parsed.response.docs)
    }
}

#[async_trait]
impl SearchBackend for GolrClient {
    async fn search(
        &self,
        profile: &EntityTypeProfile,
        query: &str,
    ) -> Result<Vec<BackendDocument>, OpenSearchError> {
        let golr_query = GolrQuery::new(profile, query, self.rows);
        self.select(&golr_query).await
    }
}
