//! Suggestion gateway: profile lookup, one backend call, mapping and aggregation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::entities::profile::resolve_profile;
use crate::entities::suggestion::{SuggestionRequest, SuggestionResponse, aggregate};
use crate::error::OpenSearchError;
use crate::link::LinkResolver;
use crate::sources::golr::{GOLR_API, SearchBackend};
use crate::transform::suggestion::map_document;

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn SearchBackend>,
    linker: Arc<dyn LinkResolver>,
    deadline: Option<Duration>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn SearchBackend>, linker: Arc<dyn LinkResolver>) -> Self {
        Self {
            backend,
            linker,
            deadline: Some(DEFAULT_DEADLINE),
        }
    }

    /// `None` waits on the backend indefinitely.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, OpenSearchError> {
        let profile = resolve_profile(&request.entity_type)?;
        let query = request.normalized_query();
        debug!(entity_type = profile.entity_type, %query, "suggestion request");

        let search = self.backend.search(profile, &query);
        let docs = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, search).await.map_err(|_| {
                OpenSearchError::Timeout {
                    api: GOLR_API.to_string(),
                    deadline,
                }
            })??,
            None => search.await?,
        };

        let linker = self.linker.as_ref();
        let response = aggregate(
            query,
            docs.iter().map(|doc| map_document(doc, profile, linker)),
        );
        info!(
            entity_type = profile.entity_type,
            query = %response.query,
            results = response.len(),
            "suggestions served"
        );
        Ok(response)
    }
}
