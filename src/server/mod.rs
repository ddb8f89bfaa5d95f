//! HTTP surface: suggestion routes plus the static documents that advertise them.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::http::Uri;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::entities::suggestion::{SuggestionRequest, SuggestionResponse, normalize_query};
use crate::error::OpenSearchError;
use crate::gateway::Gateway;

pub mod pages;

pub use pages::Pages;

#[derive(Clone)]
pub struct AppState {
    gateway: Gateway,
    pages: Arc<Pages>,
}

impl AppState {
    pub fn new(gateway: Gateway, pages: Pages) -> Self {
        Self {
            gateway,
            pages: Arc::new(pages),
        }
    }
}

impl IntoResponse for OpenSearchError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UnknownEntityType(_) => StatusCode::NOT_FOUND,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            err if err.is_backend_failure() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/index.html", get(cached_index))
        .route("/favicon.ico", get(favicon))
        .route("/osd_term.xml", get(descriptor))
        .route("/osd_gp.xml", get(descriptor))
        .route("/:entity_type/", get(suggest))
        .route("/:entity_type/:query", get(suggest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.pages.index.clone())
}

async fn cached_index(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/html")],
        state.pages.cached_index_html.clone(),
    )
}

async fn favicon() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/x-icon")], "")
}

async fn descriptor(State(state): State<AppState>, uri: Uri) -> Response {
    match state.pages.descriptor(uri.path()) {
        Some(xml) => ([(CONTENT_TYPE, "application/xml")], xml.to_string()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Splits `/<entity_type>/<query>` into its raw segments, percent-escapes intact.
fn suggestion_segments(path: &str) -> (&str, Option<&str>) {
    let path = path.strip_prefix('/').unwrap_or(path);
    match path.split_once('/') {
        Some((entity_type, query)) => (entity_type, Some(query)),
        None => (path, None),
    }
}

/// `GET /<entity_type>/<query>`. Segments are read from the request URI so the
/// query is percent-decoded exactly once, by `normalize_query`.
async fn suggest(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<SuggestionResponse>, OpenSearchError> {
    let (entity_type, raw_query) = suggestion_segments(uri.path());
    let entity_type = normalize_query(Some(entity_type));

    let request = SuggestionRequest::new(entity_type.as_str(), raw_query);
    match state.gateway.suggest(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            warn!(%entity_type, error = %err, "suggestion request failed");
            Err(err)
        }
    }
}

/// Binds `addr` and serves until Ctrl-C or SIGTERM.
pub async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(%addr, "opensearch service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("opensearch server failure")?;

    info!("opensearch service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, terminating"),
        _ = terminate => info!("received SIGTERM, terminating"),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::entities::profile::EntityTypeProfile;
    use crate::link::AmigoLinker;
    use crate::sources::golr::{BackendDocument, SearchBackend};

    /// Returns one document echoing the profile and query it was asked for.
    struct EchoBackend;

    #[async_trait]
    impl SearchBackend for EchoBackend {
        async fn search(
            &self,
            profile: &EntityTypeProfile,
            query: &str,
        ) -> Result<Vec<BackendDocument>, OpenSearchError> {
            if query.is_empty() {
                return Ok(Vec::new());
            }
            if query == "explode" {
                return Err(OpenSearchError::Api {
                    api: "golr".into(),
                    message: "HTTP 500: boom".into(),
                });
            }
            let mut doc = BackendDocument::new();
            doc.insert(profile.id_field.into(), "GO:0006915".into());
            doc.insert(profile.label_field.into(), format!("{query} label").into());
            Ok(vec![doc])
        }
    }

    fn app() -> Router {
        let gateway = Gateway::new(
            Arc::new(EchoBackend),
            Arc::new(AmigoLinker::with_base("http://amigo.test")),
        );
        let pages = Pages::render(
            "localhost:8910",
            "http://amigo.test/amigo/medial_search?q={searchTerms}",
            "http://amigo.test/",
        )
        .unwrap();
        router(AppState::new(gateway, pages))
    }

    async fn get(uri: &str) -> (StatusCode, Option<String>, String) {
        let resp = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn term_route_returns_opensearch_json() {
        let (status, content_type, body) = get("/term/apopto").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                "apopto",
                ["apopto label"],
                ["GO:0006915"],
                ["http://amigo.test/amigo/term/GO:0006915"]
            ])
        );
    }

    #[tokio::test]
    async fn query_segment_is_percent_decoded() {
        let (status, _, body) = get("/gene_product/cell%20death").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value[0], "cell death");
        assert_eq!(value[1][0], "cell death label");
        assert_eq!(value[3][0], "http://amigo.test/amigo/gene_product/GO:0006915");
    }

    #[tokio::test]
    async fn encoded_percent_is_decoded_once() {
        let (status, _, body) = get("/term/50%2525").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value[0], "50%25");
        assert_eq!(value[1][0], "50%25 label");
    }

    #[tokio::test]
    async fn invalid_utf8_query_is_decoded_lossily() {
        let (status, content_type, body) = get("/term/p53%FF").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value[0], "p53\u{FFFD}");
    }

    #[tokio::test]
    async fn query_whitespace_is_echoed_verbatim() {
        let (status, _, body) = get("/term/apoptotic%20").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value[0], "apoptotic ");
        assert_eq!(value[1][0], "apoptotic  label");
    }

    #[test]
    fn suggestion_segments_keep_escapes() {
        assert_eq!(suggestion_segments("/term/a%2Fb"), ("term", Some("a%2Fb")));
        assert_eq!(suggestion_segments("/gene_product/"), ("gene_product", Some("")));
        assert_eq!(suggestion_segments("/term"), ("term", None));
    }

    #[tokio::test]
    async fn empty_query_route_returns_empty_arrays() {
        let (status, _, body) = get("/term/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"["",[],[],[]]"#);
    }

    #[tokio::test]
    async fn unknown_entity_type_is_not_found() {
        let (status, content_type, body) = get("/disease/melanoma").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert!(body.contains("Unknown entity type"));
    }

    #[tokio::test]
    async fn backend_failure_maps_to_bad_gateway() {
        let (status, _, body) = get("/term/explode").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("boom"));
    }

    #[tokio::test]
    async fn descriptors_are_served_as_xml() {
        let (status, content_type, body) = get("/osd_gp.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/xml"));
        assert!(body.contains("http://localhost:8910/gene_product/{searchTerms}"));

        let (_, _, body) = get("/osd_term.xml").await;
        assert!(body.contains("http://localhost:8910/term/{searchTerms}"));
    }

    #[tokio::test]
    async fn static_pages_have_expected_types() {
        let (status, content_type, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.is_some_and(|v| v.starts_with("text/html")));
        assert!(body.contains("/osd_gp.xml"));

        let (status, content_type, body) = get("/favicon.ico").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/x-icon"));
        assert!(body.is_empty());

        let (status, content_type, _) = get("/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/html"));
    }
}
