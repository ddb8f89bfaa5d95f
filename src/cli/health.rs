use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::error::OpenSearchError;

const GOLR: &str = "GOlr";
const AMIGO: &str = "AmiGO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Error,
}

/// One upstream probe: which service, the URL hit, and how it went.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthRow {
    pub api: &'static str,
    pub url: String,
    pub status: ProbeStatus,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affects: Option<&'static str>,
}

impl HealthRow {
    fn failed(api: &'static str, url: &str, detail: String) -> Self {
        Self {
            api,
            url: url.to_string(),
            status: ProbeStatus::Error,
            detail,
            affects: Some(affects_for_api(api)),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub healthy: usize,
    pub total: usize,
    pub rows: Vec<HealthRow>,
}

impl HealthReport {
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# AmiGO OpenSearch Health Check\n\n");
        out.push_str("| API | URL | Status | Detail | Affects |\n");
        out.push_str("|-----|-----|--------|--------|---------|\n");
        for row in &self.rows {
            let status = match row.status {
                ProbeStatus::Ok => "ok",
                ProbeStatus::Error => "error",
            };
            out.push_str(&format!(
                "| {} | {} | {status} | {} | {} |\n",
                row.api,
                row.url,
                row.detail,
                row.affects.unwrap_or("-")
            ));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} upstreams reachable\n",
            self.healthy, self.total
        ));
        out
    }
}

fn affects_for_api(api: &str) -> &'static str {
    match api {
        GOLR => "all suggestion routes",
        _ => "suggestion links and descriptor search page",
    }
}

async fn probe(client: &reqwest::Client, api: &'static str, url: &str) -> HealthRow {
    let start = Instant::now();
    let sent = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await;
    let elapsed = start.elapsed().as_millis();

    match sent {
        Ok(resp) if resp.status().is_success() => HealthRow {
            api,
            url: url.to_string(),
            status: ProbeStatus::Ok,
            detail: format!("{elapsed}ms"),
            affects: None,
        },
        Ok(resp) => HealthRow::failed(
            api,
            url,
            format!("HTTP {} after {elapsed}ms", resp.status().as_u16()),
        ),
        Err(err) if err.is_timeout() => HealthRow::failed(api, url, "timeout".into()),
        Err(err) if err.is_connect() => HealthRow::failed(api, url, "connect failed".into()),
        Err(err) => HealthRow::failed(api, url, err.to_string()),
    }
}

fn health_http_client() -> Result<reqwest::Client, OpenSearchError> {
    static HEALTH_HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

    if let Some(client) = HEALTH_HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    let client = reqwest::Client::builder()
        // Keep health checks snappy and deterministic.
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .user_agent(concat!("amigo-opensearch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(OpenSearchError::HttpClientInit)?;

    Ok(HEALTH_HTTP_CLIENT.get_or_init(|| client).clone())
}

fn golr_probe_url(golr_base: &str) -> String {
    format!(
        "{}/select?q=*:*&rows=0&wt=json",
        golr_base.trim_end_matches('/')
    )
}

/// Runs connectivity checks against the search backend and the link target.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be created.
pub async fn check(golr_base: &str, amigo_base: &str) -> Result<HealthReport, OpenSearchError> {
    let client = health_http_client()?;
    let golr_url = golr_probe_url(golr_base);
    let amigo_url = format!("{}/", amigo_base.trim_end_matches('/'));

    let (golr, amigo) = tokio::join!(
        probe(&client, GOLR, &golr_url),
        probe(&client, AMIGO, &amigo_url),
    );

    let rows = vec![golr, amigo];
    let healthy = rows
        .iter()
        .filter(|r| r.status == ProbeStatus::Ok)
        .count();
    Ok(HealthReport {
        healthy,
        total: rows.len(),
        rows,
    })
}
