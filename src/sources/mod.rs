//! Outbound HTTP sources and the shared plumbing they use.

use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::OpenSearchError;

pub mod golr;

const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
const EXCERPT_CHARS: usize = 200;

/// Base URL with an environment override. Blank overrides are ignored.
pub(crate) fn env_base(default: &'static str, env_var: &str) -> Cow<'static, str> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Cow::Owned(value.trim().to_string()),
        _ => Cow::Borrowed(default),
    }
}

/// Connection-pooling client shared by every source.
///
/// The client carries no per-request state; each call builds its own request.
pub(crate) fn shared_client() -> Result<reqwest::Client, OpenSearchError> {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

    if let Some(client) = CLIENT.get() {
        return Ok(client.clone());
    }

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("amigo-opensearch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(OpenSearchError::HttpClientInit)?;

    Ok(CLIENT.get_or_init(|| client).clone())
}

pub(crate) async fn read_limited_body(
    mut resp: reqwest::Response,
    api: &str,
) -> Result<Vec<u8>, OpenSearchError> {
    let too_large = || OpenSearchError::Api {
        api: api.to_string(),
        message: format!("Response body exceeds {MAX_BODY_BYTES} bytes"),
    };

    if resp
        .content_length()
        .is_some_and(|len| len > MAX_BODY_BYTES as u64)
    {
        return Err(too_large());
    }

    let mut out = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if out.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(too_large());
        }
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    out.push('…');
    out
}
