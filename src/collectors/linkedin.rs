use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::collectors::{Transport, TransportResponse};
use crate::error::{AppError, FetchError};
use crate::models::filter::FilterState;

/// Characters that encodeURIComponent does NOT encode.
/// RFC 3986 unreserved: A-Z a-z 0-9 - _ . ! ~ * ' ( )
const ENCODE_URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const SEARCH_PATH: &str = "/jobs-guest/jobs/api/seeMoreJobPostings/search";

/// Listings per result batch, fixed by the source's pagination.
pub const BATCH_SIZE: u32 = 25;

/// Render the guest search URL for `filter` at batch offset `start`.
///
/// Parameters appear only when set, always in the same order, so the URL
/// at `start = 0` doubles as the cache key for the whole query. The only
/// failure is a host that does not form a valid URL.
pub fn build_url(filter: &FilterState, start: u32) -> Result<String, AppError> {
    let mut params: Vec<(&str, String)> = Vec::with_capacity(12);

    if !filter.keyword.is_empty() {
        params.push(("keywords", encode_terms(&filter.keyword)));
    }
    if !filter.location.is_empty() {
        params.push(("location", encode_terms(&filter.location)));
    }

    let codes = [
        ("f_TPR", filter.date_since_posted.code()),
        ("f_SB2", filter.salary.code()),
        ("f_E", filter.experience_level.code()),
        ("f_WT", filter.remote_filter.code()),
        ("f_JT", filter.job_type.code()),
    ];
    for (name, code) in codes {
        if let Some(code) = code {
            params.push((name, urlencoded(code)));
        }
    }

    let offset = start.saturating_add(filter.page.saturating_mul(BATCH_SIZE));
    params.push(("start", offset.to_string()));

    if let Some(code) = filter.sort_by.code() {
        params.push(("sortBy", code.to_string()));
    }
    if filter.has_verification {
        params.push(("f_VJ", "true".to_string()));
    }
    if filter.under_10_applicants {
        params.push(("f_EA", "true".to_string()));
    }

    let query = params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let url = format!("https://{}{SEARCH_PATH}?{query}", filter.host);

    let parsed = reqwest::Url::parse(&url)
        .map_err(|e| AppError::BadRequest(format!("Invalid host '{}': {e}", filter.host)))?;
    if parsed.path() != SEARCH_PATH || !parsed.username().is_empty() {
        return Err(AppError::BadRequest(format!(
            "Invalid host '{}'",
            filter.host
        )));
    }

    Ok(url)
}

/// Percent-encode each `+`-joined term, keeping `+` as the separator.
/// A literal `+` in the caller's text reads as a separator too.
fn encode_terms(joined: &str) -> String {
    joined
        .split('+')
        .filter(|term| !term.is_empty())
        .map(urlencoded)
        .collect::<Vec<_>>()
        .join("+")
}

/// URL-encode a string for use in query parameters.
fn urlencoded(s: &str) -> String {
    utf8_percent_encode(s, ENCODE_URI_COMPONENT_SET).to_string()
}

/// reqwest-backed transport with browser-like XHR headers.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<TransportResponse, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header("User-Agent", user_agent)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Connection", "keep-alive")
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache");

        if let Some(host) = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
        {
            request = request.header("Referer", format!("https://{host}/jobs"));
        }

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        Ok(TransportResponse { status, body })
    }
}
