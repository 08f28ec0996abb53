//! Shared outbound HTTP client.

use std::time::Duration;

/// User agent sent to both upstreams (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!("gist-crm-sync/", env!("CARGO_PKG_VERSION"));

/// HTTP connect timeout for upstream calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the pooled client shared by the CRM and gist adapters.
pub fn build_http_client(request_timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(HTTP_CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .build()
}

/// Read an error body for logging, capped so a large HTML error page stays readable.
pub(crate) async fn error_body(resp: reqwest::Response) -> String {
    const MAX_ERROR_BODY: usize = 512;

    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
