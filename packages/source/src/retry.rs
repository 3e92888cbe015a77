//! HTTP retry helpers for transient errors.
//!
//! Fetchers send every request through [`send_json`], [`send_text`], or
//! [`send_bytes`] instead of calling `reqwest::RequestBuilder::send()`
//! directly, so each request gets the same policy: exponential backoff
//! on timeouts, connection resets, HTTP 429, and HTTP 5xx; an immediate
//! error on anything permanent. A 401 surfaces as
//! [`SourceError::Auth`] so callers can distinguish a bad API key from
//! a flaky network.
//!
//! The `build_request` closure is invoked on each attempt because
//! builders are consumed by `.send()`; this keeps any request shape
//! retryable (query params, bearer tokens, POST bodies).

use std::time::Duration;

use crate::SourceError;

/// Retry attempts after the initial request.
///
/// With exponential backoff (2s, 4s, 8s) the total wait before giving
/// up on a request is 14 seconds.
const MAX_RETRIES: u32 = 3;

/// Maximum length of the response body preview included in parse-error
/// logs.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The body is read as text first so a parse failure can log what the
/// server actually sent.
///
/// # Errors
///
/// Returns [`SourceError`] when the request fails after all retries,
/// the server answers with a non-retryable status, or the body is not
/// valid JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request).await?;
    let url = response.url().to_string();
    let status = response.status();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|json_err| {
        let preview = if text.len() > BODY_PREVIEW_LEN {
            &text[..BODY_PREVIEW_LEN]
        } else {
            text.as_str()
        };
        log::error!(
            "JSON parse failed for {url} (status {status}, {} bytes): {json_err}\n  body preview: {preview}",
            text.len(),
        );
        SourceError::Json(json_err)
    })
}

/// Sends an HTTP request and returns the response body as a `String`.
///
/// # Errors
///
/// Returns [`SourceError`] when the request fails after all retries or
/// the server answers with a non-retryable status.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(build_request: F) -> Result<String, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request).await?;
    Ok(response.text().await?)
}

/// Sends an HTTP request and returns the raw response bytes.
///
/// Used for archive downloads where the body is not text.
///
/// # Errors
///
/// Returns [`SourceError`] when the request fails after all retries or
/// the server answers with a non-retryable status.
#[allow(clippy::future_not_send)]
pub async fn send_bytes<F>(build_request: F) -> Result<Vec<u8>, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request).await?;
    Ok(response.bytes().await?.to_vec())
}

/// Core retry loop shared by the `send_*` helpers.
///
/// Returns the successful [`reqwest::Response`] (status 2xx or 3xx).
#[allow(clippy::future_not_send)]
async fn send_inner<F>(build_request: &F) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt); // 2s, 4s, 8s
            log::warn!("  retry {attempt}/{MAX_RETRIES} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < MAX_RETRIES {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::UNAUTHORIZED {
                    return Err(SourceError::Auth {
                        url: response.url().to_string(),
                    });
                }

                // 429 and 5xx come back with the next backoff step.
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < MAX_RETRIES {
                        log::warn!("  HTTP {status}");
                        continue;
                    }
                    return Err(SourceError::Status {
                        status,
                        url: response.url().to_string(),
                    });
                }

                // Remaining 4xx are permanent.
                if status.is_client_error() {
                    return Err(SourceError::Status {
                        status,
                        url: response.url().to_string(),
                    });
                }

                return Ok(response);
            }
        }
    }

    unreachable!("request retry loop exited without returning")
}

/// Returns `true` when the error is likely transient and worth another
/// attempt.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request()
}
