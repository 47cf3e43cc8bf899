// Shared HTTP plumbing for the embedding and vision clients.


use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, error, warn};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;
const ERROR_BODY_SNIPPET_CHARS: usize = 200;

/// One failed request attempt, before retry classification. Non-success
/// statuses keep the response body so error messages can say what the
/// service actually complained about.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("{0}")]
    Transport(#[from] ureq::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Build a blocking agent with a global request timeout. Status errors are
/// disabled so the response body stays readable on 4xx/5xx; classification
/// happens in `read_body`.
#[inline]
pub fn agent_with_timeout(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Read a response body, turning non-success statuses into `CallError::Status`
/// with the body attached.
#[inline]
pub fn read_body(mut response: ureq::http::Response<ureq::Body>) -> Result<String, CallError> {
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string()?;
    if status >= 400 {
        return Err(CallError::Status { status, body });
    }
    Ok(body)
}

/// Run a request closure with retry on transient failures.
///
/// Server errors (5xx) and transport errors are retried with exponential
/// backoff; client errors (4xx) fail immediately since repeating them cannot
/// succeed, and carry a snippet of the response body. The closure owns
/// building and sending the request so callers keep full control over method,
/// headers, and body.
#[inline]
pub fn send_with_retry<F>(attempts: u32, mut request_fn: F) -> Result<String>
where
    F: FnMut() -> Result<String, CallError>,
{
    let mut last_error = None;

    for attempt in 1..=attempts {
        debug!("HTTP request attempt {}/{}", attempt, attempts);

        match request_fn() {
            Ok(response_text) => {
                debug!("Request succeeded on attempt {}", attempt);
                return Ok(response_text);
            }
            Err(error) => {
                let should_retry = match &error {
                    CallError::Status { status, body } => {
                        if *status >= 500 {
                            warn!(
                                "Server error (status {}), attempt {}/{}",
                                status, attempt, attempts
                            );
                            true
                        } else {
                            warn!("Client error (status {}), not retrying", status);
                            return Err(anyhow::anyhow!(
                                "Client error: HTTP {}: {}",
                                status,
                                body_snippet(body)
                            ));
                        }
                    }
                    CallError::Transport(transport) => match transport {
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                transport, attempt, attempts
                            );
                            true
                        }
                        _ => {
                            warn!("Non-retryable error: {}", transport);
                            false
                        }
                    },
                };

                if !should_retry {
                    return Err(anyhow::anyhow!("Non-retryable error: {}", error));
                }

                last_error = Some(anyhow::anyhow!("Request error: {}", error));

                if attempt < attempts {
                    let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
                    let delay = Duration::from_millis(delay_ms);
                    debug!("Waiting {:?} before retry", delay);
                    std::thread::sleep(delay);
                }
            }
        }
    }

    error!("All {} retry attempts failed", attempts);

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Request failed after retries")))
}

fn body_snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > ERROR_BODY_SNIPPET_CHARS {
        let mut snippet: String = trimmed.chars().take(ERROR_BODY_SNIPPET_CHARS).collect();
        snippet.push_str("...");
        snippet
    } else {
        trimmed.to_string()
    }
}
