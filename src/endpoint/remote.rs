//! SPARQL 1.1 protocol client over HTTP (`GET ?query=`).

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::SparqlEndpoint;
use crate::config::EndpointConfig;
use crate::error::{EndpointError, EndpointResult};
use crate::sparql::{SparqlQuery, SparqlResults};

const RESULTS_JSON: &str = "application/sparql-results+json";

/// Longest error body kept in an [`EndpointError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Remote SPARQL endpoint with a request timeout and bounded retries.
#[derive(Clone)]
pub struct RemoteEndpoint {
    url: String,
    http: ureq::Agent,
    max_retries: u32,
    backoff: Duration,
}

impl RemoteEndpoint {
    pub fn new(config: &EndpointConfig) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            url: config.url.clone(),
            http,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn get_json<T: DeserializeOwned>(&self, query: &str) -> EndpointResult<T> {
        let mut delay = self.backoff;
        let mut attempt = 1;
        loop {
            match self.try_get(query, attempt) {
                Err(e) if e.is_retryable() && attempt <= self.max_retries => {
                    tracing::warn!(
                        url = %self.url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "SPARQL request failed, retrying"
                    );
                    std::thread::sleep(delay);
                    delay *= 2;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn try_get<T: DeserializeOwned>(&self, query: &str, attempt: u32) -> EndpointResult<T> {
        let resp = self
            .http
            .get(&self.url)
            .query("query", query)
            .set("Accept", RESULTS_JSON)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(status, resp) => {
                    let mut body = resp.into_string().unwrap_or_default();
                    if body.len() > MAX_ERROR_BODY {
                        let cut = (0..=MAX_ERROR_BODY)
                            .rev()
                            .find(|&i| body.is_char_boundary(i))
                            .unwrap_or(0);
                        body.truncate(cut);
                    }
                    EndpointError::Status {
                        url: self.url.clone(),
                        status,
                        body,
                    }
                }
                ureq::Error::Transport(t) => EndpointError::Unreachable {
                    url: self.url.clone(),
                    attempts: attempt,
                    message: t.to_string(),
                },
            })?;
        serde_json::from_reader(resp.into_reader()).map_err(|e| EndpointError::Malformed {
            message: format!("failed to parse JSON from {}: {e}", self.url),
        })
    }
}

impl std::fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("url", &self.url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl SparqlEndpoint for RemoteEndpoint {
    fn select(&self, query: &SparqlQuery) -> EndpointResult<SparqlResults> {
        tracing::debug!(url = %self.url, query = %query, "remote SPARQL select");
        self.get_json(query.as_str())
    }

    fn raw(&self, query: &str) -> EndpointResult<serde_json::Value> {
        self.get_json(query)
    }

    fn describe(&self) -> String {
        format!("remote {}", self.url)
    }
}
