//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `ApiClient` is written against the `Transport` trait so tests can swap in
//! an in-memory fake. `UreqTransport` is the blocking implementation. It
//! disables ureq's status-as-error behavior: a 4xx/5xx is still a response,
//! and only failures that produced no response at all come back as
//! `TransportError`.

use thiserror::Error;
use uuid::Uuid;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// The request never produced a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("reading response body failed: {0}")]
    Body(String),
}

pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport built on `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn multipart_boundary() -> String {
    format!("----ticketdesk{}", Uuid::new_v4().simple())
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut headers = request.headers.clone();
        let body: Option<Vec<u8>> = match &request.body {
            Some(RequestBody::Json(text)) => Some(text.clone().into_bytes()),
            Some(RequestBody::Multipart(form)) => {
                let (content_type, bytes) = form.encode(&multipart_boundary());
                crate::http::set_header(&mut headers, "content-type", &content_type);
                Some(bytes)
            }
            None => None,
        };

        let url = request.url.as_str();
        let result = match (request.method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), &headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), &headers).call(),
            (HttpMethod::Post, Some(bytes)) => {
                with_headers(self.agent.post(url), &headers).send(&bytes[..])
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), &headers).send_empty(),
            (HttpMethod::Put, Some(bytes)) => {
                with_headers(self.agent.put(url), &headers).send(&bytes[..])
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), &headers).send_empty(),
            (HttpMethod::Patch, Some(bytes)) => {
                with_headers(self.agent.patch(url), &headers).send(&bytes[..])
            }
            (HttpMethod::Patch, None) => with_headers(self.agent.patch(url), &headers).send_empty(),
        };

        let mut response = result.map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
