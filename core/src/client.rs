//! Request builder, response parser, and the request primitive that joins
//! them through a `Transport`.
//!
//! # Design
//! `build_request` and `parse_response` are pure: the first turns a URL plus
//! `RequestOptions` into an `HttpRequest`, the second turns an `HttpResponse`
//! into an `ApiResult`. `request` is the only method that performs I/O, and it
//! never panics or returns anything but `ApiResult`. The bearer token is read
//! from the injected `SessionStore` on every build, so a login or logout is
//! visible to the very next request.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::{ApiConfig, Endpoints};
use crate::error::{ApiError, ApiResult};
use crate::http::{remove_header, set_header, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
use crate::query::{build_url, QueryParams};
use crate::session::SessionStore;
use crate::transport::{Transport, UreqTransport};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Request payload: JSON data or a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartForm),
}

impl Payload {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> ApiResult<Self> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(ApiError::encode)
    }
}

impl From<MultipartForm> for Payload {
    fn from(form: MultipartForm) -> Self {
        Payload::Multipart(form)
    }
}

/// Everything about a request except its URL.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub params: QueryParams,
    pub payload: Option<Payload>,
    /// Overrides for the default headers, matched case-insensitively.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            params: QueryParams::new(),
            payload: None,
            headers: Vec::new(),
        }
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn payload(mut self, payload: Option<Payload>) -> Self {
        self.payload = payload;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

/// Client for the ticket API.
///
/// Cheap to clone; clones share the session and the transport.
#[derive(Clone)]
pub struct ApiClient {
    endpoints: Endpoints,
    session: SessionStore,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionStore, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoints: config.endpoints(),
            session,
            transport,
        }
    }

    /// Client over the blocking `ureq` transport.
    pub fn with_ureq(config: &ApiConfig, session: SessionStore) -> Self {
        Self::new(config, session, Arc::new(UreqTransport::new()))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn build_request(&self, url: &str, options: RequestOptions) -> ApiResult<HttpRequest> {
        let RequestOptions {
            method,
            params,
            payload,
            headers: overrides,
        } = options;

        let mut headers = vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())];
        for (name, value) in &overrides {
            set_header(&mut headers, name, value);
        }

        if let Some(token) = self.session.token() {
            set_header(&mut headers, "authorization", &format!("Bearer {token}"));
        }

        let body = match payload {
            Some(Payload::Multipart(form)) => {
                // The transport picks the boundary and sets the content type.
                remove_header(&mut headers, "content-type");
                Some(RequestBody::Multipart(form))
            }
            Some(Payload::Json(value)) => {
                // Content type is already JSON unless the caller overrode it.
                let text = serde_json::to_string(&value).map_err(ApiError::encode)?;
                Some(RequestBody::Json(text))
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: build_url(url, &params),
            headers,
            body,
        })
    }

    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> ApiResult<T> {
        if !response.is_success() {
            let err = ApiError::from_response(&response);
            tracing::warn!(status = err.status_code, message = %err.message, "request rejected");
            return Err(err);
        }
        serde_json::from_str(&response.body).map_err(ApiError::decode)
    }

    /// Build, execute, and parse one request.
    pub fn request<T: DeserializeOwned>(&self, url: &str, options: RequestOptions) -> ApiResult<T> {
        let request = self.build_request(url, options)?;
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let response = self.transport.execute(&request).map_err(|e| {
            tracing::warn!(method = request.method.as_str(), url = %request.url, error = %e, "transport failure");
            ApiError::network()
        })?;

        tracing::debug!(status = response.status, "received response");
        self.parse_response(response)
    }

    pub fn get<T: DeserializeOwned>(&self, url: &str, params: QueryParams) -> ApiResult<T> {
        self.request(url, RequestOptions::new(HttpMethod::Get).params(params))
    }

    pub fn post<T: DeserializeOwned>(&self, url: &str, payload: Option<Payload>) -> ApiResult<T> {
        self.request(url, RequestOptions::new(HttpMethod::Post).payload(payload))
    }

    pub fn put<T: DeserializeOwned>(&self, url: &str, payload: Option<Payload>) -> ApiResult<T> {
        self.request(url, RequestOptions::new(HttpMethod::Put).payload(payload))
    }

    pub fn patch<T: DeserializeOwned>(&self, url: &str, payload: Option<Payload>) -> ApiResult<T> {
        self.request(url, RequestOptions::new(HttpMethod::Patch).payload(payload))
    }

    pub fn delete<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.request(url, RequestOptions::new(HttpMethod::Delete))
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoints", &self.endpoints)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
