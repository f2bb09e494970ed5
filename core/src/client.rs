//! Request builder and response parser for one REST resource.
//!
//! # Design
//! `ResourceClient` holds the base URL, the resource name and a token
//! provider, and carries no other state between calls. Each CRUD operation
//! has a `build_*` method that produces an `HttpRequest`; responses are
//! checked by `parse_list`, `parse_item` and `parse_empty`. Executing the
//! request is left to a `Transport`, which keeps this layer deterministic.
//!
//! Paths follow the Rails JSON convention: `/<resource>.json` for the
//! collection and `/<resource>/<id>.json` for a member. Whichever one a
//! request targets depends only on whether the input carries an `id`.

use std::fmt;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;

use crate::csrf::{TokenProvider, CSRF_HEADER};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Item, Params};

/// Characters escaped when an id is placed in a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Stateless client for a single resource's JSON endpoints.
#[derive(Clone)]
pub struct ResourceClient {
    base_url: String,
    resource: String,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("base_url", &self.base_url)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl ResourceClient {
    pub fn new(base_url: &str, resource: &str, tokens: impl TokenProvider + 'static) -> Self {
        Self::with_shared_tokens(base_url, resource, Arc::new(tokens))
    }

    /// Like `new`, but shares one provider between several resources.
    pub fn with_shared_tokens(
        base_url: &str,
        resource: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resource: resource.trim_matches('/').to_string(),
            tokens,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// `/<resource>/<id>.json` when `id` is present, `/<resource>.json` otherwise.
    ///
    /// A `null` or empty-string id counts as absent.
    pub fn path_for(&self, id: Option<&Value>) -> String {
        match id.filter(|id| !is_blank_id(id)) {
            Some(id) => format!(
                "{}/{}/{}.json",
                self.base_url,
                self.resource,
                utf8_percent_encode(&render_id(id), PATH_SEGMENT)
            ),
            None => format!("{}/{}.json", self.base_url, self.resource),
        }
    }

    pub fn build_get_all(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        let path = with_query(self.path_for(None), params)?;
        self.request(HttpMethod::Get, path, None)
    }

    pub fn build_get(&self, id: &Value, params: &Params) -> Result<HttpRequest, ApiError> {
        let path = with_query(self.path_for(Some(id)), params)?;
        self.request(HttpMethod::Get, path, None)
    }

    pub fn build_create(&self, item: &Item) -> Result<HttpRequest, ApiError> {
        let body = to_body(item)?;
        self.request(HttpMethod::Post, self.path_for(None), Some(body))
    }

    pub fn build_update(&self, item: &Item) -> Result<HttpRequest, ApiError> {
        let body = to_body(item)?;
        self.request(HttpMethod::Put, self.path_for(item.id()), Some(body))
    }

    pub fn build_destroy(&self, item: &Item) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Delete, self.path_for(item.id()), None)
    }

    /// Parse a collection response: a JSON array of objects.
    pub fn parse_list(&self, response: &HttpResponse) -> Result<Vec<Item>, ApiError> {
        check_status(response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parse a member response: a single JSON object.
    pub fn parse_item(&self, response: &HttpResponse) -> Result<Item, ApiError> {
        check_status(response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Check a response whose body is irrelevant.
    pub fn parse_empty(&self, response: &HttpResponse) -> Result<(), ApiError> {
        check_status(response)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: String,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        let token = self.tokens.csrf_token().ok_or(ApiError::MissingCsrfToken)?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                (CSRF_HEADER.to_string(), token),
            ],
            body,
        })
    }
}

/// Strings go into the path verbatim, everything else as its JSON text.
fn is_blank_id(id: &Value) -> bool {
    match id {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn render_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn with_query(path: String, params: &Params) -> Result<String, ApiError> {
    if params.is_empty() {
        return Ok(path);
    }
    let query =
        serde_urlencoded::to_string(params).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(format!("{path}?{query}"))
}

fn to_body(item: &Item) -> Result<String, ApiError> {
    serde_json::to_string(item).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Any non-2xx status is a failure carrying the raw body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
