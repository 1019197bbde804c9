// Collection API HTTP client
//
// Wraps `reqwest::Client` with collection URL construction, status
// checking and body decoding. One client serves one base URL for its
// whole lifetime; every method is a single stateless request.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::document::{Document, kind};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Returned by [`CollectionClient::create`] when the server accepted the
/// document but sent back an empty body.
pub const CREATED_WITHOUT_ID: &str = "document created (no id returned)";

/// Raw HTTP client for a JSON REST API organised as named collections.
///
/// Routes: `GET /{c}`, `GET /{c}/{id}`, `POST /{c}`, `PUT /{c}/{id}`,
/// `DELETE /{c}/{id}`, all relative to the base URL given at construction.
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct CollectionClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CollectionClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` is the API root (e.g. `http://localhost:5103/api`);
    /// collection names are appended as path segments.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.into()));
        }
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Collection operations ────────────────────────────────────────

    /// Fetch every document of a collection, in server order.
    ///
    /// A bare JSON object is treated as a one-document collection and
    /// `null` as an empty one.
    pub async fn list(&self, collection: &str) -> Result<Vec<Document>, Error> {
        let url = self.endpoint(&[collection])?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let body = success_body(resp).await?;

        decode_collection(&body)
    }

    /// Fetch one document. `Ok(None)` when the server answers 404 or
    /// serves a JSON `null`.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        let url = self.endpoint(&[collection, id])?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(collection, id, "document not found");
            return Ok(None);
        }
        let body = success_body(resp).await?;

        serde_json::from_str::<Option<Document>>(&body).map_err(|e| Error::decode(e, &body))
    }

    /// Create a document, returning whatever identifies it.
    ///
    /// The result is the `id` from a JSON response when there is one. Callers
    /// must tolerate non-id strings: an empty body yields
    /// [`CREATED_WITHOUT_ID`], a JSON body without `id` yields that body
    /// re-encoded, and a non-JSON body is returned verbatim.
    pub async fn create(
        &self,
        collection: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<String, Error> {
        let url = self.endpoint(&[collection])?;
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        let text = success_body(resp).await?;

        Ok(created_id(&text))
    }

    /// Replace a document. `Ok(true)` on any 2xx.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<bool, Error> {
        let url = self.endpoint(&[collection, id])?;
        debug!("PUT {}", url);

        let resp = self.http.put(url).json(body).send().await?;
        success_body(resp).await?;
        Ok(true)
    }

    /// Delete a document. `Ok(true)` on any 2xx.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, Error> {
        let url = self.endpoint(&[collection, id])?;
        debug!("DELETE {}", url);

        let resp = self.http.delete(url).send().await?;
        success_body(resp).await?;
        Ok(true)
    }

    // ── Conveniences ─────────────────────────────────────────────────

    /// [`list`](Self::list) that never fails: errors are logged and an
    /// empty collection is returned.
    pub async fn fetch_once(&self, collection: &str) -> Vec<Document> {
        match self.list(collection).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!(collection, error = %e, "one-shot fetch failed");
                Vec::new()
            }
        }
    }

    /// Check that the API host answers at all.
    ///
    /// Any HTTP response counts as reachable; only transport failures
    /// are errors.
    pub async fn ping(&self) -> Result<(), Error> {
        debug!("GET {} (ping)", self.base_url);
        let resp = self.http.get(self.base_url.clone()).send().await?;
        debug!(status = resp.status().as_u16(), "API reachable");
        Ok(())
    }
}

// ── Response helpers ─────────────────────────────────────────────────

/// Read the body of a 2xx response, or turn the response into
/// [`Error::Http`].
async fn success_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::http(status, &body));
    }
    Ok(resp.text().await?)
}

fn decode_collection(body: &str) -> Result<Vec<Document>, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| Error::decode(e, body))?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(|e| Error::decode(e, body)),
        Value::Object(fields) => Document::try_from(fields)
            .map(|doc| vec![doc])
            .map_err(|e| Error::decode(e, body)),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::decode(
            format!("expected an array of documents, got {}", kind(&other)),
            body,
        )),
    }
}

fn created_id(text: &str) -> String {
    if text.is_empty() {
        return CREATED_WITHOUT_ID.to_owned();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => match value.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(id) if is_truthy(id) => id.to_string(),
            _ => value.to_string(),
        },
        Err(e) => {
            warn!(error = %e, body = text, "create response is not JSON, returning it verbatim");
            text.to_owned()
        }
    }
}

/// A falsy id (`null`, `false`, `0`, `""`) means the server named nothing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
