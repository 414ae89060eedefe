// Async HTTP client for the admin backend.
//
// Base path: whatever the profile configures (e.g. `https://host/api/admin/`)
// Auth: `Authorization: Bearer <token>` from a `CredentialProvider`

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::CredentialProvider;
use crate::envelope::{Envelope, ErrorBody, WirePage};
use crate::error::Error;
use crate::transport::TransportConfig;

/// A CSV export body, streamed chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Bytes, Error>>;

/// Async client for the admin backend's resource endpoints.
///
/// Every resource family (users, transactions, predictions) shares the same
/// URL scheme and envelope, so the methods here are generic over the wire
/// record type and take the collection path segment as an argument.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, credential source, and transport config.
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            credentials,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            credentials,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ensure the base URL ends with `/` so segments append rather than replace.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Attach the bearer token and timeout, failing fast when signed out.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let token = self.credentials.credential().ok_or(Error::MissingCredential)?;
        Ok(builder
            .bearer_auth(token.expose_secret())
            .timeout(self.timeout))
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Send the request; 401/403 are reported to the credential provider
    /// exactly once and surfaced as [`Error::Unauthorized`].
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let builder = self.authorize(builder)?;
        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            debug!(status = status.as_u16(), "credential rejected");
            self.credentials.on_unauthorized();
            return Err(Error::Unauthorized {
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    /// Read the body and unwrap the `{ success, data, message }` envelope.
    async fn parse_envelope<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(server_error(status, &body));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..floor_char_boundary(&body, 200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if !envelope.success {
            return Err(Error::Server {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".into()),
            });
        }

        envelope
            .data
            .ok_or_else(|| Error::MalformedEnvelope("`data` missing from successful response".into()))
    }

    /// Like [`parse_envelope`](Self::parse_envelope) but `data` may be absent.
    async fn parse_ack(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(server_error(status, &body));
        }
        // 204 No Content and empty bodies count as success.
        if body.trim().is_empty() {
            return Ok(());
        }

        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if envelope.success {
            Ok(())
        } else {
            Err(Error::Server {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".into()),
            })
        }
    }

    // ── Resource endpoints ───────────────────────────────────────────

    /// `GET /{collection}?page=..&limit=..&...`
    pub async fn list_records<T: DeserializeOwned>(
        &self,
        collection: &str,
        params: &[(&str, String)],
    ) -> Result<WirePage<T>, Error> {
        let url = self.url(&[collection])?;
        debug!("GET {url} params={params:?}");

        let resp = self.send(self.http.get(url).query(params)).await?;
        self.parse_envelope(resp).await
    }

    /// `GET /{collection}/{id}`
    pub async fn get_record<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T, Error> {
        let url = self.url(&[collection, id])?;
        debug!("GET {url}");

        let resp = self.send(self.http.get(url)).await?;
        self.parse_envelope(resp).await
    }

    /// `POST /{collection}`
    pub async fn create_record<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(&[collection])?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        self.parse_envelope(resp).await
    }

    /// `PUT /{collection}/{id}`
    pub async fn update_record<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(&[collection, id])?;
        debug!("PUT {url}");

        let resp = self.send(self.http.put(url).json(body)).await?;
        self.parse_envelope(resp).await
    }

    /// `DELETE /{collection}/{id}`
    pub async fn delete_record(&self, collection: &str, id: &str) -> Result<(), Error> {
        let url = self.url(&[collection, id])?;
        debug!("DELETE {url}");

        let resp = self.send(self.http.delete(url)).await?;
        self.parse_ack(resp).await
    }

    /// `GET /{collection}/export?...` -- CSV body streamed as it arrives.
    pub async fn export_records(
        &self,
        collection: &str,
        params: &[(&str, String)],
    ) -> Result<ByteStream, Error> {
        let url = self.url(&[collection, "export"])?;
        debug!("GET {url} params={params:?}");

        let builder = self
            .http
            .get(url)
            .query(params)
            .header(reqwest::header::ACCEPT, "text/csv");
        let resp = self.send(builder).await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(server_error(status, &body));
        }

        let timeout_secs = self.timeout.as_secs();
        let stream = resp
            .bytes_stream()
            .map_err(move |e| {
                trace!(error = %e, "export stream interrupted");
                if e.is_timeout() {
                    Error::Timeout { timeout_secs }
                } else {
                    Error::Transport(e)
                }
            })
            .boxed();
        Ok(stream)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Build an [`Error::Server`] from a non-2xx response body.
fn server_error(status: reqwest::StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body[..floor_char_boundary(body, 200)].to_owned()
            }
        });
    Error::Server {
        status: status.as_u16(),
        message,
    }
}

/// Largest index `<= max` that lies on a UTF-8 boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
