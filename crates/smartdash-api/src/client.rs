// HTTP client gateway for the Smart Solutions monitoring API.
//
// Base path: /api/v1/
// Auth: `Authorization: Bearer <token>` + `X-User-Id: <id>`, read from the
// credential source on every request.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::credentials::CredentialSource;
use crate::transport::TransportConfig;

const USER_ID_HEADER: &str = "X-User-Id";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async gateway to the monitoring backend.
///
/// Every outbound call goes through this type. Per-domain call groups live
/// in the sibling modules as inherent methods (`auth`, `devices`,
/// `sensors`, `alerts`).
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialSource>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a gateway for `base_url` (e.g. `http://localhost:8080/api/v1`).
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            credentials,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            credentials,
        })
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"devices/getAllDevices"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Auth headers ─────────────────────────────────────────────────

    fn authorize(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let req = match self.credentials.token() {
            Some(token) => req.header(AUTHORIZATION, bearer(token.expose_secret())?),
            None => req,
        };
        self.with_user_id(req)
    }

    fn with_user_id(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let Some(user_id) = self.credentials.user_id() else {
            return Ok(req);
        };
        let value = HeaderValue::from_str(&user_id).map_err(|_| Error::InvalidHeader {
            header: USER_ID_HEADER,
        })?;
        Ok(req.header(USER_ID_HEADER, value))
    }

    /// The token currently held by the credential source, if any.
    pub(crate) fn current_token(&self) -> Option<secrecy::SecretString> {
        self.credentials.token()
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.authorize(self.http.get(url))?.send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .authorize(self.http.get(url).query(params))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .authorize(self.http.post(url).json(body))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// POST with a caller-built `Authorization` header that replaces the
    /// session-derived one.
    pub(crate) async fn post_with_bearer<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} (explicit bearer)");

        let req = self.http.post(url).json(body).header(AUTHORIZATION, bearer(token)?);
        let resp = self.with_user_id(req)?.send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self
            .authorize(self.http.put(url).json(body))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self
            .authorize(self.http.patch(url).json(body))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn patch_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self
            .authorize(self.http.patch(url).json(body))?
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    /// PATCH without a request body.
    pub(crate) async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self.authorize(self.http.patch(url))?.send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.authorize(self.http.delete(url))?.send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty());

        debug!(status = status.as_u16(), ?message, "request rejected");
        Error::Rejected {
            status: status.as_u16(),
            message,
            body,
        }
    }
}

fn bearer(token: &str) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        Error::InvalidHeader {
            header: "Authorization",
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::Anonymous;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::new(
            "http://localhost:8080/api/v1",
            &TransportConfig::default(),
            Arc::new(Anonymous),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/v1/");
        assert_eq!(
            client.url("devices/getAllDevices").unwrap().as_str(),
            "http://localhost:8080/api/v1/devices/getAllDevices"
        );
    }

    #[test]
    fn existing_trailing_slash_is_kept_single() {
        let client = ApiClient::new(
            "http://example.test/api/v1/",
            &TransportConfig::default(),
            Arc::new(Anonymous),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "http://example.test/api/v1/");
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let value = bearer("tok").unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer tok");
    }

    #[test]
    fn bearer_rejects_control_characters() {
        assert!(matches!(
            bearer("bad\ntoken"),
            Err(Error::InvalidHeader { .. })
        ));
    }
}
