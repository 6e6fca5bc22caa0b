use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{header, multipart, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ErroresCampo};

/// Thin wrapper over `reqwest` that fixes the base url and headers for all
/// backend calls and turns non-2xx responses into `ApiError`.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    bearer: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            bearer: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Installs (or clears) the bearer token sent with every request.
    pub fn set_bearer(&self, token: Option<String>) {
        match self.bearer.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer.read().map(|g| g.is_some()).unwrap_or(false)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.http.request(method, self.url(path));
        let token = self.bearer.read().ok().and_then(|g| g.clone());
        match token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        Self::send_json(self.request(Method::GET, path)).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        Self::send_json(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Self::send_json(self.request(Method::POST, path).json(body)).await
    }

    /// POST whose response body is ignored.
    pub async fn post_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        Self::send_empty(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Self::send_json(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        Self::send_json(self.request(Method::PATCH, path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        Self::send_empty(self.request(Method::DELETE, path)).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<T, ApiError> {
        Self::send_json(self.request(Method::POST, path).multipart(form)).await
    }

    async fn send_json<T: DeserializeOwned>(rb: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send(rb).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_empty(rb: RequestBuilder) -> Result<(), ApiError> {
        Self::send(rb).await.map(|_| ())
    }

    async fn send(rb: RequestBuilder) -> Result<String, ApiError> {
        let resp = rb.send().await?;
        let status = resp.status();
        let url = resp.url().path().to_string();
        let body = resp.text().await?;
        if status.is_success() {
            debug!(%status, %url, "api response");
            return Ok(body);
        }
        warn!(%status, %url, "api error response");
        Err(error_from_response(status, &body))
    }
}

/// `{ "count": N }` returned by the stats endpoints; a missing count is 0.
#[derive(Debug, serde::Deserialize)]
pub struct Conteo {
    #[serde(default)]
    pub count: Option<i64>,
}

impl Conteo {
    pub fn valor(&self) -> i64 {
        self.count.unwrap_or(0)
    }
}

/// Maps a failed response onto the client's error taxonomy.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> ApiError {
    let json: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = json
        .as_ref()
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .or_else(|| v.get("error").and_then(|m| m.as_str()))
        })
        .map(str::to_string);

    match status {
        StatusCode::BAD_REQUEST => match (message, json.as_ref().and_then(field_errors)) {
            (None, Some(campos)) => ApiError::Validation(campos),
            (message, _) => ApiError::Status {
                status: status.as_u16(),
                message: message.unwrap_or_default(),
            },
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::Unauthorized(message.unwrap_or_else(|| "No autorizado".into()))
        }
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message: message.unwrap_or_default(),
        },
    }
}

/// A 400 body made only of string values is a field → message map.
fn field_errors(v: &serde_json::Value) -> Option<ErroresCampo> {
    let obj = v.as_object()?;
    if obj.is_empty() {
        return None;
    }
    obj.iter()
        .map(|(k, v)| v.as_str().map(|m| (k.clone(), m.to_string())))
        .collect()
}
