//! Request builder and response parser for the MessFinder REST API.
//!
//! # Design
//! `ApiClient` holds the fixed configuration and a handle to session storage.
//! It never performs I/O: [`ApiClient::request`] produces an `HttpRequest`
//! carrying the bearer token and timeout, and [`ApiClient::parse`] turns the
//! host's `HttpResponse` into an [`Envelope`] or a normalized [`ApiError`].
//! The only side effect is the 401 purge of persisted credentials, which
//! happens inside `parse` so every call path gets it.
//!
//! Services return typed [`Call`] values; [`ApiClient::send`] is the
//! convenience that runs one through a [`Transport`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::envelope::{server_message, Envelope};
use crate::error::{ApiError, GENERIC_ERROR_MESSAGE, SESSION_EXPIRED_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::storage::{self, SessionStorage};

/// A built request whose successful envelope decodes into `T`.
pub struct Call<T> {
    request: HttpRequest,
    _response: PhantomData<fn() -> T>,
}

impl<T> Call<T> {
    pub(crate) fn new(request: HttpRequest) -> Self {
        Self {
            request,
            _response: PhantomData,
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn into_request(self) -> HttpRequest {
        self.request
    }
}

impl<T> Clone for Call<T> {
    fn clone(&self) -> Self {
        Self::new(self.request.clone())
    }
}

impl<T> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call").field("request", &self.request).finish()
    }
}

/// Single point of outbound HTTP traffic.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    base_url: String,
    storage: Arc<dyn SessionStorage>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, storage: Arc<dyn SessionStorage>) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            config,
            base_url,
            storage,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &dyn SessionStorage {
        self.storage.as_ref()
    }

    /// Build a request against `path` (relative to the versioned base URL).
    ///
    /// Reads the persisted token on every call; a storage failure is logged
    /// and the request goes out unauthenticated.
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        params: &[(&str, String)],
    ) -> HttpRequest {
        let mut url = format!("{}{}", self.base_url, path);
        if !params.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = Vec::new();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        match storage::load_token(self.storage()) {
            Ok(Some(token)) => {
                headers.push(("authorization".to_string(), format!("Bearer {token}")));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read persisted token"),
        }

        debug!(%method, %url, "built request");
        HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: self.config.timeout(),
        }
    }

    pub(crate) fn get<T>(&self, path: &str, params: &[(&str, String)]) -> Call<T> {
        Call::new(self.request(HttpMethod::Get, path, None, params))
    }

    pub(crate) fn bodyless<T>(&self, method: HttpMethod, path: &str) -> Call<T> {
        Call::new(self.request(method, path, None, &[]))
    }

    pub(crate) fn with_json<T, B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<Call<T>, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Call::new(self.request(method, path, Some(body), &[])))
    }

    /// Interpret a response.
    ///
    /// - 401: persisted token and user are deleted, `Unauthorized` returned.
    /// - other non-2xx: `Http` with the server message or a generic one.
    /// - 2xx with `success: false`: treated like a non-2xx.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Envelope<T>, ApiError> {
        if response.status == 401 {
            warn!("received 401, clearing persisted credentials");
            if let Err(e) = storage::purge_session(self.storage()) {
                warn!(error = %e, "failed to clear persisted credentials");
            }
            return Err(ApiError::Unauthorized {
                message: server_message(&response.body)
                    .unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_string()),
            });
        }
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: server_message(&response.body)
                    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        if !envelope.success {
            let message = if envelope.message.trim().is_empty() {
                GENERIC_ERROR_MESSAGE.to_string()
            } else {
                envelope.message
            };
            return Err(ApiError::Http {
                status: envelope.status_code.unwrap_or(response.status),
                message,
            });
        }
        Ok(envelope)
    }

    /// Execute `call` on `transport` and parse the result. A transport
    /// failure becomes `ApiError::Network`; nothing is retried.
    pub fn send<T, X>(&self, transport: &X, call: Call<T>) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        X: Transport + ?Sized,
    {
        let request = call.into_request();
        match transport.execute(&request) {
            Ok(response) => self.parse(response),
            Err(e) => {
                warn!(method = %request.method, url = %request.url, error = %e, "network error");
                Err(ApiError::network())
            }
        }
    }
}
