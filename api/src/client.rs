//! Boxoffice API client implementation

use crate::error::ApiError;
use crate::notify::Notifier;
use crate::types::{ApiErrorBody, ApiPrefix, GENERIC_ERROR_MESSAGE, message_for_code};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Typed client for the marketplace API
///
/// All requests carry credentials (cookie-based session) and are addressed
/// as `{base_url}/{prefix}/{path}`. Non-2xx responses are mapped through the
/// internal error-code table and reported to the user through the injected
/// [`Notifier`] before the error is returned.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a new client against the given base URL
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the underlying HTTP client cannot be
    /// constructed (TLS backend initialization).
    pub fn new(base_url: impl Into<String>, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            notifier,
        })
    }

    /// GET a JSON resource
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, non-2xx status, or a body
    /// that does not decode as `T`. The user notification has already fired.
    pub async fn get<T: DeserializeOwned>(
        &self,
        prefix: ApiPrefix,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.endpoint(prefix, path)).query(params);
        self.execute(request).await
    }

    /// POST a JSON body
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, non-2xx status, or a body
    /// that does not decode as `T`. The user notification has already fired.
    pub async fn post<T: DeserializeOwned>(
        &self,
        prefix: ApiPrefix,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.endpoint(prefix, path)).json(body);
        self.execute(request).await
    }

    /// PUT a JSON body
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, non-2xx status, or a body
    /// that does not decode as `T`. The user notification has already fired.
    pub async fn put<T: DeserializeOwned>(
        &self,
        prefix: ApiPrefix,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let request = self.http.put(self.endpoint(prefix, path)).json(body);
        self.execute(request).await
    }

    /// PATCH a JSON body
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, non-2xx status, or a body
    /// that does not decode as `T`. The user notification has already fired.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        prefix: ApiPrefix,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let request = self.http.patch(self.endpoint(prefix, path)).json(body);
        self.execute(request).await
    }

    /// DELETE a resource
    ///
    /// Deletions do not decode a response body; a 2xx status is success.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure or non-2xx status. The user
    /// notification has already fired.
    pub async fn delete(&self, prefix: ApiPrefix, path: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.endpoint(prefix, path));
        self.execute_unit(request).await
    }

    /// POST a `multipart/form-data` body (the `*_FILE` variant)
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, non-2xx status, or a body
    /// that does not decode as `T`. The user notification has already fired.
    pub async fn post_file<T: DeserializeOwned>(
        &self,
        prefix: ApiPrefix,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.endpoint(prefix, path)).multipart(form);
        self.execute(request).await
    }

    /// PUT a `multipart/form-data` body (the `*_FILE` variant)
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, non-2xx status, or a body
    /// that does not decode as `T`. The user notification has already fired.
    pub async fn put_file<T: DeserializeOwned>(
        &self,
        prefix: ApiPrefix,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let request = self.http.put(self.endpoint(prefix, path)).multipart(form);
        self.execute(request).await
    }

    fn endpoint(&self, prefix: ApiPrefix, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/{}", self.base_url, prefix.as_str())
        } else {
            format!("{}/{}/{}", self.base_url, prefix.as_str(), path)
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;

        response.json::<T>().await.map_err(|e| {
            self.notifier.error(GENERIC_ERROR_MESSAGE);
            ApiError::Decode(e.to_string())
        })
    }

    async fn execute_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    /// Send the request and turn any failure into a notified [`ApiError`]
    ///
    /// Exactly one notification fires per failed request; success never
    /// notifies (callers opt in to their own success toasts).
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "API request failed to send");
                self.notifier.error(GENERIC_ERROR_MESSAGE);
                return Err(ApiError::Request(error.to_string()));
            },
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .json::<ApiErrorBody>()
            .await
            .unwrap_or_default();

        let message = body
            .code
            .as_deref()
            .and_then(message_for_code)
            .unwrap_or(GENERIC_ERROR_MESSAGE);

        tracing::warn!(
            status = status.as_u16(),
            code = body.code.as_deref().unwrap_or("-"),
            "API request returned an error"
        );
        self.notifier.error(message);

        Err(ApiError::Api {
            status: status.as_u16(),
            code: body.code,
            message: message.to_string(),
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
