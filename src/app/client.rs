//! Authorized Resource Client
//!
//! The single chokepoint for authenticated network calls. Every request
//! carries the current session token as a bearer credential, and every
//! outcome is classified into success or one [`ApiError`] category. This is
//! the only place that decides a failure means the session is dead: a
//! 401/403 clears the [`SessionStore`] before the error is returned.
//!
//! Without a token the request fails with [`ApiError::Unauthenticated`] and
//! nothing is sent.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app::config::Config;
use crate::app::session::SessionStore;
use crate::shared::error::ApiError;

/// Describes one outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::transport(format!("invalid request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// Successful response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub status: u16,
    pub body: String,
}

impl Payload {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client bound to the process session
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Config,
    http: Client,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: Config, session: SessionStore) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http,
            session,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Issue an authorized request and classify the outcome.
    pub async fn request(&self, request: ApiRequest) -> Result<Payload, ApiError> {
        let Some(token) = self.session.get() else {
            tracing::debug!(endpoint = %request.endpoint, "[API] No session, request blocked");
            return Err(ApiError::Unauthenticated);
        };

        let url = self.config.api_url(&request.endpoint);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .header(reqwest::header::ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, endpoint = %request.endpoint, "[API] Sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(&request.endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&request.endpoint, e))?;

        if status.is_success() {
            tracing::debug!(endpoint = %request.endpoint, status = status.as_u16(), "[API] Success");
            return Ok(Payload {
                status: status.as_u16(),
                body,
            });
        }

        let error = ApiError::from_status(status.as_u16(), &request.endpoint, body);
        if let ApiError::Unauthorized { status } = &error {
            tracing::warn!(endpoint = %request.endpoint, status, "[API] Credentials rejected, clearing session");
            self.session.clear();
        } else {
            tracing::debug!(endpoint = %request.endpoint, error = %error, "[API] Request failed");
        }
        Err(error)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(ApiRequest::get(endpoint)).await?.json()
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(ApiRequest::post(endpoint).json(body)?)
            .await?
            .json()
    }

    /// Call without credentials, for the login handshake only
    pub async fn get_public_text(&self, endpoint: &str) -> Result<String, ApiError> {
        let url = self.config.api_url(endpoint);
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;
        if status.is_success() {
            Ok(body)
        } else {
            // No session is involved here, so a 401 is just a refusal.
            Err(match ApiError::from_status(status.as_u16(), endpoint, body.clone()) {
                ApiError::Unauthorized { status } => ApiError::Rejected {
                    status,
                    message: body,
                },
                other => other,
            })
        }
    }

    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> ApiError {
        let message = if err.is_timeout() {
            format!(
                "request timed out after {}s",
                self.config.request_timeout().as_secs()
            )
        } else {
            err.to_string()
        };
        tracing::debug!(endpoint, error = %message, "[API] Transport failure");
        ApiError::transport(message)
    }
}
