use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Thin wrapper over `reqwest` that owns the base URL and the bearer
/// token. Every service call goes through here so auth and error
/// mapping live in one place.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method, &url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let resp = self.request(Method::GET, path).send().await?;
        Self::read_json(resp).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.request(Method::POST, path).json(body).send().await?;
        Self::read_json(resp).await
    }

    pub async fn put_json<B>(&self, path: &str, body: &B) -> AppResult<()>
    where
        B: Serialize + ?Sized,
    {
        let resp = self.request(Method::PUT, path).json(body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// The agenda status endpoint takes the new status as a plain-text
    /// body, not JSON.
    pub async fn put_text(&self, path: &str, body: &str) -> AppResult<()> {
        let resp = self
            .request(Method::PUT, path)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(body.to_string())
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let resp = self.request(Method::DELETE, path).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> AppResult<T> {
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn check(resp: Response) -> AppResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            let message = if message.trim().is_empty() {
                "Resource not found".to_string()
            } else {
                message
            };
            return Err(AppError::NotFound(message));
        }

        Err(AppError::ServerRejection {
            status: status.as_u16(),
            message,
        })
    }
}
