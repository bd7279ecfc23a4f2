//! HTTP helpers for JSON APIs with consistent timeouts and error handling. The
//! auth provider and profile store clients use these helpers to avoid
//! duplicating request setup. The helpers do not store secrets or tokens; they
//! only attach headers provided by callers.

use crate::{
    error::{sanitize_body, ApiError},
    APP_USER_AGENT,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default request timeout applied to all helpers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON client bound to one API base URL.
#[derive(Clone, Debug)]
pub struct JsonClient {
    http: Client,
    base_url: String,
}

impl JsonClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a URL from the configured base URL and the provided path.
    #[must_use]
    pub fn build_url(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    /// Posts JSON and expects no meaningful response body.
    ///
    /// # Errors
    /// Returns an error on transport failures or non-2xx responses.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        headers: &[(String, String)],
    ) -> Result<(), ApiError> {
        let url = self.build_url(path);
        let builder = with_headers(self.http.post(&url).json(body), headers);
        let response = send(builder).await?;
        handle_empty_response(response).await
    }

    /// Posts JSON and parses a JSON response.
    ///
    /// # Errors
    /// Returns an error on transport failures, non-2xx responses, or undecodable bodies.
    pub async fn post_json_response<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        headers: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        let builder = with_headers(self.http.post(&url).json(body), headers);
        let response = send(builder).await?;
        handle_json_response(response).await
    }

    /// Fetches JSON with optional query parameters.
    ///
    /// # Errors
    /// Returns an error on transport failures, non-2xx responses, or undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        let builder = with_headers(self.http.get(&url).query(query), headers);
        let response = send(builder).await?;
        handle_json_response(response).await
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn with_headers(mut builder: RequestBuilder, headers: &[(String, String)]) -> RequestBuilder {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    builder.send().await.map_err(map_request_error)
}

/// Maps transport errors into `ApiError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

/// Handles empty responses and returns sanitized HTTP errors when needed.
async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    debug!(status, "request rejected");
    ApiError::Http {
        status,
        message: sanitize_body(&extract_error_message(&body)),
    }
}

/// Pulls the human-readable message out of the JSON error shapes used by the
/// auth provider (`msg`, `error_description`) and the profile store
/// (`error.message`). Falls back to the raw body.
fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let candidates = [
        value.get("msg"),
        value.get("error_description"),
        value.get("message"),
        value.get("error").and_then(|error| error.get("message")),
        value.get("error"),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .map_or_else(|| body.to_string(), str::to_string);
    message
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        ok: bool,
    }

    #[test]
    fn build_url_joins_base_and_path() {
        assert_eq!(
            build_url_with_base("https://api.camedu.dev/", "/auth/v1/otp"),
            "https://api.camedu.dev/auth/v1/otp"
        );
        assert_eq!(build_url_with_base("  ", "/auth/v1/otp"), "/auth/v1/otp");
    }

    #[test]
    fn extract_error_message_understands_provider_shapes() {
        assert_eq!(
            extract_error_message(r#"{"code":403,"msg":"Token has expired or is invalid"}"#),
            "Token has expired or is invalid"
        );
        assert_eq!(
            extract_error_message(r#"{"error":"invalid_grant","error_description":"Bad code"}"#),
            "Bad code"
        );
        assert_eq!(
            extract_error_message(
                r#"{"data":null,"error":{"status":400,"name":"ValidationError","message":"Invalid identifier or password"}}"#
            ),
            "Invalid identifier or password"
        );
        assert_eq!(extract_error_message("plain text"), "plain text");
    }

    #[tokio::test]
    async fn post_json_response_sends_headers_and_decodes() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/ping")
            .match_header("apikey", "anon")
            .match_body(mockito::Matcher::Json(json!({"hello": "world"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = JsonClient::new(&server.url()).unwrap();
        let pong: Pong = client
            .post_json_response(
                "/ping",
                &json!({"hello": "world"}),
                &[("apikey".to_string(), "anon".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(pong, Pong { ok: true });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_maps_to_http_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/fail")
            .with_status(422)
            .with_body(r#"{"msg":"Email address is invalid"}"#)
            .create_async()
            .await;

        let client = JsonClient::new(&server.url()).unwrap();
        let result = client.post_json("/fail", &json!({}), &[]).await;

        assert_eq!(
            result,
            Err(ApiError::Http {
                status: 422,
                message: "Email address is invalid".to_string(),
            })
        );
    }
}
