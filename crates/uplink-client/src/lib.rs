//! Control-plane REST client for upload sessions.
//!
//! One [`ApiClient`] holds one bearer credential, obtained once via the OAuth
//! password grant and never refreshed. Every session operation checks the
//! credential first (before any network I/O), stamps it as an Authorization
//! header, enforces the operation's single expected status code, and returns
//! the server's session snapshot wholesale — callers replace their local
//! value with the return, they never patch fields.

pub mod error;

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use uplink_core::{ClientConfig, UploadSession};

pub use error::ApiError;

const SESSION_UPLOAD_PATH: &str = "/PublicAPI/Rest/sessionUpload";
const TOKEN_PATH: &str = "/oauth2/connect/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// HTTP client for the upload-session control plane.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Build a client from config and authenticate in one step.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let mut client = Self::new(config.server.clone())?;
        client
            .authenticate(
                &config.client_id,
                &config.client_secret,
                &config.username,
                &config.password,
            )
            .await
            .context("Authentication against the control plane failed")?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Guard invoked by every session operation. Fails before any request is
    /// sent when no token has been stored.
    fn bearer(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::Unauthorized)
    }

    /// Check the single expected status code for an operation; anything else
    /// becomes `ServiceCallFailed` carrying the raw body.
    async fn expect_status(response: Response, expected: StatusCode) -> Result<Response, ApiError> {
        let status = response.status();
        if status != expected {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::ServiceCallFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// One password-grant exchange against the token endpoint. The username
    /// is lower-cased before transmission (identity matching on the remote
    /// side is case-insensitive). On success the bearer token is stored for
    /// the lifetime of this client instance; no expiry is tracked.
    pub async fn authenticate(
        &mut self,
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        // Identity matching is case-insensitive on the remote side.
        let username = username.to_lowercase();
        let params = [
            ("grant_type", "password"),
            ("username", username.as_str()),
            ("password", password),
            ("scope", "api"),
        ];

        let response = self
            .client
            .post(self.build_url(TOKEN_PATH))
            .basic_auth(client_id, Some(client_secret))
            .form(&params)
            .send()
            .await?;

        let response = Self::expect_status(response, StatusCode::OK).await?;
        let token: TokenResponse = response.json().await?;
        self.token = Some(token.access_token);

        tracing::debug!(base_url = %self.base_url, "Authenticated against control plane");
        Ok(())
    }

    /// Create a new upload session in the given folder. Expects HTTP 201.
    pub async fn new_session(&self, folder_id: &str) -> Result<UploadSession, ApiError> {
        let token = self.bearer()?;

        let response = self
            .client
            .post(self.build_url(SESSION_UPLOAD_PATH))
            .bearer_auth(token)
            .json(&serde_json::json!({ "FolderId": folder_id }))
            .send()
            .await?;

        let response = Self::expect_status(response, StatusCode::CREATED).await?;
        let session: UploadSession = response.json().await?;

        tracing::info!(
            session_id = %session.session_id,
            folder_id = %session.folder_id,
            "Created upload session"
        );
        Ok(session)
    }

    /// Mark a session finished-uploading. Sends the full snapshot with
    /// `State = 1`; the server's response is authoritative and may differ
    /// from the local mutation, so callers must replace their snapshot with
    /// the return value.
    pub async fn finish_session(&self, session: &UploadSession) -> Result<UploadSession, ApiError> {
        let token = self.bearer()?;

        let response = self
            .client
            .put(self.build_url(&format!("{}/{}", SESSION_UPLOAD_PATH, session.id)))
            .bearer_auth(token)
            .json(&session.finished())
            .send()
            .await?;

        let response = Self::expect_status(response, StatusCode::OK).await?;
        let session: UploadSession = response.json().await?;

        tracing::info!(session_id = %session.session_id, state = session.state, "Finished upload session");
        Ok(session)
    }

    /// Refresh a session snapshot and return it with its lifecycle state.
    /// Callers must replace their local snapshot with the returned one: the
    /// upload target may have been rotated server-side.
    pub async fn session_status(
        &self,
        session: &UploadSession,
    ) -> Result<(UploadSession, i32), ApiError> {
        let token = self.bearer()?;

        let response = self
            .client
            .get(self.build_url(&format!("{}/{}", SESSION_UPLOAD_PATH, session.id)))
            .bearer_auth(token)
            .send()
            .await?;

        let response = Self::expect_status(response, StatusCode::OK).await?;
        let session: UploadSession = response.json().await?;
        let state = session.state;
        Ok((session, state))
    }

    /// Delete a session by its correlation identifier (`SessionId`, not `Id`
    /// — deletion lives on a separate API surface with its own namespace).
    pub async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        let token = self.bearer()?;

        let response = self
            .client
            .delete(self.build_url(&format!("/api/v1/sessions/{}", session_id)))
            .bearer_auth(token)
            .send()
            .await?;

        Self::expect_status(response, StatusCode::OK).await?;

        tracing::info!(session_id = %session_id, "Deleted upload session");
        Ok(())
    }
}
