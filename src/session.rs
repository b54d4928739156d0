use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::TokenSource;

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Youtube,
    Spotify,
}

impl Service {
    fn token_url(self) -> &'static str {
        match self {
            Service::Youtube => GOOGLE_TOKEN_URL,
            Service::Spotify => SPOTIFY_TOKEN_URL,
        }
    }
}

/// OAuth token endpoint response. Both Google and Spotify answer with this shape.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    #[error("Invalid refresh token: {reason}")]
    InvalidRefreshToken { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// The API rejected the access token (HTTP 401).
#[derive(Debug, thiserror::Error)]
#[error("Access token rejected (401 Unauthorized)")]
pub struct Unauthorized;

/// `error_for_status`, except that a 401 becomes [`Unauthorized`] so a
/// [`Session`] can tell an expired token from other failures.
pub fn check_status(response: Response) -> Result<Response> {
    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(Unauthorized.into());
    }
    Ok(response.error_for_status()?)
}

fn is_unauthorized(error: &color_eyre::Report) -> bool {
    error.chain().any(|cause| cause.is::<Unauthorized>())
}

/// Exchange a refresh token for a fresh access token.
///
/// Spotify wants the client credentials as HTTP basic auth, Google wants them
/// in the form body.
pub async fn refresh_access_token(
    service: Service,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, RefreshTokenError> {
    let client = reqwest::Client::new();

    let mut params = HashMap::new();
    params.insert("grant_type", "refresh_token");
    params.insert("refresh_token", refresh_token);
    params.insert("client_id", client_id);

    let request = match service {
        Service::Spotify => client
            .post(service.token_url())
            .basic_auth(client_id, Some(client_secret)),
        Service::Youtube => {
            params.insert("client_secret", client_secret);
            client.post(service.token_url())
        }
    };

    let response = request
        .form(&params)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(RefreshTokenError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(RefreshTokenError::InvalidRefreshToken {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(RefreshTokenError::FailedToParseResponse)?;

    Ok(token_response)
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self) -> Result<TokenResponse, RefreshTokenError>;
}

/// Refresh-token grant against the service's OAuth endpoint.
pub struct OAuthRefresher {
    service: Service,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

#[async_trait::async_trait]
impl TokenRefresher for OAuthRefresher {
    async fn refresh(&self) -> Result<TokenResponse, RefreshTokenError> {
        refresh_access_token(
            self.service,
            &self.client_id,
            &self.client_secret,
            &self.refresh_token,
        )
        .await
    }
}

/// The access token of one service, refreshed in place when the API rejects
/// it and refresh credentials are configured.
pub struct Session {
    service: Service,
    access_token: RwLock<String>,
    refresher: Option<Box<dyn TokenRefresher>>,
}

impl Session {
    fn new(
        service: Service,
        access_token: String,
        refresher: Option<Box<dyn TokenRefresher>>,
    ) -> Self {
        Self {
            service,
            access_token: RwLock::new(access_token),
            refresher,
        }
    }

    /// Turns configured credentials into a session. A configured access token
    /// is used as-is and never refreshed.
    pub async fn open(service: Service, source: TokenSource) -> Result<Self, RefreshTokenError> {
        match source {
            TokenSource::AccessToken(token) => Ok(Self::new(service, token, None)),
            TokenSource::Refresh {
                client_id,
                client_secret,
                refresh_token,
            } => {
                let refresher = OAuthRefresher {
                    service,
                    client_id,
                    client_secret,
                    refresh_token,
                };
                log::debug!("Refreshing {:?} access token", service);
                let response = refresher.refresh().await?;
                log::debug!(
                    "Got {:?} access token, expires in {}s",
                    service,
                    response.expires_in
                );
                Ok(Self::new(
                    service,
                    response.access_token,
                    Some(Box::new(refresher)),
                ))
            }
        }
    }

    pub async fn access_token(&self) -> String {
        self.access_token.read().await.clone()
    }

    /// Runs `request` with the current access token. If the API answers 401
    /// and the session can refresh, the token is refreshed and `request` is
    /// retried once.
    pub async fn call<T, F, Fut>(&self, request: F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let error = match request(self.access_token().await).await {
            Err(error) if is_unauthorized(&error) => error,
            result => return result,
        };

        let Some(refresher) = &self.refresher else {
            return Err(error);
        };

        log::info!("{:?} access token expired, refreshing", self.service);
        let response = refresher
            .refresh()
            .await
            .wrap_err_with(|| format!("Failed to refresh {:?} access token", self.service))?;
        *self.access_token.write().await = response.access_token.clone();

        request(response.access_token).await
    }
}
