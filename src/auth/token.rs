//! JWT-bearer token exchange against the RingCentral OAuth endpoint.

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, error, info, warn};
use url::Url;
use zeroize::Zeroizing;

use crate::error::AuthError;

/// Grant type for the assertion-based exchange.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Client credentials plus the signed assertion of an admin user.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    pub jwt: Zeroizing<String>,
}

impl Credentials {
    /// True when all three values are present.
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.jwt.is_empty()
    }

    /// `Basic` authorization value: base64(client_id:client_secret).
    fn basic_auth_header(&self) -> Zeroizing<String> {
        let client_data = Zeroizing::new(format!("{}:{}", self.client_id, *self.client_secret));
        Zeroizing::new(format!("Basic {}", STANDARD.encode(client_data.as_bytes())))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("jwt", &"<redacted>")
            .finish()
    }
}

/// Token response from the OAuth endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// Holds the bearer token obtained from a single exchange.
pub struct TokenProvider {
    access_token: Zeroizing<String>,
}

impl TokenProvider {
    /// Exchange credentials for a token if they are complete.
    ///
    /// Returns `Ok(None)` when any credential is empty; requests made
    /// without a provider go out unauthenticated.
    pub async fn connect(
        http_client: &reqwest::Client,
        token_url: &Url,
        credentials: &Credentials,
    ) -> Result<Option<Self>, AuthError> {
        if !credentials.is_complete() {
            warn!("Credentials incomplete, skipping token exchange");
            return Ok(None);
        }

        Self::exchange(http_client, token_url, credentials)
            .await
            .map(Some)
    }

    /// Perform the JWT-bearer exchange.
    pub async fn exchange(
        http_client: &reqwest::Client,
        token_url: &Url,
        credentials: &Credentials,
    ) -> Result<Self, AuthError> {
        if !credentials.is_complete() {
            return Err(AuthError::MissingCredentials);
        }

        let params = [
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", credentials.jwt.as_str()),
        ];

        debug!("Requesting access token from {}", token_url);

        let response = http_client
            .post(token_url.clone())
            .header(AUTHORIZATION, credentials.basic_auth_header().as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&params)
            .send()
            .await
            .map_err(AuthError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Token exchange failed: HTTP {} - {}", status, body);
            return Err(AuthError::TokenExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

        if token_response.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse(
                "empty access_token".to_string(),
            ));
        }

        info!(
            "Acquired access token (type: {}, expires in: {:?}s)",
            token_response.token_type, token_response.expires_in
        );

        Ok(Self {
            access_token: Zeroizing::new(token_response.access_token),
        })
    }

    /// Wrap a fixed token.
    #[cfg(test)]
    pub(crate) fn from_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Zeroizing::new(access_token.into()),
        }
    }

    /// The bearer token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("access_token", &"<redacted>")
            .finish()
    }
}
