//! RingCentral REST API client.
//!
//! Covers the account extension and role endpoints the connector needs:
//! - Paged listing of extensions (principals) and user roles
//! - Reading and replacing an extension's assigned roles

pub mod models;
pub mod pagination;

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};
use url::Url;

use crate::auth::TokenProvider;
use crate::config::{Config, PaginationConfig};
use crate::error::{ApiError, SyncError};
use models::{AssignedRole, AssignedRolesResponse, AssignedRolesUpdate, Extension, Role};
use pagination::{Page, PageWindow, PaginatedFetcher};

/// Extension listing, relative to the API root.
pub const EXTENSIONS_PATH: &str = "account/~/extension";

/// Role listing, relative to the API root.
pub const USER_ROLES_PATH: &str = "account/~/user-role";

/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// RingCentral API client.
pub struct RingCentralClient {
    http_client: Client,
    api_root: Url,
    token: Option<TokenProvider>,
    pagination: PaginationConfig,
}

impl RingCentralClient {
    /// Build a client from configuration, exchanging credentials for a token
    /// when they are complete.
    pub async fn connect(config: &Config) -> Result<Self, SyncError> {
        let http_client = Self::http_client(config.request_timeout()).map_err(ApiError::from)?;
        let token_url = config.token_url().map_err(ApiError::from)?;
        let api_root = config.api_root().map_err(ApiError::from)?;

        // Skipped when credentials are incomplete
        let token =
            TokenProvider::connect(&http_client, &token_url, &config.credentials()).await?;

        Ok(Self::from_parts(
            http_client,
            api_root,
            token,
            config.pagination,
        ))
    }

    /// Assemble a client from already-built parts.
    pub fn from_parts(
        http_client: Client,
        api_root: Url,
        token: Option<TokenProvider>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            http_client,
            api_root,
            token,
            pagination,
        }
    }

    /// HTTP client with the per-request deadline applied.
    pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
    }

    /// True when requests carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch one page of extensions.
    pub async fn list_extensions(&self, window: PageWindow) -> Result<Page<Extension>, ApiError> {
        self.extensions(window.per_page()).fetch(window).await
    }

    /// Fetch one page of account roles.
    pub async fn list_user_roles(&self, window: PageWindow) -> Result<Page<Role>, ApiError> {
        self.user_roles(window.per_page()).fetch(window).await
    }

    /// Page walker over extensions.
    pub fn extensions(&self, per_page: u32) -> PaginatedFetcher<'_, Extension> {
        PaginatedFetcher::new(self, EXTENSIONS_PATH, self.pagination.principals, per_page)
    }

    /// Page walker over account roles.
    pub fn user_roles(&self, per_page: u32) -> PaginatedFetcher<'_, Role> {
        PaginatedFetcher::new(self, USER_ROLES_PATH, self.pagination.roles, per_page)
    }

    /// Roles currently assigned to an extension, in server order.
    pub async fn get_assigned_roles(
        &self,
        extension_id: &str,
    ) -> Result<Vec<AssignedRole>, ApiError> {
        let url = self.assigned_roles_url(extension_id)?;
        let response: AssignedRolesResponse = self.get_json(url).await?;

        debug!(
            "Extension {} has {} assigned roles",
            extension_id,
            response.records.len()
        );
        Ok(response.records)
    }

    /// Replace an extension's assigned roles with exactly `role_ids`.
    pub async fn replace_assigned_roles(
        &self,
        extension_id: &str,
        role_ids: &[String],
    ) -> Result<(), ApiError> {
        let url = self.assigned_roles_url(extension_id)?;
        self.put_json(url, &AssignedRolesUpdate::new(role_ids))
            .await?;

        info!(
            "Replaced assigned roles of extension {} ({} roles)",
            extension_id,
            role_ids.len()
        );
        Ok(())
    }

    fn assigned_roles_url(&self, extension_id: &str) -> Result<Url, ApiError> {
        self.endpoint(&format!(
            "{}/{}/assigned-role",
            EXTENSIONS_PATH,
            urlencoding::encode(extension_id)
        ))
    }

    /// Resolve a path against the API root.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.api_root.join(path)?)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let request = self
            .http_client
            .request(method, url)
            .header(ACCEPT, "application/json");

        match &self.token {
            Some(token) => request.bearer_auth(token.access_token()),
            None => request,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("GET {}", url);

        let response = self
            .request(reqwest::Method::GET, url.clone())
            .send()
            .await?;
        let response = Self::check_status(reqwest::Method::GET, &url, response).await?;

        // Body read failures stay network errors; only bad JSON is a decode error
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{url}: {e}")))
    }

    async fn put_json<B: Serialize>(&self, url: Url, body: &B) -> Result<(), ApiError> {
        debug!("PUT {}", url);

        let response = self
            .request(reqwest::Method::PUT, url.clone())
            .json(body)
            .send()
            .await?;
        Self::check_status(reqwest::Method::PUT, &url, response).await?;
        Ok(())
    }

    async fn check_status(
        method: reqwest::Method,
        url: &Url,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Keep the server's error body for the caller
        let body = response.text().await.unwrap_or_default();
        error!("{} {} failed: HTTP {} - {}", method, url, status, body);
        Err(ApiError::Status {
            status: status.as_u16(),
            method: method.to_string(),
            url: url.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn client(base: &str) -> RingCentralClient {
        let config = test_config(base);
        RingCentralClient::from_parts(
            Client::new(),
            config.api_root().unwrap(),
            None,
            config.pagination,
        )
    }

    #[test]
    fn test_endpoint_resolution() {
        let client = client("https://platform.example.test/restapi");
        assert_eq!(
            client.endpoint(EXTENSIONS_PATH).unwrap().as_str(),
            "https://platform.example.test/restapi/v1.0/account/~/extension"
        );
        assert_eq!(
            client.assigned_roles_url("1001").unwrap().as_str(),
            "https://platform.example.test/restapi/v1.0/account/~/extension/1001/assigned-role"
        );
    }

    #[test]
    fn test_assigned_roles_url_escapes_id() {
        let client = client("https://platform.example.test/restapi");
        let url = client.assigned_roles_url("../user-role").unwrap();
        assert!(url.path().ends_with("/extension/..%2Fuser-role/assigned-role"));
    }

    #[test]
    fn test_unauthenticated_without_token() {
        let client = client("https://platform.example.test/restapi");
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_truncated_body_is_network_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Promise 100 bytes, send a few, hang up
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                      Content-Length: 100\r\n\r\n{\"records\":",
                )
                .await;
        });

        let client = client(&format!("http://{addr}/restapi"));
        let err = client.get_assigned_roles("1001").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    }
}
