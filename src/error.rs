//! Error types for the rcsync connector.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level connector error type.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid continuation token: {0}")]
    InvalidCursor(String),

    #[error("the role with ID '{role_id}' is already assigned to the user with ID '{principal_id}'")]
    AlreadyAssigned {
        role_id: String,
        principal_id: String,
    },

    #[error("only users can be granted role membership (principal '{principal_id}' is a '{resource_type}')")]
    PrincipalMismatch {
        principal_id: String,
        resource_type: String,
    },
}

/// Token exchange errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Client ID, client secret and JWT are all required")]
    MissingCredentials,

    #[error("Token exchange failed: HTTP {status} - {body}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Remote API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        status: u16,
        method: String,
        url: String,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse API response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of the failed call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl SyncError {
    /// Returns true for failures at the network/HTTP boundary.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::Status { .. })
                | Self::Api(ApiError::Network(_))
                | Self::Auth(AuthError::Network(_))
        )
    }

    /// Returns a short operator-facing message.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Auth(AuthError::MissingCredentials) => {
                "Credentials incomplete. Set client ID, client secret and JWT."
            }
            Self::Auth(_) => "Authentication with RingCentral failed.",
            Self::Api(ApiError::Status { status: 401, .. }) => {
                "Access token rejected. Check the JWT credential."
            }
            Self::Api(ApiError::Status { status: 403, .. }) => {
                "Insufficient permissions for this operation."
            }
            Self::Api(ApiError::Status { status: 429, .. }) => {
                "Too many requests. Please wait a moment."
            }
            Self::Api(ApiError::Decode(_)) => "Unexpected response from RingCentral.",
            Self::Api(_) => "Network error. Check your connection.",
            Self::InvalidCursor(_) => "Sync cursor is invalid. Restart the listing.",
            Self::AlreadyAssigned { .. } => "The user already holds this role.",
            Self::PrincipalMismatch { .. } => "Only users can be granted roles.",
        }
    }
}
