//! Driven port for the admin login and token verification endpoints.

use async_trait::async_trait;

use super::BackendError;
use crate::domain::{AuthToken, LoginCredentials};

/// Port for authenticating admins against the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] when the backend refuses the
    /// credentials and [`BackendError::Decode`] when a success body carries
    /// no usable token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, BackendError>;

    /// Check that a stored token is still accepted. Any 2xx is success.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] for non-success statuses and
    /// transport or timeout errors when no response arrived.
    async fn verify(&self, token: &AuthToken) -> Result<(), BackendError>;
}
