//! Driven port for the create-registration call.
//!
//! The domain hands over values that already passed client-side validation;
//! the adapter owns multipart encoding and HTTP status handling.

use async_trait::async_trait;

use super::BackendError;
use crate::domain::{RegistrationReceipt, ValidRegistration};

/// Port for submitting a membership registration to the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationGateway: Send + Sync {
    /// Perform exactly one registration attempt.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] for non-success statuses with the
    /// backend's message or code, [`BackendError::Unparsed`] when the body
    /// carries neither, and transport or timeout errors when no response
    /// arrived.
    async fn register(
        &self,
        registration: &ValidRegistration,
    ) -> Result<RegistrationReceipt, BackendError>;
}
