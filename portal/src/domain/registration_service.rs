//! Registration submitter.
//!
//! Validates a draft locally, then performs exactly one create-registration
//! call. Nothing is retried and nothing is cached; callers decide what to do
//! with the draft based on the returned outcome.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::ports::RegistrationGateway;
use super::registration::RegistrationDraft;
use super::submission::{SubmissionError, SubmissionResult};
use super::validation::validate_draft;

/// Service implementing the registration submit use-case.
#[derive(Clone)]
pub struct RegistrationService<G> {
    gateway: Arc<G>,
}

impl<G> RegistrationService<G> {
    /// Create a service backed by `gateway`.
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

impl<G> RegistrationService<G>
where
    G: RegistrationGateway,
{
    /// Validate and submit `draft`.
    ///
    /// Validation failures return [`SubmissionError::Validation`] without
    /// touching the gateway.
    pub async fn submit(&self, draft: &RegistrationDraft) -> SubmissionResult {
        let registration = match validate_draft(draft) {
            Ok(registration) => registration,
            Err(errors) => {
                debug!(failed = errors.errors().len(), "registration rejected locally");
                return Err(SubmissionError::Validation(errors));
            }
        };

        match self.gateway.register(&registration).await {
            Ok(receipt) => {
                info!(
                    plan = %registration.plan_id,
                    payment_method = %registration.payment_method,
                    with_photo = registration.photo.is_some(),
                    "registration accepted"
                );
                Ok(receipt)
            }
            Err(error) => {
                warn!(error = %error, "registration failed");
                Err(SubmissionError::from(error))
            }
        }
    }
}
