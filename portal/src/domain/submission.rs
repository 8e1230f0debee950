//! Registration submission outcomes and backend error classification.
//!
//! The registration endpoint reports duplicates as free text (`{message}`),
//! optionally with a machine-readable `code`. A recognised code always wins;
//! substring matching on the message is a compatibility fallback and only
//! applies when the text mentions exactly one of "email" or "phone".

use std::fmt;

use serde_json::Value;

use super::ports::BackendError;
use super::validation::ValidationErrors;

const DUPLICATE_EMAIL_CODE: &str = "duplicate_email";
const DUPLICATE_PHONE_CODE: &str = "duplicate_phone";

/// Which unique member attribute the backend reported as taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Another member already registered this email.
    DuplicateEmail,
    /// Another member already registered this phone number.
    DuplicatePhone,
}

impl ConflictKind {
    /// User-facing explanation of the conflict.
    pub const fn message(self) -> &'static str {
        match self {
            Self::DuplicateEmail => "This email is already registered",
            Self::DuplicatePhone => "This phone number is already registered",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Why a registration was not accepted.
///
/// `Display` renders the user-facing notification text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// Local checks failed; nothing was sent.
    #[error("{0}")]
    Validation(ValidationErrors),
    /// The backend refused a duplicate email or phone number.
    #[error("{0}")]
    Conflict(ConflictKind),
    /// Any other backend refusal, carrying the server's message verbatim.
    #[error("{message}")]
    Server {
        /// HTTP status when one was received.
        status: Option<u16>,
        /// Message to show the member.
        message: String,
    },
    /// The backend could not be reached.
    #[error("Unable to reach the server. Please check your connection and try again.")]
    Network {
        /// Transport diagnostic, for logs only.
        detail: String,
    },
    /// The backend did not answer in time.
    #[error("The server took too long to respond. Please try again.")]
    Timeout {
        /// Transport diagnostic, for logs only.
        detail: String,
    },
}

/// Coarse failure category, mirroring the submission error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionFailureKind {
    /// Local, field-attributed failure.
    Validation,
    /// Duplicate email or phone.
    Conflict,
    /// Transport failure.
    Network,
    /// Bounded wait exceeded.
    Timeout,
    /// Other non-success response.
    Server,
}

impl SubmissionError {
    /// Category of the failure.
    pub const fn kind(&self) -> SubmissionFailureKind {
        match self {
            Self::Validation(_) => SubmissionFailureKind::Validation,
            Self::Conflict(_) => SubmissionFailureKind::Conflict,
            Self::Server { .. } => SubmissionFailureKind::Server,
            Self::Network { .. } => SubmissionFailureKind::Network,
            Self::Timeout { .. } => SubmissionFailureKind::Timeout,
        }
    }
}

impl From<BackendError> for SubmissionError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Transport { message } => Self::Network { detail: message },
            BackendError::Timeout { message } => Self::Timeout { detail: message },
            BackendError::Rejected {
                status,
                message,
                code,
            } => classify_rejection(status, &message, code.as_deref()),
            BackendError::Unparsed { status, .. } => Self::Server {
                status: Some(status),
                message: status_failure_message(status),
            },
            BackendError::Decode { message } => Self::Server {
                status: None,
                message,
            },
        }
    }
}

/// Map a non-success registration response to a submission error.
///
/// # Examples
/// ```
/// use portal::domain::{ConflictKind, SubmissionError, classify_rejection};
///
/// let err = classify_rejection(400, "email already exists", None);
/// assert_eq!(err, SubmissionError::Conflict(ConflictKind::DuplicateEmail));
/// ```
pub fn classify_rejection(status: u16, message: &str, code: Option<&str>) -> SubmissionError {
    match code {
        Some(DUPLICATE_EMAIL_CODE) => return SubmissionError::Conflict(ConflictKind::DuplicateEmail),
        Some(DUPLICATE_PHONE_CODE) => return SubmissionError::Conflict(ConflictKind::DuplicatePhone),
        _ => {}
    }

    let lowered = message.to_lowercase();
    match (lowered.contains("email"), lowered.contains("phone")) {
        (true, false) => SubmissionError::Conflict(ConflictKind::DuplicateEmail),
        (false, true) => SubmissionError::Conflict(ConflictKind::DuplicatePhone),
        _ => SubmissionError::Server {
            status: Some(status),
            message: message.to_owned(),
        },
    }
}

/// Member-facing text for a refusal the backend did not explain.
pub(crate) fn status_failure_message(status: u16) -> String {
    format!("Request failed with status {status}")
}

/// Opaque body returned by a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationReceipt {
    /// Response JSON, or `Value::Null` when the body was empty or not JSON.
    pub body: Value,
}

/// Outcome of one user-initiated submit.
pub type SubmissionResult = Result<RegistrationReceipt, SubmissionError>;
