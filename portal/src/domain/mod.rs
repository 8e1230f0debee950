//! Domain primitives and services for registration and admin sessions.
//!
//! Purpose: keep every decision the portal makes (pricing, membership dates,
//! field validation, error classification, session gating) independent of
//! transport and rendering so it can be unit tested without a UI harness.
//!
//! Public surface:
//! - [`PlanCatalog`] and [`Plan`] for the fixed pricing table.
//! - [`MembershipWindow`] for start/end date arithmetic.
//! - [`RegistrationDraft`], [`RegistrationForm`] and [`Photo`] for form state.
//! - [`validate_draft`] for client-side checks.
//! - [`RegistrationService`] for submission and [`SubmissionError`] for its
//!   failure taxonomy.
//! - [`SessionManager`] and [`SessionState`] for admin authentication.
//! - [`resolve_view`] for route gating.

pub mod auth;
pub mod membership_window;
pub mod navigation;
pub mod photo;
pub mod plan;
pub mod ports;
pub mod registration;
pub mod registration_form;
pub mod registration_service;
pub mod session;
pub mod submission;
pub mod validation;

pub use self::auth::{AuthToken, LoginCredentials, LoginValidationError};
pub use self::membership_window::{MembershipWindow, MembershipWindowError, compute_window};
pub use self::navigation::{Route, View, resolve_view};
pub use self::photo::{MAX_PHOTO_BYTES, Photo, PhotoError};
pub use self::plan::{Plan, PlanCatalog, PlanId, PlanNotFound};
pub use self::registration::{PaymentMethod, RegistrationDraft};
pub use self::registration_form::{FormError, FormPhase, PhotoSlot, RegistrationForm};
pub use self::registration_service::RegistrationService;
pub use self::session::{
    DEFAULT_VERIFY_TIMEOUT, LoginError, SessionEvent, SessionManager, SessionState,
};
pub use self::submission::{
    ConflictKind, RegistrationReceipt, SubmissionError, SubmissionFailureKind, SubmissionResult,
    classify_rejection,
};
pub use self::validation::{
    Field, FieldError, ValidRegistration, ValidationErrors, is_valid_email, is_valid_phone,
    validate_draft,
};
