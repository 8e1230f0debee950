//! Client-side registration checks.
//!
//! These rules mirror what the registration endpoint enforces so obviously
//! bad input is rejected without a round trip. The server stays
//! authoritative and may still refuse a draft that passes here.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::membership_window::MembershipWindow;
use super::photo::{MAX_PHOTO_BYTES, Photo};
use super::plan::PlanId;
use super::registration::{PaymentMethod, RegistrationDraft};

/// Draft field a validation failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Member name.
    Name,
    /// Contact email.
    Email,
    /// Phone number.
    Phone,
    /// Date of birth.
    DateOfBirth,
    /// Profile photo.
    Photo,
}

impl Field {
    /// Form field name as sent to the registration endpoint.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::DateOfBirth => "dob",
            Self::Photo => "photo",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed rule with a user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field the failure belongs to.
    pub field: Field,
    /// Message suitable for inline display next to the field.
    pub reason: String,
}

impl FieldError {
    fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Every rule a draft failed, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Build from a list of field errors.
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    /// All recorded failures.
    pub fn errors(&self) -> &[FieldError] {
        self.0.as_slice()
    }

    /// First failure recorded for `field`, if any.
    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|error| error.field == field)
    }

    /// Whether `field` failed at least one rule.
    pub fn contains(&self, field: Field) -> bool {
        self.for_field(field).is_some()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.reason))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Registration values that passed every client-side rule.
///
/// Text fields are trimmed. Built only by [`validate_draft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    /// Member name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Ten ASCII digits.
    pub phone: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Optional photo within the size limit.
    pub photo: Option<Photo>,
    /// Selected plan.
    pub plan_id: PlanId,
    /// Membership dates.
    pub window: MembershipWindow,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{10}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Whether `email` has the `local@domain.tld` shape.
///
/// # Examples
/// ```
/// use portal::domain::is_valid_email;
///
/// assert!(is_valid_email("a@b.co"));
/// assert!(!is_valid_email("a@bco"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Whether `phone` is exactly ten ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

/// Check a draft against every client-side rule.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing each failed rule.
pub fn validate_draft(draft: &RegistrationDraft) -> Result<ValidRegistration, ValidationErrors> {
    let mut errors = Vec::new();

    let name = draft.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new(Field::Name, "Name is required"));
    }

    let email = draft.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new(Field::Email, "Email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new(
            Field::Email,
            "Please enter a valid email address",
        ));
    }

    let phone = draft.phone.trim();
    if phone.is_empty() {
        errors.push(FieldError::new(Field::Phone, "Phone number is required"));
    } else if !is_valid_phone(phone) {
        errors.push(FieldError::new(
            Field::Phone,
            "Phone number must be exactly 10 digits",
        ));
    }

    if draft.date_of_birth.is_none() {
        errors.push(FieldError::new(
            Field::DateOfBirth,
            "Date of birth is required",
        ));
    }

    if let Some(photo) = &draft.photo {
        if photo.size() > MAX_PHOTO_BYTES {
            errors.push(FieldError::new(
                Field::Photo,
                "Photo must be 1 MB or smaller",
            ));
        }
        if !photo.media_type().starts_with("image/") {
            errors.push(FieldError::new(Field::Photo, "Photo must be an image"));
        }
    }

    match (errors.is_empty(), draft.date_of_birth) {
        (true, Some(date_of_birth)) => Ok(ValidRegistration {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            date_of_birth,
            photo: draft.photo.clone(),
            plan_id: draft.plan_id(),
            window: draft.window(),
            payment_method: draft.payment_method,
        }),
        _ => Err(ValidationErrors::new(errors)),
    }
}
