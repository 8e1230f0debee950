//! Shared helpers for portal integration tests.
//!
//! Integration tests compile as separate crates, so the stub backend and the
//! hand-written port doubles live here rather than being repeated per file.
//! Not every test crate uses every helper.
#![allow(dead_code)]

pub mod doubles;
pub mod stub_backend;

use chrono::NaiveDate;
use portal::domain::RegistrationDraft;

/// Parse an ISO date used in fixtures and feature files.
pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw.trim_matches('"'), "%Y-%m-%d").expect("fixture date")
}

/// Draft starting on `start` with every required field filled in.
pub fn complete_draft(start: NaiveDate) -> RegistrationDraft {
    let mut draft = RegistrationDraft::starting_on(start).expect("valid draft");
    draft.name = "Asha Rao".to_owned();
    draft.email = "asha@example.in".to_owned();
    draft.phone = "9876543210".to_owned();
    draft.date_of_birth = NaiveDate::from_ymd_opt(1995, 8, 14);
    draft
}
