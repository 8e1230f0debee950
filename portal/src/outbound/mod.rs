//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **portal_api**: reqwest client for the registration and auth endpoints
//! - **token_store**: file-backed admin token persistence
//!
//! Adapters are thin translators between domain types and wire or disk
//! representations. They contain no business logic.

pub mod portal_api;
pub mod token_store;
