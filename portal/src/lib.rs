//! Client-side core of the gym portal.
//!
//! The crate models the membership registration flow and the admin session
//! as framework-independent state machines and services. Rendering is left to
//! whichever driving adapter hosts the flows; the bundled `portal` binary is a
//! command-line stand-in for the browser UI.
//!
//! Layout follows a hexagonal split:
//!
//! - [`domain`] owns plans, membership dates, drafts, validation, submission
//!   outcomes, the session state machine and the navigation guard.
//! - [`domain::ports`] declares the outbound seams (REST gateways and token
//!   storage).
//! - [`outbound`] implements those seams with `reqwest` and `cap-std`.
//! - [`config`] resolves environment-selected settings.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod outbound;

pub use config::{ApiEnvironment, ConfigError, PortalConfig, PortalSettings};
