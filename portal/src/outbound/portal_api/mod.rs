//! Portal REST backend adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `RegistrationGateway` and `AuthGateway` ports.

mod dto;
mod http_client;

pub use http_client::PortalHttpClient;
