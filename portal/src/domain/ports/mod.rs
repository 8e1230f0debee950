//! Outbound ports for the REST backend and client-side token storage.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod backend_error;
mod registration_gateway;
mod token_store;

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::AuthGateway;
pub use backend_error::BackendError;
#[cfg(test)]
pub use registration_gateway::MockRegistrationGateway;
pub use registration_gateway::RegistrationGateway;
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{InMemoryTokenStore, TOKEN_STORAGE_KEY, TokenStore, TokenStoreError};
