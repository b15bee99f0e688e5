//! Estate Server - HTTP API for property listings.
//!
//! Every read endpoint goes through the read-through cache from
//! `estate-cache` and every write invalidates the categories it affects.
//! The cache is optional at runtime: with the backend down the API keeps
//! answering from the repository.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod server;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use handlers::health::{ComponentHealth, HealthResponse};
pub use repository::{InMemoryRepository, PropertyRepository, RepositoryError};
pub use server::{create_router, create_router_with_state, run_server_with_state};
pub use settings::Settings;
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
