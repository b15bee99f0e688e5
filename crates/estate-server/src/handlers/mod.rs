pub mod cache;
pub mod health;
pub mod metrics;
pub mod properties;
pub mod response;
