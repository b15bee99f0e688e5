//! Metrics module for Estate Server.

pub mod http;
pub mod setup;

pub use http::{http_metrics_middleware, register_http_metrics};
pub use setup::{detached_handle, init_metrics};
