//! Observability for the casting service.
//!
//! Provides Prometheus metric definitions and recording helpers.

pub mod metrics;
