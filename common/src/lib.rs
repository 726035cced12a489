//! # Subscout Common
//!
//! Shared vocabulary of the workspace: the models that flow through the pipeline,
//! the scan configuration, the error types and the **port traits** every
//! collaborator (DNS, HTTP, TCP, TLS, archive index, result sinks) implements.
//!
//! Nothing in here performs IO. Concrete adapters live in `subscout-core::network`
//! and `subscout-core::sinks`; tests plug in their own stubs.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
