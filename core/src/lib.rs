//! # Subscout Core
//!
//! The discovery pipeline and the adapters that connect it to the network.
//!
//! * [`candidates`]: builds the candidate set from a wordlist and the web archive.
//! * [`scanner`]: wildcard detection, resolution with retry, per-host enrichment and
//!   the bounded worker fan-out.
//! * [`aggregator`]: collects enrichment records from concurrent workers.
//! * [`discovery`]: the application service tying the above together for one domain.
//! * [`network`]: concrete implementations of the port traits from `subscout-common`.
//! * [`sinks`]: CSV and JSON result writers.

pub mod aggregator;
pub mod candidates;
pub mod discovery;
pub mod network;
pub mod scanner;
pub mod sinks;
