//! # Models
//!
//! Data that flows through the discovery pipeline.
//!
//! * [`domain::Domain`]: the validated target domain.
//! * [`candidate::Candidate`] / [`candidate::CandidateSet`]: labels to test under the domain.
//! * [`host::ResolvedHost`]: a candidate that resolved to an address.
//! * [`record::EnrichmentRecord`] / [`record::ResultSet`]: the output of a run.

pub mod candidate;
pub mod domain;
pub mod host;
pub mod record;
