//! # Result Sinks
//!
//! File writers for a finished [`ResultSet`](subscout_common::models::record::ResultSet).
//!
//! * [`csv::CsvSink`]: one flat row per record, list fields joined into single cells.
//! * [`json::JsonSink`]: the records as a pretty-printed JSON array.
//!
//! Both render the whole document in memory first and write it with a single call,
//! so a failed encode never leaves a truncated file behind.

pub mod csv;
pub mod json;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
