//! Structured logging for FinNext.
//!
//! Console output (plain or JSON), optional rolling NDJSON files, and secret
//! scrubbing for text that originates outside the process.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_secrets;
