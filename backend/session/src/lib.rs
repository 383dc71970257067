//! Chat session management for the multi-agent chat page.
//!
//! A [`ChatSession`] owns the active persona, one history per persona, the
//! loading gate, and the input buffer. Chat turns leave the process through an
//! [`AgentTransport`].

pub mod controller;
pub mod transport;

pub use controller::{ChatSession, PendingTurn, SessionState, UNEXPECTED_ERROR};
pub use transport::{AgentTransport, Delivery, HttpTransport, UNKNOWN_ERROR};
