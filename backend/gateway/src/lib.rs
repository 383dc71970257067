//! FinNext Gateway HTTP API Server
//!
//! Hosts one proxy endpoint per agent persona, relaying chat turns to the
//! external inference service, plus registry listing and health routes.

pub mod catalog;
pub mod health_api;
pub mod proxy;
pub mod server;

pub use server::{CredentialLookup, GatewayState, build_router, start_server};
