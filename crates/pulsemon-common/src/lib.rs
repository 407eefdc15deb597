//! Shared domain types for the pulsemon workspace.
//!
//! Everything here is pure: ID generation, payload validation and liveness
//! derivation have no storage or network dependencies, so both the server
//! and the agent can depend on this crate.

pub mod id;
pub mod liveness;
pub mod types;
pub mod validate;
