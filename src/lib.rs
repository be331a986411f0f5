//! Candidate assessment orchestrator.
//!
//! Client library for a three-round hiring pipeline: two locally-sampled MCQ
//! rounds (aptitude, then data structures and algorithms) followed by a
//! realtime voice interview conducted by a remote agent over WebSocket.
//! Round progression, sampling, and scoring are local; results are reported
//! to the hiring backend over REST.

pub mod backend;
pub mod config;
pub mod core;

// Re-export commonly used items for convenience
pub use backend::{BackendClient, BackendError, BackendResult};
pub use config::{ConfigError, OrchestratorConfig};
pub use core::*;
