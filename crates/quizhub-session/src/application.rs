//! The orchestrator and its per-session write serialization.

mod locks;
pub mod orchestrator;
