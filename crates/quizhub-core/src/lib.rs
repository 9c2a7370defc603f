//! QuizHub Core — shared domain model and ports.
//!
//! This crate defines the play-session data model with its pure transition
//! logic, the error taxonomy, and the traits that infrastructure plugs into.
//! It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod identity;
pub mod quiz;
pub mod rng;
pub mod session;
pub mod store;
pub mod team;
