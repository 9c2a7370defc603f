//! Commands and read models of the session orchestrator.

pub mod commands;
pub mod view;
