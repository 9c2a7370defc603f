//! QuizHub Session — the authorization-gated operation surface of a live
//! play session.
//!
//! Every mutating operation runs load, transition, save and broadcast under a
//! per-session lock, so concurrent callers on the same session never lose an
//! update and callers on different sessions never contend.

pub mod application;
pub mod domain;

pub use application::orchestrator::SessionOrchestrator;
pub use domain::view::SessionView;
