//! QuizHub Store — `Store` implementations.
//!
//! Sessions only live as long as the process, so the in-memory store is the
//! production implementation. Quiz definitions are loaded into it from a JSON
//! seed file at startup.

pub mod memory;
pub mod seed;

pub use memory::InMemoryStore;
pub use seed::{QuizSeed, SeedError, parse_seed};
