//! Shared test doubles and fixtures for the QuizHub live session engine.

mod clock;
mod fixtures;
mod rng;
mod store;
mod transport;

pub use clock::FixedClock;
pub use fixtures::{fixed_time, participant, quiz_fixture, quiz_master};
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingStore, ReadOnlyStore};
pub use transport::{ClosedTransport, RecordingTransport, StalledTransport};
