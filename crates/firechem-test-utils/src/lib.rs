//! Shared testing utilities: in-process mock upstreams, scripted trait
//! implementations and canned upstream payloads.

pub mod fixtures;
pub mod mock_server;
pub mod mocks;

pub use mock_server::MockServer;
pub use mocks::{MockOutcome, MockPredictor, MockResolver};
