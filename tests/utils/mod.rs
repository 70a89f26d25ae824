pub mod backend;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use backend::{FakeBackend, RecordedRequest, ISSUED_TOKEN, SLOW_RESPONSE, VALID_TOKEN};
#[allow(unused_imports)]
pub use mocks::MockNavigator;
#[allow(unused_imports)]
pub use setup::{client_for, gate_router, TestClient};
