//! Common test utilities and helpers
//!
//! - Mock API server wired to a real client
//! - JSON fixtures for the server's payloads


// Re-export commonly used utilities
pub use fixtures::*;
pub use mock_server::*;
