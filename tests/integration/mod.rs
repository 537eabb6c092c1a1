//! Integration tests
//!
//! Each test runs the real client against a mock API server.

mod auth_test;
mod client_test;
mod notifications_test;
mod state_test;
