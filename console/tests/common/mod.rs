//! Common test utilities shared by the console test suites

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{ConsoleBuilder, TestHelpers};
