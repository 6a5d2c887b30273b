//! Service-specific tests
//!
//! Each service has its own test file; HTTP behaviour runs against a wiremock
//! server, file storage against a temporary directory.

pub mod helpers;

mod health_monitor;
