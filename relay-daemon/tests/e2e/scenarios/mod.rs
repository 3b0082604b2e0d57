//! E2E test scenarios.

mod config_error;
mod nsca_forwarding;
mod relay_flow;
