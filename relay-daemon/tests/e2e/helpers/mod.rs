//! Shared E2E test helpers.
//!
//! Provides reusable utilities for building test configurations,
//! running a server in the background, sending raw HTTP requests,
//! and standing in for an NSCA daemon.

pub mod config;
pub mod http;
pub mod nsca;
pub mod payloads;
