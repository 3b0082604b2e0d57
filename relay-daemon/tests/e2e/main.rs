//! E2E integration tests for alertrelay-daemon.
//!
//! These tests start a real server on `127.0.0.1:0` and talk to it with a
//! raw TCP HTTP/1.1 client, so access control, routing, forwarding, and
//! shutdown are exercised exactly as a remote client would see them.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared test utilities (config builder, HTTP client, fake NSCA daemon)
//! - `scenarios/` -- Test files organized by scenario
//!
//! # Running
//!
//! ```bash
//! cargo test -p alertrelay-daemon --test e2e
//! ```

mod helpers;
mod scenarios;
