//! Test configuration builder for E2E tests.
//!
//! Provides [`TestConfigBuilder`] for creating `RelayConfig` instances
//! with fine-grained control over routes, allow-list, and forwarding.

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;

use alertrelay_core::config::{EgressRoute, IngestionRoute, RelayConfig};

/// Builder for constructing test-friendly `RelayConfig` instances.
///
/// By default metrics and NSCA forwarding are disabled and the default
/// Catchpoint ingestion/egress routes are kept.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .allowed_ips(&["127.0.0.1"])
///     .build();
/// ```
#[allow(dead_code)]
pub struct TestConfigBuilder {
    config: RelayConfig,
}

#[allow(dead_code)]
impl TestConfigBuilder {
    /// Create a new builder with test-safe defaults.
    pub fn new() -> Self {
        let mut config = RelayConfig::default();
        config.metrics.enabled = false;
        config.nsca.enabled = false;
        config.server.request_timeout_secs = 5;
        Self { config }
    }

    /// Replace the source address allow-list.
    pub fn allowed_ips(mut self, ips: &[&str]) -> Self {
        self.config.server.allowed_ips = ips.iter().map(|ip| (*ip).to_owned()).collect();
        self
    }

    /// Remove every configured route.
    pub fn without_routes(mut self) -> Self {
        self.config.ingestion.clear();
        self.config.egress.clear();
        self
    }

    /// Add an ingestion route.
    pub fn ingestion(mut self, path: &str, plugin: &str) -> Self {
        self.config.ingestion.push(IngestionRoute {
            path: path.to_owned(),
            plugin: plugin.to_owned(),
        });
        self
    }

    /// Add an egress route.
    pub fn egress(mut self, path: &str) -> Self {
        self.config.egress.push(EgressRoute {
            path: path.to_owned(),
        });
        self
    }

    /// Enable NSCA forwarding to the given address.
    pub fn nsca(mut self, addr: SocketAddr, encryption: &str, password: &str) -> Self {
        self.config.nsca.enabled = true;
        self.config.nsca.host = addr.ip().to_string();
        self.config.nsca.port = addr.port();
        self.config.nsca.encryption = encryption.to_owned();
        self.config.nsca.password = password.to_owned();
        self.config.nsca.timeout_secs = 2;
        self
    }

    /// Set the request dump directory.
    pub fn dump_requests_dir(mut self, dir: &str) -> Self {
        self.config.server.dump_requests_dir = dir.to_owned();
        self
    }

    /// Get mutable access to the underlying config for advanced customization.
    pub fn config_mut(&mut self) -> &mut RelayConfig {
        &mut self.config
    }

    /// Build and return the `RelayConfig` without validating it.
    pub fn build(self) -> RelayConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a `RelayConfig` to a temporary TOML file and return its path.
///
/// The caller must keep the returned `NamedTempFile` alive for the duration of the test.
#[allow(dead_code)]
pub fn write_config_to_tempfile(config: &RelayConfig) -> (tempfile::NamedTempFile, PathBuf) {
    let toml_str = toml::to_string_pretty(config).expect("failed to serialize config to TOML");
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(toml_str.as_bytes())
        .expect("failed to write config to temp file");
    file.flush().expect("failed to flush temp file");
    let path = file.path().to_path_buf();
    (file, path)
}
