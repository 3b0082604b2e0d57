//! Server assembly and lifecycle.
//!
//! [`RelayServer`] wires the gateway components together from a validated
//! [`RelayConfig`]:
//!
//! 1. Install the metrics recorder (when `[metrics].enabled`)
//! 2. Build the plugin registry and verify every ingestion route's plugin
//! 3. Build the optional NSCA forwarder
//! 4. Create the result cache and the router
//! 5. Bind the allow-list listener
//!
//! [`RelayServer::run`] serves until the cancellation token fires, then
//! reports how many buffered results are discarded with the process.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use alertrelay_core::config::RelayConfig;
use alertrelay_core::plugin::PluginRegistry;
use alertrelay_gateway::{
    AccessFilter, AllowListListener, RelayRouter, ResultCache, builtin_registry, forwarder,
};

use crate::cli::DaemonCli;
use crate::metrics_server;

/// Load configuration for the daemon.
///
/// Order: file, `ALERTRELAY_*` environment overrides, CLI overrides, validation.
pub async fn load_config(cli: &DaemonCli) -> Result<RelayConfig> {
    let path = cli.config.as_path();
    let mut config = RelayConfig::from_file(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?;
    config.apply_env_overrides();
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
    Ok(config)
}

/// Check that every configured ingestion route names a registered plugin.
pub fn verify_plugins(config: &RelayConfig) -> Result<()> {
    plugin_registry(config).map(|_| ())
}

fn plugin_registry(config: &RelayConfig) -> Result<PluginRegistry> {
    let registry =
        builtin_registry().map_err(|e| anyhow::anyhow!("failed to build plugin registry: {}", e))?;
    registry
        .ensure_all(config.plugin_names())
        .map_err(|e| anyhow::anyhow!("invalid ingestion route: {}", e))?;
    Ok(registry)
}

/// Build the multi-thread runtime. `0` keeps tokio's default (one worker per CPU).
pub fn build_runtime(worker_threads: usize) -> Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all().thread_name("alertrelay-worker");
    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build tokio runtime: {}", e))
}

/// The assembled relay server.
pub struct RelayServer {
    config: RelayConfig,
    listener: AllowListListener,
    app: axum::Router,
    cache: Arc<ResultCache>,
}

impl RelayServer {
    /// Build from a loaded configuration, binding `server.listen_addr:server.port`.
    pub async fn build_from_config(config: RelayConfig) -> Result<Self> {
        let addr = config.server.bind_addr();
        Self::build_with_addr(config, &addr).await
    }

    /// Build from a loaded configuration, binding an explicit address.
    ///
    /// Useful for tests that bind `127.0.0.1:0`.
    pub async fn build_with_addr(config: RelayConfig, addr: &str) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let registry = plugin_registry(&config)?;
        let forwarder = forwarder::from_config(&config.nsca)
            .map_err(|e| anyhow::anyhow!("failed to build nsca forwarder: {}", e))?;

        let cache = Arc::new(ResultCache::new());
        let app = RelayRouter::from_config(&config, Arc::new(registry), Arc::clone(&cache))
            .with_forwarder(forwarder)
            .into_router();

        let filter = AccessFilter::new(&config.server.allowed_ips);
        if filter.is_open() {
            tracing::info!("no allow-list configured; accepting every client address");
        }
        let listener = AllowListListener::bind(addr, filter)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?
            .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));

        if !config.server.dump_requests_dir.trim().is_empty() {
            tracing::info!(
                dir = %config.server.dump_requests_dir,
                "request bodies will be dumped"
            );
        }
        for route in &config.ingestion {
            tracing::info!(path = %route.path, plugin = %route.plugin, "ingestion route");
        }
        for route in &config.egress {
            tracing::info!(path = %route.path, "egress route");
        }

        Ok(Self {
            config,
            listener,
            app,
            cache,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        axum::serve::Listener::local_addr(&self.listener)
            .map_err(|e| anyhow::anyhow!("failed to read listener address: {}", e))
    }

    /// Shared result cache.
    pub fn cache(&self) -> Arc<ResultCache> {
        Arc::clone(&self.cache)
    }

    /// Loaded configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.local_addr()?;
        tracing::info!(listen_addr = %addr, "alertrelay listening");

        // No-op tap_io: axum only implements `Connected` generically for `TapIo<L, F>`.
        axum::serve(
            axum::serve::ListenerExt::tap_io(self.listener, |_| {}),
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

        let lost = self.cache.len().await;
        if lost > 0 {
            tracing::warn!(count = lost, "buffered check results discarded on shutdown");
        }
        tracing::info!("alertrelay stopped");
        Ok(())
    }
}
