//! Startup failures caused by bad configuration.

use alertrelay_daemon::cli::DaemonCli;
use alertrelay_daemon::server::{RelayServer, load_config};
use clap::Parser;

use crate::helpers::config::{TestConfigBuilder, write_config_to_tempfile};

#[tokio::test]
async fn e2e_unknown_plugin_fails_startup() {
    // Given: an ingestion route naming a plugin that does not exist
    let config = TestConfigBuilder::new()
        .ingestion("/pingdom", "pingdom_alerts")
        .build();

    // When: the server is built
    let result = RelayServer::build_with_addr(config, "127.0.0.1:0").await;

    // Then: startup fails and names the plugin
    let err = result.err().expect("build should fail");
    assert!(err.to_string().contains("pingdom_alerts"));
}

#[tokio::test]
async fn e2e_occupied_port_fails_startup() {
    // Given: a port already in use
    let blocker = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = blocker.local_addr().unwrap().to_string();

    // When: the server tries to bind it
    let result = RelayServer::build_with_addr(TestConfigBuilder::new().build(), &addr).await;

    // Then: the bind error is reported
    let err = result.err().expect("bind should fail");
    assert!(err.to_string().contains("failed to bind"));
}

#[tokio::test]
async fn e2e_config_file_round_trips_through_loader() {
    // Given: a config file written from a builder
    let written = TestConfigBuilder::new()
        .allowed_ips(&["192.0.2.10"])
        .build();
    let (_file, path) = write_config_to_tempfile(&written);

    // When: the daemon loads it
    let cli = DaemonCli::parse_from(["alertrelay-daemon", "--config", path.to_str().unwrap()]);
    let loaded = load_config(&cli).await.unwrap();

    // Then: the values survive
    assert_eq!(loaded.server.allowed_ips, vec!["192.0.2.10".to_owned()]);
    assert_eq!(loaded.ingestion, written.ingestion);
    assert!(!loaded.metrics.enabled);
}

#[tokio::test]
async fn e2e_invalid_values_fail_loading() {
    // Given: a config with a zero body limit
    let mut builder = TestConfigBuilder::new();
    builder.config_mut().server.max_body_bytes = 0;
    let (_file, path) = write_config_to_tempfile(&builder.build());

    // When: the daemon loads it
    let cli = DaemonCli::parse_from(["alertrelay-daemon", "--config", path.to_str().unwrap()]);
    let result = load_config(&cli).await;

    // Then: validation rejects it
    assert!(result.is_err());
}
