use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use alertrelay_daemon::cli::DaemonCli;
use alertrelay_daemon::logging;
use alertrelay_daemon::server::{self, RelayServer};

fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정은 작업자 수를 알기 전에 읽어야 하므로 임시 런타임에서 로드
    let config = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(server::load_config(&cli))?;

    if cli.validate {
        server::verify_plugins(&config)?;
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "alertrelay-daemon starting"
    );

    let runtime = server::build_runtime(config.server.worker_threads)?;
    runtime.block_on(async move {
        let server = RelayServer::build_from_config(config).await?;
        let shutdown = CancellationToken::new();
        let mut server_task = tokio::spawn(server.run(shutdown.clone()));

        tokio::select! {
            signal = wait_for_shutdown_signal() => {
                let signal = signal?;
                tracing::info!(signal, "shutdown signal received");
                shutdown.cancel();
                server_task.await??;
            }
            result = &mut server_task => {
                result??;
            }
        }

        tracing::info!("alertrelay-daemon shut down");
        Ok::<(), anyhow::Error>(())
    })
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}
