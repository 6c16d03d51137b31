use anyhow::Context;
use rawhttp::app::Router;
use rawhttp::config::Config;
use rawhttp::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let srv = server::serve_with_buffer(cfg.port, cfg.read_buffer_size, Router::new(&cfg))
        .await
        .context("error starting server")?;
    tracing::info!("Server started on port {}", srv.local_addr().port());

    shutdown_signal().await;

    srv.close();
    tracing::info!("Server gracefully stopped");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "failed to install SIGTERM handler"),
        }
    }

    let _ = tokio::signal::ctrl_c().await;
}
