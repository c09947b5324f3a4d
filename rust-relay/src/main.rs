//! Tally Relay web server.
//!
//! Verifies Tally webhook deliveries and forwards each submission as an
//! email. Configuration comes from the environment; see `Config::from_env`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tally_relay::{router, AppState, Config, LogMailer, MailBackend, Mailer, SesMailer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load and validate configuration
    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        port = config.port,
        mail_backend = ?config.mail_backend,
        aws_region = %config.aws_region,
        ses_endpoint = %config.ses_endpoint,
        recipients = config.to_addresses.len(),
        session_token_set = config
            .aws_credentials
            .as_ref()
            .map(|c| c.session_token.is_some())
            .unwrap_or(false),
        "config_loaded"
    );

    let mailer: Arc<dyn Mailer> = match config.mail_backend {
        MailBackend::Ses => {
            Arc::new(SesMailer::from_config(&config).context("Failed to create SES mailer")?)
        }
        MailBackend::Log => Arc::new(LogMailer),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, mailer));

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
