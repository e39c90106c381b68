//! Gateway server setup
//!
//! Binds the TCP listener and runs the accept loop.

mod handler;
mod state;

pub use handler::{handle_connection, EndReason};
pub use state::GatewayState;

use chat_common::{AppConfig, AppError, AppResult};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;

/// Pause after a failed accept so a persistent fault (e.g. fd exhaustion) cannot spin
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Bind the configured address
pub async fn bind(config: &AppConfig) -> AppResult<TcpListener> {
    let addr = config.server.address();

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::bind(&addr, e))?;

    tracing::info!(addr = %listener.local_addr()?, "Chat gateway listening");

    Ok(listener)
}

/// Accept connections until the process exits
pub async fn serve(listener: TcpListener, state: GatewayState) -> AppResult<()> {
    serve_with_shutdown(listener, state, std::future::pending()).await
}

/// Accept connections until `signal` resolves
///
/// A failed accept is logged and the loop continues. Sessions already
/// running are not interrupted by the signal.
pub async fn serve_with_shutdown<F>(listener: TcpListener, state: GatewayState, signal: F) -> AppResult<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(signal);

    loop {
        tokio::select! {
            () = &mut signal => {
                tracing::info!("Shutdown signal received, no longer accepting");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!(peer = %peer, error = %e, "Failed to set TCP_NODELAY");
                    }

                    tracing::info!(peer = %peer, "Connection accepted");
                    tokio::spawn(handle_connection(state.clone(), stream, peer.to_string()));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> AppResult<()> {
    let listener = bind(&config).await?;
    let state = GatewayState::new(&config);

    serve_with_shutdown(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
