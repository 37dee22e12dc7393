// Server loop module
// Accepts connections until shutdown, then drains the ones still open

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::shutdown::drain_connections;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop until a shutdown signal arrives.
///
/// After shutdown the listener is closed first, then open connections get
/// up to the connection timeout to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    // Registered once so a notification between iterations is not lost
    let shutdown = signals.shutdown.notified();
    tokio::pin!(shutdown);

    loop {
        if signals.is_shutdown_requested() {
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            &signals,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    let remaining = drain_connections(
        &active_connections,
        state.config.performance.connection_timeout(),
    )
    .await;
    logger::log_shutdown_complete(remaining);
}
