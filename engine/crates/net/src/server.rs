use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use session::SessionId;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::connection::Connection;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Accept connections until shutdown is signalled, spawning `handler` once
/// per connection.
///
/// Shutdown stops accepting and returns; sessions already spawned keep
/// running until their peers leave.
pub async fn run_tcp_server<F, Fut>(
    listener: TcpListener,
    mut shutdown_rx: watch::Receiver<bool>,
    handler: F,
) -> Result<(), std::io::Error>
where
    F: Fn(Connection) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("TCP server listening on {}", addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        // Usually fd exhaustion; back off instead of spinning
                        tracing::warn!("accept failed: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        continue;
                    }
                };
                let session_id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
                tracing::info!(%session_id, %peer_addr, "New connection");

                let conn = Connection::from_tcp(stream, session_id, peer_addr);
                let session = handler(conn);
                tokio::spawn(async move {
                    session.await;
                    tracing::info!(%session_id, "Session ended");
                });
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("TCP server shutting down");
                    break;
                }
            }
        }
    }

    Ok(())
}
