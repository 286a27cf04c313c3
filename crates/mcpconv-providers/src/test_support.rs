//! Helpers shared by the client tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::backoff::Backoff;
use crate::traits::CallOptions;

/// Options with a short per-call timeout and near-zero backoff delays.
pub(crate) fn fast_options(timeout: Duration, max_retries: u32) -> CallOptions {
    CallOptions {
        max_tokens: 256,
        temperature: 0.0,
        timeout,
        backoff: Backoff {
            max_retries,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        },
    }
}

/// A server that answers every request with `200` headers and a truncated
/// body, then holds the connection open without sending the rest.
///
/// Returns the base URL and a counter of accepted connections.
pub(crate) async fn stalled_body_server() -> (String, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicU32::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 16 * 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\n\
                          content-type: application/json\r\n\
                          content-length: 100\r\n\r\n\
                          {\"mes",
                    )
                    .await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });

    (format!("http://{addr}"), connections)
}
