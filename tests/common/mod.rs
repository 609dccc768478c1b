//! Shared test fixtures: a local stand-in for the bexio API.

use axum::Router;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Counts requests a mock endpoint has served.
pub type HitCounter = Arc<AtomicUsize>;

pub fn hit_counter() -> HitCounter {
    Arc::new(AtomicUsize::new(0))
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock upstream");
    });
    format!("http://{addr}")
}
