//! Helpers shared by tests that talk HTTP

use axum::Router;

/// Serve `router` on an ephemeral localhost port and return its base URL
pub(crate) async fn serve_locally(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
