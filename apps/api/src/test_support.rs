use axum::Router;

/// Serves `router` on an ephemeral localhost port and returns its base URL.
/// Stands in for GitHub, Gemini and Pinecone in client tests.
pub(crate) async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    format!("http://{addr}")
}
