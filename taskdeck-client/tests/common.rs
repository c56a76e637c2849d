use std::sync::Arc;

use axum::Router;
use taskdeck_client::{ClientConfig, HttpTaskClient};
use taskdeck_server::AppState;

/// Serve `app` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Start the in-memory task store and hand back its state for inspection.
#[allow(dead_code)]
pub async fn spawn_store() -> (String, Arc<AppState>) {
    let state = Arc::new(AppState::default());
    let base_url = serve(taskdeck_server::router(state.clone())).await;
    (base_url, state)
}

#[allow(dead_code)]
pub fn task_client(base_url: &str) -> HttpTaskClient {
    HttpTaskClient::new(ClientConfig::new(base_url)).unwrap()
}
