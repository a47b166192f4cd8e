// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Client;

use crate::api::ApiClient;
use crate::request::Dispatcher;
use crate::session::Session;

pub(crate) use crate::token::validator::tests::sample_jwt;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Dispatcher rooted at `http://{addr}/api` with the default refresh path.
pub fn dispatcher_for(addr: SocketAddr, session: Session) -> Dispatcher {
    dispatcher_for_url(&format!("http://{}/api", addr), session)
}

pub fn dispatcher_for_url(base_url: &str, session: Session) -> Dispatcher {
    Dispatcher::from_parts(build_reqwest_client(), base_url, "en-US", "/auth/refresh", session)
}

pub fn api_for_url(base_url: &str, session: Session) -> ApiClient {
    ApiClient::new(dispatcher_for_url(base_url, session))
}

/// Token valid for the next hour.
pub fn fresh_jwt() -> String {
    sample_jwt(chrono::Utc::now().timestamp() + 3600)
}

pub fn expired_jwt() -> String {
    sample_jwt(chrono::Utc::now().timestamp() - 60)
}

pub fn user_json(id: &str, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Ada",
        "email": email,
        "date_created": "2024-03-01T10:00:00Z"
    })
}
