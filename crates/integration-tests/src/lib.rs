//! Test harness for end-to-end API tests.
//!
//! Spawns the full router on an ephemeral port against the in-memory
//! store backend. Each [`TestServer`] is fully isolated: its own stores,
//! its own signing secret, its own port.
//!
//! ```rust,ignore
//! let server = TestServer::spawn().await;
//! let client = client();
//! let resp = client
//!     .get(server.url("/health"))
//!     .send()
//!     .await
//!     .unwrap();
//! assert_eq!(resp.status(), 200);
//! ```

#![allow(clippy::expect_used)]

use std::net::SocketAddr;

use secrecy::SecretString;

use mercata_api::config::{ApiConfig, StoreBackend};
use mercata_api::db::Stores;
use mercata_api::{AppState, app};

/// A running API instance bound to an ephemeral local port.
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    /// Start a fresh server backed by empty in-memory stores.
    ///
    /// # Panics
    ///
    /// Panics when the listener cannot bind, which only happens if the
    /// host is out of ephemeral ports.
    pub async fn spawn() -> Self {
        let config = ApiConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://localhost".to_owned(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            session_secret: SecretString::from("kX9mP2vQ7rT4wY8zB3nC6fH1jL5sD0gA"),
            session_ttl_secs: 3600,
        };
        let state = AppState::new(config, Stores::in_memory(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("Listener has no local addr");

        tokio::spawn(async move {
            axum::serve(listener, app(state))
                .await
                .expect("Server error");
        });

        Self { addr }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// A client with a cookie store, so a login's session cookie is replayed
/// on subsequent requests.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
