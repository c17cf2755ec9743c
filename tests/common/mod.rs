//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use caching_proxy::config::{DispatchMode, ProxyConfig};
use caching_proxy::http::{ProxyServer, ServerError};
use caching_proxy::lifecycle::Shutdown;

#[derive(Clone, Default)]
struct OriginState {
    routes: Arc<HashMap<String, (u16, String)>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    delay: Duration,
}

/// An axum origin server on an ephemeral port that counts requests per path.
///
/// Paths without a configured route answer 404.
pub struct MockOrigin {
    pub addr: SocketAddr,
    state: OriginState,
}

impl MockOrigin {
    pub async fn start(routes: &[(&str, u16, &str)]) -> Self {
        Self::start_with_delay(routes, Duration::ZERO).await
    }

    /// Like [`MockOrigin::start`], but every response waits `delay` first.
    pub async fn start_with_delay(routes: &[(&str, u16, &str)], delay: Duration) -> Self {
        let routes = routes
            .iter()
            .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
            .collect();
        let state = OriginState {
            routes: Arc::new(routes),
            hits: Arc::default(),
            delay,
        };

        let app = Router::new().fallback(serve_origin).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().values().sum()
    }
}

async fn serve_origin(State(state): State<OriginState>, uri: Uri) -> (StatusCode, String) {
    let path = uri.path().to_string();
    *state.hits.lock().unwrap().entry(path.clone()).or_default() += 1;

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    match state.routes.get(&path) {
        Some((status, body)) => (StatusCode::from_u16(*status).unwrap(), body.clone()),
        None => (StatusCode::NOT_FOUND, "no such resource".to_string()),
    }
}

/// An origin URL nothing is listening on.
pub fn dead_origin() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Loopback config on an ephemeral port.
pub fn test_config(origin: &str, cache_root: &Path) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    // Bursts of test clients overflow the default backlog of 5.
    config.listener.backlog = 128;
    config.origin.base_url = origin.to_string();
    config.origin.timeout_secs = 5;
    config.cache.root_dir = cache_root.to_path_buf();
    config.timeouts.client_read_secs = 5;
    config.timeouts.shutdown_grace_secs = 2;
    config
}

/// A running proxy; stop it with [`TestProxy::stop`].
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), ServerError>>,
}

impl TestProxy {
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.task.await.unwrap().unwrap();
    }
}

pub async fn start_proxy(origin: &str, cache_root: &Path) -> TestProxy {
    start_proxy_with(test_config(origin, cache_root)).await
}

pub async fn start_sequential_proxy(origin: &str, cache_root: &Path) -> TestProxy {
    let mut config = test_config(origin, cache_root);
    config.listener.dispatch = DispatchMode::Sequential;
    start_proxy_with(config).await
}

pub async fn start_proxy_with(config: ProxyConfig) -> TestProxy {
    let server = ProxyServer::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let task = tokio::spawn(server.run(server_shutdown));

    TestProxy {
        addr,
        shutdown,
        task,
    }
}

/// Write raw bytes, then read until the proxy closes the connection.
pub async fn send_raw(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), stream.read_to_end(&mut out))
        .await
        .expect("proxy did not close the connection")
        .unwrap();
    out
}

/// Issue `GET <path>` and return the full raw response.
pub async fn get(addr: SocketAddr, path: &str) -> Vec<u8> {
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nUser-Agent: test\r\n\r\n");
    send_raw(addr, request.as_bytes()).await
}

/// Expected wire bytes of a 200 with `body`.
pub fn ok_response(body: &str) -> Vec<u8> {
    format!("HTTP/1.1 200 OK\r\n\r\n{body}").into_bytes()
}

pub const NOT_FOUND: &[u8] = b"HTTP/1.1 404 NOT FOUND\r\n\r\nFile Not Found";
pub const METHOD_NOT_ALLOWED: &[u8] = b"HTTP/1.1 405 Method Not Allowed\r\n\r\n";
pub const INTERNAL_ERROR: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\r\n";
