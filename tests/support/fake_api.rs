// ABOUTME: Minimal in-process HTTP stand-in for the control plane and hub.
// ABOUTME: Good enough to drive ApiClient end-to-end without a mocking crate the teacher never pulled in.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const TARBALL_BODY: &[u8] = b"fake tarball contents";

/// A tiny single-shot-per-connection HTTP server. Every request is logged
/// (method + path) so a test can assert on what the client actually called.
pub struct FakeApiServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<(String, String, String)>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl FakeApiServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind a loopback port for the fake control plane");
        let addr = listener.local_addr().expect("local_addr");
        let base_url = format!("http://{addr}");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = requests.clone();
        let server_base = base_url.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let log = log.clone();
                let base = server_base.clone();
                tokio::spawn(async move {
                    handle_connection(socket, &log, &base).await;
                });
            }
        });

        Self {
            base_url,
            requests,
            _handle: handle,
        }
    }

    /// `(method, path, body)` triples seen so far, in arrival order.
    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().clone()
    }
}

async fn handle_connection(
    mut socket: tokio::net::TcpStream,
    log: &Mutex<Vec<(String, String, String)>>,
    base_url: &str,
) {
    let mut buf = vec![0u8; 16 * 1024];
    let n = match socket.read(&mut buf).await {
        Ok(n) => n,
        Err(_) => return,
    };
    if n == 0 {
        return;
    }
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut lines = request.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("GET").to_string();
    let path = parts.next().unwrap_or("/").to_string();
    let body = request.split("\r\n\r\n").nth(1).unwrap_or_default().to_string();
    log.lock().push((method.clone(), path.clone(), body));

    let (status, content_type, body) = route(&method, &path, base_url);
    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(&body);
    let _ = socket.write_all(&response).await;
    let _ = socket.shutdown().await;
}

fn route(method: &str, path: &str, base_url: &str) -> (&'static str, &'static str, Vec<u8>) {
    if path.contains("/tarball") {
        return ("200 OK", "application/octet-stream", TARBALL_BODY.to_vec());
    }
    if path.contains("download_url") {
        let body = format!("{{\"url\":\"{base_url}/tarball\"}}");
        return ("200 OK", "application/json", body.into_bytes());
    }
    if method == "GET" && (path.contains("/components/") || path.contains("/servers/")) {
        return ("200 OK", "application/json", b"[]".to_vec());
    }
    // Every POST verb (healthcheck, update-version, usage, latency, update-status)
    // just needs a 2xx; none of them read the response body.
    ("200 OK", "application/json", b"{}".to_vec())
}
