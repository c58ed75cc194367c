//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use observability_demo::config::DemoConfig;
use observability_demo::http::HttpServer;
use observability_demo::lifecycle::{base_url_for, readiness, Shutdown};
use observability_demo::observability::Telemetry;

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    /// Raw request line and headers.
    pub head: String,
}

impl MockRequest {
    /// Header value, case-insensitive.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then(|| v.trim().to_string())
        })
    }
}

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a simple mock backend that returns a fixed 200 response.
pub async fn start_mock_backend(response: &'static str) -> MockBackend {
    start_programmable_backend(move |_req| async move { (200, response.to_string()) }).await
}

/// Start a programmable mock backend with async support.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let backend = MockBackend {
        addr,
        hits: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let f = Arc::new(f);

    let state = backend.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let state = state.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        state.hits.fetch_add(1, Ordering::SeqCst);
                        state.requests.lock().unwrap().push(request.clone());

                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            204 => "204 No Content",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    backend
}

/// Read one HTTP/1.1 request (head and body) from the socket.
async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut request_line = head.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let request = MockRequest { method, path, head };

    let content_length = request
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut have = buf.len() - header_end;
    while have < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        have += n;
    }

    Some(request)
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Defaults with cascades off and all outbound targets unreachable.
pub fn test_config() -> DemoConfig {
    let dead = format!("http://{}", closed_addr());
    let mut config = DemoConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.cascade.enabled = false;
    config.loki.url = dead.clone();
    config.trace.external_url = format!("{}/get", dead);
    config.http_client.timeout_secs = 2;
    config.http_client.connect_timeout_secs = 1;
    config
}

/// A service running on an ephemeral port. Shuts down on drop.
pub struct TestService {
    pub addr: SocketAddr,
    pub base_url: String,
    pub telemetry: Arc<Telemetry>,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sum of `demo_http_requests_total` over every path except `/metrics`.
    pub fn requests_served(&self) -> f64 {
        counter_sum(&self.telemetry.render(), "demo_http_requests_total", |labels| {
            !labels.contains("path=\"/metrics\"")
        })
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn_service(config: DemoConfig) -> TestService {
    spawn_server(HttpServer::new(config).expect("server config")).await
}

pub async fn spawn_server(server: HttpServer) -> TestService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = Shutdown::new();
    let (ready, waiter) = readiness();
    let telemetry = server.telemetry();

    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, ready, server_shutdown).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(5), waiter.wait())
        .await
        .expect("server ready in time")
        .expect("server ready");

    TestService {
        addr,
        base_url: base_url_for(addr),
        telemetry,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Sum every sample of a Prometheus counter whose label set passes `filter`.
pub fn counter_sum(text: &str, name: &str, filter: impl Fn(&str) -> bool) -> f64 {
    let prefix = format!("{}{{", name);
    text.lines()
        .filter(|line| line.starts_with(&prefix))
        .filter(|line| filter(line))
        .filter_map(|line| line.rsplit(' ').next()?.parse::<f64>().ok())
        .sum()
}

/// Value of `demo_operations_total` for one operation.
pub fn operations(telemetry: &Telemetry, operation: &str) -> f64 {
    let label = format!("operation=\"{}\"", operation);
    counter_sum(&telemetry.render(), "demo_operations_total", |l| l.contains(&label))
}
