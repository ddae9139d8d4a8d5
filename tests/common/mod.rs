//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use edge_server::error::EdgeError;
use edge_server::http::Runtime;
use edge_server::routing::{Site, VirtualHosts};
use edge_server::{EdgeServer, Shutdown, SiteConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Body every mock upstream answers with.
pub const UPSTREAM_BODY: &str = "hello from upstream";

/// One request as the upstream saw it on the wire.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    /// Header names lowercased, in wire order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().copied()
    }
}

/// Body of a `Reply::Chunked` answer.
pub const CHUNKED_BODY: &str = "hello chunked";

/// How a mock upstream frames its answer.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// `201 Created` with `Content-Length` and an `X-Upstream-Secret` header.
    Fixed,
    /// `200 OK` with `Transfer-Encoding: chunked` and no `Content-Length`.
    Chunked,
}

/// Raw TCP upstream that records every request it receives, answers it and
/// closes the connection.
pub struct MockUpstream {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        Self::start_with(Reply::Fixed).await
    }

    pub async fn start_with(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let conns = connections.clone();
        let reqs = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                conns.fetch_add(1, Ordering::SeqCst);
                let reqs = reqs.clone();
                tokio::spawn(async move {
                    let mut socket = socket;
                    if let Some(captured) = read_request(&mut socket).await {
                        // Record before answering so callers see it once
                        // their response arrives.
                        reqs.lock().unwrap().push(captured);
                        respond(&mut socket, reply).await;
                    }
                });
            }
        });

        Self {
            addr,
            connections,
            requests,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(n, _)| n == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(CapturedRequest {
        request_line,
        headers,
        body,
    })
}

async fn respond(socket: &mut TcpStream, reply: Reply) {
    let response = match reply {
        Reply::Fixed => format!(
            "HTTP/1.1 201 Created\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nX-Upstream-Secret: s3cr3t\r\nConnection: close\r\n\r\n{}",
            UPSTREAM_BODY.len(),
            UPSTREAM_BODY
        ),
        Reply::Chunked => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n{:x}\r\n{}\r\n0\r\n\r\n",
            CHUNKED_BODY.len(),
            CHUNKED_BODY
        ),
    };
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// An edge server bound to an ephemeral port, reached over 127.0.0.1.
pub struct TestServer {
    pub addr: SocketAddr,
    pub runtime: Arc<Runtime>,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), EdgeError>>,
}

impl TestServer {
    pub async fn start(config: SiteConfig) -> Self {
        let site = Site::compile("main", config).unwrap();
        Self::start_hosts(VirtualHosts::single(site)).await
    }

    pub async fn start_hosts(hosts: VirtualHosts) -> Self {
        Self::start_on("127.0.0.1:0", hosts).await
    }

    /// Listen on `[::]`; IPv4 clients then arrive as mapped IPv6 peers.
    pub async fn start_dual_stack(config: SiteConfig) -> Self {
        let site = Site::compile("main", config).unwrap();
        Self::start_on("[::]:0", VirtualHosts::single(site)).await
    }

    async fn start_on(bind: &str, hosts: VirtualHosts) -> Self {
        let listener = TcpListener::bind(bind).await.unwrap();
        // Clients always dial the IPv4 loopback.
        let addr = SocketAddr::from(([127, 0, 0, 1], listener.local_addr().unwrap().port()));
        let server = EdgeServer::new(hosts);
        let runtime = server.runtime();

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        let handle = tokio::spawn(server.run(listener, receiver));

        Self {
            addr,
            runtime,
            shutdown,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// URL that reaches this server under the given host name.
    pub fn host_url(&self, host: &str, path: &str) -> String {
        format!("http://{}:{}{}", host, self.addr.port(), path)
    }

    /// Client that resolves `hosts` to this server and never follows
    /// redirects.
    pub fn client(&self, hosts: &[&str]) -> reqwest::Client {
        let mut builder = reqwest::Client::builder()
            .no_proxy()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(10));
        for host in hosts {
            builder = builder.resolve(host, self.addr);
        }
        builder.build().unwrap()
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop");
        result.unwrap().unwrap();
    }
}
