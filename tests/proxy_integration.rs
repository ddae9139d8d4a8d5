//! End-to-end tests of the reverse-proxy path.

use std::collections::HashMap;

use axum::http::StatusCode;
use edge_server::config::{FirewallAction, SiteConfig};

mod common;

use common::{closed_addr, MockUpstream, Reply, TestServer, CHUNKED_BODY, UPSTREAM_BODY};

const APP_HOST: &str = "app.example";

fn proxy_config(upstream: &str) -> SiteConfig {
    let mut config = SiteConfig::default();
    config
        .proxy
        .rules
        .insert(APP_HOST.to_string(), upstream.to_string());
    config
}

#[tokio::test]
async fn test_request_reaches_upstream_unchanged() {
    let upstream = MockUpstream::start().await;
    let server = TestServer::start(proxy_config(&upstream.url())).await;
    let client = server.client(&[APP_HOST]);

    let response = client
        .post(server.host_url(APP_HOST, "/api/items?b=2&a=1&a=%20x"))
        .header("X-Trace", "abc-123")
        .header("X-Multi", "first")
        .header("X-Multi", "second")
        .header("Content-Type", "application/octet-stream")
        .body("payload \x00 bytes")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    let seen = &requests[0];
    assert_eq!(seen.request_line, "POST /api/items?b=2&a=1&a=%20x HTTP/1.1");
    assert_eq!(seen.header("x-trace"), Some("abc-123"));
    assert_eq!(seen.header_values("x-multi"), vec!["first", "second"]);
    assert_eq!(seen.header("content-type"), Some("application/octet-stream"));
    assert_eq!(seen.body, b"payload \x00 bytes");

    // The inbound Host is replaced by the upstream authority.
    assert_eq!(seen.header("host"), Some(upstream.addr.to_string().as_str()));

    server.stop().await;
}

#[tokio::test]
async fn test_only_allow_listed_response_headers_are_relayed() {
    let upstream = MockUpstream::start().await;
    let server = TestServer::start(proxy_config(&upstream.url())).await;
    let client = server.client(&[APP_HOST]);

    let response = client
        .get(server.host_url(APP_HOST, "/"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(
        response.headers()["content-length"],
        UPSTREAM_BODY.len().to_string().as_str()
    );
    assert!(response.headers().get("x-upstream-secret").is_none());
    assert_eq!(response.text().await.unwrap(), UPSTREAM_BODY);

    server.stop().await;
}

#[tokio::test]
async fn test_chunked_upstream_gets_no_content_length() {
    let upstream = MockUpstream::start_with(Reply::Chunked).await;
    let server = TestServer::start(proxy_config(&upstream.url())).await;
    let client = server.client(&[APP_HOST]);

    let response = client
        .get(server.host_url(APP_HOST, "/stream"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert!(response.headers().get("content-length").is_none());
    assert_eq!(response.text().await.unwrap(), CHUNKED_BODY);

    server.stop().await;
}

#[tokio::test]
async fn test_preserve_host_forwards_inbound_host() {
    let upstream = MockUpstream::start().await;
    let mut config = proxy_config(&upstream.url());
    config.proxy.preserve_host = true;
    let server = TestServer::start(config).await;
    let client = server.client(&[APP_HOST]);

    client
        .get(server.host_url(APP_HOST, "/"))
        .send()
        .await
        .unwrap();

    let requests = upstream.requests();
    let expected = format!("{}:{}", APP_HOST, server.addr.port());
    assert_eq!(requests[0].header("host"), Some(expected.as_str()));

    server.stop().await;
}

#[tokio::test]
async fn test_denied_client_never_reaches_upstream() {
    let upstream = MockUpstream::start().await;
    let mut config = proxy_config(&upstream.url());
    config.firewall.rules.insert(
        APP_HOST.to_string(),
        HashMap::from([("127.0.0.1".to_string(), FirewallAction::Deny)]),
    );
    let server = TestServer::start(config).await;
    let client = server.client(&[APP_HOST]);

    let response = client
        .get(server.host_url(APP_HOST, "/secret"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(upstream.connections(), 0);
    assert_eq!(server.runtime.metrics().snapshot().count(403, "/secret"), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_ipv4_deny_holds_on_dual_stack_listener() {
    let upstream = MockUpstream::start().await;
    let mut config = proxy_config(&upstream.url());
    config.firewall.rules.insert(
        APP_HOST.to_string(),
        HashMap::from([("127.0.0.1".to_string(), FirewallAction::Deny)]),
    );
    let server = TestServer::start_dual_stack(config).await;
    let client = server.client(&[APP_HOST]);

    let response = client
        .get(server.host_url(APP_HOST, "/secret"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(upstream.connections(), 0);

    server.stop().await;
}

#[tokio::test]
async fn test_wildcard_deny_yields_to_host_allow() {
    let upstream = MockUpstream::start().await;
    let mut config = proxy_config(&upstream.url());
    config.firewall.rules.insert(
        "*".to_string(),
        HashMap::from([("127.0.0.1".to_string(), FirewallAction::Deny)]),
    );
    config.firewall.rules.insert(
        APP_HOST.to_string(),
        HashMap::from([("127.0.0.1".to_string(), FirewallAction::Allow)]),
    );
    let server = TestServer::start(config).await;
    let client = server.client(&[APP_HOST]);

    let response = client
        .get(server.host_url(APP_HOST, "/"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(upstream.connections(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let dead = closed_addr().await;
    let server = TestServer::start(proxy_config(&format!("http://{}", dead))).await;
    let client = server.client(&[APP_HOST]);

    let response = client
        .get(server.host_url(APP_HOST, "/down"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.text().await.unwrap(), "502 Bad Gateway");
    assert_eq!(server.runtime.metrics().snapshot().count(502, "/down"), 1);

    // The server keeps serving after an upstream failure.
    let again = client
        .get(server.host_url(APP_HOST, "/down"))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::BAD_GATEWAY);

    server.stop().await;
}

#[tokio::test]
async fn test_unmatched_host_is_served_locally() {
    let upstream = MockUpstream::start().await;
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("index.html"), "<p>local</p>").unwrap();

    let mut config = proxy_config(&upstream.url());
    config.serve.root = Some(root.path().to_path_buf());
    let server = TestServer::start(config).await;
    let client = server.client(&[]);

    let page = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert_eq!(page.text().await.unwrap(), "<p>local</p>");

    let missing = client.get(server.url("/nope.txt")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(upstream.connections(), 0);

    server.stop().await;
}
