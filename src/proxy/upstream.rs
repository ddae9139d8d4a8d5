//! Upstream origins and the shared upstream client.

use std::str::FromStr;

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

/// Client type used for every proxied request.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the long-lived upstream client.
///
/// One instance is shared by all requests so that upstream connections are
/// pooled. No timeouts are set beyond the transport defaults.
pub fn build_client() -> UpstreamClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new()).build(https)
}

/// The origin of a proxy rule: scheme and authority only.
///
/// Any path or query on the configured URL is dropped; the inbound request
/// supplies both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    scheme: Scheme,
    authority: Authority,
}

impl Upstream {
    /// Parse an upstream URL such as `http://127.0.0.1:3000/ignored`.
    pub fn parse(target: &str) -> Result<Self, String> {
        let url = Url::parse(target).map_err(|e| e.to_string())?;
        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(format!("unsupported scheme '{}'", other)),
        };
        let host = url.host_str().ok_or_else(|| "upstream URL has no host".to_string())?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| e.to_string())?;

        Ok(Self { scheme, authority })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}
