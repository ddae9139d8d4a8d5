//! Listen address resolution.

use std::io;
use std::net::SocketAddr;

use crate::error::EdgeError;

/// Resolve `host:port` (IP literal, bracketed IPv6 or host name) to the
/// first socket address it names.
pub async fn resolve_listen_address(address: &str) -> Result<SocketAddr, EdgeError> {
    let unresolved = |source| EdgeError::UnresolvedAddress {
        address: address.to_string(),
        source,
    };

    let mut addrs = tokio::net::lookup_host(address).await.map_err(unresolved)?;
    addrs.next().ok_or_else(|| {
        unresolved(io::Error::new(
            io::ErrorKind::NotFound,
            "no addresses returned",
        ))
    })
}
