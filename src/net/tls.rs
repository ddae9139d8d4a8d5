//! TLS configuration and certificate loading.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;
use crate::error::EdgeError;

/// Load the listener's certificate and key (PEM).
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, EdgeError> {
    ensure_exists(&config.cert_path, "Certificate")?;
    ensure_exists(&config.key_path, "Private key")?;

    let tls = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .map_err(EdgeError::Tls)?;
    tracing::info!(cert = %config.cert_path.display(), "TLS certificate loaded");
    Ok(tls)
}

fn ensure_exists(path: &Path, what: &str) -> Result<(), EdgeError> {
    if path.exists() {
        return Ok(());
    }
    Err(EdgeError::Tls(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} file not found: {}", what, path.display()),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_certificate_is_reported() {
        let config = TlsConfig {
            enabled: true,
            cert_path: "/no/such/cert.pem".into(),
            key_path: "/no/such/key.pem".into(),
        };
        let err = load_tls_config(&config).await.unwrap_err();
        assert!(err.to_string().contains("Certificate file not found"));
    }

    #[tokio::test]
    async fn test_garbage_pem_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");
        std::fs::write(&cert, "not a certificate").unwrap();
        std::fs::write(&key, "not a key").unwrap();

        let config = TlsConfig {
            enabled: true,
            cert_path: cert,
            key_path: key,
        };
        assert!(matches!(
            load_tls_config(&config).await,
            Err(EdgeError::Tls(_))
        ));
    }
}
