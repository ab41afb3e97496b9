//! TLS helpers for the HTTP client.

use std::sync::Arc;

/// Get the crypto provider for TLS connections.
///
/// Uses the process-wide default provider when one is installed, otherwise a
/// fresh aws-lc-rs provider. Nothing is installed globally.
pub fn get_crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_get_crypto_provider_has_cipher_suites() {
        let provider = get_crypto_provider();
        assert!(!provider.cipher_suites.is_empty());
    }
}
