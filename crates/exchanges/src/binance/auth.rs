//! Binance authentication and request signing
//!
//! Private endpoints take every parameter in the query string. The sorted,
//! URL-encoded query (with `timestamp` and `recvWindow` appended) is signed
//! with HMAC-SHA256 and sent as the trailing `signature` parameter; the API
//! key travels in the `X-MBX-APIKEY` header.

use crate::credentials::Credentials;
use crate::errors::{ExchangeError, Result};
use crate::http::HttpRequest;
use crate::signing::{
    Authenticator, DigestEncoding, HmacAlgorithm, PrivateRequest, Signer, build_query_string, join_url,
};
use coinwire_core::NonceUnit;
use url::Url;

const SIGNER: Signer = Signer::new(HmacAlgorithm::Sha256, DigestEncoding::Hex);

/// Milliseconds a signed request stays valid on the server
pub const DEFAULT_RECV_WINDOW: u64 = 5000;

#[derive(Debug, Clone)]
pub struct BinanceAuth {
    credentials: Credentials,
    recv_window: u64,
}

impl BinanceAuth {
    pub fn new(credentials: Credentials) -> Result<Self> {
        if !credentials.is_valid() {
            return Err(ExchangeError::Configuration("binance API key and secret must be non-empty".to_string()));
        }
        Ok(Self {
            credentials,
            recv_window: DEFAULT_RECV_WINDOW,
        })
    }

    pub fn with_recv_window(mut self, recv_window: u64) -> Self {
        self.recv_window = recv_window;
        self
    }

    /// Sorted query including `timestamp` and `recvWindow`, unsigned
    pub fn signing_payload(&self, request: &PrivateRequest, timestamp: u64) -> String {
        let mut params = request.params.clone();
        params.push(("timestamp".to_string(), timestamp.to_string()));
        params.push(("recvWindow".to_string(), self.recv_window.to_string()));
        build_query_string(&params)
    }
}

impl Authenticator for BinanceAuth {
    fn nonce_unit(&self) -> NonceUnit {
        NonceUnit::Millis
    }

    fn authenticate(&self, base_url: &Url, request: &PrivateRequest, nonce: u64) -> Result<HttpRequest> {
        let query = self.signing_payload(request, nonce);
        let signature = SIGNER.sign(&self.credentials.secret, &query)?;

        let mut url = join_url(base_url, &request.path)?;
        url.set_query(Some(&format!("{query}&signature={signature}")));

        Ok(HttpRequest::new(request.method, url).with_header("X-MBX-APIKEY", &self.credentials.api_key))
    }
}
