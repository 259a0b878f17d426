//! Poloniex legacy `tradingApi` signing
//!
//! Every private call is a form POST to `tradingApi` carrying `command`
//! and `nonce`. `Sign` holds the hex HMAC-SHA512 of the exact body, `Key`
//! the API key.

use crate::credentials::Credentials;
use crate::errors::{ExchangeError, Result};
use crate::http::{HttpRequest, Method};
use crate::signing::{Authenticator, DigestEncoding, HmacAlgorithm, PrivateRequest, Signer, encode_params, join_url};
use coinwire_core::NonceUnit;
use url::Url;

const SIGNER: Signer = Signer::new(HmacAlgorithm::Sha512, DigestEncoding::Hex);

/// Path every private command is posted to
pub const TRADING_API: &str = "tradingApi";

#[derive(Debug, Clone)]
pub struct PoloniexAuth {
    credentials: Credentials,
}

impl PoloniexAuth {
    pub fn new(credentials: Credentials) -> Result<Self> {
        if !credentials.is_valid() {
            return Err(ExchangeError::Configuration("poloniex API key and secret must be non-empty".to_string()));
        }
        Ok(Self { credentials })
    }
}

impl Authenticator for PoloniexAuth {
    fn nonce_unit(&self) -> NonceUnit {
        NonceUnit::Micros
    }

    fn authenticate(&self, base_url: &Url, request: &PrivateRequest, nonce: u64) -> Result<HttpRequest> {
        let mut params = request.params.clone();
        params.push(("nonce".to_string(), nonce.to_string()));
        let body = encode_params(&params);
        let signature = SIGNER.sign(&self.credentials.secret, &body)?;

        let url = join_url(base_url, &request.path)?;
        Ok(HttpRequest::new(Method::Post, url)
            .with_header("Key", &self.credentials.api_key)
            .with_header("Sign", signature)
            .with_form_body(body))
    }
}
