//! Bitstamp request signing
//!
//! Private calls are form-encoded POSTs. The body carries `key`, `nonce`
//! and `signature`, where the signature is the upper-case hex HMAC-SHA256
//! of `nonce + customer_id + key`.

use crate::credentials::Credentials;
use crate::errors::{ExchangeError, Result};
use crate::http::HttpRequest;
use crate::signing::{Authenticator, DigestEncoding, HmacAlgorithm, PrivateRequest, Signer, encode_params, join_url};
use coinwire_core::NonceUnit;
use url::Url;

const SIGNER: Signer = Signer::new(HmacAlgorithm::Sha256, DigestEncoding::UpperHex);

#[derive(Debug, Clone)]
pub struct BitstampAuth {
    credentials: Credentials,
}

impl BitstampAuth {
    pub fn new(credentials: Credentials) -> Result<Self> {
        if !credentials.is_valid() {
            return Err(ExchangeError::Configuration("bitstamp API key and secret must be non-empty".to_string()));
        }
        Ok(Self { credentials })
    }

    pub fn signature(&self, nonce: u64) -> Result<String> {
        let customer_id = self
            .credentials
            .customer_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ExchangeError::CredentialsRequired("bitstamp customer_id".to_string()))?;
        SIGNER.sign(
            &self.credentials.secret,
            &format!("{nonce}{customer_id}{}", self.credentials.api_key),
        )
    }
}

impl Authenticator for BitstampAuth {
    fn nonce_unit(&self) -> NonceUnit {
        NonceUnit::Micros
    }

    fn authenticate(&self, base_url: &Url, request: &PrivateRequest, nonce: u64) -> Result<HttpRequest> {
        let signature = self.signature(nonce)?;

        let mut params = request.params.clone();
        params.push(("key".to_string(), self.credentials.api_key.clone()));
        params.push(("signature".to_string(), signature));
        params.push(("nonce".to_string(), nonce.to_string()));

        let url = join_url(base_url, &request.path)?;
        Ok(HttpRequest::new(request.method, url).with_form_body(encode_params(&params)))
    }
}
