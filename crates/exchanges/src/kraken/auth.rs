//! Kraken request signing
//!
//! `API-Sign` is the base64 HMAC-SHA512, keyed by the base64-decoded
//! secret, of `uri_path + SHA256(nonce + postdata)`. The nonce is the first
//! field of the form body.

use crate::credentials::Credentials;
use crate::errors::{ExchangeError, Result};
use crate::http::HttpRequest;
use crate::signing::{
    Authenticator, DigestEncoding, HmacAlgorithm, PrivateRequest, Signer, encode_params, join_url, sha256,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use coinwire_core::NonceUnit;
use url::Url;

const SIGNER: Signer = Signer::new(HmacAlgorithm::Sha512, DigestEncoding::Base64);

#[derive(Clone)]
pub struct KrakenAuth {
    api_key: String,
    secret: Vec<u8>,
}

impl std::fmt::Debug for KrakenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenAuth").field("api_key", &self.api_key).finish_non_exhaustive()
    }
}

impl KrakenAuth {
    /// The secret must be the base64 string Kraken issues
    pub fn new(credentials: Credentials) -> Result<Self> {
        if !credentials.is_valid() {
            return Err(ExchangeError::Configuration("kraken API key and secret must be non-empty".to_string()));
        }
        let secret = BASE64
            .decode(credentials.secret.trim())
            .map_err(|e| ExchangeError::Configuration(format!("kraken secret is not valid base64: {e}")))?;
        Ok(Self {
            api_key: credentials.api_key,
            secret,
        })
    }

    pub fn sign(&self, path: &str, nonce: u64, body: &str) -> Result<String> {
        let mut message = path.as_bytes().to_vec();
        message.extend_from_slice(&sha256(format!("{nonce}{body}").as_bytes()));
        SIGNER.sign_bytes(&self.secret, &message)
    }
}

impl Authenticator for KrakenAuth {
    fn nonce_unit(&self) -> NonceUnit {
        NonceUnit::Millis
    }

    fn authenticate(&self, base_url: &Url, request: &PrivateRequest, nonce: u64) -> Result<HttpRequest> {
        let mut params = vec![("nonce".to_string(), nonce.to_string())];
        params.extend(request.params.iter().cloned());
        let body = encode_params(&params);

        let url = join_url(base_url, &request.path)?;
        let signature = self.sign(url.path(), nonce, &body)?;

        Ok(HttpRequest::new(request.method, url)
            .with_header("API-Key", &self.api_key)
            .with_header("API-Sign", signature)
            .with_form_body(body))
    }
}
