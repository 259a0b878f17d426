//! Bittrex v1.1 request signing
//!
//! Private calls are GETs whose query ends with `apikey` and `nonce`. The
//! complete URL is signed with HMAC-SHA512 and sent in the `apisign` header.

use crate::credentials::Credentials;
use crate::errors::{ExchangeError, Result};
use crate::http::HttpRequest;
use crate::signing::{Authenticator, DigestEncoding, HmacAlgorithm, PrivateRequest, Signer, encode_params, join_url};
use coinwire_core::NonceUnit;
use url::Url;

const SIGNER: Signer = Signer::new(HmacAlgorithm::Sha512, DigestEncoding::Hex);

#[derive(Debug, Clone)]
pub struct BittrexAuth {
    credentials: Credentials,
}

impl BittrexAuth {
    pub fn new(credentials: Credentials) -> Result<Self> {
        if !credentials.is_valid() {
            return Err(ExchangeError::Configuration("bittrex API key and secret must be non-empty".to_string()));
        }
        Ok(Self { credentials })
    }
}

impl Authenticator for BittrexAuth {
    fn nonce_unit(&self) -> NonceUnit {
        NonceUnit::Seconds
    }

    fn authenticate(&self, base_url: &Url, request: &PrivateRequest, nonce: u64) -> Result<HttpRequest> {
        let mut params = request.params.clone();
        params.push(("apikey".to_string(), self.credentials.api_key.clone()));
        params.push(("nonce".to_string(), nonce.to_string()));

        let mut url = join_url(base_url, &request.path)?;
        url.set_query(Some(&encode_params(&params)));
        let signature = SIGNER.sign(&self.credentials.secret, url.as_str())?;

        Ok(HttpRequest::new(request.method, url).with_header("apisign", signature))
    }
}
