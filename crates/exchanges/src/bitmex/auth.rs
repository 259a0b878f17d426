//! BitMEX request signing
//!
//! Three headers: `api-key`, `api-expires` (unix seconds a few seconds in
//! the future) and `api-signature`, the hex HMAC-SHA256 of
//! `verb + path_with_query + expires + body`. GET and DELETE parameters go
//! in the query, the rest in a form body.

use crate::credentials::Credentials;
use crate::errors::{ExchangeError, Result};
use crate::http::{HttpRequest, Method};
use crate::signing::{Authenticator, DigestEncoding, HmacAlgorithm, PrivateRequest, Signer, encode_params, join_url};
use coinwire_core::NonceUnit;
use url::Url;

const SIGNER: Signer = Signer::new(HmacAlgorithm::Sha256, DigestEncoding::Hex);

/// Seconds of clock skew `api-expires` allows for
pub const EXPIRY_SKEW_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct BitmexAuth {
    credentials: Credentials,
}

impl BitmexAuth {
    pub fn new(credentials: Credentials) -> Result<Self> {
        if !credentials.is_valid() {
            return Err(ExchangeError::Configuration("bitmex API key and secret must be non-empty".to_string()));
        }
        Ok(Self { credentials })
    }

    pub fn signature(&self, verb: Method, path: &str, expires: u64, body: &str) -> Result<String> {
        SIGNER.sign(&self.credentials.secret, &format!("{verb}{path}{expires}{body}"))
    }
}

impl Authenticator for BitmexAuth {
    fn nonce_unit(&self) -> NonceUnit {
        NonceUnit::Seconds
    }

    fn authenticate(&self, base_url: &Url, request: &PrivateRequest, nonce: u64) -> Result<HttpRequest> {
        let expires = nonce + EXPIRY_SKEW_SECS;
        let mut url = join_url(base_url, &request.path)?;
        let encoded = encode_params(&request.params);

        let body = match request.method {
            Method::Get | Method::Delete => {
                if !encoded.is_empty() {
                    url.set_query(Some(&encoded));
                }
                None
            }
            Method::Post | Method::Put => Some(encoded),
        };

        let mut http = HttpRequest::new(request.method, url);
        let signature = self.signature(request.method, &http.target(), expires, body.as_deref().unwrap_or(""))?;
        http = http
            .with_header("api-expires", expires.to_string())
            .with_header("api-key", &self.credentials.api_key)
            .with_header("api-signature", signature);

        Ok(match body {
            Some(body) => http.with_form_body(body),
            None => http,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> BitmexAuth {
        BitmexAuth::new(Credentials::new("LAqUlngMIQkIUjXMUreyu3qn", "secret")).unwrap()
    }

    #[test]
    fn test_get_signs_query() {
        let base = Url::parse("https://www.bitmex.com/api/v1").unwrap();
        let request = PrivateRequest::get("user/margin").param("currency", "all");

        let signed = auth().authenticate(&base, &request, 1_518_064_231).unwrap();
        assert_eq!(signed.url.as_str(), "https://www.bitmex.com/api/v1/user/margin?currency=all");
        assert_eq!(signed.header("api-expires"), Some("1518064236"));
        assert_eq!(signed.header("api-key"), Some("LAqUlngMIQkIUjXMUreyu3qn"));
        assert_eq!(
            signed.header("api-signature").unwrap(),
            SIGNER.sign("secret", "GET/api/v1/user/margin?currency=all1518064236").unwrap()
        );
        assert!(signed.body.is_none());
    }

    #[test]
    fn test_post_signs_body() {
        let base = Url::parse("https://www.bitmex.com/api/v1").unwrap();
        let request = PrivateRequest::post("order").param("symbol", "XBTUSD").param("orderQty", "1");

        let signed = auth().authenticate(&base, &request, 100).unwrap();
        assert_eq!(signed.body.as_deref(), Some("symbol=XBTUSD&orderQty=1"));
        assert_eq!(
            signed.header("api-signature").unwrap(),
            SIGNER.sign("secret", "POST/api/v1/order105symbol=XBTUSD&orderQty=1").unwrap()
        );
    }
}
