//! Request signing primitives
//!
//! Venues authenticate private calls with an HMAC over some venue-specific
//! message. `Signer` covers the digest and its text encoding; each venue's
//! `Authenticator` decides what the message is and where the signature,
//! key and nonce go. Nothing here performs I/O.

use crate::errors::{ExchangeError, Result};
use crate::http::{HttpRequest, Method};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use coinwire_core::NonceUnit;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use url::Url;

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    Sha256,
    Sha512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestEncoding {
    Hex,
    UpperHex,
    Base64,
}

impl DigestEncoding {
    pub fn encode(&self, digest: &[u8]) -> String {
        match self {
            DigestEncoding::Hex => hex::encode(digest),
            DigestEncoding::UpperHex => hex::encode_upper(digest),
            DigestEncoding::Base64 => BASE64.encode(digest),
        }
    }
}

/// Raw HMAC digest
pub fn hmac_digest(algorithm: HmacAlgorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    match algorithm {
        HmacAlgorithm::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(key)
                .map_err(|e| ExchangeError::Signing(format!("HMAC setup failed: {e}")))?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        HmacAlgorithm::Sha512 => {
            let mut mac = HmacSha512::new_from_slice(key)
                .map_err(|e| ExchangeError::Signing(format!("HMAC setup failed: {e}")))?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }
    }
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// HMAC variant plus output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer {
    pub algorithm: HmacAlgorithm,
    pub encoding: DigestEncoding,
}

impl Signer {
    pub const fn new(algorithm: HmacAlgorithm, encoding: DigestEncoding) -> Self {
        Self { algorithm, encoding }
    }

    /// Sign `message` keyed by the secret's UTF-8 bytes
    pub fn sign(&self, secret: &str, message: &str) -> Result<String> {
        self.sign_bytes(secret.as_bytes(), message.as_bytes())
    }

    pub fn sign_bytes(&self, key: &[u8], message: &[u8]) -> Result<String> {
        let digest = hmac_digest(self.algorithm, key, message)?;
        Ok(self.encoding.encode(&digest))
    }
}

/// Key-sorted `k=v&...` with URL-encoded values
pub fn build_query_string(params: &[(String, String)]) -> String {
    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
    join_pairs(pairs.into_iter())
}

/// `k=v&...` in insertion order, for form bodies
pub fn encode_params(params: &[(String, String)]) -> String {
    join_pairs(params.iter())
}

fn join_pairs<'a>(pairs: impl Iterator<Item = &'a (String, String)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// An unsigned private call: method, venue path and business parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl PrivateRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }
}

/// Turns a private call into a signed, ready-to-send request
pub trait Authenticator: Send + Sync {
    /// Unit the venue expects its nonce or timestamp in
    fn nonce_unit(&self) -> NonceUnit;

    fn authenticate(&self, base_url: &Url, request: &PrivateRequest, nonce: u64) -> Result<HttpRequest>;
}

/// Resolve a venue path against the base URL, keeping the base path prefix
pub fn join_url(base_url: &Url, path: &str) -> Result<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}
