//! Shared REST plumbing for the venue adapters
//!
//! `RestClient` owns the base URL, the transport, the optional signer and
//! the nonce generator. Every response goes through the same
//! classification:
//!
//! - non-2xx with a venue error the extractor recognises: `RemoteApi`
//! - any other non-2xx: `Transport(Status)`
//! - 2xx that is not JSON: `RemoteApi` carrying the raw body
//! - 2xx JSON flagged by the extractor: `RemoteApi`

use crate::config::ClientConfig;
use crate::errors::{ExchangeError, Result, TransportError};
use crate::http::{HttpRequest, HttpResponse, MonoioHttpsClient, Transport};
use crate::signing::{Authenticator, PrivateRequest, join_url};
use coinwire_core::{NonceGenerator, NonceUnit, PerfTimer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Extracts a venue error message from a decoded response body
pub type ErrorExtractor = fn(&Value) -> Option<String>;

pub struct RestClient {
    venue: &'static str,
    base_url: Url,
    transport: Arc<dyn Transport>,
    authenticator: Option<Box<dyn Authenticator>>,
    nonces: NonceGenerator,
    nonces_injected: bool,
    venue_error: ErrorExtractor,
    enable_timing: bool,
}

impl RestClient {
    pub fn new(
        venue: &'static str,
        base_url: &str,
        transport: Arc<dyn Transport>,
        venue_error: ErrorExtractor,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        info!("🔗 {} REST client created", venue);
        info!("   Base URL: {}", base_url);

        Ok(Self {
            venue,
            base_url,
            transport,
            authenticator: None,
            nonces: NonceGenerator::new(NonceUnit::Millis),
            nonces_injected: false,
            venue_error,
            enable_timing: true,
        })
    }

    /// Build from a `ClientConfig`, using the given transport or a fresh
    /// `MonoioHttpsClient` configured with the config's timeouts and proxy
    pub fn from_config(
        venue: &'static str,
        config: &ClientConfig,
        mainnet_url: &str,
        testnet_url: Option<&str>,
        transport: Option<Arc<dyn Transport>>,
        venue_error: ErrorExtractor,
    ) -> Result<Self> {
        let transport = match transport {
            Some(transport) => transport,
            None => Arc::new(MonoioHttpsClient::with_config(config.transport_config())?),
        };
        let base_url = config.resolve_base_url(mainnet_url, testnet_url);
        Ok(Self::new(venue, &base_url, transport, venue_error)?.with_timing(config.enable_timing))
    }

    /// Install the signer; its nonce unit applies unless a generator was
    /// already supplied through `with_nonce_generator`
    pub fn with_authenticator(mut self, authenticator: Option<Box<dyn Authenticator>>) -> Self {
        if let Some(auth) = &authenticator {
            if !self.nonces_injected {
                self.nonces = NonceGenerator::new(auth.nonce_unit());
            }
        }
        self.authenticator = authenticator;
        self
    }

    /// Replace the nonce source, e.g. with one driven by a manual clock
    pub fn with_nonce_generator(mut self, nonces: NonceGenerator) -> Self {
        self.nonces = nonces;
        self.nonces_injected = true;
        self
    }

    pub fn with_timing(mut self, enable: bool) -> Self {
        self.enable_timing = enable;
        self
    }

    pub fn venue(&self) -> &'static str {
        self.venue
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_credentials(&self) -> bool {
        self.authenticator.is_some()
    }

    /// Fail with `CredentialsRequired` unless a signer is configured
    pub fn ensure_authenticated(&self) -> Result<&dyn Authenticator> {
        self.authenticator
            .as_deref()
            .ok_or_else(|| ExchangeError::credentials_required(self.venue))
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        join_url(&self.base_url, path)
    }

    /// Public GET with query parameters appended in order
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let mut url = self.endpoint(path)?;
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        self.execute(HttpRequest::get(url)).await
    }

    /// Sign and send a private call
    pub async fn signed(&self, request: PrivateRequest) -> Result<Value> {
        let authenticator = self.ensure_authenticated()?;
        let nonce = self.nonces.next();
        let http_request = authenticator.authenticate(&self.base_url, &request, nonce)?;
        debug!("🔐 Signed {} {} {}", self.venue, request.method, request.path);
        self.execute(http_request).await
    }

    pub async fn execute(&self, request: HttpRequest) -> Result<Value> {
        let timer = if self.enable_timing {
            PerfTimer::start(format!("{} {} {}", self.venue, request.method, request.url.path()))
        } else {
            PerfTimer::disabled()
        };

        let response = self.transport.send(request).await?;
        let result = self.classify(response);
        drop(timer);
        result
    }

    fn classify(&self, response: HttpResponse) -> Result<Value> {
        let parsed = serde_json::from_str::<Value>(&response.body);

        if !response.is_success() {
            if let Some(message) = parsed.as_ref().ok().and_then(self.venue_error) {
                return Err(ExchangeError::remote(self.venue, message, response.body));
            }
            debug!("{} HTTP {} without venue error", self.venue, response.status);
            return Err(TransportError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let value = match parsed {
            Ok(value) => value,
            Err(e) => {
                return Err(ExchangeError::remote(
                    self.venue,
                    format!("unparseable response: {e}"),
                    response.body,
                ));
            }
        };

        match (self.venue_error)(&value) {
            Some(message) => Err(ExchangeError::remote(self.venue, message, response.body)),
            None => Ok(value),
        }
    }
}

/// Field accessors over loosely typed venue JSON
pub(crate) mod json {
    use crate::errors::{ExchangeError, Result};
    use crate::types::OrderBookLevel;
    use coinwire_core::Fixed;
    use serde_json::Value;

    fn missing(venue: &str, field: &str, value: &Value) -> ExchangeError {
        ExchangeError::remote(venue, format!("missing or invalid field '{field}'"), value.to_string())
    }

    /// Deserialize a venue payload; shape mismatches are venue errors
    pub fn decode<T: serde::de::DeserializeOwned>(venue: &str, value: Value) -> Result<T> {
        let payload = value.to_string();
        serde_json::from_value(value)
            .map_err(|e| ExchangeError::remote(venue, format!("unexpected response shape: {e}"), payload))
    }

    /// Decimal from a JSON string or number
    pub fn fixed(venue: &str, value: &Value, field: &str) -> Result<Fixed> {
        let raw = value.get(field).ok_or_else(|| missing(venue, field, value))?;
        Fixed::from_json(raw).map_err(|_| missing(venue, field, value))
    }

    pub fn fixed_at(venue: &str, value: &Value, index: usize) -> Result<Fixed> {
        let raw = value.get(index).ok_or_else(|| missing(venue, &index.to_string(), value))?;
        Fixed::from_json(raw).map_err(|_| missing(venue, &index.to_string(), value))
    }

    pub fn string(venue: &str, value: &Value, field: &str) -> Result<String> {
        match value.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(missing(venue, field, value)),
        }
    }

    pub fn array<'a>(venue: &str, value: &'a Value, field: &str) -> Result<&'a Vec<Value>> {
        value
            .get(field)
            .and_then(Value::as_array)
            .ok_or_else(|| missing(venue, field, value))
    }

    /// `[[price, quantity, ...], ...]` rows under `field`
    pub fn levels(venue: &str, value: &Value, field: &str) -> Result<Vec<OrderBookLevel>> {
        array(venue, value, field)?
            .iter()
            .map(|row| Ok(OrderBookLevel::new(fixed_at(venue, row, 0)?, fixed_at(venue, row, 1)?)))
            .collect()
    }

    pub fn as_array<'a>(venue: &str, value: &'a Value) -> Result<&'a Vec<Value>> {
        value
            .as_array()
            .ok_or_else(|| ExchangeError::remote(venue, "expected a JSON array", value.to_string()))
    }

    pub fn as_object<'a>(venue: &str, value: &'a Value) -> Result<&'a serde_json::Map<String, Value>> {
        value
            .as_object()
            .ok_or_else(|| ExchangeError::remote(venue, "expected a JSON object", value.to_string()))
    }
}
