//! Client configuration shared by every venue adapter

use crate::credentials::Credentials;
use crate::errors::Result;
use crate::http::TransportConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Builder-style settings for a venue client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Overrides the venue's default (or testnet) base URL
    pub base_url: Option<String>,
    pub testnet: bool,
    /// Never serialized; load from the environment or set in code
    #[serde(skip_serializing)]
    pub credentials: Option<Credentials>,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// HTTPS forward proxy
    pub proxy: Option<String>,
    /// Log per-call latency through `PerfTimer`
    pub enable_timing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            testnet: false,
            credentials: None,
            connect_timeout_ms: 8_000,
            read_timeout_ms: 15_000,
            proxy: None,
            enable_timing: true,
        }
    }
}

impl ClientConfig {
    pub fn testnet(mut self) -> Self {
        self.testnet = true;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(api_key, secret));
        self
    }

    /// Attach the Bitstamp customer id to already configured credentials
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        if let Some(credentials) = self.credentials.take() {
            self.credentials = Some(credentials.with_customer_id(customer_id));
        }
        self
    }

    pub fn with_env_credentials(mut self, prefix: &str) -> Result<Self> {
        self.credentials = Some(Credentials::from_env(prefix)?);
        Ok(self)
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout_ms = connect.as_millis() as u64;
        self.read_timeout_ms = read.as_millis() as u64;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_timing(mut self, enable: bool) -> Self {
        self.enable_timing = enable;
        self
    }

    /// Base URL for a venue given its mainnet and optional testnet defaults
    pub fn resolve_base_url(&self, mainnet: &str, testnet: Option<&str>) -> String {
        match (&self.base_url, self.testnet, testnet) {
            (Some(url), _, _) => url.clone(),
            (None, true, Some(testnet_url)) => testnet_url.to_string(),
            _ => mainnet.to_string(),
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            proxy: self.proxy.clone(),
        }
    }
}
