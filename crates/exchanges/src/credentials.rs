//! API credentials
//!
//! Held for the lifetime of a client and never written anywhere. The secret
//! is redacted from `Debug` output.

use crate::errors::{ExchangeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
    /// Bitstamp customer id; other venues ignore it
    #[serde(default)]
    pub customer_id: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            customer_id: None,
        }
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Read `<PREFIX>_API_KEY`, `<PREFIX>_SECRET_KEY` and the optional
    /// `<PREFIX>_CUSTOMER_ID`
    pub fn from_env(prefix: &str) -> Result<Self> {
        let prefix = prefix.to_ascii_uppercase();
        let var = |suffix: &str| {
            let name = format!("{prefix}_{suffix}");
            std::env::var(&name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .ok_or(name)
        };

        let api_key = var("API_KEY").map_err(ExchangeError::CredentialsRequired)?;
        let secret = var("SECRET_KEY").map_err(ExchangeError::CredentialsRequired)?;
        let customer_id = var("CUSTOMER_ID").ok();

        Ok(Self {
            api_key,
            secret,
            customer_id,
        })
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .field("customer_id", &self.customer_id)
            .finish()
    }
}
