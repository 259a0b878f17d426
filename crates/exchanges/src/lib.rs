//! # coinwire exchange adapters
//!
//! REST clients for cryptocurrency venues behind one `Exchange` contract.
//!
//! ## Architecture
//!
//! - **monoio-based HTTPS transport** - single-threaded async, rustls TLS
//! - **Per-venue signing** - each adapter owns an `Authenticator`
//! - **Pair normalization** - canonical lowercase `quote-base` everywhere
//! - **Fixed-point arithmetic** - exact decimals for prices and sizes
//!
//! Venues are cargo features, all enabled by default.

pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod pair;
pub mod rest;
pub mod signing;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(feature = "binance")]
pub mod binance;
#[cfg(feature = "bitmex")]
pub mod bitmex;
#[cfg(feature = "bitstamp")]
pub mod bitstamp;
#[cfg(feature = "bittrex")]
pub mod bittrex;
#[cfg(feature = "kraken")]
pub mod kraken;
#[cfg(feature = "poloniex")]
pub mod poloniex;

// Re-export main types
#[cfg(feature = "binance")]
pub use binance::BinanceExchange;
#[cfg(feature = "bitmex")]
pub use bitmex::BitmexExchange;
#[cfg(feature = "bitstamp")]
pub use bitstamp::BitstampExchange;
#[cfg(feature = "bittrex")]
pub use bittrex::BittrexExchange;
#[cfg(feature = "kraken")]
pub use kraken::KrakenExchange;
#[cfg(feature = "poloniex")]
pub use poloniex::PoloniexExchange;

pub use config::ClientConfig;
pub use credentials::Credentials;
pub use errors::{ExchangeError, Result, TransportError};
pub use http::{HttpRequest, HttpResponse, Method, MonoioHttpsClient, Transport, TransportConfig};
pub use pair::{PairFormat, TokenCase, TokenOrder};
pub use rest::RestClient;
pub use signing::{Authenticator, DigestEncoding, HmacAlgorithm, PrivateRequest, Signer};
pub use traits::Exchange;
pub use types::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::credentials::Credentials;
    pub use crate::errors::{ExchangeError, Result};
    pub use crate::traits::Exchange;
    pub use crate::types::*;
    pub use coinwire_core::prelude::*;

    #[cfg(feature = "binance")]
    pub use crate::binance::BinanceExchange;
    #[cfg(feature = "bitmex")]
    pub use crate::bitmex::BitmexExchange;
    #[cfg(feature = "bitstamp")]
    pub use crate::bitstamp::BitstampExchange;
    #[cfg(feature = "bittrex")]
    pub use crate::bittrex::BittrexExchange;
    #[cfg(feature = "kraken")]
    pub use crate::kraken::KrakenExchange;
    #[cfg(feature = "poloniex")]
    pub use crate::poloniex::PoloniexExchange;
}
