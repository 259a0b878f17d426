//! Cross-venue test support for coinwire
//!
//! Builds any adapter by name so contract tests, demos and connectivity
//! checks can treat every venue as a `Box<dyn Exchange>`.

use coinwire_exchanges::http::Transport;
use coinwire_exchanges::prelude::*;
use std::sync::Arc;

/// Every venue adapter, by `Exchange::name`
pub const VENUES: [&str; 6] = ["binance", "bitstamp", "bittrex", "kraken", "poloniex", "bitmex"];

/// Build an adapter over the given transport
pub fn exchange_with_transport(
    venue: &str,
    config: ClientConfig,
    transport: Arc<dyn Transport>,
) -> Result<Box<dyn Exchange>> {
    Ok(match venue {
        "binance" => Box::new(BinanceExchange::with_transport(config, transport)?),
        "bitstamp" => Box::new(BitstampExchange::with_transport(config, transport)?),
        "bittrex" => Box::new(BittrexExchange::with_transport(config, transport)?),
        "kraken" => Box::new(KrakenExchange::with_transport(config, transport)?),
        "poloniex" => Box::new(PoloniexExchange::with_transport(config, transport)?),
        "bitmex" => Box::new(BitmexExchange::with_transport(config, transport)?),
        other => return Err(ExchangeError::Configuration(format!("unknown venue '{other}'"))),
    })
}

/// Build an adapter over the live monoio HTTPS transport
pub fn exchange(venue: &str, config: ClientConfig) -> Result<Box<dyn Exchange>> {
    Ok(match venue {
        "binance" => Box::new(BinanceExchange::new(config)?),
        "bitstamp" => Box::new(BitstampExchange::new(config)?),
        "bittrex" => Box::new(BittrexExchange::new(config)?),
        "kraken" => Box::new(KrakenExchange::new(config)?),
        "poloniex" => Box::new(PoloniexExchange::new(config)?),
        "bitmex" => Box::new(BitmexExchange::new(config)?),
        other => return Err(ExchangeError::Configuration(format!("unknown venue '{other}'"))),
    })
}

/// A pair each venue lists, in canonical form
pub fn sample_pair(venue: &str) -> &'static str {
    match venue {
        "bitstamp" | "kraken" | "bitmex" => "btc-usd",
        _ => "eth-btc",
    }
}

#[cfg(test)]
mod exchange_contract_tests;
#[cfg(test)]
mod unit_tests;
