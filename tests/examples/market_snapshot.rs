//! Public market data from every venue
//!
//! Demonstrates:
//! - Building adapters behind `dyn Exchange`
//! - Blocking calls through `VenueRuntime::block_on`
//! - Canonical `quote-base` pairs on every venue
//!
//! Usage: `cargo run --example market_snapshot -- [venue...]`

use coinwire_core::prelude::*;
use coinwire_exchanges::prelude::*;
use coinwire_tests::{VENUES, exchange, sample_pair};
use tracing::{error, info};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let requested: Vec<String> = std::env::args().skip(1).collect();
    let venues: Vec<&str> = if requested.is_empty() {
        VENUES.to_vec()
    } else {
        VENUES.iter().copied().filter(|v| requested.iter().any(|r| r == v)).collect()
    };

    info!("🚀 Market snapshot for {:?}", venues);
    let runtime = VenueRuntime::new();

    for venue in venues {
        let client = exchange(venue, ClientConfig::default())?;
        let pair = sample_pair(venue);

        let snapshot = runtime.block_on(async {
            let ticker = client.get_ticker(pair).await?;
            let book = client.get_order_book(pair, 5).await?;
            let trades = client.get_trade_history(pair, 10).await?;
            Ok::<_, ExchangeError>((ticker, book, trades))
        })?;

        match snapshot {
            Ok((ticker, book, trades)) => {
                info!("📊 {} {}: bid {} ask {} last {}", venue, pair, ticker.bid, ticker.ask, ticker.last);
                info!("   Spread: {:?}", book.spread());
                info!(
                    "   Depth: {} bids / {} asks, {} recent trades ({:?})",
                    book.bids.len(),
                    book.asks.len(),
                    trades.len(),
                    client.trade_history_order()
                );
            }
            Err(e) => error!("❌ {} {}: {}", venue, pair, e),
        }
    }

    Ok(())
}
