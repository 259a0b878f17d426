//! Place and cancel a far-from-market limit order on Binance testnet
//!
//! Reads `BINANCE_API_KEY` and `BINANCE_SECRET_KEY` from the environment or
//! a `.env` file. The order is priced well below the market so it rests on
//! the book, then it is cancelled.

use coinwire_core::prelude::*;
use coinwire_exchanges::prelude::*;
use tracing::{info, warn};

#[monoio::main(timer_enabled = true)]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logging();

    let config = ClientConfig::default().testnet().with_env_credentials("binance")?;
    let exchange = BinanceExchange::new(config)?;

    info!("🏓 Binance testnet ping: {}μs", exchange.ping().await?);

    let ticker = exchange.get_ticker("btc-usdt").await?;
    let price = (ticker.bid * Fixed::from_str_exact("0.5")?).round_dp(2);
    info!("📊 btc-usdt bid {}, placing buy at {}", ticker.bid, price);

    let request = OrderRequest::limit("btc-usdt", OrderSide::Buy, price, Fixed::from_str_exact("0.001")?);
    let order = exchange.place_order(&request).await?;
    info!("✅ Order {} accepted with status {}", order.id, order.status);

    if exchange.cancel_order(&order.id, Some("btc-usdt")).await? {
        info!("🗑️ Order {} cancelled", order.id);
    } else {
        warn!("⚠️ Order {} was not cancelled", order.id);
    }

    for balance in exchange.get_balances().await? {
        info!("   {}: {} available, {} reserved", balance.currency, balance.available, balance.reserved);
    }

    Ok(())
}
