//! The uniform client contract every venue adapter implements
//!
//! Futures are not `Send`: adapters run on monoio's single-threaded
//! runtime. Blocking callers drive them with `VenueRuntime::block_on`.

use crate::errors::{ExchangeError, Result};
use crate::pair::PairFormat;
use crate::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coinwire_core::Fixed;

#[async_trait(?Send)]
pub trait Exchange: Send + Sync {
    /// Lowercase venue name, e.g. `"binance"`
    fn name(&self) -> &'static str;

    /// How the venue spells market identifiers
    fn pair_format(&self) -> &PairFormat;

    /// Ordering of `get_trade_history` results
    fn trade_history_order(&self) -> TradeOrder;

    /// Whether private calls can be signed
    fn has_credentials(&self) -> bool;

    /// Canonical `quote-base` to the venue's native token
    fn to_venue(&self, pair: &str) -> Result<String> {
        self.pair_format().to_venue(pair)
    }

    /// Native token to canonical `quote-base`
    fn from_venue(&self, native: &str) -> Result<String> {
        self.pair_format().from_venue(native)
    }

    /// Every market the venue lists, as native tokens
    async fn list_markets(&self) -> Result<Vec<String>>;

    /// Listed markets that normalize, in canonical form
    async fn list_canonical_markets(&self) -> Result<Vec<String>> {
        let markets = self.list_markets().await?;
        Ok(markets.iter().filter_map(|native| self.from_venue(native).ok()).collect())
    }

    async fn get_ticker(&self, pair: &str) -> Result<Ticker>;

    /// Up to `depth` levels per side, best first
    async fn get_order_book(&self, pair: &str, depth: usize) -> Result<OrderBook>;

    async fn get_trade_history(&self, pair: &str, limit: usize) -> Result<Vec<Trade>>;

    /// Non-zero balances; requires credentials
    async fn get_balances(&self) -> Result<Vec<Balance>>;

    /// Requires credentials
    async fn place_order(&self, request: &OrderRequest) -> Result<Order>;

    /// Requires credentials; `pair` is needed only by venues that key
    /// orders by market
    async fn cancel_order(&self, order_id: &str, pair: Option<&str>) -> Result<bool>;

    /// Requires credentials
    async fn withdraw(&self, currency: &str, amount: Fixed, address: &str) -> Result<WithdrawalReceipt>;

    /// Resting orders for one market, or for every market when `pair` is
    /// `None`; requires credentials
    async fn get_open_orders(&self, _pair: Option<&str>) -> Result<Vec<Order>> {
        Err(ExchangeError::unsupported(self.name(), "get_open_orders"))
    }

    /// Current state of one order; `pair` as for `cancel_order`
    async fn get_order(&self, _order_id: &str, _pair: Option<&str>) -> Result<Order> {
        Err(ExchangeError::unsupported(self.name(), "get_order"))
    }

    /// Cancel every resting order, or those of one market; returns how many
    /// the venue reported canceled
    async fn cancel_all_orders(&self, _pair: Option<&str>) -> Result<usize> {
        Err(ExchangeError::unsupported(self.name(), "cancel_all_orders"))
    }

    async fn get_deposit_address(&self, _currency: &str) -> Result<DepositAddress> {
        Err(ExchangeError::unsupported(self.name(), "get_deposit_address"))
    }

    /// Deposits, optionally for one currency
    async fn get_deposit_history(&self, _currency: Option<&str>) -> Result<Vec<Transfer>> {
        Err(ExchangeError::unsupported(self.name(), "get_deposit_history"))
    }

    /// Withdrawals, optionally for one currency
    async fn get_withdraw_history(&self, _currency: Option<&str>) -> Result<Vec<Transfer>> {
        Err(ExchangeError::unsupported(self.name(), "get_withdraw_history"))
    }

    /// Traded amount of the quote currency over the last 24h
    async fn get_market_volume(&self, _pair: &str) -> Result<Fixed> {
        Err(ExchangeError::unsupported(self.name(), "get_market_volume"))
    }

    /// Last price and 24h volume of every listed market
    async fn get_summaries(&self) -> Result<Vec<MarketSummary>> {
        Err(ExchangeError::unsupported(self.name(), "get_summaries"))
    }

    /// Candles oldest first, starting at `since` when given
    async fn get_market_ohlcv_data(
        &self,
        _pair: &str,
        _interval: CandleInterval,
        _since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Candle>> {
        Err(ExchangeError::unsupported(self.name(), "get_market_ohlcv_data"))
    }

    /// Best ask minus best bid
    async fn get_market_spread(&self, pair: &str) -> Result<Option<Fixed>> {
        let book = self.get_order_book(pair, 1).await?;
        Ok(book.spread())
    }

    /// Summed liquidity over the top `depth` levels of each side
    async fn get_market_depth(&self, pair: &str, depth: usize) -> Result<MarketDepth> {
        let book = self.get_order_book(pair, depth).await?;
        Ok(MarketDepth::from(&book))
    }
}
