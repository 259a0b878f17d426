//! Binance spot REST adapter
//!
//! Public market data comes from `/api/v3`; private calls are signed by
//! `BinanceAuth`. Testnet is selected through `ClientConfig::testnet()`.

pub mod auth;
pub mod types;

use crate::config::ClientConfig;
use crate::errors::{ExchangeError, Result};
use crate::http::Transport;
use crate::pair::{PairFormat, TokenCase, TokenOrder};
use crate::rest::{RestClient, json};
use crate::signing::{Authenticator, PrivateRequest};
use crate::traits::Exchange;
use crate::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coinwire_core::timing::{datetime_from_millis, parse_utc_datetime};
use coinwire_core::{Fixed, client_order_id, log_order, nanos};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub use auth::BinanceAuth;
pub use types::*;

pub const VENUE: &str = "binance";
pub const MAINNET_URL: &str = "https://api.binance.com";
pub const TESTNET_URL: &str = "https://testnet.binance.vision";

/// `ETHBTC`: quote first, no delimiter
pub const BINANCE_PAIRS: PairFormat = PairFormat {
    delimiter: "",
    case: TokenCase::Upper,
    order: TokenOrder::QuoteFirst,
    base_currencies: &["btc", "eth", "bnb", "usdt"],
    aliases: &[],
};

/// Book sizes `/api/v3/depth` accepts
const DEPTH_LIMITS: [usize; 8] = [5, 10, 20, 50, 100, 500, 1000, 5000];
const MAX_TRADES: usize = 1000;
const MAX_KLINES: usize = 1000;

/// `{"code": -1121, "msg": "Invalid symbol."}`
pub fn venue_error(value: &Value) -> Option<String> {
    let code = value.get("code")?;
    let msg = value.get("msg")?.as_str()?;
    Some(format!("{msg} (code {code})"))
}

/// Smallest accepted book size covering `depth`
fn depth_limit(depth: usize) -> usize {
    DEPTH_LIMITS
        .iter()
        .copied()
        .find(|&limit| limit >= depth)
        .unwrap_or(DEPTH_LIMITS[DEPTH_LIMITS.len() - 1])
}

/// Numeric ids are exchange order ids, anything else a client order id
fn order_ref(call: PrivateRequest, order_id: &str) -> PrivateRequest {
    if !order_id.is_empty() && order_id.bytes().all(|b| b.is_ascii_digit()) {
        call.param("orderId", order_id)
    } else {
        call.param("origClientOrderId", order_id)
    }
}

fn side_param(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "BUY",
        OrderSide::Sell => "SELL",
    }
}

fn type_param(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Limit => "LIMIT",
        OrderType::Market => "MARKET",
        OrderType::Stop => "STOP_LOSS",
    }
}

pub struct BinanceExchange {
    rest: RestClient,
}

impl BinanceExchange {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Use a caller-supplied transport, e.g. a mock
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::build(config, Some(transport))
    }

    fn build(config: ClientConfig, transport: Option<Arc<dyn Transport>>) -> Result<Self> {
        info!("🚀 Initializing Binance exchange");
        info!("   Testnet: {}", config.testnet);

        let auth = config
            .credentials
            .clone()
            .map(BinanceAuth::new)
            .transpose()?
            .map(|auth| Box::new(auth) as Box<dyn Authenticator>);

        let rest = RestClient::from_config(VENUE, &config, MAINNET_URL, Some(TESTNET_URL), transport, venue_error)?
            .with_authenticator(auth);
        Ok(Self { rest })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Round trip to `/api/v3/ping`, in microseconds
    pub async fn ping(&self) -> Result<u64> {
        let start = nanos();
        self.rest.get("/api/v3/ping", &[]).await?;
        let latency_micros = (nanos() - start) / 1000;
        info!("🏓 Binance ping: {}μs", latency_micros);
        Ok(latency_micros)
    }

    fn to_order(&self, order: BinanceOrder) -> Order {
        Order {
            id: order.order_id.to_string(),
            pair: self
                .from_venue(&order.symbol)
                .unwrap_or_else(|_| order.symbol.to_ascii_lowercase()),
            side: order.side(),
            order_type: order.kind(),
            price: order.effective_price(),
            quantity: order.orig_qty,
            status: order_status(&order.status),
        }
    }

    async fn open_orders(&self, pair: Option<&str>) -> Result<Vec<BinanceOrder>> {
        let symbol = pair.map(|pair| self.to_venue(pair)).transpose()?;
        let call = PrivateRequest::get("/api/v3/openOrders").param_opt("symbol", symbol);
        json::decode(VENUE, self.rest.signed(call).await?)
    }

    async fn cancel_on_symbol(&self, order_id: &str, symbol: &str) -> Result<bool> {
        let call = order_ref(PrivateRequest::delete("/api/v3/order").param("symbol", symbol), order_id);
        let response = self.rest.signed(call).await?;
        let ack: BinanceOrderResponse = json::decode(VENUE, response)?;
        debug!("Binance cancel {} -> {}", order_id, ack.status);
        log_order!(VENUE, "CANCELED", order_id, symbol);
        Ok(order_status(&ack.status) == OrderStatus::Canceled)
    }

    /// Server clock in milliseconds
    pub async fn server_time(&self) -> Result<u64> {
        let response = self.rest.get("/api/v3/time", &[]).await?;
        response
            .get("serverTime")
            .and_then(Value::as_u64)
            .ok_or_else(|| ExchangeError::remote(VENUE, "missing serverTime", response.to_string()))
    }
}

#[async_trait(?Send)]
impl Exchange for BinanceExchange {
    fn name(&self) -> &'static str {
        VENUE
    }

    fn pair_format(&self) -> &PairFormat {
        &BINANCE_PAIRS
    }

    fn trade_history_order(&self) -> TradeOrder {
        TradeOrder::OldestFirst
    }

    fn has_credentials(&self) -> bool {
        self.rest.has_credentials()
    }

    async fn list_markets(&self) -> Result<Vec<String>> {
        let response = self.rest.get("/api/v3/exchangeInfo", &[]).await?;
        let info: BinanceExchangeInfo = json::decode(VENUE, response)?;
        Ok(info.symbols.into_iter().map(|s| s.symbol).collect())
    }

    async fn get_ticker(&self, pair: &str) -> Result<Ticker> {
        let symbol = self.to_venue(pair)?;
        let response = self.rest.get("/api/v3/ticker/24hr", &[("symbol", symbol)]).await?;
        let ticker: BinanceTicker = json::decode(VENUE, response)?;
        Ok(Ticker {
            ask: ticker.ask_price,
            bid: ticker.bid_price,
            last: ticker.last_price,
        })
    }

    async fn get_order_book(&self, pair: &str, depth: usize) -> Result<OrderBook> {
        let symbol = self.to_venue(pair)?;
        let params = [("symbol", symbol), ("limit", depth_limit(depth).to_string())];
        let response = self.rest.get("/api/v3/depth", &params).await?;
        let book: BinanceDepth = json::decode(VENUE, response)?;
        Ok(OrderBook::from_levels(
            BinanceDepth::levels(book.bids),
            BinanceDepth::levels(book.asks),
            depth,
        ))
    }

    async fn get_trade_history(&self, pair: &str, limit: usize) -> Result<Vec<Trade>> {
        let symbol = self.to_venue(pair)?;
        let limit = limit.clamp(1, MAX_TRADES);
        let params = [("symbol", symbol), ("limit", limit.to_string())];
        let response = self.rest.get("/api/v3/trades", &params).await?;
        let trades: Vec<BinanceTrade> = json::decode(VENUE, response)?;

        trades
            .into_iter()
            .map(|trade| {
                let timestamp = datetime_from_millis(trade.time)
                    .ok_or_else(|| ExchangeError::remote(VENUE, "invalid trade time", trade.time.to_string()))?;
                Ok(Trade {
                    timestamp,
                    side: trade.taker_side(),
                    price: trade.price,
                    quantity: trade.qty,
                    trade_id: trade.id.to_string(),
                })
            })
            .collect()
    }

    async fn get_balances(&self) -> Result<Vec<Balance>> {
        let response = self.rest.signed(PrivateRequest::get("/api/v3/account")).await?;
        let account: BinanceAccount = json::decode(VENUE, response)?;
        Ok(account
            .balances
            .into_iter()
            .filter(|b| !(b.free.is_zero() && b.locked.is_zero()))
            .map(|b| Balance::new(&b.asset, b.free, b.locked))
            .collect())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order> {
        self.rest.ensure_authenticated()?;
        request.validate()?;
        let symbol = self.to_venue(&request.pair)?;

        let mut call = PrivateRequest::post("/api/v3/order")
            .param("symbol", &symbol)
            .param("side", side_param(request.side))
            .param("type", type_param(request.order_type))
            .param("quantity", request.quantity.to_plain_string())
            .param("newClientOrderId", client_order_id("cw"));
        call = match request.order_type {
            OrderType::Limit => call
                .param("timeInForce", "GTC")
                .param("price", request.required_price()?.to_plain_string()),
            OrderType::Stop => call.param("stopPrice", request.required_price()?.to_plain_string()),
            OrderType::Market => call,
        };

        let response = self.rest.signed(call).await?;
        let ack: BinanceOrderResponse = json::decode(VENUE, response)?;
        log_order!(VENUE, "PLACED", ack.order_id, symbol);
        Ok(Order::accepted(request, ack.order_id.to_string(), order_status(&ack.status)))
    }

    async fn cancel_order(&self, order_id: &str, pair: Option<&str>) -> Result<bool> {
        self.rest.ensure_authenticated()?;
        let pair = pair.ok_or_else(|| ExchangeError::InvalidOrder("binance cancels need the order's pair".to_string()))?;
        let symbol = self.to_venue(pair)?;
        self.cancel_on_symbol(order_id, &symbol).await
    }

    async fn get_open_orders(&self, pair: Option<&str>) -> Result<Vec<Order>> {
        self.rest.ensure_authenticated()?;
        let orders = self.open_orders(pair).await?;
        Ok(orders.into_iter().map(|order| self.to_order(order)).collect())
    }

    async fn get_order(&self, order_id: &str, pair: Option<&str>) -> Result<Order> {
        self.rest.ensure_authenticated()?;
        let pair = pair.ok_or_else(|| ExchangeError::InvalidOrder("binance order lookups need the order's pair".to_string()))?;
        let call = order_ref(PrivateRequest::get("/api/v3/order").param("symbol", self.to_venue(pair)?), order_id);
        let order: BinanceOrder = json::decode(VENUE, self.rest.signed(call).await?)?;
        Ok(self.to_order(order))
    }

    /// One cancel per open order
    async fn cancel_all_orders(&self, pair: Option<&str>) -> Result<usize> {
        self.rest.ensure_authenticated()?;
        let open = self.open_orders(pair).await?;
        let mut canceled = 0;
        for order in &open {
            if self.cancel_on_symbol(&order.order_id.to_string(), &order.symbol).await? {
                canceled += 1;
            }
        }
        info!("🧹 Binance canceled {}/{} open orders", canceled, open.len());
        Ok(canceled)
    }

    async fn get_deposit_address(&self, currency: &str) -> Result<DepositAddress> {
        self.rest.ensure_authenticated()?;
        let call = PrivateRequest::get("/sapi/v1/capital/deposit/address").param("coin", BINANCE_PAIRS.native_currency(currency));
        let address: BinanceDepositAddress = json::decode(VENUE, self.rest.signed(call).await?)?;
        Ok(DepositAddress {
            currency: address.coin.to_ascii_lowercase(),
            address: address.address,
            tag: Some(address.tag).filter(|tag| !tag.is_empty()),
        })
    }

    async fn get_deposit_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        self.rest.ensure_authenticated()?;
        let call = PrivateRequest::get("/sapi/v1/capital/deposit/hisrec")
            .param_opt("coin", currency.map(|c| BINANCE_PAIRS.native_currency(c)));
        let deposits: Vec<BinanceDeposit> = json::decode(VENUE, self.rest.signed(call).await?)?;
        Ok(deposits
            .into_iter()
            .map(|deposit| Transfer {
                kind: TransferKind::Deposit,
                id: deposit.id,
                currency: deposit.coin.to_ascii_lowercase(),
                amount: deposit.amount,
                address: deposit.address,
                status: deposit_status(deposit.status).to_string(),
                timestamp: deposit.insert_time.and_then(datetime_from_millis),
            })
            .collect())
    }

    async fn get_withdraw_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        self.rest.ensure_authenticated()?;
        let call = PrivateRequest::get("/sapi/v1/capital/withdraw/history")
            .param_opt("coin", currency.map(|c| BINANCE_PAIRS.native_currency(c)));
        let withdrawals: Vec<BinanceWithdrawal> = json::decode(VENUE, self.rest.signed(call).await?)?;
        Ok(withdrawals
            .into_iter()
            .map(|withdrawal| Transfer {
                kind: TransferKind::Withdrawal,
                id: Some(withdrawal.id),
                currency: withdrawal.coin.to_ascii_lowercase(),
                amount: withdrawal.amount,
                address: withdrawal.address,
                status: withdrawal_status(withdrawal.status).to_string(),
                timestamp: withdrawal.apply_time.as_deref().and_then(parse_utc_datetime),
            })
            .collect())
    }

    async fn get_market_volume(&self, pair: &str) -> Result<Fixed> {
        let symbol = self.to_venue(pair)?;
        let response = self.rest.get("/api/v3/ticker/24hr", &[("symbol", symbol)]).await?;
        let ticker: BinanceTicker = json::decode(VENUE, response)?;
        Ok(ticker.volume)
    }

    async fn get_summaries(&self) -> Result<Vec<MarketSummary>> {
        let summaries: Vec<BinanceSummary> = json::decode(VENUE, self.rest.get("/api/v3/ticker/24hr", &[]).await?)?;
        Ok(summaries
            .into_iter()
            .map(|summary| MarketSummary {
                market: summary.symbol,
                last: summary.last_price,
                volume: summary.volume,
            })
            .collect())
    }

    /// Klines: `[openTime, open, high, low, close, volume, closeTime, ...]`
    async fn get_market_ohlcv_data(
        &self,
        pair: &str,
        interval: CandleInterval,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Candle>> {
        let symbol = self.to_venue(pair)?;
        let mut params = vec![
            ("symbol", symbol),
            ("interval", interval.to_string()),
            ("limit", MAX_KLINES.to_string()),
        ];
        if let Some(since) = since {
            params.push(("startTime", since.timestamp_millis().to_string()));
        }
        let response = self.rest.get("/api/v3/klines", &params).await?;

        json::as_array(VENUE, &response)?
            .iter()
            .map(|row| {
                let open_time = row
                    .get(0)
                    .and_then(Value::as_i64)
                    .and_then(datetime_from_millis)
                    .ok_or_else(|| ExchangeError::remote(VENUE, "invalid kline open time", row.to_string()))?;
                Ok(Candle {
                    open_time,
                    open: json::fixed_at(VENUE, row, 1)?,
                    high: json::fixed_at(VENUE, row, 2)?,
                    low: json::fixed_at(VENUE, row, 3)?,
                    close: json::fixed_at(VENUE, row, 4)?,
                    volume: json::fixed_at(VENUE, row, 5)?,
                })
            })
            .collect()
    }

    async fn withdraw(&self, currency: &str, amount: Fixed, address: &str) -> Result<WithdrawalReceipt> {
        self.rest.ensure_authenticated()?;
        let coin = BINANCE_PAIRS.native_currency(currency);
        let call = PrivateRequest::post("/sapi/v1/capital/withdraw/apply")
            .param("coin", &coin)
            .param("address", address)
            .param("amount", amount.to_plain_string());

        let response = self.rest.signed(call).await?;
        let receipt: BinanceWithdrawResponse = json::decode(VENUE, response)?;
        info!("💸 Binance withdrawal {} {} submitted: {}", amount, coin, receipt.id);
        Ok(WithdrawalReceipt {
            id: Some(receipt.id),
            currency: currency.to_ascii_lowercase(),
            amount,
            address: address.to_string(),
        })
    }
}
