//! Bitstamp v2 REST adapter
//!
//! Markets are lowercase quote-first tokens without a delimiter
//! (`btcusd`). Private calls need the customer id alongside key and secret.

pub mod auth;

use crate::config::ClientConfig;
use crate::errors::{ExchangeError, Result};
use crate::http::Transport;
use crate::pair::{PairFormat, TokenCase, TokenOrder};
use crate::rest::{RestClient, json};
use crate::signing::{Authenticator, PrivateRequest};
use crate::traits::Exchange;
use crate::types::*;
use async_trait::async_trait;
use coinwire_core::timing::{datetime_from_secs, parse_utc_datetime};
use coinwire_core::{Fixed, log_order};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub use auth::BitstampAuth;

pub const VENUE: &str = "bitstamp";
pub const BASE_URL: &str = "https://www.bitstamp.net/api/v2/";

pub const BITSTAMP_PAIRS: PairFormat = PairFormat {
    delimiter: "",
    case: TokenCase::Lower,
    order: TokenOrder::QuoteFirst,
    base_currencies: &["usd", "eur", "btc", "gbp", "usdt", "usdc"],
    aliases: &[],
};

/// `{"status": "error", "reason": ...}` or `{"error": ...}`
pub fn venue_error(value: &Value) -> Option<String> {
    if value.get("status").and_then(Value::as_str) == Some("error") {
        return Some(match value.get("reason") {
            Some(Value::String(reason)) => reason.clone(),
            Some(reason) => reason.to_string(),
            None => "unspecified error".to_string(),
        });
    }
    match value.get("error")? {
        Value::String(error) => Some(error.clone()),
        Value::Null | Value::Bool(false) => None,
        error => Some(error.to_string()),
    }
}

/// Transaction `type`: 0 is a buy, 1 a sell
fn trade_side(value: &Value) -> Result<OrderSide> {
    match json::string(VENUE, value, "type")?.as_str() {
        "0" => Ok(OrderSide::Buy),
        "1" => Ok(OrderSide::Sell),
        other => Err(ExchangeError::remote(VENUE, format!("unknown transaction type '{other}'"), value.to_string())),
    }
}

/// Look-back of `withdrawal-requests/`, in seconds
const WITHDRAWAL_LOOKBACK_SECS: u64 = 50_000_000;

/// `BTC/USD` to canonical `btc-usd`
fn slash_pair(market: &str) -> String {
    market.to_ascii_lowercase().replace('/', "-")
}

/// Withdrawal request `status` codes
fn withdrawal_status(status: i64) -> &'static str {
    match status {
        0 => "open",
        1 => "in process",
        2 => "finished",
        3 => "canceled",
        4 => "failed",
        _ => "unknown",
    }
}

pub struct BitstampExchange {
    rest: RestClient,
}

impl BitstampExchange {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::build(config, Some(transport))
    }

    fn build(config: ClientConfig, transport: Option<Arc<dyn Transport>>) -> Result<Self> {
        let auth = config
            .credentials
            .clone()
            .map(BitstampAuth::new)
            .transpose()?
            .map(|auth| Box::new(auth) as Box<dyn Authenticator>);

        let rest = RestClient::from_config(VENUE, &config, BASE_URL, None, transport, venue_error)?.with_authenticator(auth);
        Ok(Self { rest })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }
}

#[async_trait(?Send)]
impl Exchange for BitstampExchange {
    fn name(&self) -> &'static str {
        VENUE
    }

    fn pair_format(&self) -> &PairFormat {
        &BITSTAMP_PAIRS
    }

    fn trade_history_order(&self) -> TradeOrder {
        TradeOrder::NewestFirst
    }

    fn has_credentials(&self) -> bool {
        self.rest.has_credentials()
    }

    async fn list_markets(&self) -> Result<Vec<String>> {
        let response = self.rest.get("trading-pairs-info/", &[]).await?;
        json::as_array(VENUE, &response)?
            .iter()
            .map(|market| json::string(VENUE, market, "url_symbol"))
            .collect()
    }

    async fn get_ticker(&self, pair: &str) -> Result<Ticker> {
        let market = self.to_venue(pair)?;
        let response = self.rest.get(&format!("ticker/{market}/"), &[]).await?;
        Ok(Ticker {
            ask: json::fixed(VENUE, &response, "ask")?,
            bid: json::fixed(VENUE, &response, "bid")?,
            last: json::fixed(VENUE, &response, "last")?,
        })
    }

    async fn get_order_book(&self, pair: &str, depth: usize) -> Result<OrderBook> {
        let market = self.to_venue(pair)?;
        let response = self.rest.get(&format!("order_book/{market}/"), &[]).await?;
        Ok(OrderBook::from_levels(
            json::levels(VENUE, &response, "bids")?,
            json::levels(VENUE, &response, "asks")?,
            depth,
        ))
    }

    async fn get_trade_history(&self, pair: &str, limit: usize) -> Result<Vec<Trade>> {
        let market = self.to_venue(pair)?;
        let response = self
            .rest
            .get(&format!("transactions/{market}/"), &[("time", "hour".to_string())])
            .await?;

        json::as_array(VENUE, &response)?
            .iter()
            .take(limit)
            .map(|tx| {
                let date = json::string(VENUE, tx, "date")?;
                let timestamp = date
                    .parse::<i64>()
                    .ok()
                    .and_then(datetime_from_secs)
                    .ok_or_else(|| ExchangeError::remote(VENUE, "invalid transaction date", tx.to_string()))?;
                Ok(Trade {
                    timestamp,
                    side: trade_side(tx)?,
                    price: json::fixed(VENUE, tx, "price")?,
                    quantity: json::fixed(VENUE, tx, "amount")?,
                    trade_id: json::string(VENUE, tx, "tid")?,
                })
            })
            .collect()
    }

    async fn get_balances(&self) -> Result<Vec<Balance>> {
        let response = self.rest.signed(PrivateRequest::post("balance/")).await?;
        let fields = json::as_object(VENUE, &response)?;

        let mut balances = Vec::new();
        for (key, value) in fields {
            let Some(currency) = key.strip_suffix("_available") else {
                continue;
            };
            let available = Fixed::from_json(value)?;
            let reserved = match fields.get(&format!("{currency}_reserved")) {
                Some(reserved) => Fixed::from_json(reserved)?,
                None => Fixed::ZERO,
            };
            if !(available.is_zero() && reserved.is_zero()) {
                balances.push(Balance::new(currency, available, reserved));
            }
        }
        Ok(balances)
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order> {
        self.rest.ensure_authenticated()?;
        request.validate()?;
        let market = self.to_venue(&request.pair)?;

        let side = match request.side {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        };
        let call = match request.order_type {
            OrderType::Limit => PrivateRequest::post(format!("{side}/{market}/"))
                .param("amount", request.quantity.to_plain_string())
                .param("price", request.required_price()?.to_plain_string()),
            OrderType::Market => {
                PrivateRequest::post(format!("{side}/market/{market}/")).param("amount", request.quantity.to_plain_string())
            }
            OrderType::Stop => return Err(ExchangeError::unsupported(VENUE, "stop orders")),
        };

        let response = self.rest.signed(call).await?;
        let id = json::string(VENUE, &response, "id")?;
        log_order!(VENUE, "PLACED", id, market);
        Ok(Order::accepted(request, id, OrderStatus::New))
    }

    async fn cancel_order(&self, order_id: &str, _pair: Option<&str>) -> Result<bool> {
        let response = self
            .rest
            .signed(PrivateRequest::post("cancel_order/").param("id", order_id))
            .await?;
        let canceled = response.get("id").is_some();
        if canceled {
            log_order!(VENUE, "CANCELED", order_id, "-");
        }
        Ok(canceled)
    }

    async fn withdraw(&self, currency: &str, amount: Fixed, address: &str) -> Result<WithdrawalReceipt> {
        let coin = BITSTAMP_PAIRS.native_currency(currency);
        let call = PrivateRequest::post(format!("{coin}_withdrawal/"))
            .param("amount", amount.to_plain_string())
            .param("address", address);

        let response = self.rest.signed(call).await?;
        let id = json::string(VENUE, &response, "id").ok();
        info!("💸 Bitstamp withdrawal {} {} submitted", amount, coin);
        Ok(WithdrawalReceipt {
            id,
            currency: coin,
            amount,
            address: address.to_string(),
        })
    }

    async fn get_open_orders(&self, pair: Option<&str>) -> Result<Vec<Order>> {
        let market = match pair {
            Some(pair) => self.to_venue(pair)?,
            None => "all".to_string(),
        };
        let response = self.rest.signed(PrivateRequest::post(format!("open_orders/{market}/"))).await?;

        json::as_array(VENUE, &response)?
            .iter()
            .map(|order| {
                let pair = match order.get("currency_pair").and_then(Value::as_str) {
                    Some(listed) => slash_pair(listed),
                    None => pair.unwrap_or_default().to_ascii_lowercase(),
                };
                Ok(Order {
                    id: json::string(VENUE, order, "id")?,
                    pair,
                    side: trade_side(order)?,
                    order_type: OrderType::Limit,
                    price: Some(json::fixed(VENUE, order, "price")?),
                    quantity: json::fixed(VENUE, order, "amount")?,
                    status: OrderStatus::New,
                })
            })
            .collect()
    }

    /// Status lookup; the venue reports the remaining amount and no price
    async fn get_order(&self, order_id: &str, pair: Option<&str>) -> Result<Order> {
        let response = self
            .rest
            .signed(PrivateRequest::post("order_status/").param("id", order_id))
            .await?;

        let filled_some = response
            .get("transactions")
            .and_then(Value::as_array)
            .is_some_and(|transactions| !transactions.is_empty());
        let status = match json::string(VENUE, &response, "status")?.as_str() {
            "Finished" => OrderStatus::Filled,
            "Canceled" => OrderStatus::Canceled,
            _ if filled_some => OrderStatus::PartiallyFilled,
            _ => OrderStatus::New,
        };
        let pair = match response.get("market").and_then(Value::as_str) {
            Some(market) => slash_pair(market),
            None => pair.unwrap_or_default().to_ascii_lowercase(),
        };
        Ok(Order {
            id: order_id.to_string(),
            pair,
            side: trade_side(&response)?,
            order_type: OrderType::Limit,
            price: None,
            quantity: json::fixed(VENUE, &response, "amount_remaining")?,
            status,
        })
    }

    async fn cancel_all_orders(&self, pair: Option<&str>) -> Result<usize> {
        let path = match pair {
            Some(pair) => format!("cancel_all_orders/{}/", self.to_venue(pair)?),
            None => "cancel_all_orders/".to_string(),
        };
        let response = self.rest.signed(PrivateRequest::post(path)).await?;
        let canceled = response.get("canceled").and_then(Value::as_array).map_or(0, Vec::len);
        info!("🧹 Bitstamp canceled {} open orders", canceled);
        Ok(canceled)
    }

    async fn get_deposit_address(&self, currency: &str) -> Result<DepositAddress> {
        let coin = BITSTAMP_PAIRS.native_currency(currency);
        let response = self.rest.signed(PrivateRequest::post(format!("{coin}_address/"))).await?;
        let tag = ["destination_tag", "memo_id"]
            .iter()
            .find_map(|field| match response.get(*field) {
                Some(Value::String(tag)) => Some(tag.clone()),
                Some(Value::Number(tag)) => Some(tag.to_string()),
                _ => None,
            });
        Ok(DepositAddress {
            currency: coin,
            address: json::string(VENUE, &response, "address")?,
            tag,
        })
    }

    async fn get_withdraw_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        let call = PrivateRequest::post("withdrawal-requests/").param("timedelta", WITHDRAWAL_LOOKBACK_SECS);
        let response = self.rest.signed(call).await?;
        let wanted = currency.map(str::to_ascii_lowercase);

        let mut transfers = Vec::new();
        for request in json::as_array(VENUE, &response)? {
            let coin = json::string(VENUE, request, "currency")?.to_ascii_lowercase();
            if wanted.as_ref().is_some_and(|wanted| *wanted != coin) {
                continue;
            }
            transfers.push(Transfer {
                kind: TransferKind::Withdrawal,
                id: json::string(VENUE, request, "id").ok(),
                currency: coin,
                amount: json::fixed(VENUE, request, "amount")?,
                address: request.get("address").and_then(Value::as_str).map(str::to_string),
                status: withdrawal_status(request.get("status").and_then(Value::as_i64).unwrap_or(-1)).to_string(),
                timestamp: request.get("datetime").and_then(Value::as_str).and_then(parse_utc_datetime),
            });
        }
        Ok(transfers)
    }

    async fn get_market_volume(&self, pair: &str) -> Result<Fixed> {
        let market = self.to_venue(pair)?;
        let response = self.rest.get(&format!("ticker/{market}/"), &[]).await?;
        json::fixed(VENUE, &response, "volume")
    }
}
