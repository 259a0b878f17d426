//! Kraken REST adapter
//!
//! Responses share the `{"error": [...], "result": ...}` envelope. Kraken
//! spells bitcoin `XBT` and keys most results by its internal pair name
//! (`XETHXXBT`), so single-pair results are read as the first entry.

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
use chrono::{DateTime, Utc};
use coinwire_core::timing::{datetime_from_secs, datetime_from_secs_f64};
use coinwire_core::{Fixed, log_order};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub use auth::KrakenAuth;

pub const VENUE: &str = "kraken";
pub const BASE_URL: &str = "https://api.kraken.com/0/";

pub const KRAKEN_PAIRS: PairFormat = PairFormat {
    delimiter: "",
    case: TokenCase::Upper,
    order: TokenOrder::QuoteFirst,
    base_currencies: &["btc", "eur", "usd", "eth", "cad", "gbp", "jpy", "usdt"],
    aliases: &[("btc", "xbt"), ("doge", "xdg")],
};

/// Non-empty `error` array
pub fn venue_error(value: &Value) -> Option<String> {
    let errors = value.get("error")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn result(response: &Value) -> Result<&Value> {
    response
        .get("result")
        .ok_or_else(|| ExchangeError::remote(VENUE, "missing result", response.to_string()))
}

/// The single entry of a result keyed by Kraken's pair name
fn first_entry(response: &Value) -> Result<&Value> {
    json::as_object(VENUE, result(response)?)?
        .iter()
        .find(|(key, _)| key.as_str() != "last")
        .map(|(_, value)| value)
        .ok_or_else(|| ExchangeError::remote(VENUE, "empty result", response.to_string()))
}

/// `XXBT`, `ZEUR` -> `btc`, `eur`
fn asset_currency(asset: &str) -> String {
    let code = match asset.len() {
        4 if asset.starts_with('X') || asset.starts_with('Z') => &asset[1..],
        _ => asset,
    };
    KRAKEN_PAIRS.canonical_currency(code)
}

/// One entry of an `OpenOrders` or `QueryOrders` result
fn to_order(txid: &str, info: &Value) -> Result<Order> {
    let descr = info
        .get("descr")
        .ok_or_else(|| ExchangeError::remote(VENUE, "missing order description", info.to_string()))?;
    let native = json::string(VENUE, descr, "pair")?;
    let order_type = match descr.get("ordertype").and_then(Value::as_str) {
        Some("market") => OrderType::Market,
        Some("stop-loss") => OrderType::Stop,
        _ => OrderType::Limit,
    };
    let side = match descr.get("type").and_then(Value::as_str) {
        Some("sell") => OrderSide::Sell,
        _ => OrderSide::Buy,
    };
    let executed = json::fixed(VENUE, info, "vol_exec").unwrap_or(Fixed::ZERO);
    let status = match info.get("status").and_then(Value::as_str) {
        Some("closed") => OrderStatus::Filled,
        Some("canceled") => OrderStatus::Canceled,
        Some("expired") => OrderStatus::Expired,
        _ if !executed.is_zero() => OrderStatus::PartiallyFilled,
        _ => OrderStatus::New,
    };

    Ok(Order {
        id: txid.to_string(),
        pair: KRAKEN_PAIRS.from_venue(&native).unwrap_or_else(|_| native.to_ascii_lowercase()),
        side,
        order_type,
        price: json::fixed(VENUE, descr, "price").ok().filter(|price| !price.is_zero()),
        quantity: json::fixed(VENUE, info, "vol")?,
        status,
    })
}

/// `DepositStatus` and `WithdrawStatus` rows
fn to_transfers(kind: TransferKind, response: &Value) -> Result<Vec<Transfer>> {
    json::as_array(VENUE, result(response)?)?
        .iter()
        .map(|row| {
            Ok(Transfer {
                kind,
                id: row.get("refid").and_then(Value::as_str).map(str::to_string),
                currency: asset_currency(&json::string(VENUE, row, "asset")?),
                amount: json::fixed(VENUE, row, "amount")?,
                address: row.get("info").and_then(Value::as_str).map(str::to_string),
                status: json::string(VENUE, row, "status")?.to_ascii_lowercase(),
                timestamp: row.get("time").and_then(Value::as_i64).and_then(datetime_from_secs),
            })
        })
        .collect()
}

pub struct KrakenExchange {
    rest: RestClient,
}

impl KrakenExchange {
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
            .map(KrakenAuth::new)
            .transpose()?
            .map(|auth| Box::new(auth) as Box<dyn Authenticator>);

        let rest = RestClient::from_config(VENUE, &config, BASE_URL, None, transport, venue_error)?.with_authenticator(auth);
        Ok(Self { rest })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// First deposit method Kraken offers for the asset
    async fn deposit_method(&self, asset: &str) -> Result<String> {
        let response = self
            .rest
            .signed(PrivateRequest::post("private/DepositMethods").param("asset", asset))
            .await?;
        let methods = json::as_array(VENUE, result(&response)?)?;
        match methods.first() {
            Some(method) => json::string(VENUE, method, "method"),
            None => Err(ExchangeError::remote(VENUE, format!("no deposit method for {asset}"), response.to_string())),
        }
    }

    async fn deposit_addresses(&self, asset: &str, method: &str, new: bool) -> Result<Value> {
        let mut call = PrivateRequest::post("private/DepositAddresses")
            .param("asset", asset)
            .param("method", method);
        if new {
            call = call.param("new", "true");
        }
        self.rest.signed(call).await
    }
}

#[async_trait(?Send)]
impl Exchange for KrakenExchange {
    fn name(&self) -> &'static str {
        VENUE
    }

    fn pair_format(&self) -> &PairFormat {
        &KRAKEN_PAIRS
    }

    fn trade_history_order(&self) -> TradeOrder {
        TradeOrder::OldestFirst
    }

    fn has_credentials(&self) -> bool {
        self.rest.has_credentials()
    }

    async fn list_markets(&self) -> Result<Vec<String>> {
        let response = self.rest.get("public/AssetPairs", &[]).await?;
        json::as_object(VENUE, result(&response)?)?
            .iter()
            // dark pool books
            .filter(|(name, _)| !name.ends_with(".d"))
            .map(|(_, info)| json::string(VENUE, info, "altname"))
            .collect()
    }

    async fn get_ticker(&self, pair: &str) -> Result<Ticker> {
        let market = self.to_venue(pair)?;
        let response = self.rest.get("public/Ticker", &[("pair", market)]).await?;
        let ticker = first_entry(&response)?;

        let price = |field: &str| -> Result<Fixed> {
            let values = ticker
                .get(field)
                .ok_or_else(|| ExchangeError::remote(VENUE, format!("missing field '{field}'"), ticker.to_string()))?;
            json::fixed_at(VENUE, values, 0)
        };
        Ok(Ticker {
            ask: price("a")?,
            bid: price("b")?,
            last: price("c")?,
        })
    }

    async fn get_order_book(&self, pair: &str, depth: usize) -> Result<OrderBook> {
        let market = self.to_venue(pair)?;
        let params = [("pair", market), ("count", depth.max(1).to_string())];
        let response = self.rest.get("public/Depth", &params).await?;
        let book = first_entry(&response)?;

        Ok(OrderBook::from_levels(
            json::levels(VENUE, book, "bids")?,
            json::levels(VENUE, book, "asks")?,
            depth,
        ))
    }

    async fn get_trade_history(&self, pair: &str, limit: usize) -> Result<Vec<Trade>> {
        let market = self.to_venue(pair)?;
        let response = self.rest.get("public/Trades", &[("pair", market)]).await?;
        let rows = json::as_array(VENUE, first_entry(&response)?)?;
        debug!("Kraken returned {} trades", rows.len());

        // oldest first; keep the most recent `limit`
        let skip = rows.len().saturating_sub(limit);
        rows.iter()
            .skip(skip)
            .map(|row| {
                let time = row.get(2).and_then(Value::as_f64);
                let timestamp = time
                    .and_then(datetime_from_secs_f64)
                    .ok_or_else(|| ExchangeError::remote(VENUE, "invalid trade time", row.to_string()))?;
                let side = match row.get(3).and_then(Value::as_str) {
                    Some("s") => OrderSide::Sell,
                    _ => OrderSide::Buy,
                };
                let trade_id = match row.get(6) {
                    Some(Value::Number(id)) => id.to_string(),
                    _ => time.map(|t| t.to_string()).unwrap_or_default(),
                };
                Ok(Trade {
                    timestamp,
                    side,
                    price: json::fixed_at(VENUE, row, 0)?,
                    quantity: json::fixed_at(VENUE, row, 1)?,
                    trade_id,
                })
            })
            .collect()
    }

    async fn get_balances(&self) -> Result<Vec<Balance>> {
        let response = self.rest.signed(PrivateRequest::post("private/Balance")).await?;
        let mut balances = Vec::new();
        for (asset, amount) in json::as_object(VENUE, result(&response)?)? {
            let available = Fixed::from_json(amount)?;
            if !available.is_zero() {
                balances.push(Balance::new(&asset_currency(asset), available, Fixed::ZERO));
            }
        }
        Ok(balances)
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order> {
        self.rest.ensure_authenticated()?;
        request.validate()?;
        let market = self.to_venue(&request.pair)?;

        // market orders carry no price field
        let (order_type, price) = match request.order_type {
            OrderType::Limit => ("limit", Some(request.required_price()?)),
            OrderType::Market => ("market", None),
            OrderType::Stop => ("stop-loss", Some(request.required_price()?)),
        };
        let side = match request.side {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        };
        let call = PrivateRequest::post("private/AddOrder")
            .param("ordertype", order_type)
            .param("pair", &market)
            .param_opt("price", price.map(|p| p.to_plain_string()))
            .param("type", side)
            .param("volume", request.quantity.to_plain_string());

        let response = self.rest.signed(call).await?;
        let txid = json::array(VENUE, result(&response)?, "txid")?
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| ExchangeError::remote(VENUE, "missing txid", response.to_string()))?
            .to_string();
        log_order!(VENUE, "PLACED", txid, market);
        Ok(Order::accepted(request, txid, OrderStatus::New))
    }

    async fn cancel_order(&self, order_id: &str, _pair: Option<&str>) -> Result<bool> {
        let response = self
            .rest
            .signed(PrivateRequest::post("private/CancelOrder").param("txid", order_id))
            .await?;
        let count = result(&response)?.get("count").and_then(Value::as_u64).unwrap_or(0);
        log_order!(VENUE, "CANCELED", order_id, format!("count={count}"));
        Ok(count > 0)
    }

    /// `address` is the name of a withdrawal key configured on the account
    async fn withdraw(&self, currency: &str, amount: Fixed, address: &str) -> Result<WithdrawalReceipt> {
        let asset = KRAKEN_PAIRS.native_currency(currency);
        let call = PrivateRequest::post("private/Withdraw")
            .param("asset", &asset)
            .param("key", address)
            .param("amount", amount.to_plain_string());

        let response = self.rest.signed(call).await?;
        let refid = json::string(VENUE, result(&response)?, "refid")?;
        info!("💸 Kraken withdrawal {} {} submitted: {}", amount, asset, refid);
        Ok(WithdrawalReceipt {
            id: Some(refid),
            currency: currency.to_ascii_lowercase(),
            amount,
            address: address.to_string(),
        })
    }

    async fn get_open_orders(&self, pair: Option<&str>) -> Result<Vec<Order>> {
        let response = self.rest.signed(PrivateRequest::post("private/OpenOrders")).await?;
        let open = result(&response)?
            .get("open")
            .ok_or_else(|| ExchangeError::remote(VENUE, "missing open orders", response.to_string()))?;

        let wanted = pair.map(str::to_ascii_lowercase);
        let mut orders = Vec::new();
        for (txid, info) in json::as_object(VENUE, open)? {
            let order = to_order(txid, info)?;
            if wanted.as_ref().map_or(true, |pair| *pair == order.pair) {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn get_order(&self, order_id: &str, _pair: Option<&str>) -> Result<Order> {
        let response = self
            .rest
            .signed(PrivateRequest::post("private/QueryOrders").param("txid", order_id))
            .await?;
        let info = result(&response)?
            .get(order_id)
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("unknown order {order_id}"), response.to_string()))?;
        to_order(order_id, info)
    }

    async fn cancel_all_orders(&self, pair: Option<&str>) -> Result<usize> {
        let canceled = match pair {
            None => {
                let response = self.rest.signed(PrivateRequest::post("private/CancelAll")).await?;
                result(&response)?.get("count").and_then(Value::as_u64).unwrap_or(0) as usize
            }
            Some(pair) => {
                let mut count = 0;
                for order in self.get_open_orders(Some(pair)).await? {
                    if self.cancel_order(&order.id, None).await? {
                        count += 1;
                    }
                }
                count
            }
        };
        info!("🧹 Kraken canceled {} orders", canceled);
        Ok(canceled)
    }

    /// Requests a fresh address when none exists yet
    async fn get_deposit_address(&self, currency: &str) -> Result<DepositAddress> {
        let asset = KRAKEN_PAIRS.native_currency(currency);
        let method = self.deposit_method(&asset).await?;

        let mut response = self.deposit_addresses(&asset, &method, false).await?;
        if json::as_array(VENUE, result(&response)?)?.is_empty() {
            debug!("Kraken has no {} address yet, generating one", asset);
            response = self.deposit_addresses(&asset, &method, true).await?;
        }
        let entry = json::as_array(VENUE, result(&response)?)?
            .first()
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("no {asset} deposit address"), response.to_string()))?;

        Ok(DepositAddress {
            currency: currency.to_ascii_lowercase(),
            address: json::string(VENUE, entry, "address")?,
            tag: ["tag", "memo"]
                .iter()
                .find_map(|field| entry.get(*field).and_then(Value::as_str).map(str::to_string)),
        })
    }

    async fn get_deposit_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        let call = PrivateRequest::post("private/DepositStatus")
            .param_opt("asset", currency.map(|c| KRAKEN_PAIRS.native_currency(c)));
        to_transfers(TransferKind::Deposit, &self.rest.signed(call).await?)
    }

    async fn get_withdraw_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        let call = PrivateRequest::post("private/WithdrawStatus")
            .param_opt("asset", currency.map(|c| KRAKEN_PAIRS.native_currency(c)));
        to_transfers(TransferKind::Withdrawal, &self.rest.signed(call).await?)
    }

    /// Rolling 24 hour volume, `v[1]`
    async fn get_market_volume(&self, pair: &str) -> Result<Fixed> {
        let market = self.to_venue(pair)?;
        let response = self.rest.get("public/Ticker", &[("pair", market)]).await?;
        let ticker = first_entry(&response)?;
        let volume = ticker
            .get("v")
            .ok_or_else(|| ExchangeError::remote(VENUE, "missing field 'v'", ticker.to_string()))?;
        json::fixed_at(VENUE, volume, 1)
    }

    async fn get_market_ohlcv_data(
        &self,
        pair: &str,
        interval: CandleInterval,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Candle>> {
        let market = self.to_venue(pair)?;
        let mut params = vec![("pair", market), ("interval", interval.minutes().to_string())];
        if let Some(since) = since {
            params.push(("since", since.timestamp().to_string()));
        }
        let response = self.rest.get("public/OHLC", &params).await?;

        // [time, open, high, low, close, vwap, volume, count]
        json::as_array(VENUE, first_entry(&response)?)?
            .iter()
            .map(|row| {
                let open_time = row
                    .get(0)
                    .and_then(Value::as_i64)
                    .and_then(datetime_from_secs)
                    .ok_or_else(|| ExchangeError::remote(VENUE, "invalid candle time", row.to_string()))?;
                Ok(Candle {
                    open_time,
                    open: json::fixed_at(VENUE, row, 1)?,
                    high: json::fixed_at(VENUE, row, 2)?,
                    low: json::fixed_at(VENUE, row, 3)?,
                    close: json::fixed_at(VENUE, row, 4)?,
                    volume: json::fixed_at(VENUE, row, 6)?,
                })
            })
            .collect()
    }
}
