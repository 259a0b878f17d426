//! Poloniex legacy REST adapter
//!
//! Targets the retired `public?command=` / `tradingApi` interface and is
//! kept as a reference for command-style APIs. Markets are base first with
//! an underscore, `BTC_LTC`.

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
use chrono::Utc;
use coinwire_core::timing::{datetime_from_secs, parse_utc_datetime};
use coinwire_core::{Fixed, log_order};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub use auth::{PoloniexAuth, TRADING_API};

pub const VENUE: &str = "poloniex";
pub const BASE_URL: &str = "https://poloniex.com/";

pub const POLONIEX_PAIRS: PairFormat = PairFormat {
    delimiter: "_",
    case: TokenCase::Upper,
    order: TokenOrder::BaseFirst,
    base_currencies: &["btc", "eth", "usdt", "xmr", "usdc"],
    aliases: &[],
};

/// `{"error": "Invalid currency pair."}`
pub fn venue_error(value: &Value) -> Option<String> {
    value.get("error").map(|error| match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}

/// Window `returnDepositsWithdrawals` is queried over
const TRANSFER_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

fn command(name: &str) -> PrivateRequest {
    PrivateRequest::post(TRADING_API).param("command", name)
}

/// A `returnOpenOrders` entry for `market`
fn to_order(market: &str, entry: &Value) -> Result<Order> {
    let remaining = json::fixed(VENUE, entry, "amount")?;
    let quantity = json::fixed(VENUE, entry, "startingAmount").unwrap_or(remaining);
    let side = match json::string(VENUE, entry, "type")?.as_str() {
        "sell" => OrderSide::Sell,
        _ => OrderSide::Buy,
    };
    Ok(Order {
        id: json::string(VENUE, entry, "orderNumber")?,
        pair: POLONIEX_PAIRS.from_venue(market).unwrap_or_else(|_| market.to_ascii_lowercase()),
        side,
        order_type: OrderType::Limit,
        price: Some(json::fixed(VENUE, entry, "rate")?),
        quantity,
        status: if remaining < quantity { OrderStatus::PartiallyFilled } else { OrderStatus::New },
    })
}

fn to_transfer(kind: TransferKind, entry: &Value) -> Result<Transfer> {
    let id = match kind {
        TransferKind::Deposit => entry.get("txid"),
        TransferKind::Withdrawal => entry.get("withdrawalNumber"),
    };
    Ok(Transfer {
        kind,
        id: id.and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }),
        currency: json::string(VENUE, entry, "currency")?.to_ascii_lowercase(),
        amount: json::fixed(VENUE, entry, "amount")?,
        address: entry.get("address").and_then(Value::as_str).map(str::to_string),
        status: json::string(VENUE, entry, "status")?,
        timestamp: entry.get("timestamp").and_then(Value::as_i64).and_then(datetime_from_secs),
    })
}

pub struct PoloniexExchange {
    rest: RestClient,
}

impl PoloniexExchange {
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
            .map(PoloniexAuth::new)
            .transpose()?
            .map(|auth| Box::new(auth) as Box<dyn Authenticator>);

        let rest = RestClient::from_config(VENUE, &config, BASE_URL, None, transport, venue_error)?.with_authenticator(auth);
        Ok(Self { rest })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    async fn public(&self, command: &str, mut params: Vec<(&str, String)>) -> Result<Value> {
        params.insert(0, ("command", command.to_string()));
        self.rest.get("public", &params).await
    }

    /// Deposits or withdrawals of the last 30 days, optionally for one currency
    async fn transfers(&self, kind: TransferKind, currency: Option<&str>) -> Result<Vec<Transfer>> {
        let end = Utc::now().timestamp();
        let call = command("returnDepositsWithdrawals")
            .param("start", end - TRANSFER_WINDOW_SECS)
            .param("end", end);
        let response = self.rest.signed(call).await?;
        let field = match kind {
            TransferKind::Deposit => "deposits",
            TransferKind::Withdrawal => "withdrawals",
        };

        let wanted = currency.map(str::to_ascii_lowercase);
        let mut transfers = Vec::new();
        for entry in json::array(VENUE, &response, field)? {
            let transfer = to_transfer(kind, entry)?;
            if wanted.as_ref().map_or(true, |c| *c == transfer.currency) {
                transfers.push(transfer);
            }
        }
        Ok(transfers)
    }
}

#[async_trait(?Send)]
impl Exchange for PoloniexExchange {
    fn name(&self) -> &'static str {
        VENUE
    }

    fn pair_format(&self) -> &PairFormat {
        &POLONIEX_PAIRS
    }

    fn trade_history_order(&self) -> TradeOrder {
        TradeOrder::NewestFirst
    }

    fn has_credentials(&self) -> bool {
        self.rest.has_credentials()
    }

    async fn list_markets(&self) -> Result<Vec<String>> {
        let response = self.public("returnTicker", Vec::new()).await?;
        Ok(json::as_object(VENUE, &response)?.keys().cloned().collect())
    }

    async fn get_ticker(&self, pair: &str) -> Result<Ticker> {
        let market = self.to_venue(pair)?;
        let response = self.public("returnTicker", Vec::new()).await?;
        let ticker = response
            .get(&market)
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("market {market} not listed"), response.to_string()))?;
        Ok(Ticker {
            ask: json::fixed(VENUE, ticker, "lowestAsk")?,
            bid: json::fixed(VENUE, ticker, "highestBid")?,
            last: json::fixed(VENUE, ticker, "last")?,
        })
    }

    async fn get_order_book(&self, pair: &str, depth: usize) -> Result<OrderBook> {
        let market = self.to_venue(pair)?;
        let params = vec![("currencyPair", market), ("depth", depth.max(1).to_string())];
        let response = self.public("returnOrderBook", params).await?;
        Ok(OrderBook::from_levels(
            json::levels(VENUE, &response, "bids")?,
            json::levels(VENUE, &response, "asks")?,
            depth,
        ))
    }

    async fn get_trade_history(&self, pair: &str, limit: usize) -> Result<Vec<Trade>> {
        let market = self.to_venue(pair)?;
        let response = self.public("returnTradeHistory", vec![("currencyPair", market)]).await?;

        json::as_array(VENUE, &response)?
            .iter()
            .take(limit)
            .map(|trade| {
                let date = json::string(VENUE, trade, "date")?;
                let timestamp = parse_utc_datetime(&date)
                    .ok_or_else(|| ExchangeError::remote(VENUE, "invalid trade date", trade.to_string()))?;
                let side = match json::string(VENUE, trade, "type")?.as_str() {
                    "sell" => OrderSide::Sell,
                    _ => OrderSide::Buy,
                };
                Ok(Trade {
                    timestamp,
                    side,
                    price: json::fixed(VENUE, trade, "rate")?,
                    quantity: json::fixed(VENUE, trade, "amount")?,
                    trade_id: json::string(VENUE, trade, "tradeID")?,
                })
            })
            .collect()
    }

    async fn get_balances(&self) -> Result<Vec<Balance>> {
        let response = self.rest.signed(command("returnCompleteBalances")).await?;
        let mut balances = Vec::new();
        for (currency, entry) in json::as_object(VENUE, &response)? {
            let available = json::fixed(VENUE, entry, "available")?;
            let reserved = json::fixed(VENUE, entry, "onOrders")?;
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
        if request.order_type != OrderType::Limit {
            return Err(ExchangeError::unsupported(VENUE, format!("{} orders", request.order_type)));
        }

        let side = match request.side {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        };
        let call = command(side)
            .param("currencyPair", &market)
            .param("rate", request.required_price()?.to_plain_string())
            .param("amount", request.quantity.to_plain_string());

        let response = self.rest.signed(call).await?;
        let id = json::string(VENUE, &response, "orderNumber")?;
        log_order!(VENUE, "PLACED", id, market);
        Ok(Order::accepted(request, id, OrderStatus::New))
    }

    async fn cancel_order(&self, order_id: &str, _pair: Option<&str>) -> Result<bool> {
        let response = self
            .rest
            .signed(command("cancelOrder").param("orderNumber", order_id))
            .await?;
        let success = response.get("success").and_then(Value::as_i64) == Some(1);
        log_order!(VENUE, "CANCELED", order_id, "-");
        Ok(success)
    }

    async fn withdraw(&self, currency: &str, amount: Fixed, address: &str) -> Result<WithdrawalReceipt> {
        let coin = POLONIEX_PAIRS.native_currency(currency);
        let call = command("withdraw")
            .param("currency", &coin)
            .param("amount", amount.to_plain_string())
            .param("address", address);

        let response = self.rest.signed(call).await?;
        let outcome = response
            .get("response")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("submitted");
        info!("💸 Poloniex withdrawal {} {}: {}", amount, coin, outcome);
        // no withdrawal id is returned
        Ok(WithdrawalReceipt {
            id: None,
            currency: currency.to_ascii_lowercase(),
            amount,
            address: address.to_string(),
        })
    }

    async fn get_open_orders(&self, pair: Option<&str>) -> Result<Vec<Order>> {
        let market = match pair {
            Some(pair) => self.to_venue(pair)?,
            None => "all".to_string(),
        };
        let response = self
            .rest
            .signed(command("returnOpenOrders").param("currencyPair", &market))
            .await?;

        let mut orders = Vec::new();
        match &response {
            Value::Object(by_market) => {
                for (name, entries) in by_market {
                    for entry in json::as_array(VENUE, entries)? {
                        orders.push(to_order(name, entry)?);
                    }
                }
            }
            entries => {
                for entry in json::as_array(VENUE, entries)? {
                    orders.push(to_order(&market, entry)?);
                }
            }
        }
        Ok(orders)
    }

    async fn get_deposit_address(&self, currency: &str) -> Result<DepositAddress> {
        let coin = POLONIEX_PAIRS.native_currency(currency);
        let response = self.rest.signed(command("returnDepositAddresses")).await?;
        let address = response
            .get(&coin)
            .and_then(Value::as_str)
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("no {coin} deposit address"), response.to_string()))?;
        Ok(DepositAddress {
            currency: currency.to_ascii_lowercase(),
            address: address.to_string(),
            tag: None,
        })
    }

    async fn get_deposit_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        self.transfers(TransferKind::Deposit, currency).await
    }

    async fn get_withdraw_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        self.transfers(TransferKind::Withdrawal, currency).await
    }

    /// 24 hour volume in the traded currency
    async fn get_market_volume(&self, pair: &str) -> Result<Fixed> {
        let market = self.to_venue(pair)?;
        let traded = POLONIEX_PAIRS.native_currency(&MarketPair::parse(pair)?.quote);
        let response = self.public("return24hVolume", Vec::new()).await?;
        let volumes = response
            .get(&market)
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("market {market} not listed"), response.to_string()))?;
        json::fixed(VENUE, volumes, &traded)
    }

    async fn get_summaries(&self) -> Result<Vec<MarketSummary>> {
        let response = self.public("returnTicker", Vec::new()).await?;
        json::as_object(VENUE, &response)?
            .iter()
            .map(|(market, ticker)| {
                Ok(MarketSummary {
                    market: market.clone(),
                    last: json::fixed(VENUE, ticker, "last")?,
                    volume: json::fixed(VENUE, ticker, "quoteVolume")?,
                })
            })
            .collect()
    }
}
