//! Bittrex v1.1 REST adapter
//!
//! Bittrex retired this API version; the adapter is kept as a reference for
//! the query-signed `{success, message, result}` envelope style. Markets
//! are spelled base first, `BTC-LTC`.

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
use coinwire_core::timing::parse_utc_datetime;
use coinwire_core::{Fixed, log_order};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub use auth::BittrexAuth;
pub use types::*;

pub const VENUE: &str = "bittrex";
pub const BASE_URL: &str = "https://bittrex.com/api/v1.1/";

pub const BITTREX_PAIRS: PairFormat = PairFormat {
    delimiter: "-",
    case: TokenCase::Upper,
    order: TokenOrder::BaseFirst,
    base_currencies: &["btc", "eth", "usdt", "usd"],
    aliases: &[],
};

/// `{"success": false, "message": "INVALID_MARKET", "result": null}`
pub fn venue_error(value: &Value) -> Option<String> {
    match value.get("success")?.as_bool()? {
        true => None,
        false => Some(
            value
                .get("message")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .unwrap_or("request failed")
                .to_string(),
        ),
    }
}

/// Unwrap the `result` member of the envelope
fn result<T: serde::de::DeserializeOwned>(mut response: Value) -> Result<T> {
    let result = response
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| ExchangeError::remote(VENUE, "missing result", response.to_string()))?;
    json::decode(VENUE, result)
}

fn to_order(order: BittrexOrder) -> Order {
    Order {
        pair: BITTREX_PAIRS
            .from_venue(&order.exchange)
            .unwrap_or_else(|_| order.exchange.to_ascii_lowercase()),
        side: order.side(),
        order_type: OrderType::Limit,
        price: order.limit,
        quantity: order.quantity,
        status: order.status(),
        id: order.order_uuid,
    }
}

pub struct BittrexExchange {
    rest: RestClient,
}

impl BittrexExchange {
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
            .map(BittrexAuth::new)
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
impl Exchange for BittrexExchange {
    fn name(&self) -> &'static str {
        VENUE
    }

    fn pair_format(&self) -> &PairFormat {
        &BITTREX_PAIRS
    }

    fn trade_history_order(&self) -> TradeOrder {
        TradeOrder::NewestFirst
    }

    fn has_credentials(&self) -> bool {
        self.rest.has_credentials()
    }

    async fn list_markets(&self) -> Result<Vec<String>> {
        let markets: Vec<BittrexMarket> = result(self.rest.get("public/getmarkets", &[]).await?)?;
        Ok(markets.into_iter().map(|m| m.market_name).collect())
    }

    async fn get_ticker(&self, pair: &str) -> Result<Ticker> {
        let market = self.to_venue(pair)?;
        let ticker: BittrexTicker = result(self.rest.get("public/getticker", &[("market", market)]).await?)?;
        Ok(Ticker {
            ask: ticker.ask,
            bid: ticker.bid,
            last: ticker.last,
        })
    }

    async fn get_order_book(&self, pair: &str, depth: usize) -> Result<OrderBook> {
        let market = self.to_venue(pair)?;
        let params = [("market", market), ("type", "both".to_string())];
        let book: BittrexOrderBook = result(self.rest.get("public/getorderbook", &params).await?)?;

        let levels = |side: Vec<BittrexLevel>| -> Vec<OrderBookLevel> {
            side.into_iter()
                .map(|level| OrderBookLevel::new(level.rate, level.quantity))
                .collect()
        };
        Ok(OrderBook::from_levels(levels(book.buy), levels(book.sell), depth))
    }

    async fn get_trade_history(&self, pair: &str, limit: usize) -> Result<Vec<Trade>> {
        let market = self.to_venue(pair)?;
        let trades: Vec<BittrexTrade> = result(self.rest.get("public/getmarkethistory", &[("market", market)]).await?)?;

        trades
            .into_iter()
            .take(limit)
            .map(|trade| {
                let timestamp = parse_utc_datetime(&trade.time_stamp)
                    .ok_or_else(|| ExchangeError::remote(VENUE, "invalid trade timestamp", trade.time_stamp.clone()))?;
                let side = match trade.order_type.as_str() {
                    "SELL" => OrderSide::Sell,
                    _ => OrderSide::Buy,
                };
                Ok(Trade {
                    timestamp,
                    side,
                    price: trade.price,
                    quantity: trade.quantity,
                    trade_id: trade.id.to_string(),
                })
            })
            .collect()
    }

    async fn get_balances(&self) -> Result<Vec<Balance>> {
        let balances: Vec<BittrexBalance> = result(self.rest.signed(PrivateRequest::get("account/getbalances")).await?)?;
        Ok(balances
            .into_iter()
            .filter_map(|b| {
                let total = b.balance.unwrap_or(Fixed::ZERO);
                let available = b.available.unwrap_or(Fixed::ZERO);
                (!total.is_zero()).then(|| Balance::new(&b.currency, available, total - available))
            })
            .collect())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order> {
        self.rest.ensure_authenticated()?;
        request.validate()?;
        let market = self.to_venue(&request.pair)?;

        let path = match (request.order_type, request.side) {
            (OrderType::Limit, OrderSide::Buy) => "market/buylimit",
            (OrderType::Limit, OrderSide::Sell) => "market/selllimit",
            (other, _) => return Err(ExchangeError::unsupported(VENUE, format!("{other} orders"))),
        };
        let call = PrivateRequest::get(path)
            .param("market", &market)
            .param("quantity", request.quantity.to_plain_string())
            .param("rate", request.required_price()?.to_plain_string());

        let ack: BittrexUuid = result(self.rest.signed(call).await?)?;
        log_order!(VENUE, "PLACED", ack.uuid, market);
        Ok(Order::accepted(request, ack.uuid, OrderStatus::New))
    }

    async fn cancel_order(&self, order_id: &str, _pair: Option<&str>) -> Result<bool> {
        let response = self
            .rest
            .signed(PrivateRequest::get("market/cancel").param("uuid", order_id))
            .await?;
        let canceled = response.get("success").and_then(Value::as_bool).unwrap_or(false);
        log_order!(VENUE, "CANCELED", order_id, "-");
        Ok(canceled)
    }

    async fn withdraw(&self, currency: &str, amount: Fixed, address: &str) -> Result<WithdrawalReceipt> {
        let coin = BITTREX_PAIRS.native_currency(currency);
        let call = PrivateRequest::get("account/withdraw")
            .param("currency", &coin)
            .param("quantity", amount.to_plain_string())
            .param("address", address);

        let receipt: BittrexUuid = result(self.rest.signed(call).await?)?;
        info!("💸 Bittrex withdrawal {} {} submitted: {}", amount, coin, receipt.uuid);
        Ok(WithdrawalReceipt {
            id: Some(receipt.uuid),
            currency: coin.to_ascii_lowercase(),
            amount,
            address: address.to_string(),
        })
    }

    async fn get_open_orders(&self, pair: Option<&str>) -> Result<Vec<Order>> {
        let market = pair.map(|pair| self.to_venue(pair)).transpose()?;
        let call = PrivateRequest::get("market/getopenorders").param_opt("market", market);
        let orders: Vec<BittrexOrder> = result(self.rest.signed(call).await?)?;
        Ok(orders.into_iter().map(to_order).collect())
    }

    async fn get_order(&self, order_id: &str, _pair: Option<&str>) -> Result<Order> {
        let call = PrivateRequest::get("account/getorder").param("uuid", order_id);
        let order: BittrexOrder = result(self.rest.signed(call).await?)?;
        Ok(to_order(order))
    }

    /// An empty address means the venue is still generating one
    async fn get_deposit_address(&self, currency: &str) -> Result<DepositAddress> {
        let coin = BITTREX_PAIRS.native_currency(currency);
        let call = PrivateRequest::get("account/getdepositaddress").param("currency", &coin);
        let response = self.rest.signed(call).await?;
        let payload = response.to_string();
        let address: BittrexDepositAddress = result(response)?;

        match address.address.filter(|a| !a.is_empty()) {
            Some(found) => Ok(DepositAddress {
                currency: address.currency.to_ascii_lowercase(),
                address: found,
                tag: None,
            }),
            None => Err(ExchangeError::remote(VENUE, format!("{coin} deposit address is being generated"), payload)),
        }
    }

    async fn get_deposit_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        let call = PrivateRequest::get("account/getdeposithistory")
            .param_opt("currency", currency.map(|c| BITTREX_PAIRS.native_currency(c)));
        let deposits: Vec<BittrexDeposit> = result(self.rest.signed(call).await?)?;
        Ok(deposits
            .into_iter()
            .map(|deposit| Transfer {
                kind: TransferKind::Deposit,
                id: Some(deposit.id.to_string()),
                currency: deposit.currency.to_ascii_lowercase(),
                amount: deposit.amount,
                address: deposit.crypto_address,
                status: format!("{} confirmations", deposit.confirmations),
                timestamp: parse_utc_datetime(&deposit.last_updated),
            })
            .collect())
    }

    async fn get_withdraw_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        let call = PrivateRequest::get("account/getwithdrawalhistory")
            .param_opt("currency", currency.map(|c| BITTREX_PAIRS.native_currency(c)));
        let withdrawals: Vec<BittrexWithdrawal> = result(self.rest.signed(call).await?)?;
        Ok(withdrawals
            .into_iter()
            .map(|withdrawal| Transfer {
                kind: TransferKind::Withdrawal,
                status: withdrawal.status().to_string(),
                timestamp: parse_utc_datetime(&withdrawal.opened),
                id: Some(withdrawal.payment_uuid),
                currency: withdrawal.currency.to_ascii_lowercase(),
                amount: withdrawal.amount,
                address: Some(withdrawal.address),
            })
            .collect())
    }

    async fn get_market_volume(&self, pair: &str) -> Result<Fixed> {
        let market = self.to_venue(pair)?;
        let summaries: Vec<BittrexSummary> = result(self.rest.get("public/getmarketsummary", &[("market", market.clone())]).await?)?;
        summaries
            .into_iter()
            .next()
            .map(|summary| summary.volume)
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("no summary for {market}"), String::new()))
    }

    async fn get_summaries(&self) -> Result<Vec<MarketSummary>> {
        let summaries: Vec<BittrexSummary> = result(self.rest.get("public/getmarketsummaries", &[]).await?)?;
        Ok(summaries
            .into_iter()
            .map(|summary| MarketSummary {
                market: summary.market_name,
                last: summary.last,
                volume: summary.volume,
            })
            .collect())
    }
}
