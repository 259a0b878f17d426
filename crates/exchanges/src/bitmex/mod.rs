//! BitMEX REST adapter (mainnet and testnet)
//!
//! Contracts use BitMEX symbols such as `XBTUSD`, treated as quote-first
//! tokens with bitcoin spelled `XBT`. Wallet amounts are integers in the
//! margin currency's minor unit (satoshi for `XBt`).

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
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub use auth::BitmexAuth;
pub use types::*;

pub const VENUE: &str = "bitmex";
pub const MAINNET_URL: &str = "https://www.bitmex.com/api/v1";
pub const TESTNET_URL: &str = "https://testnet.bitmex.com/api/v1";

pub const BITMEX_PAIRS: PairFormat = PairFormat {
    delimiter: "",
    case: TokenCase::Upper,
    order: TokenOrder::QuoteFirst,
    base_currencies: &["usd", "btc", "usdt", "eur"],
    aliases: &[("btc", "xbt")],
};

const MAX_COUNT: usize = 1000;

/// `{"error": {"message": "...", "name": "HTTPError"}}`
pub fn venue_error(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    match error.get("message").and_then(Value::as_str) {
        Some(message) => Some(message.to_string()),
        None if error.is_null() => None,
        None => Some(error.to_string()),
    }
}

/// Margin currency code and its minor-unit decimals for a canonical currency
fn wallet_currency(currency: &str, operation: &str) -> Result<(&'static str, u32)> {
    match currency.to_ascii_lowercase().as_str() {
        "btc" | "xbt" => Ok(("XBt", 8)),
        "usdt" => Ok(("USDt", 6)),
        other => Err(ExchangeError::unsupported(VENUE, format!("{operation} of {other}"))),
    }
}

fn to_order(order: BitmexOrder) -> Order {
    let symbol = order.symbol.clone().unwrap_or_default();
    Order {
        pair: BITMEX_PAIRS.from_venue(&symbol).unwrap_or_else(|_| symbol.to_ascii_lowercase()),
        side: order.side.map(OrderSide::from).unwrap_or(OrderSide::Buy),
        order_type: order.order_type(),
        price: order.effective_price(),
        quantity: order.order_qty.unwrap_or(Fixed::ZERO),
        status: order.status(),
        id: order.order_id,
    }
}

pub struct BitmexExchange {
    rest: RestClient,
}

impl BitmexExchange {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::build(config, Some(transport))
    }

    fn build(config: ClientConfig, transport: Option<Arc<dyn Transport>>) -> Result<Self> {
        info!("🚀 Initializing BitMEX exchange");
        info!("   Testnet: {}", config.testnet);

        let auth = config
            .credentials
            .clone()
            .map(BitmexAuth::new)
            .transpose()?
            .map(|auth| Box::new(auth) as Box<dyn Authenticator>);

        let rest = RestClient::from_config(VENUE, &config, MAINNET_URL, Some(TESTNET_URL), transport, venue_error)?
            .with_authenticator(auth);
        Ok(Self { rest })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    async fn orders(&self, filter: Value, symbol: Option<String>) -> Result<Vec<BitmexOrder>> {
        let call = PrivateRequest::get("order")
            .param("filter", filter.to_string())
            .param_opt("symbol", symbol)
            .param("count", MAX_COUNT);
        json::decode(VENUE, self.rest.signed(call).await?)
    }

    async fn wallet_history(&self, transact_type: &str, currency: Option<&str>) -> Result<Vec<Transfer>> {
        let code = match currency {
            Some(currency) => wallet_currency(currency, "transfers")?.0,
            None => "all",
        };
        let call = PrivateRequest::get("user/walletHistory").param("currency", code);
        let history: Vec<BitmexTransaction> = json::decode(VENUE, self.rest.signed(call).await?)?;

        let kind = match transact_type {
            "Deposit" => TransferKind::Deposit,
            _ => TransferKind::Withdrawal,
        };
        Ok(history
            .into_iter()
            .filter(|tx| tx.transact_type == transact_type)
            .map(|tx| {
                let (currency, decimals) = margin_currency(&tx.currency);
                Transfer {
                    kind,
                    amount: Fixed::from_minor_units(tx.amount.abs(), decimals),
                    currency,
                    status: tx.transact_status.unwrap_or_default().to_ascii_lowercase(),
                    timestamp: tx.transact_time.as_deref().and_then(parse_utc_datetime),
                    address: tx.address,
                    id: Some(tx.transact_id),
                }
            })
            .collect())
    }
}

#[async_trait(?Send)]
impl Exchange for BitmexExchange {
    fn name(&self) -> &'static str {
        VENUE
    }

    fn pair_format(&self) -> &PairFormat {
        &BITMEX_PAIRS
    }

    fn trade_history_order(&self) -> TradeOrder {
        TradeOrder::NewestFirst
    }

    fn has_credentials(&self) -> bool {
        self.rest.has_credentials()
    }

    async fn list_markets(&self) -> Result<Vec<String>> {
        let instruments: Vec<BitmexInstrument> = json::decode(VENUE, self.rest.get("instrument/active", &[]).await?)?;
        Ok(instruments.into_iter().map(|i| i.symbol).collect())
    }

    async fn get_ticker(&self, pair: &str) -> Result<Ticker> {
        let symbol = self.to_venue(pair)?;
        let response = self.rest.get("instrument", &[("symbol", symbol.clone())]).await?;
        let payload = response.to_string();
        let instruments: Vec<BitmexInstrument> = json::decode(VENUE, response)?;

        let instrument = instruments
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("unknown instrument {symbol}"), payload.clone()))?;
        let price = |value: Option<Fixed>, field: &str| {
            value.ok_or_else(|| ExchangeError::remote(VENUE, format!("instrument has no {field}"), payload.clone()))
        };
        Ok(Ticker {
            ask: price(instrument.ask_price, "askPrice")?,
            bid: price(instrument.bid_price, "bidPrice")?,
            last: price(instrument.last_price, "lastPrice")?,
        })
    }

    async fn get_order_book(&self, pair: &str, depth: usize) -> Result<OrderBook> {
        let symbol = self.to_venue(pair)?;
        let params = [("symbol", symbol), ("depth", depth.to_string())];
        let levels: Vec<BitmexLevel> = json::decode(VENUE, self.rest.get("orderBook/L2", &params).await?)?;

        let (bids, asks): (Vec<_>, Vec<_>) = levels.into_iter().partition(|level| level.side == BitmexSide::Buy);
        let convert = |side: Vec<BitmexLevel>| -> Vec<OrderBookLevel> {
            side.into_iter()
                .map(|level| OrderBookLevel::new(level.price, level.size))
                .collect()
        };
        Ok(OrderBook::from_levels(convert(bids), convert(asks), depth))
    }

    async fn get_trade_history(&self, pair: &str, limit: usize) -> Result<Vec<Trade>> {
        let symbol = self.to_venue(pair)?;
        let params = [
            ("symbol", symbol),
            ("count", limit.clamp(1, MAX_COUNT).to_string()),
            ("reverse", "true".to_string()),
        ];
        let trades: Vec<BitmexTrade> = json::decode(VENUE, self.rest.get("trade", &params).await?)?;

        trades
            .into_iter()
            .map(|trade| {
                let timestamp = parse_utc_datetime(&trade.timestamp)
                    .ok_or_else(|| ExchangeError::remote(VENUE, "invalid trade timestamp", trade.timestamp.clone()))?;
                Ok(Trade {
                    timestamp,
                    side: trade.side.into(),
                    price: trade.price,
                    quantity: trade.size,
                    trade_id: trade.trd_match_id,
                })
            })
            .collect()
    }

    async fn get_balances(&self) -> Result<Vec<Balance>> {
        let response = self
            .rest
            .signed(PrivateRequest::get("user/margin").param("currency", "all"))
            .await?;
        // a single-currency query answers with an object instead of a list
        let margins: Vec<BitmexMargin> = match response {
            Value::Array(_) => json::decode(VENUE, response)?,
            other => vec![json::decode(VENUE, other)?],
        };

        Ok(margins
            .into_iter()
            .filter(|m| m.wallet_balance != 0)
            .map(|m| {
                let (currency, decimals) = margin_currency(&m.currency);
                let available = Fixed::from_minor_units(m.available_margin, decimals);
                let wallet = Fixed::from_minor_units(m.wallet_balance, decimals);
                let reserved = if wallet > available { wallet - available } else { Fixed::ZERO };
                Balance::new(&currency, available, reserved)
            })
            .collect())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order> {
        self.rest.ensure_authenticated()?;
        request.validate()?;
        let symbol = self.to_venue(&request.pair)?;

        let side = match request.side {
            OrderSide::Buy => "Buy",
            OrderSide::Sell => "Sell",
        };
        let call = PrivateRequest::post("order")
            .param("symbol", &symbol)
            .param("side", side)
            .param("orderQty", request.quantity.to_plain_string());
        let call = match request.order_type {
            OrderType::Limit => call
                .param("ordType", "Limit")
                .param("price", request.required_price()?.to_plain_string()),
            OrderType::Market => call.param("ordType", "Market"),
            OrderType::Stop => call
                .param("ordType", "Stop")
                .param("stopPx", request.required_price()?.to_plain_string()),
        };

        let ack: BitmexOrder = json::decode(VENUE, self.rest.signed(call).await?)?;
        log_order!(VENUE, "PLACED", ack.order_id, symbol);
        let status = ack.status();
        Ok(Order::accepted(request, ack.order_id, status))
    }

    async fn cancel_order(&self, order_id: &str, _pair: Option<&str>) -> Result<bool> {
        let response = self
            .rest
            .signed(PrivateRequest::delete("order").param("orderID", order_id))
            .await?;
        let orders: Vec<BitmexOrder> = json::decode(VENUE, response)?;
        log_order!(VENUE, "CANCELED", order_id, "-");
        Ok(orders.iter().any(|order| order.status() == OrderStatus::Canceled))
    }

    async fn withdraw(&self, currency: &str, amount: Fixed, address: &str) -> Result<WithdrawalReceipt> {
        self.rest.ensure_authenticated()?;
        let (margin_currency, decimals) = wallet_currency(currency, "withdrawals")?;
        let minor = amount
            .to_minor_units(decimals)
            .filter(|units| *units > 0)
            .ok_or_else(|| ExchangeError::InvalidOrder(format!("withdrawal amount {amount} is not a positive {margin_currency} amount")))?;

        let call = PrivateRequest::post("user/requestWithdrawal")
            .param("currency", margin_currency)
            .param("amount", minor)
            .param("address", address);

        let receipt: BitmexWithdrawal = json::decode(VENUE, self.rest.signed(call).await?)?;
        info!("💸 BitMEX withdrawal {} {} requested: {}", amount, currency, receipt.transact_id);
        Ok(WithdrawalReceipt {
            id: Some(receipt.transact_id),
            currency: currency.to_ascii_lowercase(),
            amount,
            address: address.to_string(),
        })
    }

    async fn get_open_orders(&self, pair: Option<&str>) -> Result<Vec<Order>> {
        let symbol = pair.map(|pair| self.to_venue(pair)).transpose()?;
        let orders = self.orders(json!({"open": true}), symbol).await?;
        Ok(orders.into_iter().map(to_order).collect())
    }

    async fn get_order(&self, order_id: &str, _pair: Option<&str>) -> Result<Order> {
        let response = self.orders(json!({"orderID": order_id}), None).await?;
        response
            .into_iter()
            .next()
            .map(to_order)
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("unknown order {order_id}"), String::new()))
    }

    async fn cancel_all_orders(&self, pair: Option<&str>) -> Result<usize> {
        let symbol = pair.map(|pair| self.to_venue(pair)).transpose()?;
        let call = PrivateRequest::delete("order/all").param_opt("symbol", symbol);
        let orders: Vec<BitmexOrder> = json::decode(VENUE, self.rest.signed(call).await?)?;
        let canceled = orders.iter().filter(|order| order.status() == OrderStatus::Canceled).count();
        info!("🧹 BitMEX canceled {} orders", canceled);
        Ok(canceled)
    }

    async fn get_deposit_address(&self, currency: &str) -> Result<DepositAddress> {
        let (code, _) = wallet_currency(currency, "deposits")?;
        let response = self
            .rest
            .signed(PrivateRequest::get("user/depositAddress").param("currency", code))
            .await?;
        // the address arrives as a bare JSON string
        match response {
            Value::String(address) => Ok(DepositAddress {
                currency: currency.to_ascii_lowercase(),
                address,
                tag: None,
            }),
            other => Err(ExchangeError::remote(VENUE, "unexpected deposit address", other.to_string())),
        }
    }

    async fn get_deposit_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        self.wallet_history("Deposit", currency).await
    }

    async fn get_withdraw_history(&self, currency: Option<&str>) -> Result<Vec<Transfer>> {
        self.wallet_history("Withdrawal", currency).await
    }

    async fn get_market_volume(&self, pair: &str) -> Result<Fixed> {
        let symbol = self.to_venue(pair)?;
        let response = self.rest.get("instrument", &[("symbol", symbol.clone())]).await?;
        let payload = response.to_string();
        let instruments: Vec<BitmexInstrument> = json::decode(VENUE, response)?;
        instruments
            .into_iter()
            .next()
            .and_then(|instrument| instrument.volume24h)
            .ok_or_else(|| ExchangeError::remote(VENUE, format!("no 24h volume for {symbol}"), payload))
    }

    /// Instruments that have not traded yet are left out
    async fn get_summaries(&self) -> Result<Vec<MarketSummary>> {
        let instruments: Vec<BitmexInstrument> = json::decode(VENUE, self.rest.get("instrument/active", &[]).await?)?;
        Ok(instruments
            .into_iter()
            .filter_map(|instrument| {
                Some(MarketSummary {
                    last: instrument.last_price?,
                    volume: instrument.volume24h.unwrap_or(Fixed::ZERO),
                    market: instrument.symbol,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::testing::MockTransport;
    use coinwire_core::fixed;

    fn exchange(mock: &Arc<MockTransport>) -> BitmexExchange {
        BitmexExchange::with_transport(ClientConfig::default(), mock.clone()).unwrap()
    }

    fn authed(mock: &Arc<MockTransport>) -> BitmexExchange {
        BitmexExchange::with_transport(ClientConfig::default().testnet().with_credentials("key", "secret"), mock.clone())
            .unwrap()
    }

    #[test]
    fn test_pair_format() {
        assert_eq!(BITMEX_PAIRS.to_venue("btc-usd").unwrap(), "XBTUSD");
        assert_eq!(BITMEX_PAIRS.from_venue("ETHUSD").unwrap(), "eth-usd");
        assert_eq!(BITMEX_PAIRS.from_venue("ETHXBT").unwrap(), "eth-btc");
    }

    #[test]
    fn test_venue_error() {
        let value = serde_json::json!({"error": {"message": "Invalid orderQty", "name": "ValidationError"}});
        assert_eq!(venue_error(&value).unwrap(), "Invalid orderQty");
        assert!(venue_error(&serde_json::json!([{"symbol": "XBTUSD"}])).is_none());
    }

    #[monoio::test]
    async fn test_ticker() {
        let mock = Arc::new(MockTransport::new().respond(
            200,
            r#"[{"symbol":"XBTUSD","askPrice":9000.5,"bidPrice":9000,"lastPrice":9000.5,"state":"Open"}]"#,
        ));
        let ticker = exchange(&mock).get_ticker("btc-usd").await.unwrap();
        assert_eq!(ticker.ask, fixed!(9000.5));
        assert_eq!(ticker.bid, fixed!(9000));

        let request = mock.last_request().unwrap();
        assert_eq!(request.url.as_str(), "https://www.bitmex.com/api/v1/instrument?symbol=XBTUSD");
    }

    #[monoio::test]
    async fn test_unknown_instrument() {
        let mock = Arc::new(MockTransport::new().respond(200, "[]"));
        assert!(exchange(&mock).get_ticker("ltc-usd").await.unwrap_err().is_remote());
    }

    #[monoio::test]
    async fn test_order_book_and_trades() {
        let mock = Arc::new(
            MockTransport::new()
                .respond(
                    200,
                    r#"[{"symbol":"XBTUSD","id":1,"side":"Sell","size":100,"price":9001},
                        {"symbol":"XBTUSD","id":2,"side":"Sell","size":50,"price":9000.5},
                        {"symbol":"XBTUSD","id":3,"side":"Buy","size":200,"price":9000}]"#,
                )
                .respond(
                    200,
                    r#"[{"timestamp":"2018-08-18T17:20:57.514Z","symbol":"XBTUSD","side":"Buy","size":10,"price":6400.5,"trdMatchID":"6c7ad7d6-2c0e-4b3b-9c1a-0a0f28e7c9a5"}]"#,
                ),
        );
        let exchange = exchange(&mock);

        let book = exchange.get_order_book("btc-usd", 25).await.unwrap();
        assert_eq!(book.best_ask().unwrap().price, fixed!(9000.5));
        assert_eq!(book.best_bid().unwrap().quantity, fixed!(200));

        let trades = exchange.get_trade_history("btc-usd", 5).await.unwrap();
        assert_eq!(trades[0].side, OrderSide::Buy);
        assert_eq!(trades[0].timestamp.timestamp(), 1_534_612_857);
        let request = mock.last_request().unwrap();
        assert_eq!(request.query_param("reverse").as_deref(), Some("true"));
        assert_eq!(request.query_param("count").as_deref(), Some("5"));
    }

    #[monoio::test]
    async fn test_balances_in_satoshi() {
        let mock = Arc::new(MockTransport::new().respond(
            200,
            r#"[{"account":1,"currency":"XBt","walletBalance":150000000,"availableMargin":100000000},{"account":1,"currency":"USDt","walletBalance":0,"availableMargin":0}]"#,
        ));
        let balances = authed(&mock).get_balances().await.unwrap();
        assert_eq!(balances, vec![Balance::new("btc", fixed!(1), fixed!(0.5))]);

        let request = mock.last_request().unwrap();
        assert!(request.url.as_str().starts_with("https://testnet.bitmex.com/api/v1/user/margin"));
        assert!(request.header("api-signature").is_some());
    }

    #[monoio::test]
    async fn test_orders_and_withdrawal() {
        let mock = Arc::new(
            MockTransport::new()
                .respond(200, r#"{"orderID":"b5e5c9d6-0000-4000-8000-000000000001","ordStatus":"New","symbol":"XBTUSD"}"#)
                .respond(200, r#"[{"orderID":"b5e5c9d6-0000-4000-8000-000000000001","ordStatus":"Canceled"}]"#)
                .respond(200, r#"{"transactID":"7ea4f3c5-0000-4000-8000-000000000002","amount":-1000000}"#),
        );
        let exchange = authed(&mock);

        let request = OrderRequest::stop("btc-usd", OrderSide::Sell, fixed!(8500), fixed!(100));
        let order = exchange.place_order(&request).await.unwrap();
        assert_eq!(order.status, OrderStatus::New);
        let body = mock.last_request().unwrap().body.unwrap();
        assert_eq!(body, "symbol=XBTUSD&side=Sell&orderQty=100&ordType=Stop&stopPx=8500");

        assert!(exchange.cancel_order("b5e5c9d6-0000-4000-8000-000000000001", None).await.unwrap());
        let cancel = mock.last_request().unwrap();
        assert_eq!(cancel.method, Method::Delete);
        assert!(cancel.query_param("orderID").is_some());

        let receipt = exchange.withdraw("btc", fixed!(0.01), "1BoatSLRHtKNngkdXEeobR76b53LETtpyT").await.unwrap();
        assert_eq!(receipt.id.as_deref(), Some("7ea4f3c5-0000-4000-8000-000000000002"));
        assert!(mock.last_request().unwrap().body.unwrap().contains("currency=XBt&amount=1000000&"));

        let err = exchange.withdraw("doge", fixed!(1), "D8x").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Unsupported { .. }));
        assert_eq!(mock.call_count(), 3);
    }

    #[monoio::test]
    async fn test_open_orders_and_lookup() {
        let open = r#"[{"orderID":"93e4b0e2-3a2a-4b6a-9d3b-4f4b3c7d1a11","symbol":"XBTUSD","side":"Buy","ordType":"Limit","price":9000,"orderQty":100,"leavesQty":60,"ordStatus":"PartiallyFilled"}]"#;
        let mock = Arc::new(
            MockTransport::new()
                .respond(200, open)
                .respond(200, r#"[{"orderID":"5e6b2e1f","symbol":"XBTZ24","side":"Sell","ordType":"Stop","stopPx":8500,"orderQty":50,"ordStatus":"New"}]"#)
                .respond(200, "[]"),
        );
        let exchange = authed(&mock);

        let orders = exchange.get_open_orders(Some("btc-usd")).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].pair, "btc-usd");
        assert_eq!(orders[0].price, Some(fixed!(9000)));
        assert_eq!(orders[0].status, OrderStatus::PartiallyFilled);
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.method, Method::Get);
        assert_eq!(sent.query_param("filter").as_deref(), Some(r#"{"open":true}"#));
        assert_eq!(sent.query_param("symbol").as_deref(), Some("XBTUSD"));

        let order = exchange.get_order("5e6b2e1f", None).await.unwrap();
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.order_type, OrderType::Stop);
        assert_eq!(order.price, Some(fixed!(8500)));
        assert_eq!(order.pair, "xbtz24");
        assert_eq!(mock.last_request().unwrap().query_param("filter").as_deref(), Some(r#"{"orderID":"5e6b2e1f"}"#));

        assert!(exchange.get_order("missing", None).await.unwrap_err().is_remote());
    }

    #[monoio::test]
    async fn test_cancel_all_orders() {
        let mock = Arc::new(MockTransport::new().respond(
            200,
            r#"[{"orderID":"a","ordStatus":"Canceled"},{"orderID":"b","ordStatus":"Canceled"},{"orderID":"c","ordStatus":"Filled"}]"#,
        ));
        let exchange = authed(&mock);

        assert_eq!(exchange.cancel_all_orders(Some("btc-usd")).await.unwrap(), 2);
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.method, Method::Delete);
        assert_eq!(sent.url.path(), "/api/v1/order/all");
        assert_eq!(sent.query_param("symbol").as_deref(), Some("XBTUSD"));
    }

    #[monoio::test]
    async fn test_deposit_address_and_wallet_history() {
        let history = r#"[
            {"transactID":"4b1f0c0e","account":1,"currency":"XBt","transactType":"Deposit","amount":150000000,"fee":0,"transactStatus":"Completed","address":"3BMEXqGpG4FxBA1KWhRFufXfSTRgzfDBhJ","transactTime":"2020-03-01T10:00:00.000Z"},
            {"transactID":"9d2e7a31","account":1,"currency":"XBt","transactType":"Withdrawal","amount":-25000000,"fee":20000,"transactStatus":"Pending","address":"bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh","transactTime":"2020-03-02T11:30:00.000Z"},
            {"transactID":"00000000","account":1,"currency":"XBt","transactType":"RealisedPNL","amount":1200,"transactStatus":"Completed"}
        ]"#;
        let mock = Arc::new(
            MockTransport::new()
                .respond(200, r#""3BMEXqGpG4FxBA1KWhRFufXfSTRgzfDBhJ""#)
                .respond(200, history)
                .respond(200, history),
        );
        let exchange = authed(&mock);

        let address = exchange.get_deposit_address("btc").await.unwrap();
        assert_eq!(address.address, "3BMEXqGpG4FxBA1KWhRFufXfSTRgzfDBhJ");
        assert_eq!(mock.last_request().unwrap().query_param("currency").as_deref(), Some("XBt"));

        let deposits = exchange.get_deposit_history(Some("btc")).await.unwrap();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].amount, fixed!(1.5));
        assert_eq!(deposits[0].currency, "btc");
        assert_eq!(deposits[0].status, "completed");

        let withdrawals = exchange.get_withdraw_history(None).await.unwrap();
        assert_eq!(withdrawals.len(), 1);
        assert_eq!(withdrawals[0].kind, TransferKind::Withdrawal);
        assert_eq!(withdrawals[0].amount, fixed!(0.25));
        assert_eq!(mock.last_request().unwrap().query_param("currency").as_deref(), Some("all"));

        assert!(matches!(
            exchange.get_deposit_address("eth").await,
            Err(ExchangeError::Unsupported { .. })
        ));
        assert_eq!(mock.call_count(), 3);
    }

    #[monoio::test]
    async fn test_volume_and_summaries() {
        let mock = Arc::new(
            MockTransport::new()
                .respond(200, r#"[{"symbol":"XBTUSD","lastPrice":9000.5,"volume24h":2153746}]"#)
                .respond(
                    200,
                    r#"[{"symbol":"XBTUSD","lastPrice":9000.5,"volume24h":2153746},{"symbol":"XBTZ24","lastPrice":9100,"volume24h":1200},{"symbol":"ETHUSDZ24","lastPrice":null}]"#,
                ),
        );
        let exchange = exchange(&mock);

        assert_eq!(exchange.get_market_volume("btc-usd").await.unwrap(), fixed!(2153746));

        let summaries = exchange.get_summaries().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].market, "XBTZ24");
        assert_eq!(summaries[1].volume, fixed!(1200));
    }
}
