//! Venue-independent entity types
//!
//! Every value is decoded fresh from one response and handed to the
//! caller; prices and quantities are always `Fixed`.

use crate::errors::{ExchangeError, Result};
use chrono::{DateTime, Utc};
use coinwire_core::Fixed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical `QUOTE-BASE` market identifier, stored lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketPair {
    pub quote: String,
    pub base: String,
}

impl MarketPair {
    pub fn new(quote: &str, base: &str) -> Result<Self> {
        let pair = Self {
            quote: quote.to_ascii_lowercase(),
            base: base.to_ascii_lowercase(),
        };
        if !is_token(&pair.quote) || !is_token(&pair.base) {
            return Err(ExchangeError::InvalidPairFormat(format!("{quote}-{base}")));
        }
        Ok(pair)
    }

    /// Parse `quote-base`, case-insensitive
    pub fn parse(canonical: &str) -> Result<Self> {
        let (quote, base) = canonical
            .trim()
            .split_once('-')
            .ok_or_else(|| ExchangeError::InvalidPairFormat(canonical.to_string()))?;
        if base.contains('-') {
            return Err(ExchangeError::InvalidPairFormat(canonical.to_string()));
        }
        Self::new(quote, base).map_err(|_| ExchangeError::InvalidPairFormat(canonical.to_string()))
    }
}

fn is_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric())
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.quote, self.base)
    }
}

impl FromStr for MarketPair {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Best ask, best bid and last traded price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub ask: Fixed,
    pub bid: Fixed,
    pub last: Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Fixed,
    pub quantity: Fixed,
}

impl OrderBookLevel {
    pub fn new(price: Fixed, quantity: Fixed) -> Self {
        Self { price, quantity }
    }

    pub fn notional(&self) -> Fixed {
        self.price * self.quantity
    }
}

/// Bids descending, asks ascending, best level first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

impl OrderBook {
    /// Sort both sides best-first and keep at most `depth` levels each
    pub fn from_levels(
        mut bids: Vec<OrderBookLevel>,
        mut asks: Vec<OrderBookLevel>,
        depth: usize,
    ) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        bids.truncate(depth);
        asks.truncate(depth);
        Self { bids, asks }
    }

    pub fn best_bid(&self) -> Option<&OrderBookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&OrderBookLevel> {
        self.asks.first()
    }

    /// Best ask minus best bid
    pub fn spread(&self) -> Option<Fixed> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }
}

/// Summed book liquidity: bid side in quote notional, ask side in size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDepth {
    pub bids: Fixed,
    pub asks: Fixed,
}

impl From<&OrderBook> for MarketDepth {
    fn from(book: &OrderBook) -> Self {
        Self {
            bids: book.bids.iter().map(OrderBookLevel::notional).sum(),
            asks: book.asks.iter().map(|level| level.quantity).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Stop => write!(f, "STOP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Canceled => write!(f, "CANCELED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
            OrderStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// Order placement request; `pair` is canonical
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub pair: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: Option<Fixed>,
    pub quantity: Fixed,
}

impl OrderRequest {
    pub fn limit(pair: &str, side: OrderSide, price: Fixed, quantity: Fixed) -> Self {
        Self {
            pair: pair.to_string(),
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            quantity,
        }
    }

    pub fn market(pair: &str, side: OrderSide, quantity: Fixed) -> Self {
        Self {
            pair: pair.to_string(),
            side,
            order_type: OrderType::Market,
            price: None,
            quantity,
        }
    }

    /// Stop order triggering at `stop_price`
    pub fn stop(pair: &str, side: OrderSide, stop_price: Fixed, quantity: Fixed) -> Self {
        Self {
            pair: pair.to_string(),
            side,
            order_type: OrderType::Stop,
            price: Some(stop_price),
            quantity,
        }
    }

    /// Local checks run before the request is signed
    pub fn validate(&self) -> Result<()> {
        if !self.quantity.is_positive() {
            return Err(ExchangeError::InvalidOrder(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        match (self.order_type, self.price) {
            (OrderType::Limit | OrderType::Stop, None) => Err(ExchangeError::InvalidOrder(format!(
                "{} order needs a price",
                self.order_type
            ))),
            (_, Some(price)) if !price.is_positive() => Err(ExchangeError::InvalidOrder(format!(
                "price must be positive, got {price}"
            ))),
            _ => Ok(()),
        }
    }

    /// Price of a validated limit or stop order
    pub fn required_price(&self) -> Result<Fixed> {
        self.price.ok_or_else(|| {
            ExchangeError::InvalidOrder(format!("{} order needs a price", self.order_type))
        })
    }
}

/// An order as acknowledged by the venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub pair: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: Option<Fixed>,
    pub quantity: Fixed,
    pub status: OrderStatus,
}

impl Order {
    /// Acknowledgement built from the request and the venue-assigned id
    pub fn accepted(request: &OrderRequest, id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            pair: request.pair.to_ascii_lowercase(),
            side: request.side,
            order_type: request.order_type,
            price: request.price,
            quantity: request.quantity,
            status,
        }
    }
}

/// A public trade; `side` is the taker side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub side: OrderSide,
    pub price: Fixed,
    pub quantity: Fixed,
    pub trade_id: String,
}

/// Ordering of `get_trade_history` results, which differs per venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeOrder {
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    pub available: Fixed,
    pub reserved: Fixed,
}

impl Balance {
    pub fn new(currency: &str, available: Fixed, reserved: Fixed) -> Self {
        Self {
            currency: currency.to_ascii_lowercase(),
            available,
            reserved,
        }
    }

    pub fn total(&self) -> Fixed {
        self.available + self.reserved
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// Venue reference, when the venue returns one
    pub id: Option<String>,
    pub currency: String,
    pub amount: Fixed,
    pub address: String,
}

/// Where to send funds of one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAddress {
    pub currency: String,
    pub address: String,
    /// Memo, destination tag or payment id, for currencies that need one
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    Deposit,
    Withdrawal,
}

/// One entry of the account's deposit or withdrawal history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub kind: TransferKind,
    pub id: Option<String>,
    pub currency: String,
    pub amount: Fixed,
    pub address: Option<String>,
    /// Venue wording, e.g. `COMPLETE` or `Success`
    pub status: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// 24h activity of one market; `market` is the native token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub market: String,
    pub last: Fixed,
    /// Traded amount of the quote currency
    pub volume: Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    OneDay,
    OneWeek,
}

impl CandleInterval {
    pub fn minutes(&self) -> u32 {
        match self {
            CandleInterval::OneMinute => 1,
            CandleInterval::FiveMinutes => 5,
            CandleInterval::FifteenMinutes => 15,
            CandleInterval::ThirtyMinutes => 30,
            CandleInterval::OneHour => 60,
            CandleInterval::FourHours => 240,
            CandleInterval::OneDay => 1440,
            CandleInterval::OneWeek => 10080,
        }
    }
}

impl fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleInterval::OneMinute => write!(f, "1m"),
            CandleInterval::FiveMinutes => write!(f, "5m"),
            CandleInterval::FifteenMinutes => write!(f, "15m"),
            CandleInterval::ThirtyMinutes => write!(f, "30m"),
            CandleInterval::OneHour => write!(f, "1h"),
            CandleInterval::FourHours => write!(f, "4h"),
            CandleInterval::OneDay => write!(f, "1d"),
            CandleInterval::OneWeek => write!(f, "1w"),
        }
    }
}

/// OHLCV bar keyed by its opening time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: Fixed,
    pub high: Fixed,
    pub low: Fixed,
    pub close: Fixed,
    pub volume: Fixed,
}
