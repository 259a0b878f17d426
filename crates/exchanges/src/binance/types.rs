//! Binance wire types
//!
//! Only the fields the adapter maps are declared; serde ignores the rest.

use crate::types::{OrderBookLevel, OrderSide, OrderStatus, OrderType};
use coinwire_core::Fixed;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceExchangeInfo {
    pub symbols: Vec<BinanceSymbol>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceSymbol {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
}

/// `/api/v3/ticker/24hr`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker {
    pub ask_price: Fixed,
    pub bid_price: Fixed,
    pub last_price: Fixed,
    #[serde(default)]
    pub volume: Fixed,
}

/// One entry of the all-markets `/api/v3/ticker/24hr`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSummary {
    pub symbol: String,
    pub last_price: Fixed,
    pub volume: Fixed,
}

/// `/api/v3/depth`; levels are `["price", "qty"]`
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceDepth {
    pub bids: Vec<(Fixed, Fixed)>,
    pub asks: Vec<(Fixed, Fixed)>,
}

impl BinanceDepth {
    pub fn levels(side: Vec<(Fixed, Fixed)>) -> Vec<OrderBookLevel> {
        side.into_iter()
            .map(|(price, quantity)| OrderBookLevel::new(price, quantity))
            .collect()
    }
}

/// `/api/v3/trades`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTrade {
    pub id: u64,
    pub price: Fixed,
    pub qty: Fixed,
    pub time: i64,
    pub is_buyer_maker: bool,
}

impl BinanceTrade {
    /// Taker side: the seller hit the bid when the buyer was the maker
    pub fn taker_side(&self) -> OrderSide {
        if self.is_buyer_maker {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceAccount {
    pub balances: Vec<BinanceBalance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceBalance {
    pub asset: String,
    pub free: Fixed,
    pub locked: Fixed,
}

/// Response of order placement and cancellation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceOrderResponse {
    pub order_id: u64,
    #[serde(default)]
    pub client_order_id: String,
    pub status: String,
}

/// `/api/v3/openOrders` and `/api/v3/order` entries
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceOrder {
    pub symbol: String,
    pub order_id: u64,
    pub price: Fixed,
    pub orig_qty: Fixed,
    #[serde(default)]
    pub stop_price: Option<Fixed>,
    pub status: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
}

impl BinanceOrder {
    pub fn side(&self) -> OrderSide {
        if self.side == "SELL" { OrderSide::Sell } else { OrderSide::Buy }
    }

    pub fn kind(&self) -> OrderType {
        match self.order_type.as_str() {
            "MARKET" => OrderType::Market,
            "STOP_LOSS" | "STOP_LOSS_LIMIT" | "TAKE_PROFIT" | "TAKE_PROFIT_LIMIT" => OrderType::Stop,
            _ => OrderType::Limit,
        }
    }

    /// Limit price, or the trigger for stops; market orders report zero
    pub fn effective_price(&self) -> Option<Fixed> {
        match self.kind() {
            OrderType::Market => None,
            OrderType::Stop => self.stop_price.filter(|p| !p.is_zero()).or(Some(self.price)),
            OrderType::Limit => Some(self.price),
        }
    }
}

/// `/sapi/v1/capital/deposit/address`
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceDepositAddress {
    pub address: String,
    pub coin: String,
    #[serde(default)]
    pub tag: String,
}

/// `/sapi/v1/capital/deposit/hisrec`; status 0 pending, 6 credited, 1 success
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceDeposit {
    #[serde(default)]
    pub id: Option<String>,
    pub amount: Fixed,
    pub coin: String,
    pub status: i64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub insert_time: Option<i64>,
}

/// `/sapi/v1/capital/withdraw/history`; `applyTime` is a UTC wall clock
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceWithdrawal {
    pub id: String,
    pub amount: Fixed,
    pub coin: String,
    pub status: i64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub apply_time: Option<String>,
}

pub fn deposit_status(status: i64) -> &'static str {
    match status {
        0 => "PENDING",
        1 => "SUCCESS",
        6 => "CREDITED",
        7 => "WRONG_DEPOSIT",
        8 => "WAITING_USER_CONFIRM",
        _ => "UNKNOWN",
    }
}

pub fn withdrawal_status(status: i64) -> &'static str {
    match status {
        0 => "EMAIL_SENT",
        1 => "CANCELLED",
        2 => "AWAITING_APPROVAL",
        3 => "REJECTED",
        4 => "PROCESSING",
        5 => "FAILURE",
        6 => "COMPLETED",
        _ => "UNKNOWN",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceWithdrawResponse {
    pub id: String,
}

pub fn order_status(status: &str) -> OrderStatus {
    match status {
        "PARTIALLY_FILLED" => OrderStatus::PartiallyFilled,
        "FILLED" => OrderStatus::Filled,
        "CANCELED" | "PENDING_CANCEL" => OrderStatus::Canceled,
        "REJECTED" => OrderStatus::Rejected,
        "EXPIRED" | "EXPIRED_IN_MATCH" => OrderStatus::Expired,
        _ => OrderStatus::New,
    }
}
