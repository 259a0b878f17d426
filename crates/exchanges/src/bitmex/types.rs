//! BitMEX wire types

use crate::types::{OrderSide, OrderStatus, OrderType};
use coinwire_core::Fixed;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitmexInstrument {
    pub symbol: String,
    pub ask_price: Option<Fixed>,
    pub bid_price: Option<Fixed>,
    pub last_price: Option<Fixed>,
    /// Contracts traded over 24 hours
    pub volume24h: Option<Fixed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BitmexLevel {
    pub side: BitmexSide,
    pub size: Fixed,
    pub price: Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BitmexSide {
    Buy,
    Sell,
}

impl From<BitmexSide> for OrderSide {
    fn from(side: BitmexSide) -> Self {
        match side {
            BitmexSide::Buy => OrderSide::Buy,
            BitmexSide::Sell => OrderSide::Sell,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitmexTrade {
    pub timestamp: String,
    pub side: BitmexSide,
    pub size: Fixed,
    pub price: Fixed,
    #[serde(rename = "trdMatchID")]
    pub trd_match_id: String,
}

/// `user/margin`; amounts are integers in the currency's minor unit
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitmexMargin {
    pub currency: String,
    #[serde(default)]
    pub wallet_balance: i64,
    #[serde(default)]
    pub available_margin: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitmexOrder {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(default)]
    pub ord_status: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub side: Option<BitmexSide>,
    #[serde(default)]
    pub ord_type: Option<String>,
    #[serde(default)]
    pub price: Option<Fixed>,
    #[serde(default)]
    pub stop_px: Option<Fixed>,
    #[serde(default)]
    pub order_qty: Option<Fixed>,
}

impl BitmexOrder {
    pub fn status(&self) -> OrderStatus {
        match self.ord_status.as_deref() {
            Some("PartiallyFilled") => OrderStatus::PartiallyFilled,
            Some("Filled") => OrderStatus::Filled,
            Some("Canceled") => OrderStatus::Canceled,
            Some("Rejected") => OrderStatus::Rejected,
            Some("Expired") => OrderStatus::Expired,
            _ => OrderStatus::New,
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self.ord_type.as_deref() {
            Some("Market") => OrderType::Market,
            Some("Stop") => OrderType::Stop,
            _ => OrderType::Limit,
        }
    }

    /// Stop orders report their trigger price
    pub fn effective_price(&self) -> Option<Fixed> {
        match self.order_type() {
            OrderType::Stop => self.stop_px,
            OrderType::Market => None,
            OrderType::Limit => self.price,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BitmexWithdrawal {
    #[serde(rename = "transactID")]
    pub transact_id: String,
}

/// `user/walletHistory` entry; `amount` is signed, in minor units
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitmexTransaction {
    #[serde(rename = "transactID")]
    pub transact_id: String,
    pub currency: String,
    pub transact_type: String,
    pub amount: i64,
    #[serde(default)]
    pub transact_status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub transact_time: Option<String>,
}

/// Canonical currency and minor-unit decimals of a BitMEX margin currency
pub fn margin_currency(currency: &str) -> (String, u32) {
    match currency {
        "XBt" => ("btc".to_string(), 8),
        "USDt" => ("usdt".to_string(), 6),
        "Gwei" => ("eth".to_string(), 9),
        other => (other.to_ascii_lowercase(), 0),
    }
}
