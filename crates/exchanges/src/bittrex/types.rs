//! Bittrex v1.1 `result` payloads

use crate::types::{OrderSide, OrderStatus};
use coinwire_core::Fixed;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexMarket {
    pub market_name: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexTicker {
    pub bid: Fixed,
    pub ask: Fixed,
    pub last: Fixed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexLevel {
    pub quantity: Fixed,
    pub rate: Fixed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BittrexOrderBook {
    #[serde(default)]
    pub buy: Vec<BittrexLevel>,
    #[serde(default)]
    pub sell: Vec<BittrexLevel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexTrade {
    pub id: u64,
    pub time_stamp: String,
    pub quantity: Fixed,
    pub price: Fixed,
    /// `BUY` or `SELL`, the taker side
    pub order_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexBalance {
    pub currency: String,
    pub balance: Option<Fixed>,
    pub available: Option<Fixed>,
}

/// `market/getopenorders` entry or `account/getorder` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexOrder {
    pub order_uuid: String,
    pub exchange: String,
    /// `LIMIT_BUY` or `LIMIT_SELL`; `account/getorder` names it `Type`
    #[serde(alias = "Type")]
    pub order_type: String,
    pub quantity: Fixed,
    pub quantity_remaining: Fixed,
    #[serde(default)]
    pub limit: Option<Fixed>,
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub cancel_initiated: bool,
    #[serde(default)]
    pub closed: Option<String>,
}

impl BittrexOrder {
    pub fn side(&self) -> OrderSide {
        if self.order_type.ends_with("SELL") { OrderSide::Sell } else { OrderSide::Buy }
    }

    pub fn status(&self) -> OrderStatus {
        let done = self.is_open == Some(false) || self.closed.is_some();
        if self.cancel_initiated {
            OrderStatus::Canceled
        } else if done && self.quantity_remaining.is_zero() {
            OrderStatus::Filled
        } else if done {
            OrderStatus::Canceled
        } else if self.quantity_remaining < self.quantity {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::New
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexDepositAddress {
    pub currency: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexWithdrawal {
    pub payment_uuid: String,
    pub currency: String,
    pub amount: Fixed,
    pub address: String,
    pub opened: String,
    #[serde(default)]
    pub authorized: bool,
    #[serde(default)]
    pub pending_payment: bool,
    #[serde(default)]
    pub canceled: bool,
    #[serde(default)]
    pub invalid_address: bool,
}

impl BittrexWithdrawal {
    pub fn status(&self) -> &'static str {
        if self.canceled {
            "canceled"
        } else if self.invalid_address {
            "invalid address"
        } else if self.pending_payment {
            "pending payment"
        } else if self.authorized {
            "completed"
        } else {
            "awaiting authorization"
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexDeposit {
    pub id: u64,
    pub amount: Fixed,
    pub currency: String,
    #[serde(default)]
    pub confirmations: u32,
    pub last_updated: String,
    #[serde(default)]
    pub crypto_address: Option<String>,
}

/// `public/getmarketsummaries` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BittrexSummary {
    pub market_name: String,
    pub last: Fixed,
    /// In the market currency, e.g. LTC for `BTC-LTC`
    pub volume: Fixed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BittrexUuid {
    pub uuid: String,
}
