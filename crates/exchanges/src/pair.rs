//! Pair normalization between canonical `quote-base` and venue tokens
//!
//! Each venue describes its market identifiers with a `PairFormat`:
//! delimiter, letter case, token order, the base currencies it quotes
//! against and any currency renames (Kraken and BitMEX call bitcoin XBT).

use crate::errors::{ExchangeError, Result};
use crate::types::MarketPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCase {
    Upper,
    Lower,
}

impl TokenCase {
    fn apply(&self, token: &str) -> String {
        match self {
            TokenCase::Upper => token.to_ascii_uppercase(),
            TokenCase::Lower => token.to_ascii_lowercase(),
        }
    }
}

/// Which currency comes first in the native token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrder {
    /// `ETHBTC`
    QuoteFirst,
    /// `BTC-ETH`
    BaseFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairFormat {
    /// Empty for undelimited tokens such as `ETHBTC`
    pub delimiter: &'static str,
    pub case: TokenCase,
    pub order: TokenOrder,
    /// Supported base currencies, canonical lowercase
    pub base_currencies: &'static [&'static str],
    /// `(canonical, native)` currency renames, lowercase
    pub aliases: &'static [(&'static str, &'static str)],
}

impl PairFormat {
    /// Canonical `quote-base` to the venue's native token
    pub fn to_venue(&self, canonical: &str) -> Result<String> {
        let pair = MarketPair::parse(canonical)?;
        let quote = self.canonical_currency(&pair.quote);
        let base = self.canonical_currency(&pair.base);

        if !self.supports_base(&base) {
            return Err(ExchangeError::UnsupportedBaseCurrency {
                pair: canonical.to_string(),
                base,
            });
        }

        let quote = self.native_currency(&quote);
        let base = self.native_currency(&base);
        Ok(match self.order {
            TokenOrder::QuoteFirst => format!("{quote}{}{base}", self.delimiter),
            TokenOrder::BaseFirst => format!("{base}{}{quote}", self.delimiter),
        })
    }

    /// Native token back to canonical lowercase `quote-base`
    pub fn from_venue(&self, native: &str) -> Result<String> {
        let native = native.trim();
        let (first, second) = self.split_native(native)?;
        let (quote, base) = match self.order {
            TokenOrder::QuoteFirst => (first, second),
            TokenOrder::BaseFirst => (second, first),
        };

        let base = self.canonical_currency(base);
        if !self.supports_base(&base) {
            return Err(ExchangeError::UnsupportedBaseCurrency {
                pair: native.to_string(),
                base,
            });
        }

        let pair = MarketPair::new(&self.canonical_currency(quote), &base)
            .map_err(|_| ExchangeError::InvalidPairFormat(native.to_string()))?;
        Ok(pair.to_string())
    }

    /// Venue spelling of a single currency code
    pub fn native_currency(&self, code: &str) -> String {
        let lower = code.to_ascii_lowercase();
        let native = self
            .aliases
            .iter()
            .find(|(canonical, _)| *canonical == lower)
            .map(|(_, native)| native.to_string())
            .unwrap_or(lower);
        self.case.apply(&native)
    }

    /// Canonical lowercase spelling of a venue currency code
    pub fn canonical_currency(&self, code: &str) -> String {
        let lower = code.to_ascii_lowercase();
        self.aliases
            .iter()
            .find(|(_, native)| *native == lower)
            .map(|(canonical, _)| canonical.to_string())
            .unwrap_or(lower)
    }

    pub fn supports_base(&self, canonical_base: &str) -> bool {
        self.base_currencies.contains(&canonical_base)
    }

    fn split_native<'a>(&self, native: &'a str) -> Result<(&'a str, &'a str)> {
        if !self.delimiter.is_empty() {
            return native
                .split_once(self.delimiter)
                .filter(|(a, b)| !a.is_empty() && !b.is_empty())
                .ok_or_else(|| ExchangeError::InvalidPairFormat(native.to_string()));
        }

        // Undelimited: the base is the longest supported currency at the
        // end (quote-first) or start (base-first) of the token
        let lower = native.to_ascii_lowercase();
        let mut candidates: Vec<String> = self
            .base_currencies
            .iter()
            .map(|base| self.native_currency(base).to_ascii_lowercase())
            .collect();
        candidates.sort_by_key(|c| std::cmp::Reverse(c.len()));

        candidates
            .iter()
            .find_map(|base| match self.order {
                TokenOrder::QuoteFirst if lower.len() > base.len() && lower.ends_with(base.as_str()) => {
                    Some(native.split_at(native.len() - base.len()))
                }
                TokenOrder::BaseFirst if lower.len() > base.len() && lower.starts_with(base.as_str()) => {
                    Some(native.split_at(base.len()))
                }
                _ => None,
            })
            .ok_or_else(|| ExchangeError::InvalidPairFormat(native.to_string()))
    }
}
