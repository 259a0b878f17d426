//! Contract tests run against every venue adapter through `dyn Exchange`
//!
//! All traffic goes to a recording `MockTransport`; nothing here touches
//! the network.

use crate::{VENUES, exchange_with_transport, sample_pair};
use coinwire_exchanges::prelude::*;
use coinwire_exchanges::testing::MockTransport;
use coinwire_exchanges::{Method, TransportError};
use rstest::*;
use serde_json::{Value, json};
use std::sync::Arc;

// ============================================================================
// TEST FIXTURES
// ============================================================================

#[fixture]
fn mock() -> Arc<MockTransport> {
    Arc::new(MockTransport::new())
}

fn anonymous(venue: &str, mock: &Arc<MockTransport>) -> Box<dyn Exchange> {
    exchange_with_transport(venue, ClientConfig::default(), mock.clone()).unwrap()
}

fn authenticated(venue: &str, mock: &Arc<MockTransport>) -> Box<dyn Exchange> {
    let config = ClientConfig::default().with_credentials("key", "c2VjcmV0");
    exchange_with_transport(venue, config, mock.clone()).unwrap()
}

fn limit_order(venue: &str) -> OrderRequest {
    OrderRequest::limit(sample_pair(venue), OrderSide::Buy, Fixed::from_str_exact("0.05").unwrap(), Fixed::from_i64(1))
}

// ============================================================================
// UNIFORM CONTRACT
// ============================================================================

#[cfg(test)]
mod contract {
    use super::*;

    #[rstest]
    fn test_every_venue_builds_as_trait_object(mock: Arc<MockTransport>) {
        let exchanges: Vec<Box<dyn Exchange>> = VENUES.iter().map(|venue| anonymous(venue, &mock)).collect();

        let names: Vec<&str> = exchanges.iter().map(|e| e.name()).collect();
        assert_eq!(names, VENUES.to_vec());
        assert!(exchanges.iter().all(|e| !e.has_credentials()));
        assert_eq!(mock.call_count(), 0);
    }

    #[rstest]
    #[case("binance", "ETHBTC")]
    #[case("bitstamp", "btcusd")]
    #[case("bittrex", "USD-BTC")]
    #[case("kraken", "XBTUSD")]
    #[case("poloniex", "BTC_ETH")]
    #[case("bitmex", "XBTUSD")]
    fn test_native_pair_round_trip(mock: Arc<MockTransport>, #[case] venue: &str, #[case] native: &str) {
        let exchange = anonymous(venue, &mock);
        let canonical = exchange.from_venue(native).unwrap();
        assert_eq!(exchange.to_venue(&canonical).unwrap(), native);
        assert_eq!(canonical, canonical.to_ascii_lowercase());
    }

    #[rstest]
    #[case("binance")]
    #[case("bitstamp")]
    #[case("bittrex")]
    #[case("kraken")]
    #[case("poloniex")]
    #[case("bitmex")]
    fn test_unsupported_base_rejected_locally(mock: Arc<MockTransport>, #[case] venue: &str) {
        let exchange = anonymous(venue, &mock);
        let err = exchange.to_venue("eth-doge").unwrap_err();
        assert!(matches!(err, ExchangeError::UnsupportedBaseCurrency { .. }), "{venue}: {err}");
    }
}

// ============================================================================
// LISTED MARKETS
// ============================================================================

/// A multi-market listing in each venue's wire shape, with the canonical
/// pairs expected to normalize from it
fn listing(venue: &str) -> (Value, Vec<&'static str>) {
    match venue {
        "binance" => (
            json!({"timezone": "UTC", "symbols": [
                {"symbol": "ETHBTC", "status": "TRADING"},
                {"symbol": "BNBETH", "status": "TRADING"},
                {"symbol": "BTCUSDT", "status": "TRADING"},
                {"symbol": "BNBUSDT", "status": "TRADING"},
                {"symbol": "1INCHBTC", "status": "TRADING"},
                {"symbol": "BTCTUSD", "status": "TRADING"},
                {"symbol": "USDTBRL", "status": "BREAK"}
            ]}),
            vec!["1inch-btc", "bnb-eth", "bnb-usdt", "btc-usdt", "eth-btc"],
        ),
        "bitstamp" => (
            json!([
                {"name": "BTC/USD", "url_symbol": "btcusd"},
                {"name": "ETH/EUR", "url_symbol": "etheur"},
                {"name": "USDC/USD", "url_symbol": "usdcusd"},
                {"name": "USDC/USDT", "url_symbol": "usdcusdt"},
                {"name": "EUR/USD", "url_symbol": "eurusd"},
                {"name": "XRP/GBP", "url_symbol": "xrpgbp"},
                {"name": "XRP/PAX", "url_symbol": "xrppax"}
            ]),
            vec!["btc-usd", "eth-eur", "eur-usd", "usdc-usd", "usdc-usdt", "xrp-gbp"],
        ),
        "bittrex" => (
            json!({"success": true, "message": "", "result": [
                {"MarketName": "BTC-LTC", "IsActive": true},
                {"MarketName": "USDT-BTC", "IsActive": true},
                {"MarketName": "ETH-1ST", "IsActive": true},
                {"MarketName": "USD-BTC", "IsActive": true},
                {"MarketName": "EUR-BTC", "IsActive": false}
            ]}),
            vec!["1st-eth", "btc-usd", "btc-usdt", "ltc-btc"],
        ),
        "kraken" => (
            json!({"error": [], "result": {
                "XXBTZUSD": {"altname": "XBTUSD"},
                "XXBTZUSD.d": {"altname": "XBTUSD.d"},
                "XXBTZEUR": {"altname": "XBTEUR"},
                "XETHXXBT": {"altname": "ETHXBT"},
                "XXDGZUSD": {"altname": "XDGUSD"},
                "XDGXBT": {"altname": "XDGXBT"},
                "USDTZUSD": {"altname": "USDTUSD"},
                "XBTUSDT": {"altname": "XBTUSDT"},
                "ETH2.SETH": {"altname": "ETH2.SETH"},
                "USDCUSDC": {"altname": "ETHUSDC"}
            }}),
            vec!["btc-eur", "btc-usd", "btc-usdt", "doge-btc", "doge-usd", "eth-btc", "usdt-usd"],
        ),
        "poloniex" => (
            json!({
                "BTC_ETH": {"last": "0.05", "lowestAsk": "0.0501", "highestBid": "0.0499"},
                "USDT_BTC": {"last": "30000", "lowestAsk": "30001", "highestBid": "29999"},
                "USDC_USDT": {"last": "1.0001", "lowestAsk": "1.0002", "highestBid": "1.0000"},
                "XMR_LTC": {"last": "0.5", "lowestAsk": "0.51", "highestBid": "0.49"},
                "TRX_WIN": {"last": "0.01", "lowestAsk": "0.011", "highestBid": "0.009"}
            }),
            vec!["btc-usdt", "eth-btc", "ltc-xmr", "usdt-usdc"],
        ),
        "bitmex" => (
            json!([
                {"symbol": "XBTUSD", "askPrice": 30001, "bidPrice": 30000, "lastPrice": 30000.5},
                {"symbol": "ETHUSD", "askPrice": 1900.1, "bidPrice": 1900, "lastPrice": 1900},
                {"symbol": "XBTUSDT", "askPrice": 30002, "bidPrice": 30001, "lastPrice": 30001},
                {"symbol": "XBTEUR", "askPrice": 27500, "bidPrice": 27499, "lastPrice": 27499},
                {"symbol": "XBTZ24", "askPrice": 31000, "bidPrice": 30990, "lastPrice": 30995},
                {"symbol": "ETHUSDZ24", "askPrice": null, "bidPrice": null, "lastPrice": null}
            ]),
            vec!["btc-eur", "btc-usd", "btc-usdt", "eth-usd"],
        ),
        other => panic!("no listing for {other}"),
    }
}

#[cfg(test)]
mod listed_markets {
    use super::*;

    #[rstest]
    #[case("binance")]
    #[case("bitstamp")]
    #[case("bittrex")]
    #[case("kraken")]
    #[case("poloniex")]
    #[case("bitmex")]
    #[monoio::test]
    async fn test_listed_markets_round_trip(#[case] venue: &str) {
        let (body, expected) = listing(venue);
        let mock = Arc::new(MockTransport::new().respond_json(body));
        let exchange = anonymous(venue, &mock);

        let markets = exchange.list_markets().await.unwrap();
        assert!(markets.len() > expected.len(), "{venue}: listing should include tokens that do not normalize");

        let mut normalized = Vec::new();
        for token in &markets {
            if let Ok(canonical) = exchange.from_venue(token) {
                assert_eq!(&exchange.to_venue(&canonical).unwrap(), token, "{venue}: {token} -> {canonical}");
                normalized.push(canonical);
            }
        }
        normalized.sort();
        assert_eq!(normalized, expected, "{venue}");
    }
}

// ============================================================================
// CREDENTIAL GATING
// ============================================================================

#[cfg(test)]
mod credentials {
    use super::*;

    #[rstest]
    #[case("binance")]
    #[case("bitstamp")]
    #[case("bittrex")]
    #[case("kraken")]
    #[case("poloniex")]
    #[case("bitmex")]
    #[monoio::test]
    async fn test_place_order_without_credentials(#[case] venue: &str) {
        let mock = Arc::new(MockTransport::new());
        let exchange = anonymous(venue, &mock);

        let err = exchange.place_order(&limit_order(venue)).await.unwrap_err();
        assert!(matches!(err, ExchangeError::CredentialsRequired(_)), "{venue}: {err}");
        assert_eq!(mock.call_count(), 0, "{venue} reached the transport");
    }

    #[rstest]
    #[case("binance")]
    #[case("bitstamp")]
    #[case("bittrex")]
    #[case("kraken")]
    #[case("poloniex")]
    #[case("bitmex")]
    #[monoio::test]
    async fn test_private_reads_without_credentials(#[case] venue: &str) {
        let mock = Arc::new(MockTransport::new());
        let exchange = anonymous(venue, &mock);

        let balances = exchange.get_balances().await.unwrap_err();
        assert!(matches!(balances, ExchangeError::CredentialsRequired(_)));
        let withdrawal = exchange
            .withdraw("btc", Fixed::from_i64(1), "1BoatSLRHtKNngkdXEeobR76b53LETtpyT")
            .await
            .unwrap_err();
        assert!(matches!(withdrawal, ExchangeError::CredentialsRequired(_)), "{venue}: {withdrawal}");
        assert_eq!(mock.call_count(), 0);
    }

    fn gated(venue: &str, operation: &str, result: Result<impl std::fmt::Debug>) {
        match result {
            Err(ExchangeError::CredentialsRequired(_) | ExchangeError::Unsupported { .. }) => {}
            other => panic!("{venue} {operation}: {other:?}"),
        }
    }

    #[rstest]
    #[case("binance")]
    #[case("bitstamp")]
    #[case("bittrex")]
    #[case("kraken")]
    #[case("poloniex")]
    #[case("bitmex")]
    #[monoio::test]
    async fn test_account_queries_without_credentials(#[case] venue: &str) {
        let mock = Arc::new(MockTransport::new());
        let exchange = anonymous(venue, &mock);
        let pair = Some(sample_pair(venue));

        gated(venue, "open orders", exchange.get_open_orders(pair).await);
        gated(venue, "order", exchange.get_order("1", pair).await);
        gated(venue, "cancel all", exchange.cancel_all_orders(pair).await);
        gated(venue, "deposit address", exchange.get_deposit_address("btc").await);
        gated(venue, "deposit history", exchange.get_deposit_history(Some("btc")).await);
        gated(venue, "withdraw history", exchange.get_withdraw_history(None).await);
        assert_eq!(mock.call_count(), 0, "{venue} reached the transport");
    }

    #[rstest]
    #[case("poloniex", "get_order")]
    #[case("bittrex", "cancel_all_orders")]
    #[case("bitstamp", "get_market_ohlcv_data")]
    #[case("kraken", "get_summaries")]
    #[monoio::test]
    async fn test_unimplemented_operations_are_unsupported(#[case] venue: &str, #[case] operation: &str) {
        let mock = Arc::new(MockTransport::new().respond(200, "{}"));
        let exchange = authenticated(venue, &mock);
        let pair = sample_pair(venue);

        let err = match operation {
            "get_order" => exchange.get_order("1", Some(pair)).await.map(|_| ()),
            "cancel_all_orders" => exchange.cancel_all_orders(None).await.map(|_| ()),
            "get_market_ohlcv_data" => exchange
                .get_market_ohlcv_data(pair, CandleInterval::OneHour, None)
                .await
                .map(|_| ()),
            _ => exchange.get_summaries().await.map(|_| ()),
        }
        .unwrap_err();
        match err {
            ExchangeError::Unsupported { venue: name, operation: op } => {
                assert_eq!(name, venue);
                assert_eq!(op, operation);
            }
            other => panic!("{venue}: {other:?}"),
        }
        assert_eq!(mock.call_count(), 0);
    }
}

// ============================================================================
// TRANSPORT BEHAVIOUR
// ============================================================================

#[cfg(test)]
mod transport {
    use super::*;

    #[monoio::test]
    async fn test_binance_ticker_scenario() {
        let mock = Arc::new(MockTransport::new().respond(
            200,
            r#"{"symbol":"ETHBTC","askPrice":"0.05","bidPrice":"0.049","lastPrice":"0.0495","volume":"1024.5"}"#,
        ));
        let exchange = anonymous("binance", &mock);

        let ticker = exchange.get_ticker("eth-btc").await.unwrap();
        assert_eq!(ticker.ask, Fixed::from_str_exact("0.05").unwrap());
        assert_eq!(ticker.bid, Fixed::from_str_exact("0.049").unwrap());
        assert_eq!(ticker.last, Fixed::from_str_exact("0.0495").unwrap());

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url.as_str(), "https://api.binance.com/api/v3/ticker/24hr?symbol=ETHBTC");
    }

    #[rstest]
    #[case("binance")]
    #[case("bitstamp")]
    #[case("bittrex")]
    #[case("kraken")]
    #[case("poloniex")]
    #[case("bitmex")]
    #[monoio::test]
    async fn test_server_error_html_is_transport_error(#[case] venue: &str) {
        let mock = Arc::new(MockTransport::new().respond(500, "<html><body>Internal Server Error</body></html>"));
        let exchange = anonymous(venue, &mock);

        let err = exchange.get_ticker(sample_pair(venue)).await.unwrap_err();
        match err {
            ExchangeError::Transport(TransportError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("{venue}: expected transport error, got {other:?}"),
        }
        assert_eq!(mock.call_count(), 1);
    }

    #[monoio::test]
    async fn test_transport_failure_propagates() {
        let mock = Arc::new(MockTransport::new().fail(TransportError::Timeout(8000).into()));
        let exchange = anonymous("kraken", &mock);

        let err = exchange.get_order_book("btc-usd", 10).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[monoio::test]
    async fn test_success_status_with_garbage_is_remote_error() {
        let mock = Arc::new(MockTransport::new().respond(200, "maintenance"));
        let exchange = anonymous("bitstamp", &mock);

        let err = exchange.get_ticker("btc-usd").await.unwrap_err();
        assert!(err.is_remote());
    }

    #[monoio::test]
    async fn test_testnet_routing() {
        let mock = Arc::new(MockTransport::new());
        let config = ClientConfig::default().testnet();
        exchange_with_transport("bitmex", config, mock.clone())
            .unwrap()
            .list_markets()
            .await
            .unwrap_err();

        let request = mock.last_request().unwrap();
        assert_eq!(request.url.host_str(), Some("testnet.bitmex.com"));
    }
}
