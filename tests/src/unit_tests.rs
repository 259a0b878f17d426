//! Unit and property tests for the venue-independent building blocks
//!
//! Pair normalization, nonces, signing and configuration, exercised the
//! way every adapter relies on them.

use coinwire_core::prelude::*;
use coinwire_core::{ManualClock, client_order_id};
use coinwire_exchanges::binance::BINANCE_PAIRS;
use coinwire_exchanges::bittrex::BITTREX_PAIRS;
use coinwire_exchanges::kraken::KRAKEN_PAIRS;
use coinwire_exchanges::poloniex::POLONIEX_PAIRS;
use coinwire_exchanges::prelude::*;
use coinwire_exchanges::signing::build_query_string;
use coinwire_exchanges::{DigestEncoding, HmacAlgorithm, PairFormat, Signer};
use proptest::prelude::*;
use rstest::*;
use serial_test::serial;
use std::sync::Arc;

// ============================================================================
// FIXED-POINT VALUES
// ============================================================================

#[cfg(test)]
mod fixed_values {
    use super::*;

    #[test]
    fn test_exact_decimal_arithmetic() {
        let a = Fixed::from_str_exact("0.1").unwrap();
        let b = Fixed::from_str_exact("0.2").unwrap();
        assert_eq!(a + b, Fixed::from_str_exact("0.3").unwrap());
        assert_eq!(Fixed::from_i64(100).to_string(), "100");
        assert!(Fixed::from_str_exact("invalid_number").is_err());
    }

    #[test]
    fn test_minor_units_round_trip() {
        let satoshi = Fixed::from_minor_units(150_000_000, 8);
        assert_eq!(satoshi, Fixed::from_str_exact("1.5").unwrap());
        assert_eq!(satoshi.to_minor_units(8), Some(150_000_000));
    }
}

// ============================================================================
// PAIR NORMALIZATION
// ============================================================================

#[cfg(test)]
mod pairs {
    use super::*;

    fn base_of(format: &'static PairFormat) -> impl Strategy<Value = &'static str> {
        prop::sample::select(format.base_currencies.to_vec())
    }

    proptest! {
        #[test]
        fn test_binance_round_trip(quote in "q[a-z0-9]{1,5}", base in base_of(&BINANCE_PAIRS)) {
            let canonical = format!("{quote}-{base}");
            let native = BINANCE_PAIRS.to_venue(&canonical).unwrap();
            prop_assert_eq!(native.clone(), native.to_ascii_uppercase());
            prop_assert_eq!(BINANCE_PAIRS.from_venue(&native).unwrap(), canonical);
        }

        #[test]
        fn test_delimited_round_trip(quote in "q[a-z0-9]{1,5}", base in base_of(&POLONIEX_PAIRS)) {
            let canonical = format!("{quote}-{base}");
            let native = POLONIEX_PAIRS.to_venue(&canonical).unwrap();
            prop_assert!(native.starts_with(&base.to_ascii_uppercase()));
            prop_assert_eq!(POLONIEX_PAIRS.from_venue(&native).unwrap(), canonical);
        }

        #[test]
        fn test_case_insensitive_input(quote in "Q[A-Z]{1,5}", base in base_of(&BITTREX_PAIRS)) {
            let mixed = format!("{quote}-{}", base.to_ascii_uppercase());
            let native = BITTREX_PAIRS.to_venue(&mixed).unwrap();
            prop_assert_eq!(BITTREX_PAIRS.from_venue(&native).unwrap(), mixed.to_ascii_lowercase());
        }

        #[test]
        fn test_malformed_pairs_rejected(token in "[a-z]{2,8}") {
            prop_assert!(MarketPair::parse(&token).is_err());
            let doubled = format!("{token}-{token}-{token}");
            prop_assert!(MarketPair::parse(&doubled).is_err());
        }
    }

    #[rstest]
    #[case("eth-btc", "ETHXBT")]
    #[case("btc-eur", "XBTEUR")]
    #[case("doge-usd", "XDGUSD")]
    fn test_kraken_aliases(#[case] canonical: &str, #[case] native: &str) {
        assert_eq!(KRAKEN_PAIRS.to_venue(canonical).unwrap(), native);
        assert_eq!(KRAKEN_PAIRS.from_venue(native).unwrap(), canonical);
    }

    #[test]
    fn test_unsupported_base_names_the_base() {
        match BINANCE_PAIRS.to_venue("eth-doge") {
            Err(ExchangeError::UnsupportedBaseCurrency { base, .. }) => assert_eq!(base, "doge"),
            other => panic!("unexpected {other:?}"),
        }
    }
}

// ============================================================================
// NONCES
// ============================================================================

#[cfg(test)]
mod nonces {
    use super::*;

    #[test]
    fn test_nonce_survives_clock_jumping_back() {
        let clock = Arc::new(ManualClock::new(5_000_000_000));
        let nonces = NonceGenerator::with_clock(NonceUnit::Millis, clock.clone());

        let first = nonces.next();
        assert_eq!(first, 5_000);
        clock.set_nanos(1_000_000_000);
        let second = nonces.next();
        assert!(second > first);
    }

    proptest! {
        #[test]
        fn test_nonces_strictly_increase(calls in 2usize..200) {
            let nonces = NonceGenerator::new(NonceUnit::Seconds);
            let mut last = 0;
            for _ in 0..calls {
                let next = nonces.next();
                prop_assert!(next > last);
                last = next;
            }
        }
    }

    #[test]
    fn test_nonces_unique_across_threads() {
        let nonces = Arc::new(NonceGenerator::new(NonceUnit::Micros));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let nonces = nonces.clone();
                std::thread::spawn(move || (0..500).map(|_| nonces.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_client_order_ids_are_unique() {
        let a = client_order_id("cw");
        let b = client_order_id("cw");
        assert!(a.starts_with("cw"));
        assert_ne!(a, b);
    }
}

// ============================================================================
// SIGNING
// ============================================================================

#[cfg(test)]
mod signing {
    use super::*;

    // RFC 4231 test case 2
    const KEY: &str = "Jefe";
    const DATA: &str = "what do ya want for nothing?";

    #[rstest]
    #[case(HmacAlgorithm::Sha256, "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")]
    #[case(
        HmacAlgorithm::Sha512,
        "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
    )]
    fn test_hmac_vectors(#[case] algorithm: HmacAlgorithm, #[case] expected: &str) {
        let signer = Signer::new(algorithm, DigestEncoding::Hex);
        assert_eq!(signer.sign(KEY, DATA).unwrap(), expected);

        let upper = Signer::new(algorithm, DigestEncoding::UpperHex);
        assert_eq!(upper.sign(KEY, DATA).unwrap(), expected.to_ascii_uppercase());
    }

    proptest! {
        #[test]
        fn test_signature_tracks_every_character(message in "[ -~]{1,64}", index in any::<prop::sample::Index>()) {
            let signer = Signer::new(HmacAlgorithm::Sha256, DigestEncoding::Base64);
            let signature = signer.sign("secret", &message).unwrap();
            prop_assert_eq!(&signature, &signer.sign("secret", &message).unwrap());

            let mut bytes = message.clone().into_bytes();
            let i = index.index(bytes.len());
            bytes[i] = if bytes[i] == b'a' { b'b' } else { b'a' };
            let changed = String::from_utf8(bytes).unwrap();
            prop_assert_ne!(signature, signer.sign("secret", &changed).unwrap());
        }
    }

    #[test]
    fn test_sorted_query_string() {
        let params = vec![
            ("timestamp".to_string(), "1499827319559".to_string()),
            ("symbol".to_string(), "LTCBTC".to_string()),
        ];
        assert_eq!(build_query_string(&params), "symbol=LTCBTC&timestamp=1499827319559");
    }
}

// ============================================================================
// CONFIGURATION (environment-touching tests run serially)
// ============================================================================

#[cfg(test)]
mod configuration {
    use super::*;

    fn clear(prefix: &str) {
        for suffix in ["API_KEY", "SECRET_KEY", "CUSTOMER_ID"] {
            std::env::remove_var(format!("{prefix}_{suffix}"));
        }
    }

    #[test]
    #[serial]
    fn test_env_credentials() {
        clear("COINWIRE_TEST");
        std::env::set_var("COINWIRE_TEST_API_KEY", "key");
        std::env::set_var("COINWIRE_TEST_SECRET_KEY", "secret");
        std::env::set_var("COINWIRE_TEST_CUSTOMER_ID", "123456");

        let config = ClientConfig::default().with_env_credentials("coinwire_test").unwrap();
        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.api_key, "key");
        assert_eq!(credentials.customer_id.as_deref(), Some("123456"));
        assert!(!format!("{credentials:?}").contains("secret\""));
        clear("COINWIRE_TEST");
    }

    #[test]
    #[serial]
    fn test_missing_env_credentials() {
        clear("COINWIRE_TEST");
        std::env::set_var("COINWIRE_TEST_API_KEY", "key");

        let err = Credentials::from_env("COINWIRE_TEST").unwrap_err();
        match err {
            ExchangeError::CredentialsRequired(name) => assert_eq!(name, "COINWIRE_TEST_SECRET_KEY"),
            other => panic!("unexpected {other:?}"),
        }
        clear("COINWIRE_TEST");
    }

    #[test]
    fn test_proxy_must_be_https() {
        let config = ClientConfig::default().with_proxy("http://127.0.0.1:3128");
        assert!(BinanceExchange::new(config).is_err());
    }
}
