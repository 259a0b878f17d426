//! Performance benchmarks for the request-building hot path
//!
//! Measures what every private call pays before touching the network:
//! - Request signing per venue authenticator
//! - Pair normalization in both directions
//! - Nonce generation
//! - Fixed-point parsing

use coinwire_core::{Fixed, NonceGenerator, NonceUnit};
use coinwire_exchanges::binance::{BINANCE_PAIRS, BinanceAuth};
use coinwire_exchanges::bitmex::BitmexAuth;
use coinwire_exchanges::bitstamp::BitstampAuth;
use coinwire_exchanges::kraken::{KRAKEN_PAIRS, KrakenAuth};
use coinwire_exchanges::poloniex::{POLONIEX_PAIRS, PoloniexAuth};
use coinwire_exchanges::{Authenticator, Credentials, PrivateRequest};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use url::Url;

const KRAKEN_SECRET: &str = "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";

fn order_request() -> PrivateRequest {
    PrivateRequest::post("order")
        .param("symbol", "ETHBTC")
        .param("side", "BUY")
        .param("type", "LIMIT")
        .param("price", "0.05")
        .param("quantity", "1.25")
}

fn bench_signing(c: &mut Criterion) {
    let credentials = Credentials::new("api-key", "secret").with_customer_id("123456");
    let authenticators: Vec<(&str, Box<dyn Authenticator>, &str)> = vec![
        (
            "binance",
            Box::new(BinanceAuth::new(credentials.clone()).unwrap()),
            "https://api.binance.com",
        ),
        (
            "bitstamp",
            Box::new(BitstampAuth::new(credentials.clone()).unwrap()),
            "https://www.bitstamp.net/api/v2/",
        ),
        (
            "kraken",
            Box::new(KrakenAuth::new(Credentials::new("api-key", KRAKEN_SECRET)).unwrap()),
            "https://api.kraken.com/0/",
        ),
        (
            "poloniex",
            Box::new(PoloniexAuth::new(credentials.clone()).unwrap()),
            "https://poloniex.com/",
        ),
        (
            "bitmex",
            Box::new(BitmexAuth::new(credentials).unwrap()),
            "https://www.bitmex.com/api/v1",
        ),
    ];

    let request = order_request();
    let mut group = c.benchmark_group("sign_request");
    for (venue, auth, base) in &authenticators {
        let base = Url::parse(base).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(venue), &base, |b, base| {
            b.iter(|| auth.authenticate(black_box(base), black_box(&request), 1_700_000_000_000).unwrap())
        });
    }
    group.finish();
}

fn bench_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_format");
    group.bench_function("binance_to_venue", |b| b.iter(|| BINANCE_PAIRS.to_venue(black_box("eth-btc")).unwrap()));
    group.bench_function("binance_from_venue", |b| b.iter(|| BINANCE_PAIRS.from_venue(black_box("ETHBTC")).unwrap()));
    group.bench_function("kraken_alias", |b| b.iter(|| KRAKEN_PAIRS.from_venue(black_box("XDGXBT")).unwrap()));
    group.bench_function("poloniex_delimited", |b| {
        b.iter(|| POLONIEX_PAIRS.from_venue(black_box("BTC_ETH")).unwrap())
    });
    group.finish();
}

fn bench_primitives(c: &mut Criterion) {
    let nonces = NonceGenerator::new(NonceUnit::Micros);
    c.bench_function("nonce_next", |b| b.iter(|| nonces.next()));
    c.bench_function("fixed_parse", |b| b.iter(|| Fixed::from_str_exact(black_box("37500.12345678")).unwrap()));
}

criterion_group!(benches, bench_signing, bench_pairs, bench_primitives);
criterion_main!(benches);
