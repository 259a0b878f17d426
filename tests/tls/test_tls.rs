//! Connectivity check for the monoio-native TLS transport
//!
//! Sends one unsigned GET to a public endpoint of every venue and reports
//! the status line, bypassing the adapters entirely.

use coinwire_exchanges::{HttpRequest, MonoioHttpsClient, Transport, TransportConfig};
use tracing_subscriber::EnvFilter;
use url::Url;

const ENDPOINTS: [(&str, &str); 6] = [
    ("binance", "https://api.binance.com/api/v3/ping"),
    ("bitstamp", "https://www.bitstamp.net/api/v2/ticker/btcusd/"),
    ("bittrex", "https://bittrex.com/api/v1.1/public/getmarkets"),
    ("kraken", "https://api.kraken.com/0/public/Time"),
    ("poloniex", "https://poloniex.com/public?command=returnTicker"),
    ("bitmex", "https://www.bitmex.com/api/v1/instrument/active"),
];

#[monoio::main(timer_enabled = true)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // transport debug lines (connect, tunnel, status) unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coinwire_exchanges::http=debug")),
        )
        .with_target(false)
        .init();

    println!("🚀 Testing monoio-native TLS transport");

    // COINWIRE_PROXY=https://host:port routes every check through the tunnel
    let client = MonoioHttpsClient::with_config(TransportConfig {
        proxy: std::env::var("COINWIRE_PROXY").ok(),
        ..Default::default()
    })?;
    println!("✅ HTTPS client created");

    for (venue, endpoint) in ENDPOINTS {
        let request = HttpRequest::get(Url::parse(endpoint)?);
        match client.send(request).await {
            Ok(response) => {
                let preview: String = response.body.chars().take(80).collect();
                let kind = match serde_json::from_str::<serde_json::Value>(&response.body) {
                    Ok(serde_json::Value::Array(_)) => "json array",
                    Ok(_) => "json",
                    Err(_) => "not json",
                };
                println!("📡 {venue}: HTTP {} ({kind}) {}", response.status, preview);
            }
            Err(e) => println!("❌ {venue}: {e}"),
        }
    }

    Ok(())
}
