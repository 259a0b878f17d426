//! Check API credentials for every configured venue
//!
//! For each venue with `<VENUE>_API_KEY` and `<VENUE>_SECRET_KEY` set (in
//! the environment or a `.env` file) this makes one signed balance call.
//! `<VENUE>_TESTNET=true` routes Binance and BitMEX to their testnets;
//! Bitstamp also needs `BITSTAMP_CUSTOMER_ID`.

use coinwire_core::prelude::*;
use coinwire_exchanges::prelude::*;
use coinwire_tests::{VENUES, exchange};
use std::env;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    println!("🚀 coinwire credentials check");
    println!("============================");

    let runtime = VenueRuntime::new();
    let mut failures = 0;

    for venue in VENUES {
        let prefix = venue.to_ascii_uppercase();
        let mut config = match ClientConfig::default().with_env_credentials(&prefix) {
            Ok(config) => config,
            Err(_) => {
                println!("⏭️  {venue}: no credentials in environment");
                continue;
            }
        };
        if env::var(format!("{prefix}_TESTNET")).is_ok_and(|v| v.eq_ignore_ascii_case("true")) {
            config = config.testnet();
        }

        if let Some(credentials) = &config.credentials {
            let key = &credentials.api_key;
            println!("🔑 {venue}: API key {}...", key.chars().take(6).collect::<String>());
        }

        let client = exchange(venue, config)?;
        match runtime.block_on(client.get_balances())? {
            Ok(balances) => {
                println!("✅ {venue}: {} non-zero balances", balances.len());
                for balance in balances.iter().take(5) {
                    println!("   {}: {} (+{} reserved)", balance.currency, balance.available, balance.reserved);
                }
            }
            Err(e) => {
                failures += 1;
                println!("❌ {venue}: {e}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} venue(s) rejected their credentials");
    }
    Ok(())
}
