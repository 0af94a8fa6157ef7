//! Default instrument universe, loaded on first startup.

use crate::services::stock_store::StockStore;
use crate::types::Stock;
use tracing::info;

/// Default volatility coefficient for seeded instruments.
const DEFAULT_VOLATILITY: f64 = 0.02;

/// (symbol, name, sector, price, avg_volume)
const UNIVERSE: &[(&str, &str, &str, f64, u64)] = &[
    ("AAPL", "Apple Inc.", "Technology", 150.0, 90_000_000),
    ("MSFT", "Microsoft Corporation", "Technology", 300.0, 35_000_000),
    ("JPM", "JPMorgan Chase & Co.", "Finance", 160.0, 12_000_000),
    ("XOM", "Exxon Mobil Corporation", "Energy", 110.0, 18_000_000),
    ("JNJ", "Johnson & Johnson", "Healthcare", 170.0, 7_000_000),
    ("WMT", "Walmart Inc.", "Consumer", 140.0, 8_000_000),
    ("GOOGL", "Alphabet Inc.", "Technology", 2800.0, 1_500_000),
    ("AMZN", "Amazon.com Inc.", "Consumer", 3500.0, 4_000_000),
    ("TSLA", "Tesla Inc.", "Automotive", 700.0, 25_000_000),
    ("BAC", "Bank of America", "Finance", 40.0, 60_000_000),
    ("GS", "Goldman Sachs Group", "Finance", 380.0, 3_000_000),
    ("CVX", "Chevron Corporation", "Energy", 120.0, 9_000_000),
    ("PFE", "Pfizer Inc.", "Healthcare", 45.0, 25_000_000),
    ("UNH", "UnitedHealth Group", "Healthcare", 500.0, 4_000_000),
    ("NKE", "Nike Inc.", "Consumer", 130.0, 7_000_000),
    ("KO", "Coca-Cola Company", "Consumer", 55.0, 15_000_000),
];

/// Build the default universe as insertable records.
pub fn default_universe() -> Vec<Stock> {
    let now = chrono::Utc::now().timestamp_millis();
    UNIVERSE
        .iter()
        .map(|&(symbol, name, sector, price, avg_volume)| Stock {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
            price,
            volatility: DEFAULT_VOLATILITY,
            volume: 0,
            avg_volume,
            created_at: now,
        })
        .collect()
}

/// Insert the default universe if the store is empty. Returns the number
/// of instruments inserted.
pub fn seed_if_empty(store: &StockStore) -> Result<usize, rusqlite::Error> {
    if store.count()? > 0 {
        return Ok(0);
    }
    let stocks = default_universe();
    for stock in &stocks {
        store.insert(stock)?;
    }
    info!("Seeded {} instruments", stocks.len());
    Ok(stocks.len())
}
