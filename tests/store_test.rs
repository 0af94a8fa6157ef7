//! Integration tests for the SQLite instrument store.

use marketsim::services::{seed, ApplyTick, SimulationStore, StockStore};
use marketsim::types::{PricePoint, Stock};

fn stock(symbol: &str, price: f64, avg_volume: u64) -> Stock {
    Stock {
        symbol: symbol.to_string(),
        name: format!("{} Corp.", symbol),
        sector: "Test".to_string(),
        price,
        volatility: 0.02,
        volume: 0,
        avg_volume,
        created_at: 0,
    }
}

fn point(price: f64, volume: u64, timestamp: i64) -> PricePoint {
    PricePoint {
        price,
        volume,
        timestamp,
    }
}

#[test]
fn test_insert_roundtrip() {
    let store = StockStore::new_in_memory(500).unwrap();
    store.insert(&stock("AAPL", 150.0, 90_000_000)).unwrap();

    let fetched = store.get("AAPL").unwrap().unwrap();
    assert_eq!(fetched.name, "AAPL Corp.");
    assert_eq!(fetched.price, 150.0);
    assert_eq!(fetched.avg_volume, 90_000_000);
    assert_eq!(fetched.volume, 0);
}

#[test]
fn test_get_many_skips_unknown_symbols() {
    let store = StockStore::new_in_memory(500).unwrap();
    store.insert(&stock("AAPL", 150.0, 1000)).unwrap();
    store.insert(&stock("MSFT", 300.0, 1000)).unwrap();

    let stocks = store
        .get_many(&[
            "aapl".to_string(),
            "GHOST".to_string(),
            "MSFT".to_string(),
        ])
        .unwrap();
    let symbols: Vec<&str> = stocks.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);
}

#[test]
fn test_all_is_ordered_by_symbol() {
    let store = StockStore::new_in_memory(500).unwrap();
    store.insert(&stock("MSFT", 300.0, 1000)).unwrap();
    store.insert(&stock("AAPL", 150.0, 1000)).unwrap();

    let symbols: Vec<String> = store.all().unwrap().into_iter().map(|s| s.symbol).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);
}

#[test]
fn test_apply_tick_accumulates_volume() {
    let store = StockStore::new_in_memory(500).unwrap();
    store.insert(&stock("AAPL", 150.0, 1000)).unwrap();

    store
        .apply_tick("AAPL", 150.45, 50, &point(150.45, 50, 1))
        .unwrap();
    store
        .apply_tick("AAPL", 150.20, 30, &point(150.20, 30, 2))
        .unwrap();

    let fetched = store.get("AAPL").unwrap().unwrap();
    assert_eq!(fetched.price, 150.20);
    assert_eq!(fetched.volume, 80);
}

#[test]
fn test_apply_tick_does_not_touch_other_instruments() {
    let store = StockStore::new_in_memory(500).unwrap();
    store.insert(&stock("AAPL", 150.0, 1000)).unwrap();
    store.insert(&stock("MSFT", 300.0, 1000)).unwrap();

    store
        .apply_tick("AAPL", 151.0, 10, &point(151.0, 10, 1))
        .unwrap();

    let msft = store.get("MSFT").unwrap().unwrap();
    assert_eq!(msft.price, 300.0);
    assert_eq!(msft.volume, 0);
    assert_eq!(store.history_len("MSFT").unwrap(), 0);
}

#[test]
fn test_history_cap_after_many_ticks() {
    let cap = 500;
    let store = StockStore::new_in_memory(cap).unwrap();
    store.insert(&stock("AAPL", 150.0, 1000)).unwrap();

    for i in 0..(cap as i64 + 40) {
        store
            .apply_tick("AAPL", 150.0, 1, &point(150.0, 1, i))
            .unwrap();
    }

    assert_eq!(store.history_len("AAPL").unwrap(), cap);

    // The tail holds exactly the most recent points, oldest first.
    let tail = store.history_tail("AAPL", cap).unwrap();
    assert_eq!(tail.len(), cap);
    assert_eq!(tail.first().unwrap().timestamp, 40);
    assert_eq!(tail.last().unwrap().timestamp, cap as i64 + 39);
    assert!(tail.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn test_history_tail_respects_limit() {
    let store = StockStore::new_in_memory(500).unwrap();
    store.insert(&stock("AAPL", 150.0, 1000)).unwrap();

    for i in 0..10i64 {
        store
            .apply_tick("AAPL", 150.0, 1, &point(150.0 + i as f64, 1, i))
            .unwrap();
    }

    let tail = store.history_tail("AAPL", 3).unwrap();
    let timestamps: Vec<i64> = tail.iter().map(|p| p.timestamp).collect();
    assert_eq!(timestamps, vec![7, 8, 9]);
}

#[test]
fn test_apply_tick_not_found_is_reported() {
    let store = StockStore::new_in_memory(500).unwrap();
    let outcome = store
        .apply_tick("GHOST", 1.0, 1, &point(1.0, 1, 1))
        .unwrap();
    assert_eq!(outcome, ApplyTick::NotFound);
}

#[test]
fn test_load_tick_inputs_has_generation_fields() {
    let store = StockStore::new_in_memory(500).unwrap();
    seed::seed_if_empty(&store).unwrap();

    let inputs = store.load_tick_inputs().unwrap();
    assert_eq!(inputs.len(), store.count().unwrap());

    let aapl = inputs.iter().find(|i| i.symbol == "AAPL").unwrap();
    assert_eq!(aapl.price, 150.0);
    assert_eq!(aapl.avg_volume, 90_000_000);
    assert_eq!(aapl.volatility, 0.02);
}

#[test]
fn test_summaries_match_universe() {
    let store = StockStore::new_in_memory(500).unwrap();
    seed::seed_if_empty(&store).unwrap();

    let summaries = store.summaries().unwrap();
    assert_eq!(summaries.len(), store.count().unwrap());
    let aapl = summaries.iter().find(|s| s.symbol == "AAPL").unwrap();
    assert_eq!(aapl.name, "Apple Inc.");
    assert_eq!(aapl.sector, "Technology");
}
