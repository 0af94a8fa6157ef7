use serde::{Deserialize, Serialize};

/// A single price/volume observation in an instrument's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub volume: u64,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

/// A simulated tradable instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// Unique ticker symbol, stored uppercase.
    pub symbol: String,
    pub name: String,
    pub sector: String,
    /// Current price. Always > 0; the tick generator floor-clamps at 0.01.
    pub price: f64,
    /// Coefficient controlling how strongly demand imbalance moves price.
    pub volatility: f64,
    /// Cumulative simulated volume traded since creation.
    pub volume: u64,
    /// Long-run baseline trading activity used to scale simulated volume.
    pub avg_volume: u64,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}

/// Compact listing row for the REST index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
}

/// The subset of instrument state the tick generator reads.
#[derive(Debug, Clone, PartialEq)]
pub struct TickInputs {
    pub symbol: String,
    pub price: f64,
    pub avg_volume: u64,
    pub volatility: f64,
}
