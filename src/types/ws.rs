use super::{PricePoint, Stock};
use serde::{Deserialize, Serialize};

/// Incoming WebSocket message from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Request a one-time snapshot of the full instrument list.
    GetStocks,
    /// Replace this connection's subscription set with the given symbols.
    SubscribeStocks { symbols: Vec<String> },
    /// Remove the given symbols from this connection's subscription set.
    UnsubscribeStocks { symbols: Vec<String> },
}

/// Outgoing WebSocket message to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full instrument dump, reply to `getStocks`.
    StocksInit { data: Vec<Stock> },
    /// Per-symbol snapshot with recent history, reply to `subscribeStocks`.
    StockInit { data: StockSnapshot },
    /// One simulated tick for a subscribed symbol.
    StockUpdate { data: StockUpdateData },
    Error { error: String },
}

/// Snapshot payload sent once per symbol at subscribe time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    /// Most recent history points, oldest first.
    pub history: Vec<PricePoint>,
}

/// Update payload broadcast after each simulation sweep.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateData {
    pub symbol: String,
    pub price: f64,
    /// Percent change from the pre-tick price.
    pub change: f64,
    pub point: PricePoint,
}
