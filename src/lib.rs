//! marketsim - Real-time stock market simulation and broadcast server
//!
//! A recurring simulation loop synthesizes trading volume and buy/sell
//! pressure for every tracked instrument, derives a bounded price move,
//! persists the new price with a capped history window, and fans the
//! update out to subscribed WebSocket connections.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;
pub mod websocket;

use config::Config;
use services::StockStore;
use std::sync::Arc;
use websocket::RoomManager;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<StockStore>,
    pub rooms: Arc<RoomManager>,
}
