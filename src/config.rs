use std::env;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Delay between simulation sweeps in milliseconds, measured from the
    /// end of one sweep to the start of the next.
    pub tick_interval_ms: u64,
    /// Maximum number of history points retained per instrument.
    pub history_cap: usize,
    /// Number of history points sent in the subscribe-time snapshot.
    pub snapshot_points: usize,
    /// Amplification applied to net demand imbalance when deriving a price
    /// move. A tuning knob, not a market-derived quantity.
    pub scaling_factor: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "marketsim.db".to_string()),
            tick_interval_ms: env::var("TICK_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            history_cap: env::var("HISTORY_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            snapshot_points: env::var("SNAPSHOT_POINTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            scaling_factor: env::var("SCALING_FACTOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5.0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: "marketsim.db".to_string(),
            tick_interval_ms: 3000,
            history_cap: 500,
            snapshot_points: 50,
            scaling_factor: 5.0,
        }
    }
}
