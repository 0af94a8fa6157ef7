//! SQLite persistence for the simulated instrument universe.
//!
//! The store is the only shared mutable resource in the system. All
//! simulation writes go through [`StockStore::apply_tick`], a single
//! transaction that sets the price, increments cumulative volume, and
//! appends one history point while trimming the history to its cap. No
//! caller ever reads-modifies-writes instrument state across two calls.

use crate::types::{PricePoint, Stock, StockSummary, TickInputs};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Outcome of applying one tick to an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyTick {
    /// Price, volume and history were updated.
    Applied,
    /// The instrument vanished between load and update; nothing was written.
    NotFound,
}

/// Store operations the simulation loop depends on.
///
/// A seam for tests: the scheduler only needs to load tick inputs and
/// apply results, so a test double can interpose slow or failing calls.
pub trait SimulationStore: Send + Sync {
    /// Load the fields needed for tick computation, one row per instrument.
    fn load_tick_inputs(&self) -> anyhow::Result<Vec<TickInputs>>;

    /// Atomically set the price, increment cumulative volume, and append
    /// one history point (evicting the oldest beyond the cap).
    fn apply_tick(
        &self,
        symbol: &str,
        new_price: f64,
        volume_delta: u64,
        point: &PricePoint,
    ) -> anyhow::Result<ApplyTick>;
}

/// SQLite-backed instrument store.
pub struct StockStore {
    conn: Mutex<Connection>,
    history_cap: usize,
}

impl StockStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P, history_cap: usize) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
            history_cap,
        };
        store.init_schema()?;
        info!("Stock store initialized (history cap {})", history_cap);
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory(history_cap: usize) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            history_cap,
        };
        store.init_schema()?;
        debug!("In-memory stock store initialized");
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS stocks (
                symbol TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sector TEXT NOT NULL,
                price REAL NOT NULL,
                volatility REAL NOT NULL DEFAULT 0.02,
                volume INTEGER NOT NULL DEFAULT 0,
                avg_volume INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        // History rows are append-only per symbol; insertion order is
        // chronological, so the autoincrement id doubles as the sort key.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL REFERENCES stocks(symbol),
                price REAL NOT NULL,
                volume INTEGER NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_symbol_id
             ON price_history(symbol, id)",
            [],
        )?;

        Ok(())
    }

    /// Insert a new instrument. Fails if the symbol already exists.
    pub fn insert(&self, stock: &Stock) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO stocks (symbol, name, sector, price, volatility, volume, avg_volume, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                stock.symbol.to_uppercase(),
                stock.name,
                stock.sector,
                stock.price,
                stock.volatility,
                stock.volume as i64,
                stock.avg_volume as i64,
                stock.created_at,
            ],
        )?;
        Ok(())
    }

    /// Number of instruments in the store.
    pub fn count(&self) -> Result<usize, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stocks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Fetch a single instrument by symbol (case-insensitive).
    pub fn get(&self, symbol: &str) -> Result<Option<Stock>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT symbol, name, sector, price, volatility, volume, avg_volume, created_at
             FROM stocks WHERE symbol = ?1",
            params![symbol.to_uppercase()],
            row_to_stock,
        )
        .optional()
    }

    /// Fetch several instruments by symbol. Unknown symbols are omitted.
    pub fn get_many(&self, symbols: &[String]) -> Result<Vec<Stock>, rusqlite::Error> {
        let mut stocks = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(stock) = self.get(symbol)? {
                stocks.push(stock);
            }
        }
        Ok(stocks)
    }

    /// Fetch every instrument, ordered by symbol.
    pub fn all(&self) -> Result<Vec<Stock>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT symbol, name, sector, price, volatility, volume, avg_volume, created_at
             FROM stocks ORDER BY symbol",
        )?;
        let rows = stmt.query_map([], row_to_stock)?;
        rows.collect()
    }

    /// Compact listing rows for the REST index.
    pub fn summaries(&self) -> Result<Vec<StockSummary>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT symbol, name, sector, price FROM stocks ORDER BY symbol")?;
        let rows = stmt.query_map([], |row| {
            Ok(StockSummary {
                symbol: row.get(0)?,
                name: row.get(1)?,
                sector: row.get(2)?,
                price: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    /// The most recent `n` history points for a symbol, oldest first.
    pub fn history_tail(&self, symbol: &str, n: usize) -> Result<Vec<PricePoint>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT price, volume, timestamp FROM price_history
             WHERE symbol = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![symbol.to_uppercase(), n as i64], |row| {
            Ok(PricePoint {
                price: row.get(0)?,
                volume: row.get::<_, i64>(1)? as u64,
                timestamp: row.get(2)?,
            })
        })?;
        let mut points: Vec<PricePoint> = rows.collect::<Result<_, _>>()?;
        points.reverse();
        Ok(points)
    }

    /// Number of history points stored for a symbol.
    pub fn history_len(&self, symbol: &str) -> Result<usize, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM price_history WHERE symbol = ?1",
            params![symbol.to_uppercase()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl SimulationStore for StockStore {
    fn load_tick_inputs(&self) -> anyhow::Result<Vec<TickInputs>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT symbol, price, avg_volume, volatility FROM stocks")?;
        let rows = stmt.query_map([], |row| {
            Ok(TickInputs {
                symbol: row.get(0)?,
                price: row.get(1)?,
                avg_volume: row.get::<_, i64>(2)? as u64,
                volatility: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn apply_tick(
        &self,
        symbol: &str,
        new_price: f64,
        volume_delta: u64,
        point: &PricePoint,
    ) -> anyhow::Result<ApplyTick> {
        let symbol = symbol.to_uppercase();
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE stocks SET price = ?1, volume = volume + ?2 WHERE symbol = ?3",
            params![new_price, volume_delta as i64, symbol],
        )?;
        if updated == 0 {
            // Dropping the uncommitted transaction rolls back.
            return Ok(ApplyTick::NotFound);
        }

        tx.execute(
            "INSERT INTO price_history (symbol, price, volume, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![symbol, point.price, point.volume as i64, point.timestamp],
        )?;

        // Bounded append: evict the oldest rows beyond the cap in the same
        // transaction, so no intermediate state is ever visible.
        tx.execute(
            "DELETE FROM price_history WHERE symbol = ?1 AND id NOT IN (
                 SELECT id FROM price_history WHERE symbol = ?1
                 ORDER BY id DESC LIMIT ?2
             )",
            params![symbol, self.history_cap as i64],
        )?;

        tx.commit()?;
        Ok(ApplyTick::Applied)
    }
}

fn row_to_stock(row: &rusqlite::Row<'_>) -> Result<Stock, rusqlite::Error> {
    Ok(Stock {
        symbol: row.get(0)?,
        name: row.get(1)?,
        sector: row.get(2)?,
        price: row.get(3)?,
        volatility: row.get(4)?,
        volume: row.get::<_, i64>(5)? as u64,
        avg_volume: row.get::<_, i64>(6)? as u64,
        created_at: row.get(7)?,
    })
}
