pub mod seed;
pub mod simulator;
pub mod stock_store;
pub mod tick;

pub use simulator::{Simulator, SimulatorHandle};
pub use stock_store::{ApplyTick, SimulationStore, StockStore};
pub use tick::{Tick, TickGenerator, DEFAULT_SCALING_FACTOR, PRICE_FLOOR};
