mod stock;
mod ws;

pub use stock::{PricePoint, Stock, StockSummary, TickInputs};
pub use ws::{ClientMessage, ServerMessage, StockSnapshot, StockUpdateData};
