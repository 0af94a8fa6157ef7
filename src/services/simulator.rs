//! Simulation scheduler: drives the tick generator across every instrument
//! on a fixed cadence and fans the results out to subscribed connections.
//!
//! The loop alternates between exactly two states: running one sweep, and
//! sleeping until the next. The delay is measured from the *end* of a
//! sweep, so a slow store stretches the cycle instead of overlapping it.
//! Sweep N's result for an instrument is always visible before sweep N+1
//! computes against it.

use crate::services::stock_store::{ApplyTick, SimulationStore};
use crate::services::tick::TickGenerator;
use crate::types::{ServerMessage, StockUpdateData, TickInputs};
use crate::websocket::RoomManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Owned handle to a running simulation loop.
pub struct SimulatorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    /// Signal the loop to stop and wait for it. An in-flight sweep is
    /// allowed to finish; per-instrument store updates are atomic, so a
    /// partial sweep leaves a consistent set of updated instruments.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// The market simulation scheduler.
pub struct Simulator {
    store: Arc<dyn SimulationStore>,
    rooms: Arc<RoomManager>,
    generator: TickGenerator,
    interval: Duration,
    sweeps: AtomicU64,
}

impl Simulator {
    pub fn new(
        store: Arc<dyn SimulationStore>,
        rooms: Arc<RoomManager>,
        generator: TickGenerator,
        interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            rooms,
            generator,
            interval,
            sweeps: AtomicU64::new(0),
        })
    }

    /// Start the simulation loop on a background task.
    pub fn spawn(self: &Arc<Self>) -> SimulatorHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let sim = Arc::clone(self);

        let task = tokio::spawn(async move {
            loop {
                if let Err(e) = sim.sweep() {
                    // Store connectivity loss abandons this sweep; the next
                    // one is still scheduled after the normal delay.
                    error!("Simulation sweep abandoned: {}", e);
                }

                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = tokio::time::sleep(sim.interval) => {}
                }
            }
            debug!("Simulation loop stopped");
        });

        SimulatorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Run one sweep over all instruments. A failure in one instrument is
    /// logged and skipped; only a failed load abandons the sweep.
    pub fn sweep(&self) -> anyhow::Result<()> {
        let stocks = self.store.load_tick_inputs()?;

        for stock in &stocks {
            if let Err(e) = self.tick_one(stock) {
                warn!("Tick failed for {}: {}", stock.symbol, e);
            }
        }

        self.sweeps.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn tick_one(&self, inputs: &TickInputs) -> anyhow::Result<()> {
        let tick = self.generator.tick(&mut rand::thread_rng(), inputs);

        match self
            .store
            .apply_tick(&inputs.symbol, tick.new_price, tick.total_volume, &tick.point)?
        {
            ApplyTick::NotFound => {
                warn!("{} vanished mid-sweep, skipping broadcast", inputs.symbol);
                return Ok(());
            }
            ApplyTick::Applied => {}
        }

        let change = (tick.new_price - inputs.price) / inputs.price * 100.0;
        let msg = ServerMessage::StockUpdate {
            data: StockUpdateData {
                symbol: inputs.symbol.clone(),
                price: tick.new_price,
                change,
                point: tick.point,
            },
        };
        if let Ok(json) = serde_json::to_string(&msg) {
            self.rooms.broadcast(&inputs.symbol, &json);
        }

        Ok(())
    }

    /// Number of completed sweeps since startup.
    pub fn sweeps_completed(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }
}
