//! Tick generation: one simulated price/volume update for one instrument.
//!
//! Volume and buy/sell pressure are drawn independently, so price drift is
//! driven by *imbalance* rather than raw volume. A symmetric high-volume
//! tick is price-neutral; only net demand moves the price.

use crate::types::{PricePoint, TickInputs};
use rand::Rng;

/// Hard floor on generated prices. Prices never reach zero or go negative.
pub const PRICE_FLOOR: f64 = 0.01;

/// Default amplification of demand imbalance into a price move.
pub const DEFAULT_SCALING_FACTOR: f64 = 5.0;

/// Per-cycle trading activity caps at this fraction of the baseline average.
const VOLUME_FRACTION: f64 = 0.1;

/// Result of one simulated tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub new_price: f64,
    pub total_volume: u64,
    pub point: PricePoint,
}

/// Pure tick computation. Deterministic given its random draws.
#[derive(Debug, Clone)]
pub struct TickGenerator {
    scaling_factor: f64,
}

impl TickGenerator {
    pub fn new(scaling_factor: f64) -> Self {
        Self { scaling_factor }
    }

    /// Generate one tick, drawing volume and pressure from `rng` and
    /// timestamping the history point with the current wall clock.
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R, inputs: &TickInputs) -> Tick {
        let u1: f64 = rng.gen();
        let u2: f64 = rng.gen();
        self.tick_with_draws(inputs, u1, u2, chrono::Utc::now().timestamp_millis())
    }

    /// Deterministic core: `u1` scales trading volume, `u2` is the buy
    /// pressure, both uniform in [0, 1).
    pub fn tick_with_draws(&self, inputs: &TickInputs, u1: f64, u2: f64, timestamp: i64) -> Tick {
        let trading_volume = inputs.avg_volume as f64 * u1 * VOLUME_FRACTION;

        let buy_volume = (trading_volume * u2).floor();
        let sell_volume = (trading_volume * (1.0 - u2)).floor();
        let total_volume = (buy_volume + sell_volume) as u64;

        let net_demand_ratio = if inputs.avg_volume > 0 {
            (buy_volume - sell_volume) / inputs.avg_volume as f64
        } else {
            0.0
        };

        let change_percent = net_demand_ratio * inputs.volatility * self.scaling_factor;
        let new_price = round2(inputs.price * (1.0 + change_percent)).max(PRICE_FLOOR);

        Tick {
            new_price,
            total_volume,
            point: PricePoint {
                price: new_price,
                volume: total_volume,
                timestamp,
            },
        }
    }
}

impl Default for TickGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SCALING_FACTOR)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inputs(price: f64, avg_volume: u64, volatility: f64) -> TickInputs {
        TickInputs {
            symbol: "TEST".to_string(),
            price,
            avg_volume,
            volatility,
        }
    }

    #[test]
    fn test_reference_scenario() {
        // price 150.00, avg volume 1000, volatility 0.02, u1=0.5, u2=0.8:
        // trading volume 50, buy 40, sell 10, ratio 0.03, change 0.3% -> 150.45
        let gen = TickGenerator::default();
        let tick = gen.tick_with_draws(&inputs(150.0, 1000, 0.02), 0.5, 0.8, 42);

        assert_eq!(tick.new_price, 150.45);
        assert_eq!(tick.total_volume, 50);
        assert_eq!(tick.point.price, 150.45);
        assert_eq!(tick.point.volume, 50);
        assert_eq!(tick.point.timestamp, 42);
    }

    #[test]
    fn test_price_floor_holds() {
        let gen = TickGenerator::new(1000.0);
        // Extreme sell pressure against an already tiny price.
        let tick = gen.tick_with_draws(&inputs(0.02, 1_000_000, 0.5), 0.999, 0.0, 0);
        assert!(tick.new_price >= PRICE_FLOOR);
    }

    #[test]
    fn test_price_floor_over_random_draws() {
        let gen = TickGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut price = 0.05;
        for _ in 0..10_000 {
            let tick = gen.tick(&mut rng, &inputs(price, 5_000_000, 0.9));
            assert!(tick.new_price >= PRICE_FLOOR);
            price = tick.new_price;
        }
    }

    #[test]
    fn test_zero_avg_volume_pins_price() {
        let gen = TickGenerator::default();
        for (u1, u2) in [(0.0, 0.0), (0.99, 0.99), (0.5, 0.0), (0.01, 0.97)] {
            let tick = gen.tick_with_draws(&inputs(150.0, 0, 0.02), u1, u2, 0);
            assert_eq!(tick.new_price, 150.0);
            assert_eq!(tick.total_volume, 0);
        }
    }

    #[test]
    fn test_zero_volatility_pins_price() {
        let gen = TickGenerator::default();
        let tick = gen.tick_with_draws(&inputs(150.0, 1000, 0.0), 0.9, 0.99, 0);
        assert_eq!(tick.new_price, 150.0);
        // Volume still trades even though the price is pinned.
        assert!(tick.total_volume > 0);
    }

    #[test]
    fn test_balanced_pressure_is_price_neutral() {
        // u2 = 0.5 splits volume evenly; floored halves cancel out.
        let gen = TickGenerator::default();
        let tick = gen.tick_with_draws(&inputs(200.0, 10_000, 0.05), 0.8, 0.5, 0);
        assert_eq!(tick.new_price, 200.0);
    }

    #[test]
    fn test_prices_round_to_cents() {
        let gen = TickGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let tick = gen.tick(&mut rng, &inputs(123.45, 900_000, 0.3));
            let cents = tick.new_price * 100.0;
            assert!((cents - cents.round()).abs() < 1e-9);
        }
    }
}
