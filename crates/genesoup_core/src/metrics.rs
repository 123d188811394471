//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and metrics tracking for monitoring
//! simulation performance and population health.

use genesoup_data::LiveEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Metrics collector for simulation statistics.
pub struct Metrics {
    tick_count: AtomicU64,
    population: AtomicU64,
    food_count: AtomicU64,
    births: AtomicU64,
    deaths: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            population: AtomicU64::new(0),
            food_count: AtomicU64::new(0),
            births: AtomicU64::new(0),
            deaths: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, population: usize, food: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.population.store(population as u64, Ordering::Relaxed);
        self.food_count.store(food as u64, Ordering::Relaxed);

        // Log at info level every 1000 ticks
        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % 1000 == 0 {
            tracing::info!(
                tick = tick,
                population = population,
                food = food,
                births = self.births(),
                deaths = self.deaths(),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    /// Folds one tick's events into the birth/death totals and the named
    /// counters.
    pub fn record_events(&self, events: &[LiveEvent]) {
        for event in events {
            match event {
                LiveEvent::Birth { .. } => {
                    self.births.fetch_add(1, Ordering::Relaxed);
                }
                LiveEvent::Death { .. } => {
                    self.deaths.fetch_add(1, Ordering::Relaxed);
                }
                LiveEvent::Mutation { operator, .. } => self.increment_counter(operator),
                LiveEvent::Attack { .. } => self.increment_counter("attack"),
                LiveEvent::FoodEaten { .. } => self.increment_counter("food_eaten"),
                LiveEvent::Extinction { .. } => self.increment_counter("extinction"),
            }
        }
    }

    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.population.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn food_count(&self) -> u64 {
        self.food_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn births(&self) -> u64 {
        self.births.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.population(), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_millis(2), 20, 75);
        assert_eq!(metrics.tick_count(), 1);
        assert_eq!(metrics.population(), 20);
        assert_eq!(metrics.food_count(), 75);
    }

    #[test]
    fn test_record_events() {
        let metrics = Metrics::new();
        let id = Uuid::from_u128(1);
        metrics.record_events(&[
            LiveEvent::Birth {
                id,
                parent_id: None,
                gen: 1,
                tick: 1,
            },
            LiveEvent::Death { id, age: 3, tick: 4 },
            LiveEvent::Mutation {
                id,
                operator: "random trait modification".into(),
                tick: 4,
            },
        ]);
        assert_eq!(metrics.births(), 1);
        assert_eq!(metrics.deaths(), 1);
        assert_eq!(metrics.counter("random trait modification"), 1);
        assert_eq!(metrics.counter("attack"), 0);
    }
}
