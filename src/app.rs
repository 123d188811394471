//! Headless runner: loads configuration, drives the simulation at a fixed
//! physics step and optionally streams render snapshots as JSON lines.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::time::{Duration, Instant};

use crate::model::config::AppConfig;
use crate::model::metrics::Metrics;
use crate::model::physics::HeadlessPhysics;
use crate::model::simulation::Simulation;
use crate::model::LiveEvent;

/// Physics step per tick, in milliseconds.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: String,
    /// Overrides `[world] seed`.
    pub seed: Option<u64>,
    /// Stop after this many ticks. Unbounded when absent.
    pub ticks: Option<u64>,
    /// Emit a snapshot every N ticks.
    pub snapshot_every: Option<u64>,
}

/// End-of-run totals, logged and printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub population: usize,
    pub food: usize,
    pub births: u64,
    pub deaths: u64,
    pub elapsed_ms: u64,
}

pub struct App {
    pub running: bool,
    pub sim: Simulation<HeadlessPhysics>,
    pub metrics: Metrics,
    options: RunOptions,
    tick_interval: Option<Duration>,
}

impl App {
    pub fn new(options: RunOptions) -> Result<Self> {
        let config = AppConfig::load(&options.config_path)
            .with_context(|| format!("Failed to load config from {}", options.config_path))?;
        Self::with_config(config, options)
    }

    pub fn with_config(mut config: AppConfig, options: RunOptions) -> Result<Self> {
        if let Some(seed) = options.seed {
            config.world.seed = Some(seed);
        }
        let tick_interval = (config.target_tps > 0).then(|| Duration::from_secs_f64(1.0 / config.target_tps as f64));
        let physics = HeadlessPhysics::new(config.world.width, config.world.height);
        let sim = Simulation::new(config, physics).context("Failed to build simulation")?;
        Ok(Self {
            running: true,
            sim,
            metrics: Metrics::new(),
            options,
            tick_interval,
        })
    }

    /// Advances one tick and records it.
    pub fn step(&mut self) -> Result<Vec<LiveEvent>> {
        let started = Instant::now();
        let events = self.sim.advance(FRAME_MS)?;
        self.metrics.record_events(&events);
        self.metrics
            .record_tick(started.elapsed(), self.sim.population(), self.sim.food_count());
        if self.options.ticks.is_some_and(|max| self.sim.tick >= max) {
            self.running = false;
        }
        Ok(events)
    }

    /// Runs until the tick limit, writing snapshots to `out`.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        while self.running {
            let started = Instant::now();
            self.step()?;
            if let Some(every) = self.options.snapshot_every.filter(|n| *n > 0) {
                if self.sim.tick % every == 0 {
                    serde_json::to_writer(&mut *out, &self.sim.snapshot())?;
                    writeln!(out)?;
                }
            }
            if let Some(interval) = self.tick_interval {
                if let Some(rest) = interval.checked_sub(started.elapsed()) {
                    std::thread::sleep(rest);
                }
            }
        }
        out.flush()?;
        let summary = self.summary();
        tracing::info!(
            ticks = summary.ticks,
            population = summary.population,
            births = summary.births,
            deaths = summary.deaths,
            "Run finished"
        );
        Ok(summary)
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.sim.tick,
            population: self.sim.population(),
            food: self.sim.food_count(),
            births: self.metrics.births(),
            deaths: self.metrics.deaths(),
            elapsed_ms: self.metrics.elapsed().as_millis() as u64,
        }
    }
}
