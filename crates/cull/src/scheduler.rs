use std::time::Duration;

use crate::config::CullConfig;

/// Ring of the most recent per-tick cull durations.
#[derive(Debug, Clone)]
pub struct CullTimer {
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
}

impl CullTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    pub fn sum(&self) -> Duration {
        self.samples().iter().sum()
    }

    pub fn average(&self) -> Duration {
        match self.count() {
            0 => Duration::ZERO,
            n => self.sum() / n as u32,
        }
    }

    pub fn max(&self) -> Duration {
        self.samples().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn count(&self) -> usize {
        if self.filled { self.capacity } else { self.index }
    }

    fn samples(&self) -> &[Duration] {
        &self.history[..self.count()]
    }
}

/// Cull timing totals and rolling-window figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub total_ticks: u64,
    pub cull_passes: u64,
    pub total_time: Duration,
    pub rolling_sum: Duration,
    pub rolling_average: Duration,
    pub rolling_max: Duration,
    pub timer_increment: u32,
}

/// Decides which ticks run a cull pass and throttles the visibility-timer
/// increment when recent passes run long.
///
/// Every `rolling_window` ticks the rolling max is compared against the load
/// threshold: above it, pairs stay visible for `max_timer_increment` passes
/// before being re-tested; otherwise `min_timer_increment`.
#[derive(Debug, Clone)]
pub struct Scheduler {
    culling_period: u64,
    min_increment: u32,
    max_increment: u32,
    threshold: Duration,
    window: u64,
    timer_increment: u32,
    timer: CullTimer,
    total_ticks: u64,
    cull_passes: u64,
    total_time: Duration,
}

impl Scheduler {
    pub fn new(config: &CullConfig) -> Self {
        Self {
            culling_period: config.culling_period.max(1),
            min_increment: config.min_timer_increment,
            max_increment: config.max_timer_increment,
            threshold: Duration::from_micros(config.timer_load_threshold_us),
            window: config.rolling_window.max(1),
            timer_increment: config.min_timer_increment,
            timer: CullTimer::new(config.rolling_window as usize),
            total_ticks: 0,
            cull_passes: 0,
            total_time: Duration::ZERO,
        }
    }

    pub fn should_cull(&self, tick: u64) -> bool {
        tick % self.culling_period == 0
    }

    pub fn timer_increment(&self) -> u32 {
        self.timer_increment
    }

    /// Record one tick's cull time (zero on skipped ticks) and adapt the
    /// increment at the end of each window.
    pub fn record(&mut self, elapsed: Duration, culled: bool) {
        self.timer.record(elapsed);
        self.total_ticks += 1;
        self.total_time += elapsed;
        if culled {
            self.cull_passes += 1;
        }
        if self.total_ticks % self.window == 0 {
            self.adapt();
        }
    }

    fn adapt(&mut self) {
        let rolling_max = self.timer.max();
        let next = if rolling_max > self.threshold {
            self.max_increment
        } else {
            self.min_increment
        };
        if next != self.timer_increment {
            tracing::info!(
                from = self.timer_increment,
                to = next,
                rolling_max_us = rolling_max.as_micros() as u64,
                "visibility timer increment changed"
            );
            self.timer_increment = next;
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            total_ticks: self.total_ticks,
            cull_passes: self.cull_passes,
            total_time: self.total_time,
            rolling_sum: self.timer.sum(),
            rolling_average: self.timer.average(),
            rolling_max: self.timer.max(),
            timer_increment: self.timer_increment,
        }
    }
}
