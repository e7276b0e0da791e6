use crate::constants::{
    INITIAL_OBSTACLE_CADENCE_MS, MIN_OBSTACLE_CADENCE_MS, OBSTACLE_CADENCE_STEP_MS, POWER_UP_CADENCE_MS,
};
use log::info;

/// Obstacle spawn interval for a given score: 10 ms faster per point, never below 250 ms.
pub fn spawn_cadence_ms(score: u32) -> u64 {
    INITIAL_OBSTACLE_CADENCE_MS
        .saturating_sub(score as u64 * OBSTACLE_CADENCE_STEP_MS)
        .max(MIN_OBSTACLE_CADENCE_MS)
}

/// Periodic countdown driven by the session clock instead of a host timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnTimer {
    period_ms: u64,
    elapsed_ms: u64,
}

impl SpawnTimer {
    pub fn new(period_ms: u64) -> Self {
        SpawnTimer { period_ms: period_ms.max(1), elapsed_ms: 0 }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Advances by `dt_ms` and returns how many periods completed.
    pub fn advance(&mut self, dt_ms: u64) -> u32 {
        self.elapsed_ms += dt_ms;
        let fired = self.elapsed_ms / self.period_ms;
        self.elapsed_ms %= self.period_ms;
        fired as u32
    }

    /// Starts a fresh period; any partially elapsed one is thrown away.
    pub fn restart(&mut self, period_ms: u64) {
        self.period_ms = period_ms.max(1);
        self.elapsed_ms = 0;
    }
}

/// Spawns due on a single tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpawnsDue {
    pub obstacles: u32,
    pub power_ups: u32,
}

/// Owns both spawn timers. Once cancelled it never fires again.
#[derive(Debug)]
pub struct Scheduler {
    obstacle_timer: SpawnTimer,
    power_up_timer: SpawnTimer,
    running: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            obstacle_timer: SpawnTimer::new(spawn_cadence_ms(0)),
            power_up_timer: SpawnTimer::new(POWER_UP_CADENCE_MS),
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn obstacle_cadence_ms(&self) -> u64 {
        self.obstacle_timer.period_ms()
    }

    pub fn advance(&mut self, dt_ms: u64) -> SpawnsDue {
        if !self.running {
            return SpawnsDue::default();
        }
        SpawnsDue {
            obstacles: self.obstacle_timer.advance(dt_ms),
            power_ups: self.power_up_timer.advance(dt_ms),
        }
    }

    /// Recomputes the obstacle cadence from the score and restarts that timer.
    pub fn retune(&mut self, score: u32) {
        if !self.running {
            return;
        }
        let cadence = spawn_cadence_ms(score);
        if cadence != self.obstacle_timer.period_ms() {
            info!("Obstacle cadence now {}ms at score {}", cadence, score);
        }
        self.obstacle_timer.restart(cadence);
    }

    /// Returns false if the timers were already cancelled.
    pub fn cancel_all(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
