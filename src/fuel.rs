use crate::constants::{FUEL_DRAIN_PER_TICK, FUEL_PICKUP_AMOUNT, MAX_FUEL};
use crate::types::Rgb;

/// Fuel tank. The level is kept in `0.0..=MAX_FUEL` by every operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fuel {
    level: f64,
}

impl Fuel {
    pub fn full() -> Self {
        Fuel::with_level(MAX_FUEL)
    }

    pub fn with_level(level: f64) -> Self {
        Fuel { level: level.clamp(0.0, MAX_FUEL) }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Burns one tick's worth of fuel. Returns true when the tank runs dry.
    pub fn burn(&mut self) -> bool {
        self.level -= FUEL_DRAIN_PER_TICK;
        if self.level <= 0.0 {
            self.level = 0.0;
            return true;
        }
        false
    }

    /// Applies a pickup, capped at a full tank.
    pub fn refill(&mut self) {
        self.level = (self.level + FUEL_PICKUP_AMOUNT).min(MAX_FUEL);
    }

    pub fn color(&self) -> Rgb {
        fuel_color(self.level)
    }
}

/// Green at a full tank, yellow at half, red when empty.
pub fn fuel_color(fuel: f64) -> Rgb {
    let half = MAX_FUEL / 2.0;
    if fuel > half {
        let red = (255.0 * (1.0 - (fuel - half) / half)).floor();
        Rgb::new(red.clamp(0.0, 255.0) as u8, 255, 0)
    } else {
        let green = (255.0 * (fuel / half)).floor();
        Rgb::new(255, green.clamp(0.0, 255.0) as u8, 0)
    }
}
