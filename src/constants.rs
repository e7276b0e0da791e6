// --- Playfield ---
pub const PLAYFIELD_WIDTH: f64 = 800.0;
pub const PLAYFIELD_HEIGHT: f64 = 600.0;
pub const TICK_MS: u64 = 20; // Fixed simulation step

// --- Craft ---
pub const CRAFT_WIDTH: f64 = 50.0;
pub const CRAFT_HEIGHT: f64 = 50.0;
pub const CRAFT_SPEED: f64 = 5.0;
pub const CRAFT_START_X: f64 = PLAYFIELD_WIDTH / 2.0;
pub const CRAFT_START_Y: f64 = PLAYFIELD_HEIGHT - 50.0;

// --- Fuel ---
pub const MAX_FUEL: f64 = 100.0;
pub const FUEL_DRAIN_PER_TICK: f64 = 0.1; // Only while moving
pub const FUEL_PICKUP_AMOUNT: f64 = 20.0;

// --- Obstacles ---
pub const OBSTACLE_WIDTH: f64 = 50.0;
pub const OBSTACLE_HEIGHT: f64 = 50.0;
pub const OBSTACLE_SPAWN_Y: f64 = -50.0;
pub const OBSTACLE_MIN_SPEED: f64 = 3.0;
pub const OBSTACLE_MAX_SPEED: f64 = 5.0; // Exclusive

// --- Power-ups ---
pub const POWER_UP_WIDTH: f64 = 30.0;
pub const POWER_UP_HEIGHT: f64 = 30.0;
pub const POWER_UP_SPAWN_Y: f64 = -30.0;
pub const POWER_UP_SPEED: f64 = 2.0;

// --- Spawn cadence (ms) ---
pub const INITIAL_OBSTACLE_CADENCE_MS: u64 = 1000;
pub const OBSTACLE_CADENCE_STEP_MS: u64 = 10; // Per point of score
pub const MIN_OBSTACLE_CADENCE_MS: u64 = 250;
pub const POWER_UP_CADENCE_MS: u64 = 5000;

// --- Game over ---
pub const EXPLOSION_DELAY_MS: u64 = 200;
pub const EXPLOSION_SIZE: f64 = 64.0;

// --- HUD ---
pub const SCORE_TEXT_X: f64 = 10.0;
pub const SCORE_TEXT_Y: f64 = 30.0;
pub const FUEL_BAR_X: f64 = 10.0;
pub const FUEL_BAR_Y: f64 = 50.0;
pub const FUEL_BAR_WIDTH: f64 = 200.0;
pub const FUEL_BAR_HEIGHT: f64 = 20.0;

// --- Terminal ---
pub const KEY_HOLD_TIMEOUT_MS: u64 = 700; // Synthesized release when the terminal can't report one; above typical auto-repeat delays
pub const DEBUG_TERMINAL_WIDTH: u16 = 80;
pub const DEBUG_TERMINAL_HEIGHT: u16 = 24;
