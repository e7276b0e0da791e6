//! One game from start to game over: owns every piece of mutable state and
//! advances it one fixed tick at a time.

use log::info;
use rand::Rng;
use rand::rngs::StdRng;

use crate::constants::*;
use crate::difficulty::Scheduler;
use crate::entities::{Craft, EntityPool, Explosion, Obstacle, PowerUp};
use crate::rendering::Surface;
use crate::terminal_io::{DirectionEvent, Intent};
use crate::types::{Rect, Rgb};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Active,
    Over,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverCause {
    FuelExhausted,
    Collision,
}

/// Final result, handed out exactly once per game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOverReport {
    pub final_score: u32,
    pub cause: GameOverCause,
    pub elapsed_ms: u64,
}

/// A collision was seen; the game ends once the clock reaches `deadline_ms`.
struct PendingGameOver {
    deadline_ms: u64,
    explosion: Explosion,
}

pub struct GameSession<R: Rng = StdRng> {
    rng: R,
    craft: Craft,
    intent: Intent,
    obstacles: EntityPool<Obstacle>,
    power_ups: EntityPool<PowerUp>,
    score: u32,
    state: GameState,
    scheduler: Scheduler,
    pending: Option<PendingGameOver>,
    clock_ms: u64,
}

impl<R: Rng> GameSession<R> {
    pub fn new(rng: R) -> Self {
        GameSession {
            rng,
            craft: Craft::new(CRAFT_START_X, CRAFT_START_Y),
            intent: Intent::default(),
            obstacles: EntityPool::new(),
            power_ups: EntityPool::new(),
            score: 0,
            state: GameState::Active,
            scheduler: Scheduler::new(),
            pending: None,
            clock_ms: 0,
        }
    }

    /// Fresh craft, empty pools, zero score, new timers. The RNG carries on.
    pub fn reset(&mut self) {
        info!("Resetting game session (previous score {})", self.score);
        self.craft = Craft::new(CRAFT_START_X, CRAFT_START_Y);
        self.intent = Intent::default();
        self.obstacles = EntityPool::new();
        self.power_ups = EntityPool::new();
        self.score = 0;
        self.state = GameState::Active;
        self.scheduler = Scheduler::new();
        self.pending = None;
        self.clock_ms = 0;
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn craft(&self) -> &Craft {
        &self.craft
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn obstacle_cadence_ms(&self) -> u64 {
        self.scheduler.obstacle_cadence_ms()
    }

    pub fn is_ending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle_direction(&mut self, event: DirectionEvent) {
        if self.state == GameState::Over {
            return;
        }
        self.intent.apply(event);
        self.craft.set_intent(self.intent.dx, self.intent.dy);
    }

    /// Runs one 20 ms step and draws the frame. Returns the report on the tick the game ends.
    pub fn tick(&mut self, surface: &mut impl Surface) -> Option<GameOverReport> {
        if self.state == GameState::Over {
            return None;
        }
        debug_assert!(self.scheduler.is_running());
        self.clock_ms += TICK_MS;

        if self.pending.as_ref().is_some_and(|p| self.clock_ms >= p.deadline_ms) {
            return self.end_game(GameOverCause::Collision);
        }

        let due = self.scheduler.advance(TICK_MS);
        for _ in 0..due.obstacles {
            self.obstacles.spawn(&mut self.rng);
        }
        for _ in 0..due.power_ups {
            self.power_ups.spawn(&mut self.rng);
        }

        surface.clear(Rect::new(0.0, 0.0, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT));
        self.craft.draw(surface);

        if self.craft.update() {
            return self.end_game(GameOverCause::FuelExhausted);
        }

        self.update_obstacles(surface);
        self.update_power_ups(surface);

        self.draw_score(surface);
        self.draw_fuel_bar(surface);
        None
    }

    fn update_obstacles(&mut self, surface: &mut impl Surface) {
        let craft_bounds = self.craft.bounds();
        let sweep = self.obstacles.sweep(&craft_bounds);

        for _ in 0..sweep.exited {
            self.score += 1;
            self.scheduler.retune(self.score);
        }

        // Later hits inside the explosion window are absorbed without re-arming
        if sweep.contacts > 0 && self.pending.is_none() {
            info!("Collision at {}ms, game over in {}ms", self.clock_ms, EXPLOSION_DELAY_MS);
            self.pending = Some(PendingGameOver {
                deadline_ms: self.clock_ms + EXPLOSION_DELAY_MS,
                explosion: Explosion::at(&self.craft),
            });
        }

        self.obstacles.draw(surface);
        if let Some(pending) = &self.pending {
            pending.explosion.draw(surface);
        }
    }

    fn update_power_ups(&mut self, surface: &mut impl Surface) {
        let craft_bounds = self.craft.bounds();
        let sweep = self.power_ups.sweep(&craft_bounds);
        for _ in 0..sweep.contacts {
            self.craft.fuel.refill();
            info!("Power-up collected, fuel at {:.1}", self.craft.fuel.level());
        }
        self.power_ups.draw(surface);
    }

    fn draw_score(&self, surface: &mut impl Surface) {
        surface.draw_text(&format!("Score: {}", self.score), SCORE_TEXT_X, SCORE_TEXT_Y, Rgb::WHITE);
    }

    fn draw_fuel_bar(&self, surface: &mut impl Surface) {
        let frame = Rect::new(FUEL_BAR_X, FUEL_BAR_Y, FUEL_BAR_WIDTH, FUEL_BAR_HEIGHT);
        let filled = FUEL_BAR_WIDTH * self.craft.fuel.level() / MAX_FUEL;
        surface.fill_rect(frame, Rgb::BLACK);
        surface.fill_rect(Rect::new(FUEL_BAR_X, FUEL_BAR_Y, filled, FUEL_BAR_HEIGHT), self.craft.fuel.color());
        surface.stroke_rect(frame, Rgb::WHITE);
    }

    /// Moves to `Over`, cancelling the spawn timers first. Only the first call has any effect.
    pub fn end_game(&mut self, cause: GameOverCause) -> Option<GameOverReport> {
        if self.state == GameState::Over || !self.scheduler.cancel_all() {
            return None;
        }
        self.state = GameState::Over;
        self.pending = None;

        let report = GameOverReport { final_score: self.score, cause, elapsed_ms: self.clock_ms };
        info!("Game over ({:?}) with score {} after {}ms", cause, self.score, self.clock_ms);
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel::Fuel;
    use crate::rendering::{DrawCommand, RecordingSurface, Sprite};
    use crate::terminal_io::Direction;
    use crate::types::Vector2D;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn session() -> GameSession {
        GameSession::new(StdRng::seed_from_u64(42))
    }

    fn run(session: &mut GameSession, ticks: usize) -> Vec<GameOverReport> {
        let mut surface = RecordingSurface::default();
        (0..ticks).filter_map(|_| session.tick(&mut surface)).collect()
    }

    fn obstacle_on_craft(session: &GameSession) -> Obstacle {
        let craft = session.craft.position;
        Obstacle { position: Vector2D::new(craft.x, craft.y - 10.0), speed: 0.0 }
    }

    #[test]
    fn test_new_session_defaults() {
        let s = session();
        assert_eq!(s.state(), GameState::Active);
        assert_eq!(s.score(), 0);
        assert_eq!(s.craft().position, Vector2D::new(400.0, 550.0));
        assert_eq!(s.craft().fuel.level(), 100.0);
        assert_eq!(s.obstacle_cadence_ms(), 1000);
    }

    #[test]
    fn test_invariants_hold_over_long_random_play() {
        let mut s = session();
        let mut surface = RecordingSurface::default();
        let mut picker = StdRng::seed_from_u64(9);
        let directions = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];
        let mut last_score = 0;

        for t in 0..20_000 {
            if t % 15 == 0 {
                let d = directions[picker.gen_range(0..4)];
                let event = if picker.gen_bool(0.7) { DirectionEvent::Pressed(d) } else { DirectionEvent::Released(d) };
                s.handle_direction(event);
            }
            if s.tick(&mut surface).is_some() {
                s.reset();
                last_score = 0;
            }
            surface.commands.clear();

            let fuel = s.craft().fuel.level();
            assert!((0.0..=100.0).contains(&fuel));
            let b = s.craft().bounds();
            assert!(b.x >= 0.0 && b.right() <= PLAYFIELD_WIDTH);
            assert!(b.y >= 0.0 && b.bottom() <= PLAYFIELD_HEIGHT);
            assert!(s.score() >= last_score);
            last_score = s.score();
        }
    }

    #[test]
    fn test_score_counts_each_exit_once() {
        let mut s = session();
        s.obstacles.push(Obstacle { position: Vector2D::new(0.0, 597.0), speed: 4.0 });
        s.obstacles.push(Obstacle { position: Vector2D::new(100.0, 598.0), speed: 4.0 });
        s.obstacles.push(Obstacle { position: Vector2D::new(200.0, 100.0), speed: 4.0 });

        run(&mut s, 1);
        assert_eq!(s.score(), 2);
        assert_eq!(s.obstacles.len(), 1);
        assert_eq!(s.obstacle_cadence_ms(), 980);

        run(&mut s, 1);
        assert_eq!(s.score(), 2);
    }

    #[test]
    fn test_score_retunes_and_restarts_spawner() {
        let mut s = session();
        run(&mut s, 48);
        assert_eq!(s.obstacles.len(), 0);

        s.obstacles.push(Obstacle { position: Vector2D::new(0.0, 599.0), speed: 4.0 });
        run(&mut s, 1);
        assert_eq!(s.score(), 1);
        assert_eq!(s.obstacle_cadence_ms(), 990);
        assert_eq!(s.obstacles.len(), 0);

        // The old timer would have fired at 1000ms; the restarted one waits a full 990ms
        run(&mut s, 49);
        assert_eq!(s.obstacles.len(), 0);
        run(&mut s, 1);
        assert_eq!(s.obstacles.len(), 1);
    }

    #[test]
    fn test_power_up_spawns_every_five_seconds() {
        let mut s = session();
        for _ in 0..249 {
            run(&mut s, 1);
            // Keep falling obstacles from ending the game
            s.obstacles = EntityPool::new();
        }
        assert_eq!(s.power_ups.len(), 0);
        run(&mut s, 1);
        assert_eq!(s.power_ups.len(), 1);
    }

    #[test]
    fn test_fuel_exhaustion_ends_game_same_tick() {
        let mut s = session();
        s.craft.fuel = Fuel::with_level(0.05);
        s.handle_direction(DirectionEvent::Pressed(Direction::Left));

        let reports = run(&mut s, 1);
        assert_eq!(s.craft().fuel.level(), 0.0);
        assert_eq!(s.state(), GameState::Over);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].cause, GameOverCause::FuelExhausted);
        assert!(!s.scheduler.is_running());
    }

    #[test]
    fn test_idle_craft_never_runs_dry() {
        let mut s = session();
        s.craft.fuel = Fuel::with_level(0.05);
        run(&mut s, 100);
        assert_eq!(s.state(), GameState::Active);
        assert_relative_eq!(s.craft().fuel.level(), 0.05);
    }

    #[test]
    fn test_power_up_pickup_caps_fuel() {
        let mut s = session();
        s.craft.fuel = Fuel::with_level(95.0);
        let craft = s.craft.position;
        s.power_ups.push(PowerUp { position: Vector2D::new(craft.x + 5.0, craft.y), speed: POWER_UP_SPEED });

        run(&mut s, 1);
        assert_eq!(s.craft().fuel.level(), 100.0);
        assert_eq!(s.power_ups.len(), 0);
    }

    #[test]
    fn test_collision_ends_game_after_delay() {
        let mut s = session();
        let obstacle = obstacle_on_craft(&s);
        s.obstacles.push(obstacle);

        let mut surface = RecordingSurface::default();
        assert_eq!(s.tick(&mut surface), None);
        let collided_at = s.elapsed_ms();
        assert!(s.is_ending());
        assert_eq!(s.state(), GameState::Active);
        assert_eq!(surface.sprites(Sprite::Explosion), 1);
        assert_eq!(s.obstacles.len(), 0);

        // A second obstacle hitting inside the window changes nothing
        let obstacle = obstacle_on_craft(&s);
        s.obstacles.push(obstacle);

        let mut reports = Vec::new();
        while s.elapsed_ms() < collided_at + EXPLOSION_DELAY_MS {
            let mut surface = RecordingSurface::default();
            if let Some(report) = s.tick(&mut surface) {
                reports.push((s.elapsed_ms(), report));
            } else {
                assert_eq!(surface.sprites(Sprite::Explosion), 1);
            }
        }

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, collided_at + EXPLOSION_DELAY_MS);
        assert_eq!(reports[0].1.cause, GameOverCause::Collision);
        assert_eq!(s.state(), GameState::Over);
        assert!(run(&mut s, 50).is_empty());
    }

    #[test]
    fn test_obstacle_that_hit_never_scores() {
        let mut s = session();
        // Falls through the craft and off the bottom well inside the explosion window
        s.obstacles.push(Obstacle { position: Vector2D::new(400.0, 560.0), speed: 5.0 });
        let reports = run(&mut s, 20);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].cause, GameOverCause::Collision);
        assert_eq!(reports[0].final_score, 0);
        assert_eq!(reports[0].elapsed_ms, TICK_MS + EXPLOSION_DELAY_MS);
    }

    #[test]
    fn test_second_hit_inside_window_does_not_score() {
        let mut s = session();
        let obstacle = obstacle_on_craft(&s);
        s.obstacles.push(obstacle);
        run(&mut s, 1);
        assert!(s.is_ending());

        s.obstacles.push(Obstacle { position: Vector2D::new(420.0, 580.0), speed: 5.0 });
        let reports = run(&mut s, 10);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].final_score, 0);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_double_trigger_reports_once() {
        let mut s = session();
        let obstacle = obstacle_on_craft(&s);
        s.obstacles.push(obstacle);
        run(&mut s, 1);
        assert!(s.is_ending());

        // Fuel runs dry inside the explosion window
        s.craft.fuel = Fuel::with_level(0.05);
        s.handle_direction(DirectionEvent::Pressed(Direction::Right));
        let reports = run(&mut s, 20);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].cause, GameOverCause::FuelExhausted);

        // Later triggers are no-ops
        assert_eq!(s.end_game(GameOverCause::Collision), None);
        assert_eq!(s.state(), GameState::Over);
    }

    #[test]
    fn test_end_game_is_idempotent() {
        let mut s = session();
        assert!(s.end_game(GameOverCause::FuelExhausted).is_some());
        assert_eq!(s.end_game(GameOverCause::FuelExhausted), None);
        assert_eq!(s.end_game(GameOverCause::Collision), None);
        assert!(!s.scheduler.is_running());
    }

    #[test]
    fn test_over_session_ignores_ticks_and_input() {
        let mut s = session();
        s.end_game(GameOverCause::Collision);
        let before = s.craft().position;
        s.handle_direction(DirectionEvent::Pressed(Direction::Up));
        let mut surface = RecordingSurface::default();
        assert_eq!(s.tick(&mut surface), None);
        assert!(surface.commands.is_empty());
        assert_eq!(s.craft().position, before);
        assert_eq!(s.elapsed_ms(), 0);
    }

    #[test]
    fn test_reset_restores_fresh_game() {
        let mut s = session();
        s.handle_direction(DirectionEvent::Pressed(Direction::Left));
        run(&mut s, 300);
        s.score = 12;
        s.end_game(GameOverCause::Collision);

        s.reset();
        assert_eq!(s.state(), GameState::Active);
        assert_eq!(s.score(), 0);
        assert_eq!(s.craft().position, Vector2D::new(400.0, 550.0));
        assert!(s.craft().velocity.is_zero());
        assert_eq!(s.craft().fuel.level(), 100.0);
        assert_eq!((s.obstacles.len(), s.power_ups.len()), (0, 0));
        assert!(!s.is_ending());
        assert_eq!(s.obstacle_cadence_ms(), 1000);
        assert!(s.scheduler.is_running());
    }

    #[test]
    fn test_frame_draw_order() {
        let mut s = session();
        s.obstacles.push(Obstacle { position: Vector2D::new(0.0, 100.0), speed: 3.0 });
        let mut surface = RecordingSurface::default();
        s.tick(&mut surface);

        let kinds: Vec<&str> = surface
            .commands
            .iter()
            .map(|c| match c {
                DrawCommand::Clear(_) => "clear",
                DrawCommand::Sprite(Sprite::Craft, _) => "craft",
                DrawCommand::Sprite(Sprite::Obstacle, _) => "obstacle",
                DrawCommand::Sprite(_, _) => "other",
                DrawCommand::Text(_, _, _, _) => "score",
                DrawCommand::Fill(_, _) => "fill",
                DrawCommand::Stroke(_, _) => "stroke",
            })
            .collect();
        assert_eq!(kinds, ["clear", "craft", "obstacle", "score", "fill", "fill", "stroke"]);
    }

    #[test]
    fn test_fuel_bar_color_tracks_fuel() {
        let mut s = session();
        s.craft.fuel = Fuel::with_level(50.0);
        let mut surface = RecordingSurface::default();
        s.tick(&mut surface);

        let fills: Vec<(Rect, Rgb)> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill(r, color) => Some((*r, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(fills[0], (Rect::new(10.0, 50.0, 200.0, 20.0), Rgb::BLACK));
        assert_eq!(fills[1], (Rect::new(10.0, 50.0, 100.0, 20.0), Rgb::new(255, 255, 0)));
        assert!(surface.commands.contains(&DrawCommand::Text("Score: 0".to_string(), 10.0, 30.0, Rgb::WHITE)));
    }
}
