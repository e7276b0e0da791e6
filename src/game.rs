use std::io::{self, Write};
use std::time::{Duration, Instant};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use log::{error, info};

use crate::constants::TICK_MS;
use crate::rendering::{GameGrid, OutputTarget, TerminalSurface};
use crate::session::{GameOverReport, GameSession};
use crate::terminal_io::{HeldKeys, SimulatedInput, direction_event};

pub struct Game {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    debug_mode_active: bool,
    max_frames: Option<u64>,
    release_events: bool,
    session: GameSession,
    surface: TerminalSurface,
    held_keys: HeldKeys,
}

impl Game {
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        debug_mode_active: bool,
        max_frames: Option<u64>,
        release_events: bool,
    ) -> Self {
        // Debug runs replay the same field every time
        let rng = if debug_mode_active { StdRng::seed_from_u64(0) } else { StdRng::from_entropy() };
        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            simulated_input,
            debug_mode_active,
            max_frames,
            release_events,
            session: GameSession::new(rng),
            surface: TerminalSurface::new(terminal_width, terminal_height),
            held_keys: HeldKeys::new(),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        if !self.debug_mode_active {
            self.show_title_screen()?;
        }

        let tick = Duration::from_millis(TICK_MS);
        let started = Instant::now();
        let mut running = true;
        let mut frame_count: u64 = 0;
        let mut games_played: u32 = 0;

        while running && self.max_frames.is_none_or(|max| frame_count < max) {
            let frame_start = Instant::now();

            self.handle_input(&mut running, frame_count, frame_start, started)?;
            if !running {
                break;
            }

            if let Some(report) = self.session.tick(&mut self.surface) {
                games_played += 1;
                running = self.finish_game(report)?;
                self.session.reset();
                self.held_keys = HeldKeys::new();
                frame_count += 1;
                continue;
            }

            self.render()?;
            frame_count += 1;

            if !self.debug_mode_active {
                let spent = frame_start.elapsed();
                if spent < tick {
                    std::thread::sleep(tick - spent);
                }
            }
        }

        info!("Stopped after {} frames, {} games finished", frame_count, games_played);
        Ok(())
    }

    /// Drains pending input without blocking past the frame budget.
    fn handle_input(&mut self, running: &mut bool, frame_count: u64, frame_start: Instant, started: Instant) -> io::Result<()> {
        let now_ms = started.elapsed().as_millis() as u64;
        let mut events: Vec<Event> = Vec::new();

        if self.debug_mode_active {
            if let Some(sim_input) = &mut self.simulated_input {
                if sim_input.poll(frame_count)? {
                    events.push(sim_input.read()?);
                }
            }
        } else {
            let budget = Duration::from_millis(TICK_MS / 2);
            while frame_start.elapsed() < budget {
                let wait = budget.saturating_sub(frame_start.elapsed());
                if !event::poll(wait).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                    break;
                }
                events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
            }
        }

        for event in events {
            match event {
                Event::Key(key_event) if is_quit(&key_event) => *running = false,
                Event::Key(key_event) => {
                    if let Some(direction) = direction_event(&key_event) {
                        self.held_keys.observe(direction, now_ms);
                        self.session.handle_direction(direction);
                    }
                }
                Event::Resize(new_width, new_height) => {
                    info!("Terminal resized to {}x{}", new_width, new_height);
                    self.terminal_width = new_width;
                    self.terminal_height = new_height;
                    self.surface.resize(new_width, new_height);
                }
                _ => {}
            }
        }

        if !self.release_events && !self.debug_mode_active {
            for release in self.held_keys.expire(now_ms) {
                self.session.handle_direction(release);
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        self.surface.grid.render(&mut self.stdout_target)?;
        if let OutputTarget::ScreenBuffer(ref sb) = self.stdout_target {
            info!(
                "t={}ms state={:?} ending={} score={} fuel={:.1}",
                self.session.elapsed_ms(),
                self.session.state(),
                self.session.is_ending(),
                self.session.score(),
                self.session.craft().fuel.level()
            );
            sb.print_to_log();
        }
        self.stdout_target.flush()?;
        Ok(())
    }

    /// Reports the final score. Returns false if the player chose to quit.
    fn finish_game(&mut self, report: GameOverReport) -> io::Result<bool> {
        info!(
            "Final score {} ({:?}, {:.1}s, obstacles every {}ms)",
            report.final_score,
            report.cause,
            report.elapsed_ms as f64 / 1000.0,
            self.session.obstacle_cadence_ms()
        );
        if self.debug_mode_active {
            return Ok(true);
        }
        self.show_game_over_screen(report.final_score)
    }

    fn show_title_screen(&mut self) -> io::Result<()> {
        let title_art = [
            r"VIBE-DODGER",
            r" ____   ___  ____   ____ _____ ____  ",
            r"|  _ \ / _ \|  _ \ / ___| ____|  _ \ ",
            r"| | | | | | | | | | |  _|  _| | |_) |",
            r"| |_| | |_| | |_| | |_| | |___|  _ < ",
            r"|____/ \___/|____/ \____|_____|_| \_\",
        ];
        let controls_text = [
            "Arrow keys : Steer (moving burns fuel)",
            "Collect + to refuel, dodge the @",
            "q / Esc    : Quit",
        ];

        let title_start_y = (self.terminal_height / 2).saturating_sub(title_art.len() as u16);
        for (i, line) in title_art.iter().enumerate() {
            let x = (self.terminal_width / 2).saturating_sub(line.len() as u16 / 2);
            self.stdout_target.execute_move_to(MoveTo(x, title_start_y + i as u16))?;
            write!(self.stdout_target, "{}", line)?;
        }
        for (i, line) in controls_text.iter().enumerate() {
            let x = (self.terminal_width / 2).saturating_sub(line.len() as u16 / 2);
            self.stdout_target.execute_move_to(MoveTo(x, title_start_y + title_art.len() as u16 + 2 + i as u16))?;
            write!(self.stdout_target, "{}", line)?;
        }

        let press_any_key_msg = "Press any key to start...";
        let msg_x = (self.terminal_width / 2).saturating_sub(press_any_key_msg.len() as u16 / 2);
        self.stdout_target.execute_move_to(MoveTo(msg_x, self.terminal_height.saturating_sub(3)))?;
        write!(self.stdout_target, "{}", press_any_key_msg)?;
        self.stdout_target.flush()?;

        wait_for_key_press()?;

        let game_grid_dummy = GameGrid::new(self.terminal_width, self.terminal_height);
        game_grid_dummy.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;
        self.stdout_target.flush()?;
        Ok(())
    }

    fn show_game_over_screen(&mut self, score: u32) -> io::Result<bool> {
        let game_grid_dummy = GameGrid::new(self.terminal_width, self.terminal_height);
        game_grid_dummy.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;

        let game_over_msg = "GAME OVER!";
        let score_msg = format!("Final Score: {}", score);
        let again_msg = "Press any key to play again, q to quit";

        let go_y = (self.terminal_height / 2).saturating_sub(2);
        for (i, msg) in [game_over_msg, score_msg.as_str(), again_msg].iter().enumerate() {
            let x = (self.terminal_width / 2).saturating_sub(msg.len() as u16 / 2);
            self.stdout_target.execute_move_to(MoveTo(x, go_y + 2 * i as u16))?;
            write!(self.stdout_target, "{}", msg)?;
        }
        self.stdout_target.flush()?;

        let key = wait_for_key_press()?;
        let game_grid_dummy = GameGrid::new(self.terminal_width, self.terminal_height);
        game_grid_dummy.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;
        Ok(!is_quit(&key))
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
}

/// Blocks until a key goes down, skipping releases and leftovers from play.
fn wait_for_key_press() -> io::Result<KeyEvent> {
    while event::poll(Duration::ZERO)? {
        event::read()?;
    }
    loop {
        match event::read().map_err(|e| { error!("Failed to read event: {}", e); e })? {
            Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(key),
            _ => {}
        }
    }
}
