mod constants;
mod difficulty;
mod entities;
mod fuel;
mod game;
mod rendering;
mod session;
mod terminal_io;
mod types;

use std::io::{self, Write};
use crossterm::{
    cursor::{Hide, Show},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement},
};
use log::{error, info, warn};
use std::env;

use crate::constants::{DEBUG_TERMINAL_HEIGHT, DEBUG_TERMINAL_WIDTH};
use crate::game::Game;
use crate::rendering::{GameGrid, OutputTarget, ScreenBuffer};
use crate::terminal_io::SimulatedInput;

/// Parsed from argv: `[frames]` or `--debug [W H [frames]]`.
struct LaunchOptions {
    debug_mode_active: bool,
    debug_width: u16,
    debug_height: u16,
    max_frames: Option<u64>,
}

impl LaunchOptions {
    fn from_args(args: &[String]) -> Self {
        let debug_mode_active = args.len() > 1 && args[1] == "--debug";
        let mut options = LaunchOptions {
            debug_mode_active,
            debug_width: DEBUG_TERMINAL_WIDTH,
            debug_height: DEBUG_TERMINAL_HEIGHT,
            max_frames: None,
        };

        if debug_mode_active {
            if args.len() >= 4 {
                options.debug_width = args[2].parse::<u16>().unwrap_or(DEBUG_TERMINAL_WIDTH);
                options.debug_height = args[3].parse::<u16>().unwrap_or(DEBUG_TERMINAL_HEIGHT);
            }
            options.max_frames = args.get(4).and_then(|a| a.parse::<u64>().ok());
        } else {
            options.max_frames = args.get(1).and_then(|a| a.parse::<u64>().ok());
        }
        options
    }
}

fn main() -> io::Result<()> {
    if let Err(e) = simple_logging::log_to_file("vibe-dodger.log", log::LevelFilter::Info) {
        eprintln!("Failed to open log file: {}", e);
    }
    info!("Starting Vibe-dodger application.");

    let args: Vec<String> = env::args().collect();
    let options = LaunchOptions::from_args(&args);

    if options.debug_mode_active {
        info!("Debug mode enabled, resolution {}x{}", options.debug_width, options.debug_height);
        // Headless runs need an end; default to ten seconds of play
        let max_frames = options.max_frames.or(Some(500));
        let mut game = Game::new(
            options.debug_width,
            options.debug_height,
            OutputTarget::ScreenBuffer(ScreenBuffer::new(options.debug_width, options.debug_height)),
            Some(SimulatedInput::demo_script()),
            true,
            max_frames,
            true,
        );
        return game.run();
    }

    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
    let release_events = matches!(supports_keyboard_enhancement(), Ok(true));
    if !release_events {
        warn!("Terminal cannot report key releases; releasing keys after a hold timeout.");
    }

    // No early return past raw mode: every failure lands in `result` and the terminal is restored
    let result = size()
        .map_err(|e| { error!("Failed to get terminal size: {}", e); e })
        .and_then(|(terminal_width, terminal_height)| {
            info!("Terminal size: {}x{}", terminal_width, terminal_height);
            play(OutputTarget::Stdout(io::stdout()), terminal_width, terminal_height, release_events, options.max_frames)
        });

    let mut stdout_target = OutputTarget::Stdout(io::stdout());
    if release_events {
        let _ = stdout_target.execute_other_command(PopKeyboardEnhancementFlags);
    }
    let _ = stdout_target.execute_other_command(Show);
    let _ = stdout_target.flush();
    disable_raw_mode().map_err(|e| { error!("Failed to disable raw mode: {}", e); e })?;

    if let Err(e) = &result {
        error!("Game loop failed: {}", e);
    }
    info!("Vibe-dodger exited.");
    result
}

fn play(
    mut stdout_target: OutputTarget,
    terminal_width: u16,
    terminal_height: u16,
    release_events: bool,
    max_frames: Option<u64>,
) -> io::Result<()> {
    prepare_screen(&mut stdout_target, terminal_width, terminal_height, release_events)?;
    let mut game = Game::new(terminal_width, terminal_height, stdout_target, None, false, max_frames, release_events);
    game.run()
}

fn prepare_screen(stdout_target: &mut OutputTarget, terminal_width: u16, terminal_height: u16, release_events: bool) -> io::Result<()> {
    if release_events {
        stdout_target
            .execute_other_command(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
            .map_err(|e| { error!("Failed to enable keyboard enhancement: {}", e); e })?;
        info!("Keyboard enhancement enabled, key releases reported by the terminal.");
    }
    let game_grid_dummy = GameGrid::new(terminal_width, terminal_height);
    game_grid_dummy
        .clear_screen_manual(stdout_target, terminal_width, terminal_height)
        .map_err(|e| { error!("Failed to clear screen manually: {}", e); e })?;
    stdout_target.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;
    stdout_target.flush()
}
