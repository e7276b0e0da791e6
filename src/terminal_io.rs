use std::collections::HashMap;
use std::io;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

use crate::constants::KEY_HOLD_TIMEOUT_MS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionEvent {
    Pressed(Direction),
    Released(Direction),
}

/// Arrow keys only; everything else is ignored.
pub fn direction_event(key: &KeyEvent) -> Option<DirectionEvent> {
    let direction = match key.code {
        KeyCode::Left => Direction::Left,
        KeyCode::Right => Direction::Right,
        KeyCode::Up => Direction::Up,
        KeyCode::Down => Direction::Down,
        _ => return None,
    };
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => Some(DirectionEvent::Pressed(direction)),
        KeyEventKind::Release => Some(DirectionEvent::Released(direction)),
    }
}

/// Directional intent per axis, each in -1..=1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intent {
    pub dx: i8,
    pub dy: i8,
}

impl Intent {
    /// The last pressed key wins an axis; releasing either key on an axis stops it.
    pub fn apply(&mut self, event: DirectionEvent) {
        match event {
            DirectionEvent::Pressed(Direction::Left) => self.dx = -1,
            DirectionEvent::Pressed(Direction::Right) => self.dx = 1,
            DirectionEvent::Pressed(Direction::Up) => self.dy = -1,
            DirectionEvent::Pressed(Direction::Down) => self.dy = 1,
            DirectionEvent::Released(Direction::Left | Direction::Right) => self.dx = 0,
            DirectionEvent::Released(Direction::Up | Direction::Down) => self.dy = 0,
        }
    }
}

/// Synthesizes key releases for terminals that only report presses and auto-repeats.
#[derive(Debug, Default)]
pub struct HeldKeys {
    last_seen_ms: [Option<u64>; 4],
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: DirectionEvent, now_ms: u64) {
        match event {
            DirectionEvent::Pressed(direction) => self.last_seen_ms[direction.index()] = Some(now_ms),
            DirectionEvent::Released(direction) => self.last_seen_ms[direction.index()] = None,
        }
    }

    /// Releases for every key not seen within the hold window.
    pub fn expire(&mut self, now_ms: u64) -> Vec<DirectionEvent> {
        let mut released = Vec::new();
        for direction in Direction::ALL {
            let slot = &mut self.last_seen_ms[direction.index()];
            if let Some(seen) = *slot {
                if now_ms.saturating_sub(seen) >= KEY_HOLD_TIMEOUT_MS {
                    *slot = None;
                    released.push(DirectionEvent::Released(direction));
                }
            }
        }
        released
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Event>,
    current_frame: u64,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Event>) -> Self {
        SimulatedInput { events, current_frame: 0 }
    }

    /// A short flight: drift left, climb, dive right, then let go.
    pub fn demo_script() -> Self {
        let press = |code| Event::Key(KeyEvent::new(code, crossterm::event::KeyModifiers::NONE));
        let release = |code| {
            Event::Key(KeyEvent::new_with_kind(code, crossterm::event::KeyModifiers::NONE, KeyEventKind::Release))
        };
        let mut events = HashMap::new();
        events.insert(1, press(KeyCode::Left));
        events.insert(30, press(KeyCode::Up));
        events.insert(60, release(KeyCode::Left));
        events.insert(61, press(KeyCode::Right));
        events.insert(90, release(KeyCode::Up));
        events.insert(91, press(KeyCode::Down));
        events.insert(150, release(KeyCode::Right));
        events.insert(151, release(KeyCode::Down));
        SimulatedInput::new(events)
    }

    pub fn poll(&mut self, frame_count: u64) -> io::Result<bool> {
        self.current_frame = frame_count;
        Ok(self.events.contains_key(&frame_count))
    }

    pub fn read(&mut self) -> io::Result<Event> {
        if let Some(event) = self.events.remove(&self.current_frame) {
            Ok(event)
        } else {
            Ok(Event::Key(KeyCode::Null.into()))
        }
    }
}
