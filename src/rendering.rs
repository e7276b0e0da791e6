use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Color, Stylize, style},
};

use crate::constants::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::types::{Rect, Rgb};

/// Logical asset handles. The core never looks inside them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sprite {
    Craft,
    Obstacle,
    PowerUp,
    Explosion,
}

impl Sprite {
    pub fn name(&self) -> &'static str {
        match self {
            Sprite::Craft => "spaceship",
            Sprite::Obstacle => "asteroid",
            Sprite::PowerUp => "powerup",
            Sprite::Explosion => "explosion",
        }
    }

    fn glyph(&self) -> (char, Rgb) {
        match self {
            Sprite::Craft => ('A', Rgb::new(120, 200, 255)),
            Sprite::Obstacle => ('@', Rgb::new(170, 150, 130)),
            Sprite::PowerUp => ('+', Rgb::new(80, 255, 120)),
            Sprite::Explosion => ('*', Rgb::new(255, 140, 0)),
        }
    }
}

/// Drawing operations the game issues each tick, in playfield coordinates.
pub trait Surface {
    fn clear(&mut self, area: Rect);
    fn draw_sprite(&mut self, sprite: Sprite, at: Rect);
    fn fill_rect(&mut self, area: Rect, color: Rgb);
    fn stroke_rect(&mut self, area: Rect, color: Rgb);
    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Rgb);
}

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer.get(y as usize).map(|row| row.iter().collect()).unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for y in 0..self.height {
            info!("{}", self.row(y));
        }
        info!("---------------------");
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            },
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Ignore in debug mode
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OutputTarget::Stdout(_))
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            },
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Option<Rgb>,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', color: None };
}

// --- GameGrid: character cells with optional colour ---
pub struct GameGrid {
    pub grid: Vec<Vec<Cell>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![Cell::BLANK; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn set_cell(&mut self, x: u16, y: u16, ch: char, color: Option<Rgb>) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = Cell { ch, color };
        }
    }

    pub fn row_text(&self, y: u16) -> String {
        self.grid.get(y as usize).map(|row| row.iter().map(|cell| cell.ch).collect()).unwrap_or_default()
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            if stdout.is_terminal() {
                let mut line = String::with_capacity(self.width as usize * 4);
                for cell in &self.grid[y as usize] {
                    match cell.color {
                        Some(Rgb { r, g, b }) => line.push_str(&style(cell.ch).with(Color::Rgb { r, g, b }).to_string()),
                        None => line.push(cell.ch),
                    }
                }
                write!(stdout, "{}", line)?;
            } else {
                write!(stdout, "{}", self.row_text(y))?;
            }
        }
        Ok(())
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget, terminal_width: u16, terminal_height: u16) -> io::Result<()> {
        for y in 0..terminal_height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(terminal_width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

// --- TerminalSurface: rasterises playfield coordinates onto the grid ---
pub struct TerminalSurface {
    pub grid: GameGrid,
}

/// Half-open cell range covered by `start..start + len` once scaled, clipped to `0..limit`.
fn cell_span(start: f64, len: f64, scale: f64, limit: u16) -> Option<(u16, u16)> {
    let first = (start * scale).floor().max(0.0);
    let last = ((start + len) * scale).ceil().min(limit as f64);
    if last <= first {
        None
    } else {
        Some((first as u16, last as u16))
    }
}

impl TerminalSurface {
    pub fn new(width: u16, height: u16) -> Self {
        TerminalSurface { grid: GameGrid::new(width, height) }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.grid = GameGrid::new(width, height);
    }

    fn scale_x(&self) -> f64 {
        self.grid.width as f64 / PLAYFIELD_WIDTH
    }

    fn scale_y(&self) -> f64 {
        self.grid.height as f64 / PLAYFIELD_HEIGHT
    }

    fn cells(&self, area: Rect) -> Option<((u16, u16), (u16, u16))> {
        let cols = cell_span(area.x, area.w, self.scale_x(), self.grid.width)?;
        let rows = cell_span(area.y, area.h, self.scale_y(), self.grid.height)?;
        Some((cols, rows))
    }

    fn paint(&mut self, area: Rect, ch: char, color: Option<Rgb>) {
        if let Some(((x0, x1), (y0, y1))) = self.cells(area) {
            for y in y0..y1 {
                for x in x0..x1 {
                    self.grid.set_cell(x, y, ch, color);
                }
            }
        }
    }
}

impl Surface for TerminalSurface {
    fn clear(&mut self, area: Rect) {
        self.paint(area, ' ', None);
    }

    fn draw_sprite(&mut self, sprite: Sprite, at: Rect) {
        let (ch, color) = sprite.glyph();
        self.paint(at, ch, Some(color));
    }

    fn fill_rect(&mut self, area: Rect, color: Rgb) {
        if color == Rgb::BLACK {
            self.paint(area, ' ', None);
        } else {
            self.paint(area, '█', Some(color));
        }
    }

    fn stroke_rect(&mut self, area: Rect, color: Rgb) {
        let Some(((x0, x1), (y0, y1))) = self.cells(area) else {
            return;
        };
        let color = Some(color);
        if y1 - y0 < 2 {
            // Too thin for a box: bracket the row from outside
            if x0 > 0 {
                self.grid.set_cell(x0 - 1, y0, '[', color);
            }
            self.grid.set_cell(x1, y0, ']', color);
            return;
        }
        for x in x0..x1 {
            self.grid.set_cell(x, y0, '─', color);
            self.grid.set_cell(x, y1 - 1, '─', color);
        }
        for y in y0..y1 {
            self.grid.set_cell(x0, y, '│', color);
            self.grid.set_cell(x1 - 1, y, '│', color);
        }
        self.grid.set_cell(x0, y0, '┌', color);
        self.grid.set_cell(x1 - 1, y0, '┐', color);
        self.grid.set_cell(x0, y1 - 1, '└', color);
        self.grid.set_cell(x1 - 1, y1 - 1, '┘', color);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Rgb) {
        let col = (x * self.scale_x()).floor().max(0.0) as u16;
        let row = (y * self.scale_y()).floor().max(0.0) as u16;
        for (i, ch) in text.chars().enumerate() {
            self.grid.set_cell(col.saturating_add(i as u16), row, ch, Some(color));
        }
    }
}

/// Captures draw calls so tests can assert on what a tick rendered.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rect),
    Sprite(Sprite, Rect),
    Fill(Rect, Rgb),
    Stroke(Rect, Rgb),
    Text(String, f64, f64, Rgb),
}

#[cfg(test)]
#[derive(Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn sprites(&self, sprite: Sprite) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Sprite(s, _) if *s == sprite)).count()
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn clear(&mut self, area: Rect) {
        self.commands.push(DrawCommand::Clear(area));
    }

    fn draw_sprite(&mut self, sprite: Sprite, at: Rect) {
        self.commands.push(DrawCommand::Sprite(sprite, at));
    }

    fn fill_rect(&mut self, area: Rect, color: Rgb) {
        self.commands.push(DrawCommand::Fill(area, color));
    }

    fn stroke_rect(&mut self, area: Rect, color: Rgb) {
        self.commands.push(DrawCommand::Stroke(area, color));
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Rgb) {
        self.commands.push(DrawCommand::Text(text.to_string(), x, y, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_at(surface: &TerminalSurface, x: usize, y: usize) -> char {
        surface.grid.grid[y][x].ch
    }

    #[test]
    fn test_sprite_maps_to_scaled_cells() {
        let mut surface = TerminalSurface::new(80, 24);
        // 50x50 at (400, 550) -> cols 40..45, rows 22..24
        surface.draw_sprite(Sprite::Craft, Rect::new(400.0, 550.0, 50.0, 50.0));
        assert_eq!(char_at(&surface, 40, 22), 'A');
        assert_eq!(char_at(&surface, 44, 23), 'A');
        assert_eq!(char_at(&surface, 45, 23), ' ');
        assert_eq!(char_at(&surface, 39, 22), ' ');
    }

    #[test]
    fn test_offscreen_sprite_is_clipped() {
        let mut surface = TerminalSurface::new(80, 24);
        surface.draw_sprite(Sprite::Obstacle, Rect::new(100.0, -50.0, 50.0, 50.0));
        assert!(surface.grid.grid.iter().flatten().all(|cell| cell.ch == ' '));

        surface.draw_sprite(Sprite::Obstacle, Rect::new(100.0, -30.0, 50.0, 50.0));
        assert_eq!(char_at(&surface, 10, 0), '@');
    }

    #[test]
    fn test_text_placement() {
        let mut surface = TerminalSurface::new(80, 24);
        surface.draw_text("Score: 7", 10.0, 30.0, Rgb::WHITE);
        assert_eq!(&surface.grid.row_text(1)[1..9], "Score: 7");
    }

    #[test]
    fn test_thin_stroke_brackets_row() {
        let mut surface = TerminalSurface::new(80, 24);
        surface.fill_rect(Rect::new(10.0, 50.0, 100.0, 20.0), Rgb::new(0, 255, 0));
        surface.stroke_rect(Rect::new(10.0, 50.0, 200.0, 20.0), Rgb::WHITE);
        let row = surface.grid.row_text(2);
        assert!(row.starts_with("[██████████"), "{row}");
        assert_eq!(row.chars().nth(21), Some(']'));
    }

    #[test]
    fn test_clear_blanks_area() {
        let mut surface = TerminalSurface::new(80, 24);
        surface.draw_sprite(Sprite::PowerUp, Rect::new(0.0, 0.0, 800.0, 600.0));
        surface.clear(Rect::new(0.0, 0.0, 800.0, 600.0));
        assert!(surface.grid.grid.iter().flatten().all(|cell| *cell == Cell::BLANK));
    }

    #[test]
    fn test_screen_buffer_receives_plain_glyphs() {
        let mut grid = GameGrid::new(4, 2);
        grid.set_cell(1, 1, '@', Some(Rgb::WHITE));
        let mut target = OutputTarget::ScreenBuffer(ScreenBuffer::new(4, 2));
        grid.render(&mut target).expect("render to buffer");
        match target {
            OutputTarget::ScreenBuffer(sb) => assert_eq!(sb.row(1), " @  "),
            OutputTarget::Stdout(_) => unreachable!(),
        }
    }

    #[test]
    fn test_sprite_names() {
        assert_eq!(Sprite::Craft.name(), "spaceship");
        assert_eq!(Sprite::Explosion.name(), "explosion");
    }
}
