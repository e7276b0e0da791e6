use crate::constants::*;
use crate::fuel::Fuel;
use crate::rendering::{Sprite, Surface};
use crate::types::{Rect, Vector2D, clamp_into, overlaps};
use rand::Rng;
use log::debug;

// --- Craft ---
pub struct Craft {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
    pub fuel: Fuel,
}

impl Craft {
    pub fn new(x: f64, y: f64) -> Self {
        Craft {
            position: Vector2D::new(x, y),
            velocity: Vector2D::new(0.0, 0.0),
            width: CRAFT_WIDTH,
            height: CRAFT_HEIGHT,
            speed: CRAFT_SPEED,
            fuel: Fuel::full(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position(self.position, self.width, self.height)
    }

    /// Axes are independent; diagonals are not normalized.
    pub fn set_intent(&mut self, dx: i8, dy: i8) {
        self.velocity = Vector2D::new(dx.signum() as f64, dy.signum() as f64).scale(self.speed);
    }

    /// Advances one tick. Returns true if the tank ran dry this tick.
    pub fn update(&mut self) -> bool {
        let exhausted = !self.velocity.is_zero() && self.fuel.burn();

        self.position = self.position.add(self.velocity);
        self.position = clamp_into(self.position, self.width, self.height, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);

        exhausted
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        surface.draw_sprite(Sprite::Craft, self.bounds());
    }
}

// --- Falling entities ---
pub trait Falling {
    const SPRITE: Sprite;

    fn spawn(rng: &mut impl Rng) -> Self;
    fn bounds(&self) -> Rect;
    fn fall(&mut self);
}

pub struct Obstacle {
    pub position: Vector2D,
    pub speed: f64,
}

impl Falling for Obstacle {
    const SPRITE: Sprite = Sprite::Obstacle;

    fn spawn(rng: &mut impl Rng) -> Self {
        let x = rng.gen_range(0.0..PLAYFIELD_WIDTH - OBSTACLE_WIDTH);
        let speed = rng.gen_range(OBSTACLE_MIN_SPEED..OBSTACLE_MAX_SPEED);
        Obstacle { position: Vector2D::new(x, OBSTACLE_SPAWN_Y), speed }
    }

    fn bounds(&self) -> Rect {
        Rect::from_position(self.position, OBSTACLE_WIDTH, OBSTACLE_HEIGHT)
    }

    fn fall(&mut self) {
        self.position.y += self.speed;
    }
}

pub struct PowerUp {
    pub position: Vector2D,
    pub speed: f64,
}

impl Falling for PowerUp {
    const SPRITE: Sprite = Sprite::PowerUp;

    fn spawn(rng: &mut impl Rng) -> Self {
        let x = rng.gen_range(0.0..PLAYFIELD_WIDTH - POWER_UP_WIDTH);
        PowerUp { position: Vector2D::new(x, POWER_UP_SPAWN_Y), speed: POWER_UP_SPEED }
    }

    fn bounds(&self) -> Rect {
        Rect::from_position(self.position, POWER_UP_WIDTH, POWER_UP_HEIGHT)
    }

    fn fall(&mut self) {
        self.position.y += self.speed;
    }
}

/// What one pass over a pool produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    pub exited: u32,
    pub contacts: u32,
}

/// Live entities of one kind, kept in spawn order.
pub struct EntityPool<E> {
    entities: Vec<E>,
}

impl<E: Falling> EntityPool<E> {
    pub fn new() -> Self {
        EntityPool { entities: Vec::new() }
    }

    pub fn spawn(&mut self, rng: &mut impl Rng) {
        self.push(E::spawn(rng));
        debug!("Spawned {} ({} live)", E::SPRITE.name(), self.len());
    }

    pub fn push(&mut self, entity: E) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Moves every entity, culls the ones past the bottom edge and removes the ones
    /// touching `target`. Removals are marked during the pass and compacted once at the end.
    pub fn sweep(&mut self, target: &Rect) -> Sweep {
        let mut sweep = Sweep::default();
        let mut keep = vec![true; self.entities.len()];

        for (i, entity) in self.entities.iter_mut().enumerate() {
            entity.fall();
            if entity.bounds().y > PLAYFIELD_HEIGHT {
                keep[i] = false;
                sweep.exited += 1;
            } else if overlaps(target, &entity.bounds()) {
                // A hit entity is spent; it never goes on to count as an exit
                keep[i] = false;
                sweep.contacts += 1;
            }
        }

        let mut keep = keep.into_iter();
        self.entities.retain(|_| keep.next().unwrap_or(true));
        sweep
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        for entity in &self.entities {
            surface.draw_sprite(E::SPRITE, entity.bounds());
        }
    }
}

impl<E: Falling> Default for EntityPool<E> {
    fn default() -> Self {
        Self::new()
    }
}

// --- Explosion ---
pub struct Explosion {
    pub position: Vector2D,
}

impl Explosion {
    /// Centered on the craft.
    pub fn at(craft: &Craft) -> Self {
        let center = craft.bounds().center();
        let half = EXPLOSION_SIZE / 2.0;
        Explosion { position: Vector2D::new(center.x - half, center.y - half) }
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        surface.draw_sprite(Sprite::Explosion, Rect::from_position(self.position, EXPLOSION_SIZE, EXPLOSION_SIZE));
    }
}
