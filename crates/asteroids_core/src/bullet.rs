//! Bullet lifecycle
//!
//! Bullets fly ballistically: constant velocity fixed at the moment of
//! firing, a finite lifespan, and nothing else. Collision response is the
//! session controller's business; a bullet only reports its position and
//! size.

use crate::body::{Body, Color};
use crate::config::BulletConfig;
use crate::math::Vec2;

/// A projectile fired from the ship's gun.
#[derive(Debug, Clone)]
pub struct Bullet {
    position: Vec2,
    velocity: Vec2,
    diameter: f64,
    lifespan: f64,
    age: f64,
    color: Color,
    alive: bool,
}

impl Bullet {
    /// Creates a bullet at the gun's muzzle.
    ///
    /// The bullet's velocity is the gun's velocity plus the configured
    /// muzzle speed along `gun_direction` (expected to be unit length).
    pub fn new(
        gun_position: Vec2,
        gun_velocity: Vec2,
        gun_direction: Vec2,
        color: Color,
        config: &BulletConfig,
    ) -> Self {
        Self {
            position: gun_position,
            velocity: gun_velocity + config.muzzle_speed * gun_direction,
            diameter: config.diameter,
            lifespan: config.lifespan,
            age: 0.0,
            color,
            alive: true,
        }
    }

    /// Current velocity in pixels per second.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Visual diameter in pixels.
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Seconds since firing.
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Spawn color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Marks the bullet dead. Idempotent; an expired bullet does not
    /// explode a second time.
    pub fn explode(&mut self) {
        self.alive = false;
    }
}

impl Body for Bullet {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn extent(&self) -> (f64, f64) {
        (self.diameter, self.diameter)
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn advance(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        self.age += dt;

        if self.age >= self.lifespan {
            self.explode();
        }
    }
}
