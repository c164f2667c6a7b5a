//! Collision and session controller
//!
//! `Game` owns every live body and all session counters. Each frame the
//! embedding shell drains its input queue into [`Game::handle_event`] and
//! then calls [`Game::tick`], which runs the collision passes on
//! prior-frame positions, advances and wraps the survivors, spawns the
//! next asteroid field when the current one is cleared, and finally runs
//! the respawn/elimination clock. Bodies never touch the counters; they
//! only report liveness and hand back spawned objects.

use log::debug;
use rand::Rng;

use crate::asteroid::Asteroid;
use crate::body::{self, Body, Color};
use crate::bullet::Bullet;
use crate::config::GameConfig;
use crate::events::{GameEvent, InputEvent};
use crate::math::Vec2;
use crate::ship::Ship;

/// Session outcome reported by every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// The session continues.
    Playing,
    /// Lives are exhausted; the session is over.
    Over,
}

/// Which kind of body a [`SpriteState`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    /// The player ship.
    Ship,
    /// A bullet.
    Bullet,
    /// An asteroid.
    Asteroid,
}

/// Render-ready snapshot of one live body.
#[derive(Debug, Clone, Copy)]
pub struct SpriteState {
    /// Body kind, selecting the shape to draw.
    pub kind: SpriteKind,
    /// Center position in display-surface coordinates.
    pub position: Vec2,
    /// Orientation in radians; zero for round bodies.
    pub heading: f64,
    /// Visual radius in pixels.
    pub radius: f64,
    /// Draw color.
    pub color: Color,
}

/// The running game session.
pub struct Game<R: Rng> {
    window_size: Vec2,
    color: Color,
    config: GameConfig,
    rng: R,
    ship: Ship,
    bullets: Vec<Bullet>,
    asteroids: Vec<Asteroid>,
    score: u32,
    level: u32,
    lives: u32,
    respawn_timer: f64,
}

impl<R: Rng> Game<R> {
    /// Starts a session: a ship at the spawn pose and the level-1 asteroid
    /// field.
    ///
    /// The random source is supplied by the caller so a session can be
    /// replayed deterministically from a seed.
    pub fn new(config: GameConfig, foreground: Color, rng: R) -> Self {
        let window_size = Vec2::new(
            f64::from(config.display.width),
            f64::from(config.display.height),
        );
        let ship = Ship::new(
            window_size / 2.0,
            Vec2::zeros(),
            Vec2::new(0.0, -1.0),
            0.0,
            foreground,
            &config.ship,
            &config.bullet,
        );
        let lives = config.session.initial_lives;
        let respawn_timer = config.session.respawn_period;

        let mut game = Self {
            window_size,
            color: foreground,
            config,
            rng,
            ship,
            bullets: Vec::new(),
            asteroids: Vec::new(),
            score: 0,
            level: 1,
            lives,
            respawn_timer,
        };
        game.asteroids = game.spawn_field();
        game
    }

    /// Advances the session by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> TickStatus {
        // Collision passes run on prior-frame positions.
        self.handle_bullet_asteroid_collisions();
        self.handle_ship_asteroid_collisions();

        // Advance the survivors; every live body wraps toroidally.
        if self.ship.is_alive() {
            self.ship.advance(dt);
            body::wrap(&mut self.ship, self.window_size);
        }
        for bullet in &mut self.bullets {
            if bullet.is_alive() {
                bullet.advance(dt);
                body::wrap(bullet, self.window_size);
            }
        }
        for asteroid in &mut self.asteroids {
            if asteroid.is_alive() {
                asteroid.advance(dt);
                body::wrap(asteroid, self.window_size);
            }
        }

        self.bullets.retain(Bullet::is_alive);
        self.asteroids.retain(Asteroid::is_alive);

        // A cleared field starts the next level while anyone is left to
        // play it.
        if self.asteroids.is_empty() && (self.ship.is_alive() || self.lives > 0) {
            self.level += 1;
            self.asteroids = self.spawn_field();
            debug!(
                "level {} begins with {} asteroids",
                self.level,
                self.asteroids.len()
            );
        }

        // Respawn clock. It runs continuously; only the dead-ship branch
        // reads it.
        self.respawn_timer -= dt;
        if !self.ship.is_alive() && self.respawn_timer <= 1.0 {
            if self.lives == 0 {
                debug!("final ship lost; session over with score {}", self.score);
                return TickStatus::Over;
            }
            self.lives -= 1;
            self.ship = self.spawn_ship();
            debug!("ship respawned; {} lives remain", self.lives);
        }

        TickStatus::Playing
    }

    /// Feeds one input event to the session.
    ///
    /// Key transitions are forwarded to the ship; a honored fire request
    /// adds the bullet to the session and echoes it back to the caller.
    /// Everything else is a no-op returning `None`.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<GameEvent> {
        let bullet = self.ship.handle_event(event)?;
        self.bullets.push(bullet.clone());

        Some(GameEvent::BulletFired(bullet))
    }

    /// Current score: one point per destroyed asteroid.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current level, starting at 1.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Remaining lives.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Seconds until the respawn decision point, available while the ship
    /// is dead.
    pub fn respawn_countdown(&self) -> Option<f64> {
        (!self.ship.is_alive()).then_some(self.respawn_timer)
    }

    /// The toroidal wrap window, in pixels.
    pub fn window_size(&self) -> Vec2 {
        self.window_size
    }

    /// The session's configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The player ship. May be dead; check [`Body::is_alive`].
    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    /// All stored bullets, live ones first-fired first.
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// All stored asteroids.
    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    /// Render-ready snapshots of every live body.
    pub fn sprites(&self) -> Vec<SpriteState> {
        let mut sprites = Vec::with_capacity(1 + self.bullets.len() + self.asteroids.len());

        if self.ship.is_alive() {
            sprites.push(SpriteState {
                kind: SpriteKind::Ship,
                position: self.ship.position(),
                heading: self.ship.heading(),
                radius: self.config.ship.length / 2.0,
                color: self.ship.color(),
            });
        }
        for bullet in self.bullets.iter().filter(|b| b.is_alive()) {
            sprites.push(SpriteState {
                kind: SpriteKind::Bullet,
                position: bullet.position(),
                heading: 0.0,
                radius: bullet.diameter() / 2.0,
                color: bullet.color(),
            });
        }
        for asteroid in self.asteroids.iter().filter(|a| a.is_alive()) {
            sprites.push(SpriteState {
                kind: SpriteKind::Asteroid,
                position: asteroid.position(),
                heading: 0.0,
                radius: asteroid.radius(),
                color: asteroid.color(),
            });
        }

        sprites
    }

    /// Bullet × asteroid pass. A hit at exactly the asteroid's radius
    /// counts; the bullet dies with the asteroid, which may fan out into
    /// fragments that join the field for the next frame.
    fn handle_bullet_asteroid_collisions(&mut self) {
        let fragment_count = self.config.session.fragment_count as usize;
        let mut fragments = Vec::new();

        for bullet in self.bullets.iter_mut().filter(|b| b.is_alive()) {
            for asteroid in self.asteroids.iter_mut().filter(|a| a.is_alive()) {
                let separation = (bullet.position() - asteroid.position()).norm();
                if separation <= asteroid.radius() {
                    fragments.extend(asteroid.explode(fragment_count));
                    bullet.explode();
                    self.score += 1;
                }
            }
        }

        self.asteroids.extend(fragments);
    }

    /// Ship × asteroid pass. The loop keeps going after the ship dies so
    /// every asteroid overlapping the death position fragments too.
    fn handle_ship_asteroid_collisions(&mut self) {
        if !self.ship.is_alive() {
            return;
        }

        let fragment_count = self.config.session.fragment_count as usize;
        let mut fragments = Vec::new();

        for asteroid in self.asteroids.iter_mut().filter(|a| a.is_alive()) {
            let separation = (self.ship.position() - asteroid.position()).norm();
            if separation <= asteroid.radius() {
                self.ship.explode();
                fragments.extend(asteroid.explode(fragment_count));
                self.respawn_timer = self.config.session.respawn_period;
            }
        }

        self.asteroids.extend(fragments);
    }

    /// Spawns a fresh asteroid field for the current level.
    ///
    /// Fresh spawns (and only fresh spawns; fragments are exempt) carry
    /// the per-level speed multiplier `(level + 9) / 10`, and are never
    /// placed overlapping a living ship.
    fn spawn_field(&mut self) -> Vec<Asteroid> {
        const MAX_PLACEMENT_ATTEMPTS: usize = 100;

        let speed_multiplier = f64::from(self.level + 9) / 10.0;
        let count = self.config.session.asteroid_count as usize;
        let mut field = Vec::with_capacity(count);

        for _ in 0..count {
            let diameter = Asteroid::generate_diameter(&self.config.asteroid, &mut self.rng);

            let mut position = Asteroid::generate_position(self.window_size, &mut self.rng);
            let mut attempts = 1;
            while self.ship.is_alive()
                && (position - self.ship.position()).norm() <= diameter / 2.0
            {
                if attempts >= MAX_PLACEMENT_ATTEMPTS {
                    debug!("asteroid placement retries exhausted; accepting overlap");
                    break;
                }
                position = Asteroid::generate_position(self.window_size, &mut self.rng);
                attempts += 1;
            }

            let velocity =
                speed_multiplier * Asteroid::generate_velocity(&self.config.asteroid, &mut self.rng);
            field.push(Asteroid::new(
                diameter,
                position,
                velocity,
                self.color,
                &self.config.asteroid,
            ));
        }

        field
    }

    /// A fresh ship at the fixed spawn pose: window center, at rest,
    /// nose up.
    fn spawn_ship(&self) -> Ship {
        Ship::new(
            self.window_size / 2.0,
            Vec2::zeros(),
            Vec2::new(0.0, -1.0),
            0.0,
            self.color,
            &self.config.ship,
            &self.config.bullet,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BulletConfig;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const DT: f64 = 1.0 / 30.0;

    fn seeded_game(config: GameConfig) -> Game<SmallRng> {
        Game::new(config, Color::WHITE, SmallRng::seed_from_u64(42))
    }

    fn stationary_bullet(position: Vec2) -> Bullet {
        // Zero gun velocity and a zero direction leave the bullet parked.
        Bullet::new(
            position,
            Vec2::zeros(),
            Vec2::zeros(),
            Color::WHITE,
            &BulletConfig::default(),
        )
    }

    fn stationary_asteroid(diameter: f64, position: Vec2, config: &GameConfig) -> Asteroid {
        Asteroid::new(
            diameter,
            position,
            Vec2::zeros(),
            Color::WHITE,
            &config.asteroid,
        )
    }

    #[test]
    fn new_session_counters() {
        let game = seeded_game(GameConfig::default());

        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), 1);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.asteroids().len(), 3);
        assert!(game.ship().is_alive());
        assert!(game.respawn_countdown().is_none());
    }

    #[test]
    fn bullet_hit_at_exact_radius_counts() {
        let config = GameConfig::default();
        let mut game = seeded_game(config.clone());

        game.asteroids.clear();
        game.asteroids
            .push(stationary_asteroid(40.0, Vec2::new(500.0, 100.0), &config));
        game.bullets
            .push(stationary_bullet(Vec2::new(520.0, 100.0)));

        game.handle_bullet_asteroid_collisions();

        // Separation equals the radius: inclusive comparator, so it hits.
        // The 40 px parent splits below the minimum diameter, so no
        // fragments appear.
        assert_eq!(game.score(), 1);
        assert!(!game.bullets[0].is_alive());
        assert_eq!(game.asteroids.len(), 1);
        assert!(!game.asteroids[0].is_alive());
    }

    #[test]
    fn bullet_just_beyond_radius_misses() {
        let config = GameConfig::default();
        let mut game = seeded_game(config.clone());

        game.asteroids.clear();
        game.asteroids
            .push(stationary_asteroid(40.0, Vec2::new(500.0, 100.0), &config));
        game.bullets
            .push(stationary_bullet(Vec2::new(520.0 + 1e-6, 100.0)));

        game.handle_bullet_asteroid_collisions();

        assert_eq!(game.score(), 0);
        assert!(game.bullets[0].is_alive());
        assert!(game.asteroids[0].is_alive());
    }

    #[test]
    fn ship_collision_starts_respawn_countdown() {
        let config = GameConfig::default();
        let mut game = seeded_game(config.clone());

        game.asteroids.clear();
        let ship_position = game.ship().position();
        game.asteroids
            .push(stationary_asteroid(40.0, ship_position, &config));

        game.handle_ship_asteroid_collisions();

        assert!(!game.ship().is_alive());
        assert!(!game.asteroids[0].is_alive());
        assert_eq!(game.respawn_countdown(), Some(3.0));
    }

    #[test]
    fn respawn_and_game_over_flow() {
        let mut config = GameConfig::default();
        config.session.asteroid_count = 0;
        config.session.initial_lives = 1;
        let mut game = seeded_game(config);

        // First death: one life left, so the ship comes back at the spawn
        // pose once the countdown reaches one second.
        game.ship.explode();
        game.respawn_timer = 3.0;

        assert_eq!(game.tick(1.0), TickStatus::Playing);
        assert!(!game.ship().is_alive());

        assert_eq!(game.tick(1.0), TickStatus::Playing);
        assert!(game.ship().is_alive());
        assert_eq!(game.lives(), 0);
        assert_abs_diff_eq!(game.ship().position().x, 500.0);
        assert_abs_diff_eq!(game.ship().position().y, 281.0);
        assert_abs_diff_eq!(game.ship().velocity().norm(), 0.0);
        assert_abs_diff_eq!(game.ship().heading_vector().y, -1.0);

        // Second death with no lives left ends the session.
        game.ship.explode();
        game.respawn_timer = 3.0;

        assert_eq!(game.tick(1.0), TickStatus::Playing);
        assert_eq!(game.tick(1.0), TickStatus::Over);
    }

    #[test]
    fn cleared_field_levels_up_with_scaled_speeds() {
        let config = GameConfig::default();
        let mut game = seeded_game(config.clone());
        let mut reference = seeded_game(config);

        // Both games consumed identical draws so far. Clear the field in
        // one and tick it: the level-2 spawn pulls the same draw sequence
        // the reference pulls for a level-1 field.
        for asteroid in &mut game.asteroids {
            asteroid.explode(0);
        }
        assert_eq!(game.tick(DT), TickStatus::Playing);
        let reference_field = reference.spawn_field();

        assert_eq!(game.level(), 2);
        assert_eq!(game.asteroids().len(), 3);

        for (spawned, base) in game.asteroids().iter().zip(&reference_field) {
            assert_abs_diff_eq!(spawned.diameter(), base.diameter(), epsilon = 1e-12);
            // Fresh level-2 spawns move 1.1x faster than the same level-1
            // draw.
            assert_relative_eq!(
                spawned.velocity().norm(),
                1.1 * base.velocity().norm(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn fire_event_adds_bullet_and_echoes_it() {
        let mut game = seeded_game(GameConfig::default());

        let response = game.handle_event(InputEvent::KeyDown(crate::events::Key::Fire));
        match response {
            Some(GameEvent::BulletFired(bullet)) => {
                assert!(bullet.is_alive());
            }
            None => panic!("gun starts loaded; fire must be honored"),
        }
        assert_eq!(game.bullets().len(), 1);

        let sprites = game.sprites();
        assert!(sprites.iter().any(|s| s.kind == SpriteKind::Bullet));
        assert!(sprites.iter().any(|s| s.kind == SpriteKind::Ship));

        // Releasing fire means nothing.
        assert!(game
            .handle_event(InputEvent::KeyUp(crate::events::Key::Fire))
            .is_none());
    }

    #[test]
    fn dead_bodies_are_pruned_after_the_tick() {
        let config = GameConfig::default();
        let mut game = seeded_game(config.clone());

        game.asteroids.clear();
        game.asteroids
            .push(stationary_asteroid(40.0, Vec2::new(500.0, 100.0), &config));
        game.bullets
            .push(stationary_bullet(Vec2::new(500.0, 100.0)));

        game.tick(DT);

        assert!(game.bullets().is_empty());
        // The cleared field triggered a level-up respawn of live rocks.
        assert!(game.asteroids().iter().all(Asteroid::is_alive));
    }

    #[test]
    fn fresh_spawns_avoid_the_ship() {
        let mut config = GameConfig::default();
        config.session.asteroid_count = 20;
        let game = seeded_game(config);

        let ship_position = game.ship().position();
        for asteroid in game.asteroids() {
            let separation = (asteroid.position() - ship_position).norm();
            assert!(separation > asteroid.radius());
        }
    }
}
