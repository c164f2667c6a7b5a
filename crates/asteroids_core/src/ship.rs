//! Player ship dynamics and fire control
//!
//! The ship is a planar rigid body integrated with the classical 4th-order
//! Runge-Kutta scheme over a coupled state: center-of-mass position and
//! velocity, nose direction, and angular velocity. All four are carried as
//! 3D vectors with z = 0 so the rotation rule `du/dt = ω × u` falls out of
//! an ordinary cross product; screen coordinates put y downward, making
//! positive ω clockwise on screen.
//!
//! Thruster input arrives as key transitions. Steering is an accumulator
//! of ±1 contributions rather than a three-way switch, so holding both
//! steering keys cancels to zero and releasing one of them behaves
//! correctly regardless of ordering.

use crate::body::{Body, Color};
use crate::bullet::Bullet;
use crate::config::{BulletConfig, ShipConfig};
use crate::events::{InputEvent, Key};
use crate::math::{Vec2, Vec3};

/// Coupled dynamic state advanced by the integrator.
#[derive(Debug, Clone, Copy)]
struct DynState {
    /// Center-of-mass position.
    r: Vec3,
    /// Center-of-mass velocity.
    v: Vec3,
    /// Unit vector from the center of mass toward the nose.
    u: Vec3,
    /// Angular velocity; only the z component is ever nonzero.
    omega: Vec3,
}

impl DynState {
    /// Instantaneous rates of change: dy/dt = f(y).
    fn rates_of_change(&self, thrust: f64, steer: f64, config: &ShipConfig) -> Self {
        Self {
            r: self.v,
            v: thrust * config.linear_acceleration * self.u,
            u: self.omega.cross(&self.u),
            omega: steer * config.angular_acceleration * Vec3::z(),
        }
    }

    /// The state reached by following `rates` for `dt` seconds.
    fn after(&self, rates: &Self, dt: f64) -> Self {
        Self {
            r: self.r + rates.r * dt,
            v: self.v + rates.v * dt,
            u: self.u + rates.u * dt,
            omega: self.omega + rates.omega * dt,
        }
    }
}

/// The player-controlled ship.
#[derive(Debug, Clone)]
pub struct Ship {
    state: DynState,
    thrust: i32,
    steer: i32,
    reload: f64,
    alive: bool,
    color: Color,
    config: ShipConfig,
    gun: BulletConfig,
}

impl Ship {
    /// Creates a ship at the given pose.
    ///
    /// `direction` should be unit length; `angular_velocity` is radians per
    /// second about the screen normal. The gun starts loaded.
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        direction: Vec2,
        angular_velocity: f64,
        color: Color,
        config: &ShipConfig,
        gun: &BulletConfig,
    ) -> Self {
        Self {
            state: DynState {
                r: Vec3::new(position.x, position.y, 0.0),
                v: Vec3::new(velocity.x, velocity.y, 0.0),
                u: Vec3::new(direction.x, direction.y, 0.0),
                omega: Vec3::new(0.0, 0.0, angular_velocity),
            },
            thrust: 0,
            steer: 0,
            reload: 0.0,
            alive: true,
            color,
            config: config.clone(),
            gun: gun.clone(),
        }
    }

    /// Current velocity in pixels per second.
    pub fn velocity(&self) -> Vec2 {
        self.state.v.xy()
    }

    /// Nose direction as a unit vector.
    pub fn heading_vector(&self) -> Vec2 {
        self.state.u.xy()
    }

    /// Nose direction as an angle for rendering, `atan2(u_y, u_x)`.
    pub fn heading(&self) -> f64 {
        self.state.u.y.atan2(self.state.u.x)
    }

    /// Angular velocity in radians per second, clockwise positive on
    /// screen.
    pub fn angular_velocity(&self) -> f64 {
        self.state.omega.z
    }

    /// Seconds until the gun can fire again; zero or negative means ready.
    pub fn reload(&self) -> f64 {
        self.reload
    }

    /// Spawn color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Reacts to a key transition, possibly firing a bullet.
    ///
    /// Thrust is on while its key is held. Each steering key contributes
    /// ±1 to the steering accumulator on press and the opposite on
    /// release. A fire press is honored only while the ship is alive and
    /// the reload timer has run out; everything else is a no-op.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<Bullet> {
        match event {
            InputEvent::KeyDown(Key::Thrust) => self.thrust = 1,
            InputEvent::KeyUp(Key::Thrust) => self.thrust = 0,
            InputEvent::KeyDown(Key::Left) => self.steer -= 1,
            InputEvent::KeyUp(Key::Left) => self.steer += 1,
            InputEvent::KeyDown(Key::Right) => self.steer += 1,
            InputEvent::KeyUp(Key::Right) => self.steer -= 1,
            InputEvent::KeyDown(Key::Fire) => {
                if self.alive && self.reload <= 0.0 {
                    return Some(self.fire_bullet());
                }
            }
            InputEvent::KeyUp(Key::Fire) => {}
        }

        None
    }

    /// Marks the ship dead.
    pub fn explode(&mut self) {
        self.alive = false;
    }

    /// Fires from the nose: the bullet starts half a hull length ahead of
    /// the center of mass and inherits the gun's total velocity, including
    /// the tangential contribution of the ship's spin.
    fn fire_bullet(&mut self) -> Bullet {
        self.reload = self.config.reload_period;

        let half_length = self.config.length / 2.0;
        let gun_position = self.state.r + half_length * self.state.u;
        let gun_velocity = self.state.v + half_length * self.state.omega.cross(&self.state.u);

        Bullet::new(
            gun_position.xy(),
            gun_velocity.xy(),
            self.state.u.xy(),
            self.color,
            &self.gun,
        )
    }
}

impl Body for Ship {
    fn position(&self) -> Vec2 {
        self.state.r.xy()
    }

    fn set_position(&mut self, position: Vec2) {
        self.state.r = Vec3::new(position.x, position.y, 0.0);
    }

    fn extent(&self) -> (f64, f64) {
        // Axis-aligned bounding box of the rotated hull silhouette.
        let (sin, cos) = self.heading().sin_cos();
        let length = self.config.length;
        let width = self.config.width;

        (
            length * cos.abs() + width * sin.abs(),
            length * sin.abs() + width * cos.abs(),
        )
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn advance(&mut self, dt: f64) {
        let thrust = f64::from(self.thrust);
        let steer = f64::from(self.steer);
        let y0 = self.state;

        let k1 = y0.rates_of_change(thrust, steer, &self.config);
        let k2 = y0.after(&k1, dt / 2.0).rates_of_change(thrust, steer, &self.config);
        let k3 = y0.after(&k2, dt / 2.0).rates_of_change(thrust, steer, &self.config);
        let k4 = y0.after(&k3, dt).rates_of_change(thrust, steer, &self.config);

        let scale = dt / 6.0;
        self.state = DynState {
            r: y0.r + (k1.r + 2.0 * k2.r + 2.0 * k3.r + k4.r) * scale,
            v: y0.v + (k1.v + 2.0 * k2.v + 2.0 * k3.v + k4.v) * scale,
            u: y0.u + (k1.u + 2.0 * k2.u + 2.0 * k3.u + k4.u) * scale,
            omega: y0.omega + (k1.omega + 2.0 * k2.omega + 2.0 * k3.omega + k4.omega) * scale,
        };

        // The nose vector shortens slowly as the ship spins, which would
        // bleed away effective thrust over many frames. Renormalizing every
        // step keeps it a unit vector.
        self.state.u.normalize_mut();

        // The reload timer runs down whether or not the player is firing
        // and may go negative; firing only needs it at or below zero.
        self.reload -= dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn test_ship() -> Ship {
        Ship::new(
            Vec2::new(500.0, 281.0),
            Vec2::zeros(),
            Vec2::new(0.0, -1.0),
            0.0,
            Color::WHITE,
            &ShipConfig::default(),
            &BulletConfig::default(),
        )
    }

    #[test]
    fn free_drift_conserves_speed_and_spin() {
        let mut ship = Ship::new(
            Vec2::new(500.0, 281.0),
            Vec2::new(30.0, 40.0),
            Vec2::new(1.0, 0.0),
            1.5,
            Color::WHITE,
            &ShipConfig::default(),
            &BulletConfig::default(),
        );

        for _ in 0..1000 {
            ship.advance(0.01);
        }

        assert_abs_diff_eq!(ship.velocity().norm(), 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ship.angular_velocity(), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ship.heading_vector().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn thrust_accelerates_along_heading() {
        let mut ship = Ship::new(
            Vec2::new(500.0, 281.0),
            Vec2::zeros(),
            Vec2::new(1.0, 0.0),
            0.0,
            Color::WHITE,
            &ShipConfig::default(),
            &BulletConfig::default(),
        );
        ship.handle_event(InputEvent::KeyDown(Key::Thrust));

        for _ in 0..100 {
            ship.advance(0.01);
        }

        // Constant acceleration of 100 px/s^2 for one second; RK4 is exact
        // on polynomials of this order.
        assert_abs_diff_eq!(ship.velocity().x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ship.velocity().y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn steering_spins_up_angular_velocity() {
        let mut ship = test_ship();
        ship.handle_event(InputEvent::KeyDown(Key::Right));

        for _ in 0..50 {
            ship.advance(0.01);
        }

        // dω/dt = α is linear in t, integrated exactly.
        assert_abs_diff_eq!(
            ship.angular_velocity(),
            std::f64::consts::TAU * 0.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn opposite_steering_keys_cancel() {
        let mut ship = test_ship();
        ship.handle_event(InputEvent::KeyDown(Key::Left));
        ship.handle_event(InputEvent::KeyDown(Key::Right));

        for _ in 0..50 {
            ship.advance(0.01);
        }
        assert_abs_diff_eq!(ship.angular_velocity(), 0.0);

        // Releasing one key leaves the other in effect.
        ship.handle_event(InputEvent::KeyUp(Key::Left));
        for _ in 0..50 {
            ship.advance(0.01);
        }
        assert!(ship.angular_velocity() > 0.0);
    }

    #[test]
    fn fire_is_gated_by_reload_timer() {
        let mut ship = test_ship();

        let first = ship.handle_event(InputEvent::KeyDown(Key::Fire));
        assert!(first.is_some());

        // Immediately after a shot the timer is back at the full period.
        let second = ship.handle_event(InputEvent::KeyDown(Key::Fire));
        assert!(second.is_none());

        // Default reload period is 1 s; 1.2 s later the gun is ready.
        ship.advance(0.6);
        assert!(ship.handle_event(InputEvent::KeyDown(Key::Fire)).is_none());
        ship.advance(0.6);
        assert!(ship.handle_event(InputEvent::KeyDown(Key::Fire)).is_some());
    }

    #[test]
    fn dead_ship_does_not_fire() {
        let mut ship = test_ship();
        ship.explode();

        assert!(ship.handle_event(InputEvent::KeyDown(Key::Fire)).is_none());
    }

    #[test]
    fn bullet_spawns_at_nose_with_gun_velocity() {
        let mut ship = Ship::new(
            Vec2::new(500.0, 281.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(0.0, -1.0),
            2.0,
            Color::WHITE,
            &ShipConfig::default(),
            &BulletConfig::default(),
        );

        let bullet = ship
            .handle_event(InputEvent::KeyDown(Key::Fire))
            .expect("gun starts loaded");

        // Nose is half a hull length (15 px) along the heading.
        assert_abs_diff_eq!(bullet.position().x, 500.0);
        assert_abs_diff_eq!(bullet.position().y, 266.0);

        // Gun velocity adds the spin tangent (ω × u) · 15 = (30, 0); the
        // bullet then adds 100 px/s of muzzle speed along the heading.
        assert_abs_diff_eq!(bullet.velocity().x, 35.0);
        assert_abs_diff_eq!(bullet.velocity().y, -100.0);
    }

    #[test]
    fn wrap_extent_tracks_rotated_hull() {
        let ship = test_ship();
        let (width, height) = ship.extent();

        // Heading (0, -1): the hull is rotated a quarter turn.
        assert_abs_diff_eq!(width, 30.0, epsilon = 1e-12);
        assert_abs_diff_eq!(height, 30.0, epsilon = 1e-12);
    }
}
