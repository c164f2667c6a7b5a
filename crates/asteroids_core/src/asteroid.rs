//! Asteroid spawning and fragmentation
//!
//! Asteroids spawn with exponentially distributed diameters and speeds and
//! drift in straight lines. Destroying one splits it into fragments whose
//! velocities satisfy a coupled constraint system (momentum conservation,
//! energy conservation with a configurable injection multiplier, equal
//! fragment speeds, and a uniform angular fan) solved numerically with the
//! crate's nonlinear root-finder. Fragments that would come out below the
//! configured minimum diameter vanish instead of spawning.

use log::warn;
use rand::Rng;

use crate::body::{Body, Color};
use crate::config::AsteroidConfig;
use crate::math::solver::{self, SolverOptions};
use crate::math::{DVector, Vec2};

/// A drifting, destructible rock.
#[derive(Debug, Clone)]
pub struct Asteroid {
    diameter: f64,
    position: Vec2,
    velocity: Vec2,
    color: Color,
    config: AsteroidConfig,
    alive: bool,
}

impl Asteroid {
    /// Creates an asteroid with explicit state. Spawn-time draws live in
    /// the `generate_*` constructors; fragmentation uses this directly.
    pub fn new(
        diameter: f64,
        position: Vec2,
        velocity: Vec2,
        color: Color,
        config: &AsteroidConfig,
    ) -> Self {
        Self {
            diameter,
            position,
            velocity,
            color,
            config: config.clone(),
            alive: true,
        }
    }

    /// Draws a diameter from the configured distribution: the minimum plus
    /// an exponential whose scale puts the distribution's median at
    /// `median_diameter`.
    pub fn generate_diameter<R: Rng>(config: &AsteroidConfig, rng: &mut R) -> f64 {
        let beta =
            (config.median_diameter - config.minimum_diameter) / std::f64::consts::LN_2;
        config.minimum_diameter + sample_exponential(beta, rng)
    }

    /// Draws a position uniformly over the window.
    pub fn generate_position<R: Rng>(window_size: Vec2, rng: &mut R) -> Vec2 {
        Vec2::new(
            window_size.x * rng.gen::<f64>(),
            window_size.y * rng.gen::<f64>(),
        )
    }

    /// Draws a velocity: exponentially distributed speed (same form as the
    /// diameter draw) in a direction uniform on the unit circle.
    pub fn generate_velocity<R: Rng>(config: &AsteroidConfig, rng: &mut R) -> Vec2 {
        let beta = (config.median_speed - config.minimum_speed) / std::f64::consts::LN_2;
        let speed = config.minimum_speed + sample_exponential(beta, rng);
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);

        speed * Vec2::new(angle.cos(), angle.sin())
    }

    /// Diameter in pixels.
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Collision radius: half the diameter.
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Current velocity in pixels per second.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Spawn color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Destroys the asteroid, returning its fragments.
    ///
    /// Fragments share the parent's position, color, and configuration
    /// profile; each gets diameter `parent · sqrt(area_ratio / count)` and
    /// a velocity from the constraint solve. When that diameter would fall
    /// below the configured minimum, the pieces vanish and the returned
    /// list is empty: a policy branch, not an error.
    pub fn explode(&mut self, fragment_count: usize) -> Vec<Self> {
        self.alive = false;

        if fragment_count == 0 {
            return Vec::new();
        }

        let diameter_ratio = (self.config.area_ratio / fragment_count as f64).sqrt();
        let fragment_diameter = self.diameter * diameter_ratio;
        if fragment_diameter < self.config.minimum_diameter {
            return Vec::new();
        }

        let velocities = self.solve_fragment_velocities(fragment_count);

        (0..fragment_count)
            .map(|k| {
                Self::new(
                    fragment_diameter,
                    self.position,
                    Vec2::new(velocities[2 * k], velocities[2 * k + 1]),
                    self.color,
                    &self.config,
                )
            })
            .collect()
    }

    /// Solves the fragmentation constraint system for `count` planar
    /// velocities, flattened as `[v1x, v1y, v2x, v2y, ..]`.
    ///
    /// The system is square for count ≥ 2: two momentum rows, one energy
    /// row, count − 1 equal-speed rows, and count − 2 equal-angle rows.
    /// A solve that stops short of convergence is used anyway, the best
    /// iterate standing in for the exact root, but it is logged so a
    /// misconfigured constraint set shows up.
    fn solve_fragment_velocities(&self, count: usize) -> DVector<f64> {
        let n = count as f64;
        let parent_velocity = self.velocity;
        let parent_energy = self.config.energy_ratio * parent_velocity.norm_squared();
        let area_ratio = self.config.area_ratio;

        let residual = move |v: &DVector<f64>| -> DVector<f64> {
            let speeds: Vec<f64> = (0..count)
                .map(|k| (v[2 * k] * v[2 * k] + v[2 * k + 1] * v[2 * k + 1]).sqrt())
                .collect();
            let dot = |a: usize, b: usize| v[2 * a] * v[2 * b] + v[2 * a + 1] * v[2 * b + 1];

            let mut rows = Vec::with_capacity(2 * count);

            // Conservation of momentum, per axis: the fragments' mean
            // velocity equals the parent's.
            for axis in 0..2 {
                let sum: f64 = (0..count).map(|k| v[2 * k + axis]).sum();
                rows.push(parent_velocity[axis] - sum / n);
            }

            // Conservation of energy, scaled by the injection multiplier.
            let speed_sq_sum: f64 = speeds.iter().map(|s| s * s).sum();
            rows.push(parent_energy - area_ratio / n * speed_sq_sum);

            // All fragments leave at the same speed.
            for k in 0..count.saturating_sub(1) {
                rows.push(speeds[k] - speeds[k + 1]);
            }

            // Uniform fan: consecutive velocity pairs subtend equal
            // angles, expressed through their dot products.
            for k in 0..count.saturating_sub(2) {
                rows.push(dot(k, k + 1) - dot(k + 1, k + 2));
            }

            DVector::from_vec(rows)
        };

        let solution = solver::solve_system(
            residual,
            DVector::zeros(2 * count),
            &SolverOptions::default(),
        );

        if !solution.converged {
            warn!(
                "fragment velocity solve stopped at residual {:.3e} after {} iterations; \
                 using best iterate",
                solution.residual_norm, solution.iterations
            );
        }

        solution.x
    }
}

impl Body for Asteroid {
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
    }
}

/// Inverse-CDF draw from Exp(mean = beta); `1 - U` keeps the log argument
/// away from zero.
fn sample_exponential<R: Rng>(beta: f64, rng: &mut R) -> f64 {
    -beta * (1.0 - rng.gen::<f64>()).ln()
}
