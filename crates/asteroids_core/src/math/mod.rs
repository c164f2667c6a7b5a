//! Math types and numerical utilities
//!
//! Provides the vector aliases used throughout the simulation and the
//! nonlinear system solver backing asteroid fragmentation.

pub mod solver;

pub use nalgebra::{DMatrix, DVector, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f64>;

/// 3D vector type
///
/// The simulation is planar; dynamic quantities are carried with z = 0 so
/// that rotations can be expressed as cross products with the z axis.
pub type Vec3 = Vector3<f64>;
