//! Gameplay configuration
//!
//! The core consumes a flat set of named numeric parameters grouped per
//! entity type. Two sources exist: built-in defaults (used when no config
//! file is supplied) and a TOML or RON file. A supplied file must be
//! complete: missing sections or fields are a hard [`ConfigError`], never
//! silently defaulted, so a partially edited config fails at load time
//! rather than surfacing as odd gameplay.

use serde::{Deserialize, Serialize};

/// Display parameters consumed by the embedding shell.
///
/// The core itself only uses `width`/`height`, which define the toroidal
/// wrap window for every body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Window width in pixels.
    pub width: u32,

    /// Window height in pixels.
    pub height: u32,

    /// Target frame rate in frames per second.
    pub frame_rate: u32,
}

/// Ship geometry, dynamics, and fire-control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipConfig {
    /// Hull length in pixels (nose to tail).
    pub length: f64,

    /// Hull width in pixels.
    pub width: f64,

    /// Outline stroke width in pixels, forwarded to the renderer.
    pub edge_width: f64,

    /// Main thruster acceleration in pixels per second squared.
    pub linear_acceleration: f64,

    /// Steering thruster acceleration in radians per second squared.
    pub angular_acceleration: f64,

    /// Seconds between shots.
    pub reload_period: f64,
}

/// Asteroid spawn-distribution and fragmentation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidConfig {
    /// Smallest diameter that may exist, in pixels. Fragments that would
    /// come out smaller than this vanish instead of spawning.
    pub minimum_diameter: f64,

    /// Median of the spawn diameter distribution, in pixels.
    pub median_diameter: f64,

    /// Smallest spawn speed, in pixels per second.
    pub minimum_speed: f64,

    /// Median of the spawn speed distribution, in pixels per second.
    pub median_speed: f64,

    /// Outline stroke width in pixels, forwarded to the renderer.
    pub edge_width: f64,

    /// Fraction of a parent's area conserved across all of its fragments.
    pub area_ratio: f64,

    /// Multiplier on the kinetic energy fragments carry relative to the
    /// parent at explosion; values above 1 model energy injected by the
    /// blast.
    pub energy_ratio: f64,
}

/// Bullet parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletConfig {
    /// Bullet diameter in pixels.
    pub diameter: f64,

    /// Speed added along the firing direction on top of the gun's own
    /// velocity, in pixels per second.
    pub muzzle_speed: f64,

    /// Seconds a bullet survives before fading out.
    pub lifespan: f64,
}

/// Session-level gameplay parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lives at session start.
    pub initial_lives: u32,

    /// Asteroids spawned per level.
    pub asteroid_count: u32,

    /// Fragments produced when an asteroid explodes.
    pub fragment_count: u32,

    /// Seconds between losing the ship and respawning.
    pub respawn_period: f64,
}

/// Complete configuration for a game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Display parameters.
    pub display: DisplayConfig,

    /// Ship parameters.
    pub ship: ShipConfig,

    /// Asteroid parameters.
    pub asteroid: AsteroidConfig,

    /// Bullet parameters.
    pub bullet: BulletConfig,

    /// Session parameters (the `[game]` section of a config file).
    #[serde(rename = "game")]
    pub session: SessionConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 562,
            frame_rate: 30,
        }
    }
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            length: 30.0,
            width: 30.0,
            edge_width: 2.0,
            linear_acceleration: 100.0,
            angular_acceleration: std::f64::consts::TAU,
            reload_period: 1.0,
        }
    }
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            minimum_diameter: 30.0,
            median_diameter: 60.0,
            minimum_speed: 0.0,
            median_speed: 50.0,
            edge_width: 2.0,
            area_ratio: 0.75,
            energy_ratio: 1.1,
        }
    }
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            diameter: 5.0,
            muzzle_speed: 100.0,
            lifespan: 5.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_lives: 3,
            asteroid_count: 3,
            fragment_count: 2,
            respawn_period: 3.0,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            ship: ShipConfig::default(),
            asteroid: AsteroidConfig::default(),
            bullet: BulletConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML or RON file, dispatched on the file
    /// extension. Every section and field must be present.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Load from a file when a path is given, otherwise fall back to the
    /// built-in defaults for every parameter.
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
