//! # Asteroids Core
//!
//! The simulation core of a real-time Asteroids game: ship dynamics,
//! asteroid fragmentation, bullet ballistics, and the session controller
//! that ties them together. Rendering, audio, and the event loop belong to
//! an embedding shell; this crate exposes a typed, frame-driven API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use asteroids_core::{Color, Game, GameConfig, InputEvent, Key, TickStatus};
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     asteroids_core::logging::init();
//!
//!     let config = GameConfig::load_or_default(None)?;
//!     let mut game = Game::new(config, Color::WHITE, SmallRng::from_entropy());
//!
//!     let _ = game.handle_event(InputEvent::KeyDown(Key::Fire));
//!     while game.tick(1.0 / 30.0) == TickStatus::Playing {
//!         for sprite in game.sprites() {
//!             // hand sprite.position, sprite.heading, sprite.radius to
//!             // the renderer
//!             let _ = sprite;
//!         }
//!     }
//!     println!("final score: {}", game.score());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod asteroid;
pub mod body;
pub mod bullet;
pub mod config;
pub mod events;
pub mod game;
pub mod logging;
pub mod math;
pub mod ship;

pub use asteroid::Asteroid;
pub use body::{Body, Color};
pub use bullet::Bullet;
pub use config::{ConfigError, GameConfig};
pub use events::{GameEvent, InputEvent, Key};
pub use game::{Game, SpriteKind, SpriteState, TickStatus};
pub use ship::Ship;
