//! Input events and controller responses
//!
//! The embedding shell translates raw keyboard input into the small typed
//! vocabulary below before handing it to the session controller. Responses
//! travel back the same way: a tagged variant instead of an ad-hoc tuple,
//! so callers match on what actually happened.

use crate::bullet::Bullet;

/// Semantic keys the simulation reacts to.
///
/// Mapping physical keys onto these is the shell's job; anything it cannot
/// map simply is not forwarded, and forwarded combinations the ship does
/// not handle (such as releasing the fire key) are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Main thruster.
    Thrust,
    /// Counterclockwise steering thruster.
    Left,
    /// Clockwise steering thruster.
    Right,
    /// Fire the gun.
    Fire,
}

/// A keyboard state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Key pressed.
    KeyDown(Key),
    /// Key released.
    KeyUp(Key),
}

/// Outbound event emitted by the session controller in response to input.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// The ship fired; the bullet has already been added to the session
    /// and is echoed here for the shell (sound effects, muzzle flash).
    BulletFired(Bullet),
}
