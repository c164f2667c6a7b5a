//! Shared body capability and boundary wraparound
//!
//! Every sprite in the simulation (ship, bullet, asteroid) exposes the same
//! small surface to the session controller: a position, a bounding extent,
//! a liveness flag, and a time-step rule. The controller only ever talks to
//! this trait; concrete behavior lives with each type.

use crate::math::Vec2;

/// RGB color attached to a body at spawn time and forwarded untouched to
/// the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// White, the classic foreground.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Creates a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Capability shared by every simulated body.
pub trait Body {
    /// Center position in display-surface coordinates.
    fn position(&self) -> Vec2;

    /// Moves the body; used by boundary wraparound.
    fn set_position(&mut self, position: Vec2);

    /// Axis-aligned bounding size `(width, height)` in pixels.
    fn extent(&self) -> (f64, f64);

    /// Whether the body still participates in physics, collision, and
    /// rendering. Dead bodies stay in storage until pruned but receive no
    /// further calls from the controller.
    fn is_alive(&self) -> bool;

    /// Advances the body's own dynamics by `dt` seconds.
    fn advance(&mut self, dt: f64);
}

/// Applies toroidal topology: a body whose bounding box has fully crossed a
/// window edge re-enters from the opposite side.
///
/// Dead bodies are left untouched.
pub fn wrap<B: Body + ?Sized>(body: &mut B, window_size: Vec2) {
    if !body.is_alive() {
        return;
    }

    let (width, height) = body.extent();
    let mut position = body.position();

    if position.x < -width / 2.0 {
        position.x = window_size.x + width / 2.0;
    } else if position.x > window_size.x + width / 2.0 {
        position.x = -width / 2.0;
    }

    if position.y < -height / 2.0 {
        position.y = window_size.y + height / 2.0;
    } else if position.y > window_size.y + height / 2.0 {
        position.y = -height / 2.0;
    }

    body.set_position(position);
}
