//! Proximity checks and pursuit steering
//!
//! Populations are small, so every check is a plain Euclidean scan.

use glam::Vec2;

/// True when `a` and `b` are strictly closer than `radius`
#[inline]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// True when any point in `others` is within `radius` of `pos`
pub fn any_within<'a>(pos: Vec2, others: impl IntoIterator<Item = &'a Vec2>, radius: f32) -> bool {
    others.into_iter().any(|&o| within(pos, o, radius))
}

/// One step of pure pursuit from `pos` toward `target`.
///
/// Returns `pos` unchanged when the two coincide (no direction to move in).
pub fn pursue(pos: Vec2, target: Vec2, speed: f32) -> Vec2 {
    let to_target = target - pos;
    let dist = to_target.length();
    if dist <= f32::EPSILON {
        return pos;
    }
    pos + to_target / dist * speed
}
