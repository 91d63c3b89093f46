//! Collision detection for circles and axis-aligned rectangles
//!
//! Everything here is pure: no state, no side effects. Rectangles are given by
//! their top-left corner and size, matching how obstacles are stored.

use glam::Vec2;

use super::obstacle::Obstacle;

/// Closest point inside the rectangle to `point`
#[inline]
pub fn closest_point_on_rect(point: Vec2, rect_pos: Vec2, rect_size: Vec2) -> Vec2 {
    point.clamp(rect_pos, rect_pos + rect_size)
}

/// Distance from `point` to the rectangle (zero when inside)
#[inline]
pub fn rect_distance(point: Vec2, rect_pos: Vec2, rect_size: Vec2) -> f32 {
    point.distance(closest_point_on_rect(point, rect_pos, rect_size))
}

/// Circle vs axis-aligned rectangle.
///
/// Clamps the circle center to the rectangle and compares squared distance
/// against r². Touching counts as a hit.
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect_pos: Vec2, rect_size: Vec2) -> bool {
    let closest = closest_point_on_rect(center, rect_pos, rect_size);
    center.distance_squared(closest) <= radius * radius
}

/// Circle vs circle (touching counts as a hit)
pub fn circle_intersects_circle(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}

/// Result of a nearest-obstacle scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestObstacle {
    /// Stable ID of the closest obstacle
    pub id: u32,
    /// Distance from the probe point to the obstacle's rectangle
    pub distance: f32,
}

/// Find the obstacle closest to `point`.
///
/// Returns `None` for an empty population. On ties the first obstacle in
/// iteration order wins.
pub fn nearest_rect_distance(point: Vec2, obstacles: &[Obstacle]) -> Option<NearestObstacle> {
    let mut best: Option<NearestObstacle> = None;
    for obstacle in obstacles {
        let distance = rect_distance(point, obstacle.pos, obstacle.size);
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(NearestObstacle {
                id: obstacle.id,
                distance,
            });
        }
    }
    best
}

/// Whether a circle overlaps any obstacle
pub fn circle_hits_any(center: Vec2, radius: f32, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .any(|o| circle_intersects_rect(center, radius, o.pos, o.size))
}
