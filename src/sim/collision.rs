//! Ball vs. boundary collision detection and response
//!
//! The boundary is a circle the balls live inside. A ball touches it when
//! its far edge reaches the wall: `|pos - center| + radius >= boundary.radius`.

use glam::Vec2;

use super::state::{Ball, Boundary};

/// Contact between a ball and the boundary wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryContact {
    /// Unit vector from the boundary center toward the ball
    pub normal: Vec2,
    /// Distance of the ball center from the boundary center
    pub distance: f32,
    /// How far the ball's edge is past the wall
    pub penetration: f32,
}

/// Check whether `ball` touches or crosses the boundary wall
pub fn boundary_contact(ball: &Ball, boundary: &Boundary) -> Option<BoundaryContact> {
    let offset = ball.pos - boundary.center;
    let distance = offset.length();

    if distance + ball.radius < boundary.radius {
        return None;
    }

    Some(BoundaryContact {
        normal: contact_normal(offset, ball.vel),
        distance,
        penetration: distance + ball.radius - boundary.radius,
    })
}

/// Outward normal for a center offset.
///
/// A ball sitting exactly on the center has no defined direction; fall back
/// to its direction of travel, then to +x.
pub fn contact_normal(offset: Vec2, vel: Vec2) -> Vec2 {
    offset
        .try_normalize()
        .or_else(|| vel.try_normalize())
        .unwrap_or(Vec2::X)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Position that puts `ball` flush against the inside of the wall along `normal`
#[inline]
pub fn resting_position(boundary: &Boundary, normal: Vec2, ball_radius: f32) -> Vec2 {
    boundary.center + normal * (boundary.radius - ball_radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PALETTE;

    fn ball_at(pos: Vec2, vel: Vec2, radius: f32) -> Ball {
        Ball {
            pos,
            vel,
            radius,
            color: PALETTE[0],
        }
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(3.0, 4.0), Vec2::new(1.0, 0.0));
        assert_eq!(reflected, Vec2::new(-3.0, 4.0));
    }

    #[test]
    fn test_reflect_preserves_speed() {
        let normal = Vec2::new(1.0, 1.0).normalize();
        let velocity = Vec2::new(7.0, -2.0);
        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.length() - velocity.length()).abs() < 1e-4);
    }

    #[test]
    fn test_no_contact_inside() {
        let boundary = Boundary::fixed(Vec2::ZERO, 250.0);
        let ball = ball_at(Vec2::new(200.0, 0.0), Vec2::X, 20.0);
        assert!(boundary_contact(&ball, &boundary).is_none());
    }

    #[test]
    fn test_contact_when_touching() {
        let boundary = Boundary::fixed(Vec2::ZERO, 250.0);
        let ball = ball_at(Vec2::new(0.0, 230.0), Vec2::Y, 20.0);
        let contact = boundary_contact(&ball, &boundary).unwrap();
        assert!(contact.normal.abs_diff_eq(Vec2::Y, 1e-5));
        assert_eq!(contact.distance, 230.0);
        assert_eq!(contact.penetration, 0.0);
    }

    #[test]
    fn test_contact_off_center_boundary() {
        let boundary = Boundary::fixed(Vec2::new(400.0, 300.0), 250.0);
        let ball = ball_at(Vec2::new(400.0 - 240.0, 300.0), Vec2::ZERO, 20.0);
        let contact = boundary_contact(&ball, &boundary).unwrap();
        assert!(contact.normal.abs_diff_eq(Vec2::new(-1.0, 0.0), 1e-5));
        assert!((contact.penetration - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_normal_uses_velocity() {
        let normal = contact_normal(Vec2::ZERO, Vec2::new(0.0, -3.0));
        assert!(normal.abs_diff_eq(Vec2::new(0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_degenerate_normal_default() {
        assert_eq!(contact_normal(Vec2::ZERO, Vec2::ZERO), Vec2::X);
    }

    #[test]
    fn test_degenerate_contact_is_finite() {
        // Ball bigger than the boundary, parked on the center
        let boundary = Boundary::fixed(Vec2::ZERO, 10.0);
        let ball = ball_at(Vec2::ZERO, Vec2::ZERO, 20.0);
        let contact = boundary_contact(&ball, &boundary).unwrap();
        assert!(contact.normal.is_finite());
        assert_eq!(contact.normal.length(), 1.0);
    }

    #[test]
    fn test_resting_position() {
        let boundary = Boundary::fixed(Vec2::new(400.0, 300.0), 250.0);
        let pos = resting_position(&boundary, Vec2::Y, 30.0);
        assert_eq!(pos, Vec2::new(400.0, 520.0));
    }
}
