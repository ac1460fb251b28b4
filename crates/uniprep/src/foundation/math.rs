//! Math utilities and types
//!
//! Provides the vector and rotation types used by the mesh tooling, plus the
//! approximate comparisons used when merging vertices.

use approx::AbsDiffEq;

pub use nalgebra::{Unit, UnitQuaternion, Vector2, Vector3};

/// 2D vector type (UV coordinates)
pub type Vec2 = Vector2<f32>;

/// 3D vector type (vertex positions)
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Component-wise comparison of two UV coordinates within `epsilon`
pub fn approx_eq_vec2(a: &Vec2, b: &Vec2, epsilon: f32) -> bool {
    a.abs_diff_eq(b, epsilon)
}

/// Component-wise comparison of two positions within `epsilon`
pub fn approx_eq_vec3(a: &Vec3, b: &Vec3, epsilon: f32) -> bool {
    a.abs_diff_eq(b, epsilon)
}

/// Build a rotation from Euler angles in degrees.
///
/// Rotations are applied around Z first, then X, then Y, which is the usual
/// convention for game editors with a Y-up world.
pub fn euler_degrees(angles: Vec3) -> Quat {
    let x = Quat::from_axis_angle(&Vec3::x_axis(), angles.x.to_radians());
    let y = Quat::from_axis_angle(&Vec3::y_axis(), angles.y.to_radians());
    let z = Quat::from_axis_angle(&Vec3::z_axis(), angles.z.to_radians());
    y * x * z
}

/// Rotate `point` around `pivot` by Euler angles in degrees
pub fn rotate_point_around_pivot(point: Vec3, pivot: Vec3, angles: Vec3) -> Vec3 {
    euler_degrees(angles) * (point - pivot) + pivot
}

/// Rotate a 2D point around `center` by `degrees` counter-clockwise.
///
/// Works in polar form: the distance to the center is kept and the angle is
/// advanced, so the result is exact up to trigonometric rounding.
pub fn rotate_point_2d(point: Vec2, center: Vec2, degrees: f32) -> Vec2 {
    let offset = point - center;
    let radius = offset.norm();
    let angle = offset.y.atan2(offset.x).to_degrees() + degrees;
    let radians = angle.to_radians();
    Vec2::new(
        radius.mul_add(radians.cos(), center.x),
        radius.mul_add(radians.sin(), center.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_euler_z_rotation() {
        let rotated = rotate_point_around_pivot(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, 90.0),
        );
        assert_relative_eq!(rotated, Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_euler_order_z_then_x() {
        // Z turns +X into +Y, then X turns +Y into +Z
        let rotated = euler_degrees(Vec3::new(90.0, 0.0, 90.0)) * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_around_pivot_keeps_pivot() {
        let pivot = Vec3::new(2.0, 3.0, 4.0);
        let rotated = rotate_point_around_pivot(pivot, pivot, Vec3::new(12.0, 45.0, 80.0));
        assert_relative_eq!(rotated, pivot, epsilon = EPSILON);
    }

    #[test]
    fn test_rotate_point_2d_quarter_turn() {
        let rotated = rotate_point_2d(Vec2::new(2.0, 1.0), Vec2::new(1.0, 1.0), 90.0);
        assert_relative_eq!(rotated, Vec2::new(1.0, 2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq_vec2(&Vec2::new(0.5, 0.5), &Vec2::new(0.5, 0.500_001), 1e-5));
        assert!(!approx_eq_vec3(&Vec3::zeros(), &Vec3::new(0.0, 0.1, 0.0), 1e-5));
    }
}
