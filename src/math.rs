//! Math utilities for menu overlap tests and handle ray intersections.

use bevy::math::Ray3d;
use bevy::prelude::*;

/// Threshold for considering vectors as parallel or zero-length.
const EPSILON: f32 = 1e-6;

/// Threshold for parallel plane/ray detection.
const PLANE_EPSILON: f32 = 1e-5;

/// A box in world space with its own rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space center.
    pub center: Vec3,
    /// Half size along each of the box' local axes.
    pub half_extents: Vec3,
    /// World-space rotation of the box.
    pub rotation: Quat,
}

impl OrientedBox {
    /// Creates an oriented box.
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// The box' local axes in world space.
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation * Vec3::X,
            self.rotation * Vec3::Y,
            self.rotation * Vec3::Z,
        ]
    }

    /// The eight corners of the box in world space.
    pub fn corners(&self) -> [Vec3; 8] {
        let [x, y, z] = self.axes();
        let (x, y, z) = (
            x * self.half_extents.x,
            y * self.half_extents.y,
            z * self.half_extents.z,
        );
        let c = self.center;
        [
            c - x - y - z,
            c + x - y - z,
            c + x + y - z,
            c - x + y - z,
            c - x - y + z,
            c + x - y + z,
            c + x + y + z,
            c - x + y + z,
        ]
    }

    /// Half length of the box' shadow on a unit `axis`.
    fn projected_radius(&self, axis: Vec3) -> f32 {
        self.axes()
            .iter()
            .zip(self.half_extents.to_array())
            .map(|(a, e)| a.dot(axis).abs() * e)
            .sum()
    }

    /// Separating-axis overlap test. Touching boxes overlap.
    pub fn intersects(&self, other: &OrientedBox) -> bool {
        let a = self.axes();
        let b = other.axes();
        let d = other.center - self.center;

        let face_axes = a.into_iter().chain(b);
        let edge_axes = a
            .into_iter()
            .flat_map(|ea| b.into_iter().map(move |eb| ea.cross(eb)));

        for axis in face_axes.chain(edge_axes) {
            // Parallel edges produce no separating axis of their own.
            if axis.length_squared() < EPSILON {
                continue;
            }
            let axis = axis.normalize();
            let distance = d.dot(axis).abs();
            if distance > self.projected_radius(axis) + other.projected_radius(axis) {
                return false;
            }
        }
        true
    }
}

/// Distance along `ray` to a plane, if the ray hits it in front of its origin.
///
/// Returns `None` for a ray parallel to the plane or a degenerate normal.
pub fn ray_plane_distance(ray: &Ray3d, plane_origin: Vec3, plane_normal: Vec3) -> Option<f32> {
    let denom = plane_normal.dot(*ray.direction);
    if denom.abs() < PLANE_EPSILON {
        return None;
    }
    let t = (plane_origin - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        None
    } else {
        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn separated_boxes_do_not_overlap() {
        let a = OrientedBox::new(Vec3::ZERO, Vec3::splat(0.5), Quat::IDENTITY);
        let b = OrientedBox::new(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(0.5), Quat::IDENTITY);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn nested_and_touching_boxes_overlap() {
        let outer = OrientedBox::new(Vec3::ZERO, Vec3::splat(2.0), Quat::IDENTITY);
        let inner = OrientedBox::new(Vec3::new(0.5, 0.5, 0.0), Vec3::splat(0.1), Quat::IDENTITY);
        assert!(outer.intersects(&inner));

        let touching = OrientedBox::new(Vec3::new(4.0, 0.0, 0.0), Vec3::splat(2.0), Quat::IDENTITY);
        assert!(outer.intersects(&touching));
    }

    #[test]
    fn rotation_decides_corner_overlap() {
        // An axis-aligned unit cube whose corner region is just out of reach.
        let a = OrientedBox::new(Vec3::ZERO, Vec3::splat(0.5), Quat::IDENTITY);
        let center = Vec3::new(1.2, 1.2, 0.0);
        let aligned = OrientedBox::new(center, Vec3::splat(0.5), Quat::IDENTITY);
        assert!(!a.intersects(&aligned));

        // Rotated 45 degrees, its corner reaches toward the origin.
        let rotated = OrientedBox::new(
            Vec3::new(1.1, 0.0, 0.0),
            Vec3::new(0.5, 0.5, 0.5),
            Quat::from_rotation_z(FRAC_PI_4),
        );
        assert!(a.intersects(&rotated));
    }

    #[test]
    fn plane_distance_handles_parallel_and_behind() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 5.0), Dir3::NEG_Z);
        assert_eq!(ray_plane_distance(&ray, Vec3::ZERO, Vec3::Z), Some(5.0));
        assert_eq!(ray_plane_distance(&ray, Vec3::ZERO, Vec3::X), None);
        assert_eq!(ray_plane_distance(&ray, Vec3::new(0.0, 0.0, 10.0), Vec3::Z), None);
        assert_eq!(ray_plane_distance(&ray, Vec3::ZERO, Vec3::ZERO), None);
    }
}
