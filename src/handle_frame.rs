//! Handle coordinate frame handling.
//!
//! This module provides the reference frame (origin, rotation, and the full
//! affine transform) of a handle, and the conversions between world space and
//! the handle's local space used while dragging.

use bevy::math::Affine3A;
use bevy::prelude::*;

use crate::types::HandleAxis;

/// Precomputed world/local conversions for a handle's reference transform.
#[derive(Clone, Copy, Debug)]
pub struct HandleFrame {
    /// World-space position of the handle.
    pub origin: Vec3,
    /// World-space rotation of the handle.
    pub rotation: Quat,
    affine: Affine3A,
    inverse: Affine3A,
}

impl HandleFrame {
    /// Captures the frame of a handle's global transform.
    pub fn new(transform: &GlobalTransform) -> Self {
        let affine = transform.affine();
        Self {
            origin: transform.translation(),
            rotation: transform.rotation(),
            affine,
            inverse: affine.inverse(),
        }
    }

    /// World point to handle-local space.
    pub fn local_point(&self, world: Vec3) -> Vec3 {
        self.inverse.transform_point3(world)
    }

    /// Handle-local point to world space.
    pub fn world_point(&self, local: Vec3) -> Vec3 {
        self.affine.transform_point3(local)
    }

    /// Normal of a plane through the origin that contains `axis` and faces
    /// `ray_origin`.
    ///
    /// Zero when `ray_origin` lies on the axis itself.
    pub fn drag_plane_normal(&self, ray_origin: Vec3, axis: HandleAxis) -> Vec3 {
        let toward = self.rotation.inverse() * (ray_origin - self.origin);
        self.rotation * axis.flatten(toward).normalize_or_zero()
    }

    /// Keeps only the `axis` component of a world-space displacement,
    /// measured in the handle's (scaled) local space.
    pub fn constrain_to_axis(&self, world_delta: Vec3, axis: HandleAxis) -> Vec3 {
        let local = self.inverse.transform_vector3(world_delta);
        self.affine.transform_vector3(axis.isolate(local))
    }

    /// Point on the handle's axis level with `world` along that axis.
    pub fn project_onto_axis(&self, world: Vec3, axis: HandleAxis) -> Vec3 {
        self.world_point(axis.isolate(self.local_point(world)))
    }
}
