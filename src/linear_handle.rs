//! Single-axis drag handles.
//!
//! A [`LinearHandle`] turns device rays into displacements along one local
//! axis of the handle entity. The ray is intersected with a plane that
//! contains the axis and keeps turning to face the ray origin, so the ray is
//! never parallel to it while the user moves around.

use bevy::math::Ray3d;
use bevy::prelude::*;

use crate::handle_frame::HandleFrame;
use crate::math::ray_plane_distance;
use crate::types::{DeviceId, HandleAxis, HandlePhase, HandleRayEvent, LinearHandleDragged};

/// Default cap on how far along the ray a drag point may be placed.
pub const DEFAULT_MAX_DRAG_DISTANCE: f32 = 1000.0;

/// Projects device rays onto one local axis of a reference transform.
///
/// Created when a drag starts and dropped when it ends. The only state
/// carried between steps is the last world position the drag reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPlaneProjector {
    axis: HandleAxis,
    max_distance: f32,
    last_position: Vec3,
    plane_normal: Vec3,
}

impl DragPlaneProjector {
    /// Starts a drag at `hit_point`, with the ray currently at `ray_origin`.
    pub fn begin(
        hit_point: Vec3,
        ray_origin: Vec3,
        frame: &HandleFrame,
        axis: HandleAxis,
        max_distance: f32,
    ) -> Self {
        Self {
            axis,
            max_distance,
            last_position: hit_point,
            plane_normal: frame.drag_plane_normal(ray_origin, axis),
        }
    }

    /// World position reached by the previous step.
    pub fn last_position(&self) -> Vec3 {
        self.last_position
    }

    /// Normal of the drag plane used by the previous step.
    pub fn plane_normal(&self) -> Vec3 {
        self.plane_normal
    }

    /// Advances the drag with the current ray and returns the world-space
    /// displacement along the free axis.
    ///
    /// A ray that misses the plane leaves the position where it was, which
    /// yields a zero displacement.
    pub fn drag(&mut self, ray: &Ray3d, frame: &HandleFrame) -> Vec3 {
        self.plane_normal = frame.drag_plane_normal(ray.origin, self.axis);

        let world_position = ray_plane_distance(ray, frame.origin, self.plane_normal)
            .map(|distance| ray.get_point(distance.min(self.max_distance)))
            .unwrap_or(self.last_position);

        let delta = world_position - self.last_position;
        self.last_position = world_position;
        frame.constrain_to_axis(delta, self.axis)
    }
}

/// A handle that can be dragged along one of its local axes.
///
/// Feed it [`HandleRayEvent`]s; it writes [`LinearHandleDragged`] for every
/// drag step and keeps its [`HandleTip`] under the ray.
///
/// Only one device drags a handle at a time. Drag events from other devices
/// are ignored until the dragging device sends [`HandlePhase::EndDrag`].
///
/// # Example
///
/// ```ignore
/// commands.spawn((
///     LinearHandle::default(),
///     Transform::from_xyz(0.0, 1.0, 0.0),
/// ));
/// ```
#[derive(Component, Debug, Clone)]
#[require(Transform, HandleTip)]
pub struct LinearHandle {
    /// Local axis the handle moves along.
    pub axis: HandleAxis,
    /// Cap on the ray distance of a drag point.
    pub max_drag_distance: f32,
    /// Manipulator this handle belongs to, if any.
    pub manipulator: Option<Entity>,
    hover_count: u32,
    drag_device: Option<DeviceId>,
    projector: Option<DragPlaneProjector>,
}

impl Default for LinearHandle {
    fn default() -> Self {
        Self::new(HandleAxis::Z)
    }
}

impl LinearHandle {
    /// Creates a handle moving along `axis`.
    pub fn new(axis: HandleAxis) -> Self {
        Self {
            axis,
            max_drag_distance: DEFAULT_MAX_DRAG_DISTANCE,
            manipulator: None,
            hover_count: 0,
            drag_device: None,
            projector: None,
        }
    }

    /// Attaches the handle to a manipulator entity.
    pub fn with_manipulator(mut self, manipulator: Entity) -> Self {
        self.manipulator = Some(manipulator);
        self
    }

    /// Number of rays hovering the handle.
    pub fn hover_count(&self) -> u32 {
        self.hover_count
    }

    /// Device currently dragging the handle.
    pub fn drag_device(&self) -> Option<DeviceId> {
        self.drag_device
    }

    /// Whether a device is dragging the handle.
    pub fn is_dragging(&self) -> bool {
        self.drag_device.is_some()
    }

    /// The projector of the drag in progress, if any.
    pub fn projector(&self) -> Option<&DragPlaneProjector> {
        self.projector.as_ref()
    }

    /// Applies one ray event and returns the drag displacement, if this was a
    /// drag step of the dragging device.
    pub fn handle_ray(&mut self, event: &HandleRayEvent, frame: &HandleFrame) -> Option<Vec3> {
        let owns_drag = self.drag_device == Some(event.device);
        match event.phase {
            HandlePhase::Enter => self.hover_count += 1,
            HandlePhase::Exit => self.hover_count = self.hover_count.saturating_sub(1),
            HandlePhase::Hover => {}
            HandlePhase::BeginDrag if self.drag_device.is_none() => {
                self.drag_device = Some(event.device);
                self.projector = Some(DragPlaneProjector::begin(
                    event.hit_point,
                    event.ray.origin,
                    frame,
                    self.axis,
                    self.max_drag_distance,
                ));
            }
            HandlePhase::Drag if owns_drag => {
                return self
                    .projector
                    .as_mut()
                    .map(|projector| projector.drag(&event.ray, frame));
            }
            HandlePhase::EndDrag if owns_drag => {
                self.drag_device = None;
                self.projector = None;
            }
            HandlePhase::BeginDrag | HandlePhase::Drag | HandlePhase::EndDrag => {
                trace!(
                    "{:?} from {} ignored, drag owned by {:?}",
                    event.phase,
                    event.device,
                    self.drag_device
                );
            }
        }
        None
    }
}

/// Marker at the point of a [`LinearHandle`]'s axis under the ray.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct HandleTip {
    /// Whether the tip is shown.
    pub visible: bool,
    /// World-space tip position.
    pub position: Vec3,
}

impl HandleTip {
    fn update(&mut self, handle: &LinearHandle, frame: &HandleFrame, hit_point: Vec3) {
        self.visible = handle.hover_count > 0 || handle.is_dragging();
        if self.visible {
            self.position = frame.project_onto_axis(hit_point, handle.axis);
        }
    }
}

/// Route ray events to their handles and emit drag displacements.
pub fn drive_linear_handles(
    mut events: MessageReader<HandleRayEvent>,
    mut handles: Query<(&GlobalTransform, &mut LinearHandle, &mut HandleTip)>,
    mut dragged: MessageWriter<LinearHandleDragged>,
) {
    for event in events.read() {
        let Ok((transform, mut handle, mut tip)) = handles.get_mut(event.handle) else {
            trace!("ray event for missing handle {:?}", event.handle);
            continue;
        };
        let frame = HandleFrame::new(transform);

        let delta = handle.handle_ray(event, &frame);
        let hit_point = match (&delta, handle.projector()) {
            (Some(_), Some(projector)) => projector.last_position(),
            _ => event.hit_point,
        };
        tip.update(&handle, &frame, hit_point);

        if let Some(delta) = delta {
            dragged.write(LinearHandleDragged {
                handle: event.handle,
                device: event.device,
                delta,
            });
        }
    }
}
