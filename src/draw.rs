//! Debug rendering systems.
//!
//! This module draws menu bounds, workspace volumes and linear handles with
//! Bevy's `Gizmos` API, colored by their current state.

use bevy::gizmos::config::{DefaultGizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;

use crate::handle_frame::HandleFrame;
use crate::linear_handle::{drive_linear_handles, HandleTip, LinearHandle};
use crate::math::OrientedBox;
use crate::systems::apply_menu_visibility;
use crate::types::{MenuHideFlags, MenuState, ViewerScale, VrMenu, Workspace};

/// Edges of a box as pairs of indices into [`OrientedBox::corners`].
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Visual style of the debug overlay.
#[derive(Resource, Clone, Debug)]
pub struct MenuDebugStyle {
    /// Line width for gizmo rendering (in pixels).
    pub line_width: f32,
    /// Depth bias to draw gizmos on top of regular geometry.
    pub depth_bias: f32,
    /// Whether to draw menu bounds.
    pub show_menus: bool,
    /// Whether to draw workspace volumes.
    pub show_workspaces: bool,
    /// Whether to draw linear handles.
    pub show_handles: bool,
    /// Color of a shown menu.
    pub visible_color: Color,
    /// Color of a menu hidden by the user.
    pub hidden_color: Color,
    /// Color of a menu hidden for a temporary reason.
    pub temporary_color: Color,
    /// Color of workspace volumes.
    pub workspace_color: Color,
    /// Color of idle handle axes.
    pub handle_color: Color,
    /// Color of a handle being dragged.
    pub handle_active_color: Color,
    /// Half length of the drawn handle axis.
    pub handle_length: f32,
    /// Size of the handle tip cross.
    pub tip_size: f32,
}

impl Default for MenuDebugStyle {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            depth_bias: -1.0,
            show_menus: true,
            show_workspaces: true,
            show_handles: true,
            visible_color: Color::srgb(0.25, 1.0, 0.25),
            hidden_color: Color::srgba(0.6, 0.6, 0.6, 0.5),
            temporary_color: Color::srgb(1.0, 0.6, 0.2),
            workspace_color: Color::srgb(0.25, 0.5, 1.0),
            handle_color: Color::srgb(0.8, 0.8, 0.8),
            handle_active_color: Color::srgb(1.0, 1.0, 0.8),
            handle_length: 0.25,
            tip_size: 0.02,
        }
    }
}

/// Optional overlay drawing menus, workspaces and handles.
///
/// Requires Bevy's gizmo rendering (included in `DefaultPlugins`).
pub struct MenuDebugDrawPlugin;

impl Plugin for MenuDebugDrawPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MenuDebugStyle>()
            .add_systems(Startup, configure_gizmos)
            .add_systems(
                Update,
                (draw_menu_bounds, draw_workspaces, draw_linear_handles)
                    .after(apply_menu_visibility)
                    .after(drive_linear_handles),
            );
    }
}

/// Configure Bevy's built-in gizmo renderer using our style resource.
pub fn configure_gizmos(mut config_store: ResMut<GizmoConfigStore>, style: Res<MenuDebugStyle>) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = style.line_width;
    config.depth_bias = style.depth_bias;
}

fn draw_box(gizmos: &mut Gizmos, bounds: &OrientedBox, color: Color) {
    let corners = bounds.corners();
    for (a, b) in BOX_EDGES {
        gizmos.line(corners[a], corners[b], color);
    }
}

fn menu_color(style: &MenuDebugStyle, state: &MenuState) -> Color {
    if state.applied.is_empty() {
        style.visible_color
    } else if state.applied.contains(MenuHideFlags::HIDDEN) {
        style.hidden_color
    } else {
        style.temporary_color
    }
}

/// Draw each menu's world-space bounds.
pub fn draw_menu_bounds(
    style: Res<MenuDebugStyle>,
    viewer_scale: Res<ViewerScale>,
    menus: Query<(&VrMenu, &MenuState, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    if !style.show_menus {
        return;
    }
    let scale = viewer_scale.0;
    for (menu, state, transform) in menus.iter() {
        let rotation = transform.rotation();
        let bounds = OrientedBox::new(
            transform.translation() + rotation * (menu.bounds.center * scale),
            menu.bounds.extents * scale,
            rotation,
        );
        draw_box(&mut gizmos, &bounds, menu_color(&style, state));
    }
}

/// Draw workspace volumes.
pub fn draw_workspaces(
    style: Res<MenuDebugStyle>,
    workspaces: Query<(&Workspace, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    if !style.show_workspaces {
        return;
    }
    for (workspace, transform) in workspaces.iter() {
        let (scale, rotation, translation) = transform.to_scale_rotation_translation();
        let bounds = OrientedBox::new(translation, workspace.half_extents * scale, rotation);
        draw_box(&mut gizmos, &bounds, style.workspace_color);
    }
}

/// Draw each handle's free axis and its tip.
pub fn draw_linear_handles(
    style: Res<MenuDebugStyle>,
    handles: Query<(&LinearHandle, &HandleTip, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    if !style.show_handles {
        return;
    }
    for (handle, tip, transform) in handles.iter() {
        let frame = HandleFrame::new(transform);
        let axis_dir = (frame.rotation * handle.axis.to_vec3()).normalize_or_zero();
        let color = if handle.is_dragging() {
            style.handle_active_color
        } else {
            style.handle_color
        };
        gizmos.line(
            frame.origin - axis_dir * style.handle_length,
            frame.origin + axis_dir * style.handle_length,
            color,
        );

        if tip.visible {
            let d = style.tip_size;
            gizmos.line(tip.position - Vec3::X * d, tip.position + Vec3::X * d, color);
            gizmos.line(tip.position - Vec3::Y * d, tip.position + Vec3::Y * d, color);
            gizmos.line(tip.position - Vec3::Z * d, tip.position + Vec3::Z * d, color);
        }

        if let Some(projector) = handle.projector() {
            let normal = projector.plane_normal();
            gizmos.line(frame.origin, frame.origin + normal * style.handle_length, color);
        }
    }
}
