//! VR menu visibility and drag handle plugin for Bevy 0.18.
//!
//! This crate decides, every frame, which in-world menus of each tracked
//! input device ("hand") are shown. It reconciles several devices, several
//! menus per device, overlap with workspaces, held objects and timed
//! show/hide hysteresis into one flicker-free decision. It also provides a
//! single-axis drag handle for VR manipulators.
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_vr_menus::{DeviceId, MenuBounds, MenuKind, VrDevice, VrMenu, VrMenuPlugin};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(VrMenuPlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     let hand = DeviceId(0);
//!     commands.spawn((VrDevice::new(hand), Transform::from_xyz(-0.2, 1.2, 0.0)));
//!     commands.spawn((
//!         VrMenu::new(hand, MenuKind::Main, MenuBounds::new(Vec3::ZERO, Vec3::new(0.15, 0.1, 0.01))),
//!         Transform::from_xyz(-0.2, 1.35, 0.1),
//!     ));
//! }
//! ```
//!
//! # Features
//!
//! - **Per-hand menus**: main, alternate and custom menus for every device
//! - **Suppression**: menus hide over workspaces, while holding objects, and
//!   when another menu of the same hand takes priority
//! - **Hysteresis**: temporary hide reasons apply after a short delay, so menus
//!   don't flicker
//! - **Linear handles**: ray-driven dragging along one local axis
//! - **Debug overlay**: optional gizmo drawing via [`MenuDebugDrawPlugin`]
//!
//! # Configuration
//!
//! - [`MenuVisibilityConfig`]: hide/show delays and distances
//! - [`ViewerScale`]: world scale applied to all spatial thresholds
//! - [`MenuDebugStyle`]: colors and toggles of the debug overlay
//!
//! The visibility pass itself ([`MenuRegistry`] + [`MenuVisibilityResolver`])
//! does not depend on the ECS and can be driven directly.

#![warn(missing_docs)]

use bevy::prelude::*;

mod draw;
mod error;
mod handle_frame;
mod linear_handle;
mod manipulators;
mod math;
mod registry;
mod resolver;
mod systems;
mod types;

pub use draw::{MenuDebugDrawPlugin, MenuDebugStyle};
pub use error::MenuError;
pub use handle_frame::HandleFrame;
pub use linear_handle::{DragPlaneProjector, HandleTip, LinearHandle, DEFAULT_MAX_DRAG_DISTANCE};
pub use manipulators::{Manipulator, ManipulatorVisibility};
pub use math::OrientedBox;
pub use registry::{DeviceRecord, HideState, MenuRecord, MenuRegistry};
pub use resolver::{
    MenuVisibilityResolver, OverlapHit, ResolveContext, SelectionQuery, SpatialQuery,
    MAX_WORKSPACE_OVERLAPS,
};
pub use types::{
    DeviceId, DirectSelection, ExclusiveMode, HandleAxis, HandlePhase, HandleRayEvent,
    LinearHandleDragged, MainMenuActivator, MenuBounds, MenuHideFlags, MenuKind, MenuState,
    MenuVisibilityConfig, PointerHover, PointerHoverReport, SelectionChanged,
    SetAlternateMenuVisibility, ToggleMainMenu, ViewerScale, VrDevice, VrMenu, Workspace,
};

use crate::linear_handle::drive_linear_handles;
use crate::manipulators::update_manipulators;
use crate::systems::{
    apply_menu_visibility, handle_menu_requests, register_menu_entities,
    resolve_menu_visibility, sync_menu_registry, MenuEntities,
};

/// Plugin that enables VR menu visibility and linear handles.
///
/// Add this plugin to your Bevy app, then spawn [`VrDevice`], [`VrMenu`],
/// [`Workspace`] and [`LinearHandle`] entities. The plugin registers the
/// necessary resources, messages and systems.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_vr_menus::VrMenuPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(VrMenuPlugin)
///     .run();
/// ```
pub struct VrMenuPlugin;

impl Plugin for VrMenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MenuRegistry>()
            .init_resource::<MenuVisibilityResolver>()
            .init_resource::<MenuEntities>()
            .init_resource::<MenuVisibilityConfig>()
            .init_resource::<ViewerScale>()
            .init_resource::<ManipulatorVisibility>()
            .add_message::<ToggleMainMenu>()
            .add_message::<SetAlternateMenuVisibility>()
            .add_message::<SelectionChanged>()
            .add_message::<PointerHoverReport>()
            .add_message::<HandleRayEvent>()
            .add_message::<LinearHandleDragged>()
            .add_systems(
                Update,
                (
                    register_menu_entities,
                    sync_menu_registry,
                    handle_menu_requests,
                    resolve_menu_visibility,
                    apply_menu_visibility,
                )
                    .chain(),
            )
            .add_systems(Update, (drive_linear_handles, update_manipulators).chain());
    }
}
