//! Core types for the VR menu plugin.
//!
//! This module contains the public components, resources and messages used to
//! describe devices, menus, workspaces and handles to the plugin, and to read
//! back its visibility decisions.

use bevy::math::Ray3d;
use bevy::prelude::*;
use bitflags::bitflags;
use std::fmt;

/// Identity of one tracked input source ("hand").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// The three menu surfaces a device may own at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    /// The main menu, opened through the device's activator.
    Main,
    /// The alternate (radial) menu; only one device shows it at a time.
    Alternate,
    /// A contextual menu spawned opposite another device's ray.
    Custom,
}

impl MenuKind {
    /// All menu kinds, in the order they are visited during a tick.
    pub const ALL: [MenuKind; 3] = [MenuKind::Main, MenuKind::Alternate, MenuKind::Custom];
}

impl fmt::Display for MenuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuKind::Main => f.write_str("Main"),
            MenuKind::Alternate => f.write_str("Alternate"),
            MenuKind::Custom => f.write_str("Custom"),
        }
    }
}

bitflags! {
    /// Independent reasons a menu is currently not shown.
    ///
    /// An empty set means the menu is visible.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MenuHideFlags: u8 {
        /// Toggled off by the user. Sticky across ticks.
        const HIDDEN               = 0b0000_0001;
        /// The device's pointer is over this menu's own surface.
        const OVER_UI              = 0b0000_0010;
        /// The menu overlaps a workspace.
        const OVER_WORKSPACE       = 0b0000_0100;
        /// The device, or a nearby device, is holding an object.
        const HAS_DIRECT_SELECTION = 0b0000_1000;
        /// Another menu on the same device takes priority.
        const OTHER_MENU           = 0b0001_0000;
        /// Every flag that is recomputed each tick.
        const TEMPORARY = Self::OVER_UI.bits()
            | Self::OVER_WORKSPACE.bits()
            | Self::HAS_DIRECT_SELECTION.bits()
            | Self::OTHER_MENU.bits();
    }
}

impl Default for MenuHideFlags {
    fn default() -> Self {
        Self::HIDDEN
    }
}

/// Local-space bounding box of a menu's content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MenuBounds {
    /// Center of the box in the menu's local space.
    pub center: Vec3,
    /// Half size of the box along each local axis.
    pub extents: Vec3,
}

impl MenuBounds {
    /// Creates bounds from a center and half extents.
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self { center, extents }
    }

    /// Full size of the box.
    pub fn size(&self) -> Vec3 {
        self.extents * 2.0
    }
}

/// Identifies the single local axis a linear handle moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleAxis {
    /// The local X axis.
    X,
    /// The local Y axis.
    Y,
    /// The local Z axis.
    #[default]
    Z,
}

impl HandleAxis {
    /// Converts the axis to its corresponding unit vector.
    pub fn to_vec3(self) -> Vec3 {
        match self {
            HandleAxis::X => Vec3::X,
            HandleAxis::Y => Vec3::Y,
            HandleAxis::Z => Vec3::Z,
        }
    }

    /// Keeps only this axis' component of `v`.
    pub fn isolate(self, v: Vec3) -> Vec3 {
        v * self.to_vec3()
    }

    /// Zeroes this axis' component of `v`.
    pub fn flatten(self, v: Vec3) -> Vec3 {
        v - self.isolate(v)
    }
}

/// A tracked input source whose ray can open and interact with menus.
///
/// The entity's [`GlobalTransform`] is the ray origin; its forward direction
/// is the ray direction.
///
/// # Example
///
/// ```ignore
/// commands.spawn((
///     VrDevice::new(DeviceId(0)),
///     Transform::from_xyz(-0.2, 1.2, 0.0),
/// ));
/// ```
#[derive(Component, Debug, Clone, Copy)]
#[require(Transform, MainMenuActivator)]
pub struct VrDevice {
    /// Identity used to address the device in messages.
    pub id: DeviceId,
    /// Whether the input source is tracked this frame.
    pub tracked: bool,
}

impl VrDevice {
    /// Creates a tracked device.
    pub fn new(id: DeviceId) -> Self {
        Self { id, tracked: true }
    }
}

/// Held-object state of a device, as reported by the selection system.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectSelection {
    /// Number of objects currently held by the device.
    pub held_objects: usize,
    /// Whether the device is hovering a held object.
    pub hovering: bool,
    /// Whether the device is performing a two-handed scale.
    pub scaling: bool,
}

/// Marks a device whose current tool claims all of its input.
///
/// The alternate menu of such a device is always shown.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ExclusiveMode;

/// Main menu activator state of a device, written by the plugin.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainMenuActivator {
    /// Whether the activator can currently be pressed.
    pub interactable: bool,
    /// Whether the activator should move aside for the alternate menu.
    pub move_away: bool,
}

impl Default for MainMenuActivator {
    fn default() -> Self {
        Self {
            interactable: true,
            move_away: false,
        }
    }
}

/// A menu surface owned by a device.
///
/// The entity's [`GlobalTransform`] places the [`MenuBounds`] in the world.
/// The plugin writes [`MenuState`] and [`Visibility`] every frame.
///
/// # Example
///
/// ```ignore
/// commands.spawn((
///     VrMenu::new(DeviceId(0), MenuKind::Main, MenuBounds::new(Vec3::ZERO, Vec3::new(0.15, 0.1, 0.01))),
///     Transform::from_xyz(-0.2, 1.3, 0.2),
/// ));
/// ```
#[derive(Component, Debug, Clone, Copy)]
#[require(Transform, Visibility, MenuState)]
pub struct VrMenu {
    /// Owning device.
    pub device: DeviceId,
    /// Which of the device's menus this is.
    pub kind: MenuKind,
    /// Content bounds in local space.
    pub bounds: MenuBounds,
    /// Whether the menu currently has input focus.
    pub focused: bool,
    /// Whether the menu starts visible when registered.
    pub start_visible: bool,
}

impl VrMenu {
    /// Creates a menu that starts hidden (custom menus always start visible).
    pub fn new(device: DeviceId, kind: MenuKind, bounds: MenuBounds) -> Self {
        Self {
            device,
            kind,
            bounds,
            focused: false,
            start_visible: false,
        }
    }

    /// Makes the menu visible as soon as it is registered.
    pub fn visible(mut self) -> Self {
        self.start_visible = true;
        self
    }
}

/// Visibility decision for a menu, written by the plugin each frame.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
    /// Flags last applied to the menu; empty means visible.
    pub applied: MenuHideFlags,
}

impl MenuState {
    /// Whether the menu is shown.
    pub fn is_visible(&self) -> bool {
        self.applied.is_empty()
    }
}

/// A workspace volume that menus should not overlap.
#[derive(Component, Debug, Clone, Copy)]
#[require(Transform)]
pub struct Workspace {
    /// Half size of the workspace box in its local space.
    pub half_extents: Vec3,
}

/// Global multiplier applied to every spatial threshold and bound.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewerScale(pub f32);

impl Default for ViewerScale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Timing and distance settings for menu visibility.
#[derive(Resource, Debug, Clone)]
pub struct MenuVisibilityConfig {
    /// Seconds a temporary hide reason must persist before the main menu hides.
    pub auto_hide_delay: f32,
    /// Seconds after the last temporary hide reason before the main menu shows.
    pub auto_show_delay: f32,
    /// Distance (scaled by [`ViewerScale`]) under which another device is
    /// considered part of a two-handed interaction.
    pub two_hand_hide_distance: f32,
    /// Extra distance beyond a menu's height in which the pointer counts as
    /// being over it.
    pub menu_hide_margin: f32,
}

impl Default for MenuVisibilityConfig {
    fn default() -> Self {
        Self {
            auto_hide_delay: 0.125,
            auto_show_delay: 0.25,
            two_hand_hide_distance: 0.25,
            menu_hide_margin: 0.075,
        }
    }
}

/// What a device's pointer is currently over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerHover {
    /// Nothing, or the editor root itself.
    Nothing,
    /// UI that belongs to the same device.
    OwnDevice,
    /// Some other surface, at the given ray distance.
    Surface {
        /// Distance along the pointer ray.
        distance: f32,
    },
}

/// Request to toggle a device's main menu, as if its activator was pressed.
#[derive(Message, Debug, Clone, Copy)]
pub struct ToggleMainMenu {
    /// Device whose activator was pressed.
    pub device: DeviceId,
}

/// Request to show the alternate menu on one device and hide it on all others.
#[derive(Message, Debug, Clone, Copy)]
pub struct SetAlternateMenuVisibility {
    /// Device that should host the alternate menu.
    pub device: DeviceId,
    /// Whether it should be shown there; `false` hides it everywhere.
    pub visible: bool,
}

/// The editor selection changed while `device` was acting.
#[derive(Message, Debug, Clone, Copy)]
pub struct SelectionChanged {
    /// Device that caused the change.
    pub device: DeviceId,
    /// Whether anything is selected now.
    pub has_selection: bool,
}

/// Pointer hover state of a device for this frame.
#[derive(Message, Debug, Clone, Copy)]
pub struct PointerHoverReport {
    /// Reporting device.
    pub device: DeviceId,
    /// What the pointer is over.
    pub hover: PointerHover,
}

/// Phase of a ray interaction with a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePhase {
    /// The ray started hovering the handle.
    Enter,
    /// The ray keeps hovering the handle.
    Hover,
    /// The ray stopped hovering the handle.
    Exit,
    /// A drag started on the handle.
    BeginDrag,
    /// The drag continues.
    Drag,
    /// The drag ended.
    EndDrag,
}

/// A device ray interacting with a handle entity.
#[derive(Message, Debug, Clone, Copy)]
pub struct HandleRayEvent {
    /// The handle entity.
    pub handle: Entity,
    /// The interacting device.
    pub device: DeviceId,
    /// The device ray in world space.
    pub ray: Ray3d,
    /// Where the ray hit the handle, in world space.
    pub hit_point: Vec3,
    /// Interaction phase.
    pub phase: HandlePhase,
}

/// Displacement produced by one drag step of a [`crate::LinearHandle`].
#[derive(Message, Debug, Clone, Copy)]
pub struct LinearHandleDragged {
    /// The handle entity.
    pub handle: Entity,
    /// The dragging device.
    pub device: DeviceId,
    /// World-space displacement along the handle's free axis.
    pub delta: Vec3,
}
