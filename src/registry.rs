//! Per-device menu bookkeeping.
//!
//! The [`MenuRegistry`] owns one [`DeviceRecord`] per registered device, and
//! each device owns up to three [`MenuRecord`]s. User-driven changes (toggling
//! the main menu, moving the alternate menu, pointer hover) go through the
//! registry; the per-frame decision is made by
//! [`crate::MenuVisibilityResolver`].

use bevy::prelude::*;

use crate::error::MenuError;
use crate::types::{
    DeviceId, MainMenuActivator, MenuBounds, MenuHideFlags, MenuKind, PointerHover,
};

/// Hide reasons and show/hide timers of one menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HideState {
    /// Reasons the menu is hidden this tick.
    pub hide_flags: MenuHideFlags,
    /// Flags seen on the last tick that had any flag set.
    pub last_hide_flags: MenuHideFlags,
    /// Last time no temporary reason was present.
    pub auto_hide_time: f32,
    /// Last time any reason was present.
    pub auto_show_time: f32,
}

impl HideState {
    /// Creates a hide state with the given starting flags.
    pub fn new(hide_flags: MenuHideFlags) -> Self {
        Self {
            hide_flags,
            last_hide_flags: MenuHideFlags::HIDDEN,
            auto_hide_time: 0.0,
            auto_show_time: 0.0,
        }
    }
}

impl Default for HideState {
    fn default() -> Self {
        Self::new(MenuHideFlags::HIDDEN)
    }
}

/// One menu owned by a device.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuRecord {
    /// Content bounds in local space.
    pub bounds: MenuBounds,
    /// World-space position of the menu content.
    pub translation: Vec3,
    /// World-space rotation of the menu content.
    pub rotation: Quat,
    /// Whether the menu has input focus.
    pub focused: bool,
    /// Hide reasons and timers.
    pub hide: HideState,
    /// Flags last applied to the menu surface; empty means shown.
    pub applied: MenuHideFlags,
}

impl MenuRecord {
    fn new(bounds: MenuBounds, hide_flags: MenuHideFlags) -> Self {
        Self {
            bounds,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            focused: false,
            hide: HideState::new(hide_flags),
            applied: hide_flags,
        }
    }

    /// Whether no hide reason is present this tick.
    pub fn is_unflagged(&self) -> bool {
        self.hide.hide_flags.is_empty()
    }
}

/// One tracked input source and its menus.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    /// Device identity.
    pub id: DeviceId,
    /// World-space ray origin.
    pub ray_origin: Vec3,
    /// World-space ray direction.
    pub ray_direction: Vec3,
    /// Whether the device is tracked this tick.
    pub tracked: bool,
    /// Whether the device's current tool claims all of its input.
    pub exclusive_mode: bool,
    /// Main menu, if spawned.
    pub main: Option<MenuRecord>,
    /// Alternate menu, if spawned.
    pub alternate: Option<MenuRecord>,
    /// Custom menu, if spawned.
    pub custom: Option<MenuRecord>,
    /// Main menu activator state.
    pub activator: MainMenuActivator,
}

impl DeviceRecord {
    fn new(id: DeviceId) -> Self {
        Self {
            id,
            ray_origin: Vec3::ZERO,
            ray_direction: Vec3::NEG_Z,
            tracked: true,
            exclusive_mode: false,
            main: None,
            alternate: None,
            custom: None,
            activator: MainMenuActivator::default(),
        }
    }

    /// The menu of the given kind, if any.
    pub fn menu(&self, kind: MenuKind) -> Option<&MenuRecord> {
        match kind {
            MenuKind::Main => self.main.as_ref(),
            MenuKind::Alternate => self.alternate.as_ref(),
            MenuKind::Custom => self.custom.as_ref(),
        }
    }

    /// Mutable access to the menu of the given kind, if any.
    pub fn menu_mut(&mut self, kind: MenuKind) -> Option<&mut MenuRecord> {
        self.slot_mut(kind).as_mut()
    }

    fn slot_mut(&mut self, kind: MenuKind) -> &mut Option<MenuRecord> {
        match kind {
            MenuKind::Main => &mut self.main,
            MenuKind::Alternate => &mut self.alternate,
            MenuKind::Custom => &mut self.custom,
        }
    }

    /// All existing menus of the device.
    pub fn menus_mut(&mut self) -> impl Iterator<Item = &mut MenuRecord> {
        [
            self.main.as_mut(),
            self.alternate.as_mut(),
            self.custom.as_mut(),
        ]
        .into_iter()
        .flatten()
    }

    /// Adds `flags` to every existing menu of the device.
    pub(crate) fn flag_all_menus(&mut self, flags: MenuHideFlags) {
        for menu in self.menus_mut() {
            menu.hide.hide_flags |= flags;
        }
    }
}

/// All registered devices and their menus, in registration order.
///
/// Registration order is the enumeration order used whenever the
/// visibility pass needs to pick "the first other device".
#[derive(Resource, Debug, Clone, Default)]
pub struct MenuRegistry {
    devices: Vec<DeviceRecord>,
}

impl MenuRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new device.
    pub fn register_device(&mut self, id: DeviceId) -> Result<(), MenuError> {
        if self.device(id).is_some() {
            return Err(MenuError::DeviceAlreadyRegistered(id));
        }
        debug!("registered VR {id}");
        self.devices.push(DeviceRecord::new(id));
        Ok(())
    }

    /// Removes a device together with all of its menus.
    pub fn unregister_device(&mut self, id: DeviceId) -> Result<DeviceRecord, MenuError> {
        let index = self
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or(MenuError::UnknownDevice(id))?;
        debug!("unregistered VR {id}");
        Ok(self.devices.remove(index))
    }

    /// The device with the given id, if registered.
    pub fn device(&self, id: DeviceId) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Mutable access to the device with the given id, if registered.
    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut DeviceRecord> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    fn device_or_err(&mut self, id: DeviceId) -> Result<&mut DeviceRecord, MenuError> {
        self.device_mut(id).ok_or(MenuError::UnknownDevice(id))
    }

    /// Registered devices in registration order.
    pub fn devices(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.iter()
    }

    pub(crate) fn records_mut(&mut self) -> &mut [DeviceRecord] {
        &mut self.devices
    }

    /// Updates a device's ray and tracking state.
    pub fn set_device_ray(
        &mut self,
        id: DeviceId,
        origin: Vec3,
        direction: Vec3,
        tracked: bool,
    ) -> Result<(), MenuError> {
        let device = self.device_or_err(id)?;
        device.ray_origin = origin;
        device.ray_direction = direction;
        device.tracked = tracked;
        Ok(())
    }

    /// Marks whether the device is tracked. Untracked devices are skipped by
    /// the resolver and never receive a relocated alternate menu.
    pub fn set_tracked(&mut self, id: DeviceId, tracked: bool) -> Result<(), MenuError> {
        self.device_or_err(id)?.tracked = tracked;
        Ok(())
    }

    /// Marks whether the device's current tool claims all of its input.
    pub fn set_exclusive_mode(&mut self, id: DeviceId, exclusive: bool) -> Result<(), MenuError> {
        self.device_or_err(id)?.exclusive_mode = exclusive;
        Ok(())
    }

    /// Registers a menu for a device.
    ///
    /// Main and alternate menus start with [`MenuHideFlags::HIDDEN`] unless
    /// `visible` is set; custom menus are contextual and always start shown.
    pub fn register_menu(
        &mut self,
        device: DeviceId,
        kind: MenuKind,
        bounds: MenuBounds,
        visible: bool,
    ) -> Result<(), MenuError> {
        let record = self.device_or_err(device)?;
        let slot = record.slot_mut(kind);
        if slot.is_some() {
            return Err(MenuError::MenuAlreadyRegistered { device, kind });
        }
        let flags = if visible || kind == MenuKind::Custom {
            MenuHideFlags::empty()
        } else {
            MenuHideFlags::HIDDEN
        };
        *slot = Some(MenuRecord::new(bounds, flags));
        debug!("registered {kind} menu for {device}");
        Ok(())
    }

    /// Spawns a custom menu for `device` unless it already has one.
    ///
    /// Returns whether a menu was created.
    pub fn spawn_custom_menu(&mut self, device: DeviceId, bounds: MenuBounds) -> bool {
        match self.device_mut(device) {
            Some(record) if record.custom.is_none() => {
                record.custom = Some(MenuRecord::new(bounds, MenuHideFlags::empty()));
                debug!("spawned custom menu for {device}");
                true
            }
            _ => false,
        }
    }

    /// Removes one menu of a device.
    pub fn unregister_menu(
        &mut self,
        device: DeviceId,
        kind: MenuKind,
    ) -> Result<MenuRecord, MenuError> {
        self.device_or_err(device)?
            .slot_mut(kind)
            .take()
            .ok_or(MenuError::UnknownMenu { device, kind })
    }

    fn menu_or_err(&mut self, device: DeviceId, kind: MenuKind) -> Result<&mut MenuRecord, MenuError> {
        self.device_or_err(device)?
            .menu_mut(kind)
            .ok_or(MenuError::UnknownMenu { device, kind })
    }

    /// Updates the world pose of a menu.
    pub fn set_menu_pose(
        &mut self,
        device: DeviceId,
        kind: MenuKind,
        translation: Vec3,
        rotation: Quat,
    ) -> Result<(), MenuError> {
        let menu = self.menu_or_err(device, kind)?;
        menu.translation = translation;
        menu.rotation = rotation;
        Ok(())
    }

    /// Updates whether a menu has input focus.
    pub fn set_menu_focus(
        &mut self,
        device: DeviceId,
        kind: MenuKind,
        focused: bool,
    ) -> Result<(), MenuError> {
        self.menu_or_err(device, kind)?.focused = focused;
        Ok(())
    }

    /// Current hide reasons of a menu.
    pub fn hide_flags(&self, device: DeviceId, kind: MenuKind) -> Option<MenuHideFlags> {
        Some(self.device(device)?.menu(kind)?.hide.hide_flags)
    }

    /// Flags last applied to a menu surface; empty means shown.
    pub fn applied_flags(&self, device: DeviceId, kind: MenuKind) -> Option<MenuHideFlags> {
        Some(self.device(device)?.menu(kind)?.applied)
    }

    /// Main menu activator state of a device.
    pub fn activator(&self, device: DeviceId) -> Option<MainMenuActivator> {
        Some(self.device(device)?.activator)
    }

    /// Whether the device's main menu exists and is not toggled off.
    pub fn is_main_menu_visible(&self, device: DeviceId) -> bool {
        self.device(device)
            .and_then(|d| d.main.as_ref())
            .is_some_and(|m| !m.hide.hide_flags.contains(MenuHideFlags::HIDDEN))
    }

    /// Shows the alternate menu on `device` and hides it on every other device.
    ///
    /// With `visible == false` the alternate menu is hidden everywhere.
    pub fn set_alternate_menu_visibility(&mut self, device: DeviceId, visible: bool) {
        for record in &mut self.devices {
            let host = record.id == device && visible;
            if let Some(alternate) = record.alternate.as_mut() {
                alternate
                    .hide
                    .hide_flags
                    .set(MenuHideFlags::HIDDEN, !host);
            }
        }
    }

    /// Moves the alternate menu to `device` when it caused a selection.
    pub fn on_selection_changed(&mut self, device: DeviceId, has_selection: bool) {
        self.set_alternate_menu_visibility(device, has_selection);
    }

    /// Handles a press of `device`'s main menu activator.
    ///
    /// The pressing device toggles its main menu; every other main menu is
    /// hidden. Presses on a non-interactable activator are ignored. Returns
    /// whether the press was accepted.
    pub fn toggle_main_menu(&mut self, device: DeviceId) -> bool {
        if self
            .devices
            .iter()
            .any(|d| d.id == device && !d.activator.interactable)
        {
            trace!("ignored main menu toggle on {device}: activator not interactable");
            return false;
        }

        for index in 0..self.devices.len() {
            let mut relocate_alternate = false;
            {
                let record = &mut self.devices[index];
                let alternate_visible = record
                    .alternate
                    .as_ref()
                    .is_some_and(|m| !m.hide.hide_flags.contains(MenuHideFlags::HIDDEN));
                let custom_overridden = record
                    .custom
                    .as_ref()
                    .is_some_and(|m| m.hide.hide_flags.contains(MenuHideFlags::OTHER_MENU));
                let is_source = record.id == device;

                let Some(main) = record.main.as_mut() else {
                    continue;
                };

                // Showing through the activator is never delayed.
                main.hide.auto_show_time = 0.0;

                if is_source {
                    main.hide.hide_flags.toggle(MenuHideFlags::HIDDEN);
                    debug!(
                        "main menu on {device} toggled {}",
                        if main.hide.hide_flags.contains(MenuHideFlags::HIDDEN) {
                            "off"
                        } else {
                            "on"
                        }
                    );
                } else {
                    main.hide.hide_flags |= MenuHideFlags::HIDDEN;
                    relocate_alternate = custom_overridden && alternate_visible;
                }
            }

            if relocate_alternate {
                let owner = self.devices[index].id;
                let other_has_alternate = self
                    .devices
                    .iter()
                    .any(|d| d.id != owner && d.alternate.is_some());
                if other_has_alternate {
                    self.set_alternate_menu_visibility(device, true);
                }
            }
        }
        true
    }

    /// Records what `device`'s pointer is over and reports whether the hover
    /// is valid for that device.
    ///
    /// A pointer close enough to the device's open menu marks that menu with
    /// [`MenuHideFlags::OVER_UI`] for the current tick.
    pub fn check_pointer_hover(
        &mut self,
        device: DeviceId,
        hover: PointerHover,
        viewer_scale: f32,
        menu_hide_margin: f32,
    ) -> bool {
        let distance = match hover {
            PointerHover::Nothing => return true,
            PointerHover::OwnDevice => return self.device(device).is_none(),
            PointerHover::Surface { distance } => distance,
        };
        let Some(record) = self.device_mut(device) else {
            return true;
        };

        let main_flagged = record.main.as_ref().is_some_and(|m| !m.is_unflagged());
        let open_menu = if main_flagged && record.custom.is_some() {
            record.custom.as_mut()
        } else {
            record.main.as_mut()
        };
        let Some(open_menu) = open_menu else {
            return true;
        };

        let scaled_distance = distance / viewer_scale;
        if scaled_distance < open_menu.bounds.size().y + menu_hide_margin {
            open_menu.hide.hide_flags |= MenuHideFlags::OVER_UI;
            return true;
        }
        open_menu.hide.hide_flags.contains(MenuHideFlags::HIDDEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: DeviceId = DeviceId(0);
    const B: DeviceId = DeviceId(1);

    fn bounds() -> MenuBounds {
        MenuBounds::new(Vec3::ZERO, Vec3::new(0.2, 0.1, 0.01))
    }

    fn two_devices() -> MenuRegistry {
        let mut registry = MenuRegistry::new();
        for id in [A, B] {
            registry.register_device(id).unwrap();
            registry.register_menu(id, MenuKind::Main, bounds(), false).unwrap();
            registry.register_menu(id, MenuKind::Alternate, bounds(), false).unwrap();
        }
        registry
    }

    #[test]
    fn registration_rejects_duplicates_and_unknown_devices() {
        let mut registry = two_devices();
        assert_eq!(
            registry.register_device(A),
            Err(MenuError::DeviceAlreadyRegistered(A))
        );
        assert_eq!(
            registry.register_menu(A, MenuKind::Main, bounds(), true),
            Err(MenuError::MenuAlreadyRegistered {
                device: A,
                kind: MenuKind::Main
            })
        );
        assert_eq!(
            registry.register_menu(DeviceId(9), MenuKind::Main, bounds(), true),
            Err(MenuError::UnknownDevice(DeviceId(9)))
        );
        assert_eq!(
            registry.set_menu_focus(A, MenuKind::Custom, true),
            Err(MenuError::UnknownMenu {
                device: A,
                kind: MenuKind::Custom
            })
        );
    }

    #[test]
    fn new_menus_start_hidden_unless_visible_or_custom() {
        let mut registry = two_devices();
        assert_eq!(
            registry.hide_flags(A, MenuKind::Main),
            Some(MenuHideFlags::HIDDEN)
        );
        assert!(registry.spawn_custom_menu(A, bounds()));
        assert!(!registry.spawn_custom_menu(A, bounds()));
        assert_eq!(
            registry.hide_flags(A, MenuKind::Custom),
            Some(MenuHideFlags::empty())
        );

        registry.unregister_menu(B, MenuKind::Main).unwrap();
        registry.register_menu(B, MenuKind::Main, bounds(), true).unwrap();
        assert!(registry.is_main_menu_visible(B));
        assert_eq!(registry.applied_flags(B, MenuKind::Main), Some(MenuHideFlags::empty()));
    }

    #[test]
    fn alternate_menu_lives_on_one_device() {
        let mut registry = two_devices();
        registry.set_alternate_menu_visibility(B, true);
        assert_eq!(
            registry.hide_flags(B, MenuKind::Alternate),
            Some(MenuHideFlags::empty())
        );
        assert_eq!(
            registry.hide_flags(A, MenuKind::Alternate),
            Some(MenuHideFlags::HIDDEN)
        );

        registry.on_selection_changed(A, true);
        assert_eq!(
            registry.hide_flags(A, MenuKind::Alternate),
            Some(MenuHideFlags::empty())
        );
        assert_eq!(
            registry.hide_flags(B, MenuKind::Alternate),
            Some(MenuHideFlags::HIDDEN)
        );

        registry.set_alternate_menu_visibility(A, false);
        assert!(registry
            .devices()
            .all(|d| d.alternate.as_ref().unwrap().hide.hide_flags == MenuHideFlags::HIDDEN));
    }

    #[test]
    fn toggling_main_menu_hides_it_on_other_devices() {
        let mut registry = two_devices();
        assert!(registry.toggle_main_menu(B));
        assert!(registry.is_main_menu_visible(B));

        assert!(registry.toggle_main_menu(A));
        assert!(registry.is_main_menu_visible(A));
        assert!(!registry.is_main_menu_visible(B));

        assert!(registry.toggle_main_menu(A));
        assert!(!registry.is_main_menu_visible(A));
        assert_eq!(registry.device(A).unwrap().main.as_ref().unwrap().hide.auto_show_time, 0.0);
    }

    #[test]
    fn toggle_is_ignored_while_activator_is_disabled() {
        let mut registry = two_devices();
        registry.device_mut(A).unwrap().activator.interactable = false;
        assert!(!registry.toggle_main_menu(A));
        assert!(!registry.is_main_menu_visible(A));
    }

    #[test]
    fn toggle_moves_alternate_menu_off_an_overridden_custom_menu() {
        let mut registry = two_devices();
        assert!(registry.spawn_custom_menu(B, bounds()));
        registry.set_alternate_menu_visibility(B, true);
        registry
            .device_mut(B)
            .unwrap()
            .custom
            .as_mut()
            .unwrap()
            .hide
            .hide_flags |= MenuHideFlags::OTHER_MENU;

        registry.toggle_main_menu(A);
        assert_eq!(
            registry.hide_flags(A, MenuKind::Alternate),
            Some(MenuHideFlags::empty())
        );
        assert_eq!(
            registry.hide_flags(B, MenuKind::Alternate),
            Some(MenuHideFlags::HIDDEN)
        );
    }

    #[test]
    fn pointer_near_open_menu_marks_it_over_ui() {
        let mut registry = two_devices();
        registry.toggle_main_menu(A);

        // Menu height is 0.2; with the margin anything under 0.275 counts.
        assert!(registry.check_pointer_hover(A, PointerHover::Surface { distance: 0.25 }, 1.0, 0.075));
        assert_eq!(
            registry.hide_flags(A, MenuKind::Main),
            Some(MenuHideFlags::OVER_UI)
        );

        // Far away from a shown menu: the hover belongs to the menu's device.
        let mut registry = two_devices();
        registry.toggle_main_menu(A);
        assert!(!registry.check_pointer_hover(A, PointerHover::Surface { distance: 2.0 }, 1.0, 0.075));

        // Far away from a hidden menu: anything goes.
        assert!(registry.check_pointer_hover(B, PointerHover::Surface { distance: 2.0 }, 1.0, 0.075));
        assert!(!registry.check_pointer_hover(A, PointerHover::OwnDevice, 1.0, 0.075));
        assert!(registry.check_pointer_hover(DeviceId(7), PointerHover::OwnDevice, 1.0, 0.075));
        assert!(registry.check_pointer_hover(A, PointerHover::Nothing, 1.0, 0.075));
    }

    #[test]
    fn pointer_hover_uses_custom_menu_when_main_is_flagged() {
        let mut registry = two_devices();
        registry.spawn_custom_menu(A, bounds());
        assert!(registry.check_pointer_hover(A, PointerHover::Surface { distance: 0.1 }, 1.0, 0.075));
        assert_eq!(
            registry.hide_flags(A, MenuKind::Custom),
            Some(MenuHideFlags::OVER_UI)
        );
        assert_eq!(
            registry.hide_flags(A, MenuKind::Main),
            Some(MenuHideFlags::HIDDEN)
        );
    }

    #[test]
    fn unregistering_a_device_drops_its_menus() {
        let mut registry = two_devices();
        let record = registry.unregister_device(A).unwrap();
        assert!(record.main.is_some());
        assert!(registry.device(A).is_none());
        assert_eq!(registry.unregister_device(A), Err(MenuError::UnknownDevice(A)));
        assert_eq!(registry.devices().count(), 1);
    }
}
