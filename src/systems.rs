//! Menu systems.
//!
//! This module mirrors device and menu entities into the [`MenuRegistry`],
//! applies user requests, runs the [`MenuVisibilityResolver`] once per frame,
//! and writes the decisions back to the entities.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::error::MenuError;
use crate::math::OrientedBox;
use crate::registry::MenuRegistry;
use crate::resolver::{
    MenuVisibilityResolver, OverlapHit, ResolveContext, SelectionQuery, SpatialQuery,
};
use crate::types::{
    DeviceId, DirectSelection, ExclusiveMode, MainMenuActivator, MenuKind, MenuState,
    MenuVisibilityConfig, PointerHoverReport, SelectionChanged, SetAlternateMenuVisibility,
    ToggleMainMenu, ViewerScale, VrDevice, VrMenu, Workspace,
};

/// Which registry entries the plugin created for which entities.
#[derive(Resource, Debug, Default)]
pub struct MenuEntities {
    devices: HashMap<Entity, DeviceId>,
    menus: HashMap<Entity, (DeviceId, MenuKind)>,
    /// Menus whose device is not registered (yet, or any more).
    pending: Vec<Entity>,
}

/// Register new devices and menus, and drop despawned ones.
///
/// A menu spawned before its device, or outliving a despawned device, waits
/// in a pending list and is registered once a device with its id exists.
pub fn register_menu_entities(
    mut registry: ResMut<MenuRegistry>,
    mut entities: ResMut<MenuEntities>,
    new_devices: Query<(Entity, &VrDevice), Added<VrDevice>>,
    new_menus: Query<Entity, Added<VrMenu>>,
    menus: Query<&VrMenu>,
    mut removed_devices: RemovedComponents<VrDevice>,
    mut removed_menus: RemovedComponents<VrMenu>,
) {
    for entity in removed_menus.read() {
        let Some((device, kind)) = entities.menus.remove(&entity) else {
            continue;
        };
        if let Err(err) = registry.unregister_menu(device, kind) {
            trace!("menu {entity:?} already gone: {err}");
        }
    }

    for entity in removed_devices.read() {
        let Some(device) = entities.devices.remove(&entity) else {
            continue;
        };
        let orphaned: Vec<Entity> = entities
            .menus
            .iter()
            .filter(|(_, (owner, _))| *owner == device)
            .map(|(menu, _)| *menu)
            .collect();
        for menu in orphaned {
            entities.menus.remove(&menu);
            entities.pending.push(menu);
        }
        if let Err(err) = registry.unregister_device(device) {
            warn!("failed to unregister {device}: {err}");
        }
    }

    for (entity, device) in new_devices.iter() {
        match registry.register_device(device.id) {
            Ok(()) => {
                entities.devices.insert(entity, device.id);
            }
            Err(err) => warn!("ignoring VrDevice on {entity:?}: {err}"),
        }
    }

    entities.pending.extend(new_menus.iter());
    let pending = std::mem::take(&mut entities.pending);
    for entity in pending {
        // Despawned, or the VrMenu component was removed.
        let Ok(menu) = menus.get(entity) else {
            continue;
        };
        match registry.register_menu(menu.device, menu.kind, menu.bounds, menu.start_visible) {
            Ok(()) => {
                entities.menus.insert(entity, (menu.device, menu.kind));
            }
            Err(MenuError::UnknownDevice(device)) => {
                trace!("menu {entity:?} waits for {device}");
                entities.pending.push(entity);
            }
            Err(err) => warn!("ignoring VrMenu on {entity:?}: {err}"),
        }
    }
}

/// Copy device rays and menu poses into the registry.
pub fn sync_menu_registry(
    mut registry: ResMut<MenuRegistry>,
    devices: Query<(&VrDevice, &GlobalTransform, Has<ExclusiveMode>)>,
    menus: Query<(&VrMenu, &GlobalTransform)>,
) {
    for (device, transform, exclusive) in devices.iter() {
        let Some(record) = registry.device_mut(device.id) else {
            continue;
        };
        record.ray_origin = transform.translation();
        record.ray_direction = *transform.forward();
        record.tracked = device.tracked;
        record.exclusive_mode = exclusive;
    }

    for (menu, transform) in menus.iter() {
        let Some(record) = registry
            .device_mut(menu.device)
            .and_then(|d| d.menu_mut(menu.kind))
        else {
            continue;
        };
        record.translation = transform.translation();
        record.rotation = transform.rotation();
        record.focused = menu.focused;
    }
}

/// Apply activator presses, alternate menu moves and pointer reports.
pub fn handle_menu_requests(
    mut registry: ResMut<MenuRegistry>,
    viewer_scale: Res<ViewerScale>,
    config: Res<MenuVisibilityConfig>,
    mut toggles: MessageReader<ToggleMainMenu>,
    mut alternates: MessageReader<SetAlternateMenuVisibility>,
    mut selections: MessageReader<SelectionChanged>,
    mut hovers: MessageReader<PointerHoverReport>,
) {
    for request in toggles.read() {
        registry.toggle_main_menu(request.device);
    }
    for request in alternates.read() {
        registry.set_alternate_menu_visibility(request.device, request.visible);
    }
    for change in selections.read() {
        registry.on_selection_changed(change.device, change.has_selection);
    }
    for report in hovers.read() {
        registry.check_pointer_hover(
            report.device,
            report.hover,
            viewer_scale.0,
            config.menu_hide_margin,
        );
    }
}

/// Workspace boxes gathered for this frame's overlap queries.
struct WorkspaceBoxes(Vec<OrientedBox>);

impl SpatialQuery for WorkspaceBoxes {
    fn overlap_box(&self, bounds: &OrientedBox, hits: &mut [OverlapHit]) -> usize {
        let mut count = 0;
        for workspace in self.0.iter().filter(|w| w.intersects(bounds)) {
            let Some(slot) = hits.get_mut(count) else {
                break;
            };
            *slot = OverlapHit { is_workspace: true };
            count += 1;
        }
        count
    }
}

/// Held-object state of every device for this frame.
struct DeviceSelections(HashMap<DeviceId, DirectSelection>);

impl SelectionQuery for DeviceSelections {
    fn held_object_count(&self, device: DeviceId) -> usize {
        self.0.get(&device).map_or(0, |s| s.held_objects)
    }

    fn is_hovering(&self, device: DeviceId) -> bool {
        self.0.get(&device).is_some_and(|s| s.hovering)
    }

    fn is_scaling(&self, device: DeviceId) -> bool {
        self.0.get(&device).is_some_and(|s| s.scaling)
    }
}

/// Run the per-frame visibility pass.
#[allow(clippy::too_many_arguments)]
pub fn resolve_menu_visibility(
    mut resolver: ResMut<MenuVisibilityResolver>,
    mut registry: ResMut<MenuRegistry>,
    time: Res<Time>,
    viewer_scale: Res<ViewerScale>,
    config: Res<MenuVisibilityConfig>,
    workspaces: Query<(&Workspace, &GlobalTransform)>,
    selections: Query<(&VrDevice, &DirectSelection)>,
) {
    let spatial = WorkspaceBoxes(
        workspaces
            .iter()
            .map(|(workspace, transform)| {
                let (scale, rotation, translation) = transform.to_scale_rotation_translation();
                OrientedBox::new(translation, workspace.half_extents * scale, rotation)
            })
            .collect(),
    );
    let selection = DeviceSelections(
        selections
            .iter()
            .map(|(device, selection)| (device.id, *selection))
            .collect(),
    );

    let ctx = ResolveContext {
        now: time.elapsed_secs(),
        viewer_scale: viewer_scale.0,
        config: &config,
        spatial: &spatial,
        selection: &selection,
    };
    resolver.update(&mut registry, &ctx);
}

/// Write the frame's decisions to menu and device entities.
pub fn apply_menu_visibility(
    registry: Res<MenuRegistry>,
    mut menus: Query<(&VrMenu, &mut MenuState, &mut Visibility)>,
    mut activators: Query<(&VrDevice, &mut MainMenuActivator)>,
) {
    for (menu, mut state, mut visibility) in menus.iter_mut() {
        let Some(applied) = registry.applied_flags(menu.device, menu.kind) else {
            continue;
        };
        state.set_if_neq(MenuState { applied });
        let target = if applied.is_empty() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(target);
    }

    for (device, mut activator) in activators.iter_mut() {
        let Some(state) = registry.activator(device.id) else {
            continue;
        };
        activator.set_if_neq(state);
    }
}
