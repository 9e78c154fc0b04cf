//! Per-tick menu visibility resolution.
//!
//! [`MenuVisibilityResolver::update`] recomputes every temporary hide reason
//! from scratch, runs the show/hide timers, and writes the applied flags back
//! into the [`MenuRegistry`]. The spatial and selection services are reached
//! through the [`SpatialQuery`] and [`SelectionQuery`] traits so the pass can
//! run outside of an ECS world.

use bevy::prelude::*;

use crate::math::OrientedBox;
use crate::registry::{DeviceRecord, MenuRecord, MenuRegistry};
use crate::types::{DeviceId, MenuHideFlags, MenuVisibilityConfig};

/// Capacity of the overlap buffer used for workspace checks.
pub const MAX_WORKSPACE_OVERLAPS: usize = 16;

/// One object returned by a [`SpatialQuery`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapHit {
    /// Whether the object is part of a workspace.
    pub is_workspace: bool,
}

/// Box overlap queries against the scene.
pub trait SpatialQuery {
    /// Writes objects overlapping `bounds` into `hits` and returns how many
    /// were written. Never writes more than `hits.len()`.
    fn overlap_box(&self, bounds: &OrientedBox, hits: &mut [OverlapHit]) -> usize;
}

/// Held-object state of devices.
pub trait SelectionQuery {
    /// Number of objects currently held by `device`.
    fn held_object_count(&self, device: DeviceId) -> usize;
    /// Whether `device` is hovering a held object.
    fn is_hovering(&self, device: DeviceId) -> bool;
    /// Whether `device` is performing a two-handed scale.
    fn is_scaling(&self, device: DeviceId) -> bool;
}

/// Everything a tick needs besides the registry.
pub struct ResolveContext<'a> {
    /// Current time in seconds.
    pub now: f32,
    /// Global viewer scale.
    pub viewer_scale: f32,
    /// Delays and distances.
    pub config: &'a MenuVisibilityConfig,
    /// Scene overlap service.
    pub spatial: &'a dyn SpatialQuery,
    /// Held-object service.
    pub selection: &'a dyn SelectionQuery,
}

/// Runs the visibility pass once per tick.
///
/// Only scratch buffers live here; all persistent state is in the registry.
#[derive(Resource, Debug, Default)]
pub struct MenuVisibilityResolver {
    active: Vec<usize>,
    overlaps: [OverlapHit; MAX_WORKSPACE_OVERLAPS],
}

fn is_unflagged(menu: &Option<MenuRecord>) -> bool {
    menu.as_ref().is_some_and(MenuRecord::is_unflagged)
}

impl MenuVisibilityResolver {
    /// Creates a resolver with empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the visibility of every menu of every tracked device.
    pub fn update(&mut self, registry: &mut MenuRegistry, ctx: &ResolveContext) {
        self.active.clear();
        self.active.extend(
            registry
                .devices()
                .enumerate()
                .filter(|(_, d)| d.tracked)
                .map(|(i, _)| i),
        );

        for position in 0..self.active.len() {
            let index = self.active[position];
            let alternate_visible = self.suppress_competing_menus(registry, index);

            for menu in registry.records_mut()[index].menus_mut() {
                check_workspace_overlap(menu, &mut self.overlaps, ctx);
            }

            self.check_direct_selection(registry, index, alternate_visible, ctx);
        }

        let devices = registry.records_mut();
        for &index in &self.active {
            for menu in devices[index].menus_mut() {
                update_timers(menu, ctx.now);
            }
        }

        for &index in &self.active {
            apply_visibility(&mut devices[index], ctx);
        }

        // Untracked devices too: pointer hover may flag them between ticks.
        for device in devices.iter_mut() {
            for menu in device.menus_mut() {
                menu.hide.hide_flags.remove(MenuHideFlags::TEMPORARY);
            }
        }
    }

    /// First active device other than the one at `index`.
    fn first_other_active(&self, registry: &MenuRegistry, index: usize) -> Option<DeviceId> {
        let other = *self.active.iter().find(|&&i| i != index)?;
        registry.devices().nth(other).map(|d| d.id)
    }

    /// Keeps menus on one device from stacking in front of the hand.
    ///
    /// Returns whether the alternate menu was visible before suppression.
    fn suppress_competing_menus(&self, registry: &mut MenuRegistry, index: usize) -> bool {
        let record = &registry.records_mut()[index];
        let main_visible = is_unflagged(&record.main);
        let alternate_visible = is_unflagged(&record.alternate);
        let custom_visible = is_unflagged(&record.custom);

        if alternate_visible && (main_visible || custom_visible) {
            if let Some(other) = self.first_other_active(registry, index) {
                trace!("moving alternate menu to {other}");
                registry.set_alternate_menu_visibility(other, true);
            }
        }

        let record = &mut registry.records_mut()[index];
        if custom_visible && main_visible {
            if let Some(custom) = record.custom.as_mut() {
                custom.hide.hide_flags |= MenuHideFlags::OTHER_MENU;
            }
        }
        if alternate_visible && (custom_visible || main_visible) {
            if let Some(alternate) = record.alternate.as_mut() {
                alternate.hide.hide_flags |= MenuHideFlags::OTHER_MENU;
            }
        }

        alternate_visible
    }

    /// Hides the menus of a device holding objects, and those of a second
    /// device taking part in the same two-handed interaction.
    fn check_direct_selection(
        &self,
        registry: &mut MenuRegistry,
        index: usize,
        alternate_visible: bool,
        ctx: &ResolveContext,
    ) {
        let (id, origin) = {
            let record = &registry.records_mut()[index];
            (record.id, record.ray_origin)
        };
        if ctx.selection.held_object_count(id) == 0 {
            return;
        }

        registry.records_mut()[index].flag_all_menus(MenuHideFlags::HAS_DIRECT_SELECTION);

        let threshold = ctx.config.two_hand_hide_distance * ctx.viewer_scale;
        for &other in &self.active {
            if other == index {
                continue;
            }

            let (other_id, other_origin, other_has_alternate) = {
                let record = &registry.records_mut()[other];
                (record.id, record.ray_origin, record.alternate.is_some())
            };
            if alternate_visible && other_has_alternate {
                registry.set_alternate_menu_visibility(other_id, true);
            }

            if ctx.selection.is_hovering(other_id)
                || ctx.selection.is_scaling(other_id)
                || other_origin.distance(origin) < threshold
            {
                trace!("{other_id} joins a two-handed interaction with {id}");
                registry.records_mut()[other].flag_all_menus(MenuHideFlags::HAS_DIRECT_SELECTION);
                break;
            }
        }
    }
}

/// Flags `menu` when its world-space bounds overlap a workspace.
fn check_workspace_overlap(menu: &mut MenuRecord, hits: &mut [OverlapHit], ctx: &ResolveContext) {
    if menu.bounds.extents == Vec3::ZERO {
        return;
    }

    hits.fill(OverlapHit::default());
    let scale = ctx.viewer_scale;
    let bounds = OrientedBox::new(
        menu.translation + menu.rotation * (menu.bounds.center * scale),
        menu.bounds.extents * scale,
        menu.rotation,
    );
    let count = ctx.spatial.overlap_box(&bounds, hits).min(hits.len());
    if hits[..count].iter().any(|hit| hit.is_workspace) {
        menu.hide.hide_flags |= MenuHideFlags::OVER_WORKSPACE;
    }
}

fn update_timers(menu: &mut MenuRecord, now: f32) {
    let hide = &mut menu.hide;
    let flags = hide.hide_flags;
    if (flags - MenuHideFlags::HIDDEN - MenuHideFlags::OTHER_MENU).is_empty() {
        hide.auto_hide_time = now;
    }
    if !flags.is_empty() {
        hide.last_hide_flags = flags;
        hide.auto_show_time = now;
    }
}

/// Pushes the tick's decision to the device's menu surfaces and activator.
fn apply_visibility(record: &mut DeviceRecord, ctx: &ResolveContext) {
    let now = ctx.now;
    if let Some(main) = record.main.as_mut() {
        let flags = main.hide.hide_flags;
        let last_flags = main.hide.last_hide_flags;

        let permanently_hidden = flags.contains(MenuHideFlags::HIDDEN);
        let was_permanently_hidden = last_flags.contains(MenuHideFlags::HIDDEN);
        // Temporary states only take effect after a delay.
        let temporarily_hidden = flags.intersects(MenuHideFlags::TEMPORARY)
            && now > main.hide.auto_hide_time + ctx.config.auto_hide_delay;
        let was_temporarily_hidden = last_flags.intersects(MenuHideFlags::TEMPORARY)
            && now > main.hide.auto_show_time + ctx.config.auto_show_delay;

        // A focused menu only reacts to HIDDEN, so it can't vanish mid-use.
        if permanently_hidden
            || was_permanently_hidden
            || (!main.focused && (temporarily_hidden || was_temporarily_hidden))
        {
            if main.applied != flags {
                debug!("main menu on {} applied {:?}", record.id, flags);
            }
            main.applied = flags;
        }

        record.activator.interactable = !flags.intersects(MenuHideFlags::TEMPORARY);
    }

    if let Some(custom) = record.custom.as_mut() {
        custom.applied = custom.hide.hide_flags;
    }

    if let Some(alternate) = record.alternate.as_mut() {
        alternate.applied = if record.exclusive_mode {
            MenuHideFlags::empty()
        } else {
            alternate.hide.hide_flags
        };
        record.activator.move_away = alternate.applied.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MenuBounds, MenuKind, PointerHover};
    use std::collections::HashMap;

    const A: DeviceId = DeviceId(0);
    const B: DeviceId = DeviceId(1);
    const C: DeviceId = DeviceId(2);

    #[derive(Default)]
    struct Scene {
        workspaces: Vec<OrientedBox>,
    }

    impl SpatialQuery for Scene {
        fn overlap_box(&self, bounds: &OrientedBox, hits: &mut [OverlapHit]) -> usize {
            let mut count = 0;
            for workspace in &self.workspaces {
                if count == hits.len() {
                    break;
                }
                if workspace.intersects(bounds) {
                    hits[count] = OverlapHit { is_workspace: true };
                    count += 1;
                }
            }
            count
        }
    }

    #[derive(Default)]
    struct Selection {
        held: HashMap<DeviceId, usize>,
        scaling: Vec<DeviceId>,
    }

    impl SelectionQuery for Selection {
        fn held_object_count(&self, device: DeviceId) -> usize {
            self.held.get(&device).copied().unwrap_or(0)
        }

        fn is_hovering(&self, _device: DeviceId) -> bool {
            false
        }

        fn is_scaling(&self, device: DeviceId) -> bool {
            self.scaling.contains(&device)
        }
    }

    struct Harness {
        registry: MenuRegistry,
        resolver: MenuVisibilityResolver,
        scene: Scene,
        selection: Selection,
        config: MenuVisibilityConfig,
        viewer_scale: f32,
    }

    impl Harness {
        fn new(devices: &[DeviceId]) -> Self {
            let mut registry = MenuRegistry::new();
            let bounds = MenuBounds::new(Vec3::ZERO, Vec3::new(0.15, 0.1, 0.01));
            for (i, &id) in devices.iter().enumerate() {
                registry.register_device(id).unwrap();
                registry
                    .set_device_ray(id, Vec3::new(i as f32, 0.0, 0.0), Vec3::NEG_Z, true)
                    .unwrap();
                registry.register_menu(id, MenuKind::Main, bounds, false).unwrap();
                registry.register_menu(id, MenuKind::Alternate, bounds, false).unwrap();
                registry
                    .set_menu_pose(id, MenuKind::Main, Vec3::new(i as f32, 1.0, 0.0), Quat::IDENTITY)
                    .unwrap();
                registry
                    .set_menu_pose(id, MenuKind::Alternate, Vec3::new(i as f32, 0.5, 0.0), Quat::IDENTITY)
                    .unwrap();
            }
            Self {
                registry,
                resolver: MenuVisibilityResolver::new(),
                scene: Scene::default(),
                selection: Selection::default(),
                config: MenuVisibilityConfig::default(),
                viewer_scale: 1.0,
            }
        }

        fn tick(&mut self, now: f32) {
            let ctx = ResolveContext {
                now,
                viewer_scale: self.viewer_scale,
                config: &self.config,
                spatial: &self.scene,
                selection: &self.selection,
            };
            self.resolver.update(&mut self.registry, &ctx);
        }

        fn applied(&self, device: DeviceId, kind: MenuKind) -> MenuHideFlags {
            self.registry.applied_flags(device, kind).unwrap()
        }

        fn flags(&self, device: DeviceId, kind: MenuKind) -> MenuHideFlags {
            self.registry.hide_flags(device, kind).unwrap()
        }

        /// Reports the pointer of `device` over a surface `distance` away.
        fn hover(&mut self, device: DeviceId, distance: f32) -> bool {
            self.registry.check_pointer_hover(
                device,
                PointerHover::Surface { distance },
                self.viewer_scale,
                self.config.menu_hide_margin,
            )
        }

        fn last_flags(&self, device: DeviceId) -> MenuHideFlags {
            self.registry.device(device).unwrap().main.as_ref().unwrap().hide.last_hide_flags
        }

        fn main_visible(&self, device: DeviceId) -> bool {
            self.applied(device, MenuKind::Main).is_empty()
        }
    }

    #[test]
    fn toggled_main_menu_shows_immediately() {
        let mut h = Harness::new(&[A, B]);
        h.tick(0.0);
        assert!(!h.main_visible(A));

        h.registry.toggle_main_menu(A);
        h.tick(0.05);
        assert!(h.main_visible(A));
        assert!(!h.main_visible(B));
    }

    #[test]
    fn alternate_menu_moves_to_the_other_hand() {
        let mut h = Harness::new(&[A, B]);
        h.registry.set_alternate_menu_visibility(A, true);
        h.tick(0.0);
        assert!(h.applied(A, MenuKind::Alternate).is_empty());

        h.registry.toggle_main_menu(A);
        h.tick(0.05);
        assert!(h.main_visible(A));
        assert!(!h.applied(A, MenuKind::Alternate).is_empty());
        assert!(h.applied(B, MenuKind::Alternate).is_empty());
        assert!(h.registry.activator(B).unwrap().move_away);
        assert!(!h.registry.activator(A).unwrap().move_away);
    }

    #[test]
    fn alternate_menu_stays_when_no_other_device_is_tracked() {
        let mut h = Harness::new(&[A, B]);
        h.registry.set_tracked(B, false).unwrap();
        h.registry.set_alternate_menu_visibility(A, true);
        h.registry.toggle_main_menu(A);
        h.tick(0.0);
        // Suppressed by the main menu for this tick, but not moved anywhere.
        assert_eq!(h.applied(A, MenuKind::Alternate), MenuHideFlags::OTHER_MENU);
        assert_eq!(h.flags(A, MenuKind::Alternate), MenuHideFlags::empty());
    }

    #[test]
    fn relocation_picks_first_other_device_in_registration_order() {
        let mut h = Harness::new(&[A, B, C]);
        h.registry.set_alternate_menu_visibility(C, true);
        h.registry.toggle_main_menu(C);
        h.tick(0.0);
        assert!(h.applied(A, MenuKind::Alternate).is_empty());
        assert!(!h.applied(B, MenuKind::Alternate).is_empty());
        assert!(!h.applied(C, MenuKind::Alternate).is_empty());
    }

    #[test]
    fn custom_menu_yields_to_main_menu() {
        let mut h = Harness::new(&[A]);
        h.registry
            .spawn_custom_menu(A, MenuBounds::new(Vec3::ZERO, Vec3::splat(0.1)));
        h.registry.toggle_main_menu(A);
        h.tick(0.0);
        assert_eq!(h.applied(A, MenuKind::Custom), MenuHideFlags::OTHER_MENU);
        // Recomputed next tick rather than carried over.
        assert_eq!(h.flags(A, MenuKind::Custom), MenuHideFlags::empty());

        h.registry.toggle_main_menu(A);
        h.tick(0.05);
        assert_eq!(h.applied(A, MenuKind::Custom), MenuHideFlags::empty());
    }

    #[test]
    fn transient_flags_never_survive_a_tick() {
        let mut h = Harness::new(&[A, B]);
        h.registry.toggle_main_menu(A);
        h.selection.held.insert(A, 1);
        h.scene
            .workspaces
            .push(OrientedBox::new(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(0.5), Quat::IDENTITY));
        h.tick(0.0);

        for device in h.registry.devices() {
            for kind in MenuKind::ALL {
                if let Some(menu) = device.menu(kind) {
                    assert!(
                        !menu.hide.hide_flags.intersects(MenuHideFlags::TEMPORARY),
                        "{} {kind} kept {:?}",
                        device.id,
                        menu.hide.hide_flags
                    );
                }
            }
        }
        assert_eq!(
            h.registry.device(A).unwrap().main.as_ref().unwrap().hide.last_hide_flags,
            MenuHideFlags::HAS_DIRECT_SELECTION | MenuHideFlags::OVER_WORKSPACE
        );
    }

    #[test]
    fn main_menu_over_workspace_hides_after_delay() {
        let mut h = Harness::new(&[A]);
        h.registry.toggle_main_menu(A);
        h.tick(0.0);
        h.tick(0.1);
        assert!(h.main_visible(A));

        h.scene
            .workspaces
            .push(OrientedBox::new(Vec3::new(0.0, 1.0, 0.5), Vec3::splat(0.5), Quat::IDENTITY));
        h.tick(0.2);
        assert!(h.main_visible(A));
        assert!(!h.registry.activator(A).unwrap().interactable);
        h.tick(0.3);
        assert_eq!(h.applied(A, MenuKind::Main), MenuHideFlags::OVER_WORKSPACE);
    }

    #[test]
    fn workspace_overlap_scales_with_viewer() {
        let mut h = Harness::new(&[A]);
        h.registry.toggle_main_menu(A);
        // The menu sits at y = 1.0 with a 0.1 half height; the workspace
        // starts at y = 1.3.
        h.scene
            .workspaces
            .push(OrientedBox::new(Vec3::new(0.0, 1.8, 0.0), Vec3::splat(0.5), Quat::IDENTITY));
        h.tick(0.0);
        assert_eq!(h.registry.device(A).unwrap().main.as_ref().unwrap().hide.last_hide_flags, MenuHideFlags::HIDDEN);

        h.viewer_scale = 4.0;
        h.tick(0.05);
        assert_eq!(
            h.registry.device(A).unwrap().main.as_ref().unwrap().hide.last_hide_flags,
            MenuHideFlags::OVER_WORKSPACE
        );
    }

    #[test]
    fn hysteresis_debounces_direct_selection() {
        let mut h = Harness::new(&[A]);
        h.registry.toggle_main_menu(A);
        h.tick(0.0);
        h.tick(0.5);
        assert!(h.main_visible(A));

        // Grab: hides only once the reason persisted for the hide delay.
        h.selection.held.insert(A, 1);
        h.tick(0.55);
        assert!(h.main_visible(A));
        h.tick(0.6);
        assert!(h.main_visible(A));
        h.tick(0.7);
        assert_eq!(h.applied(A, MenuKind::Main), MenuHideFlags::HAS_DIRECT_SELECTION);
        for now in [0.8, 0.9, 1.0] {
            h.tick(now);
            assert!(!h.main_visible(A));
        }

        // Release: shows only once the show delay passed.
        h.selection.held.clear();
        h.tick(1.05);
        assert!(!h.main_visible(A));
        h.tick(1.2);
        assert!(!h.main_visible(A));
        h.tick(1.3);
        assert!(h.main_visible(A));
    }

    #[test]
    fn brief_flag_flapping_does_not_flicker() {
        let mut h = Harness::new(&[A]);
        h.registry.toggle_main_menu(A);
        h.tick(0.0);
        h.tick(0.5);

        let mut now = 0.55;
        for held in [1, 0, 1, 0, 1, 0] {
            if held > 0 {
                h.selection.held.insert(A, held);
            } else {
                h.selection.held.clear();
            }
            h.tick(now);
            assert!(h.main_visible(A), "flickered at {now}");
            now += 0.05;
        }
    }

    #[test]
    fn focused_main_menu_ignores_temporary_reasons() {
        let mut h = Harness::new(&[A]);
        h.registry.toggle_main_menu(A);
        h.registry.set_menu_focus(A, MenuKind::Main, true).unwrap();
        h.tick(0.0);

        h.selection.held.insert(A, 2);
        for step in 1..20 {
            h.tick(step as f32 * 0.1);
            assert!(h.main_visible(A));
        }

        // The activator is disabled while holding; release before toggling.
        h.selection.held.clear();
        h.tick(2.0);
        assert!(h.main_visible(A));
        assert!(h.registry.toggle_main_menu(A));
        h.tick(2.1);
        assert!(h.applied(A, MenuKind::Main).contains(MenuHideFlags::HIDDEN));
    }

    #[test]
    fn direct_selection_spreads_to_nearby_hand() {
        let mut h = Harness::new(&[A, B, C]);
        // B is 0.2 away from A, C is far away.
        h.registry.set_device_ray(B, Vec3::new(0.2, 0.0, 0.0), Vec3::NEG_Z, true).unwrap();
        h.registry.set_device_ray(C, Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z, true).unwrap();
        h.selection.held.insert(A, 1);
        h.tick(0.0);

        let last = |h: &Harness, id| {
            h.registry.device(id).unwrap().main.as_ref().unwrap().hide.last_hide_flags
        };
        assert!(last(&h, A).contains(MenuHideFlags::HAS_DIRECT_SELECTION));
        assert!(last(&h, B).contains(MenuHideFlags::HAS_DIRECT_SELECTION));
        assert!(!last(&h, C).contains(MenuHideFlags::HAS_DIRECT_SELECTION));

        // Out of range at a smaller viewer scale.
        let mut h = Harness::new(&[A, B]);
        h.registry.set_device_ray(B, Vec3::new(0.2, 0.0, 0.0), Vec3::NEG_Z, true).unwrap();
        h.viewer_scale = 0.5;
        h.selection.held.insert(A, 1);
        h.tick(0.0);
        assert!(!last(&h, B).contains(MenuHideFlags::HAS_DIRECT_SELECTION));
    }

    #[test]
    fn scaling_hand_is_flagged_regardless_of_distance() {
        let mut h = Harness::new(&[A, B]);
        h.registry.set_device_ray(B, Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_Z, true).unwrap();
        h.selection.held.insert(A, 1);
        h.selection.scaling.push(B);
        h.tick(0.0);
        assert!(h
            .registry
            .device(B)
            .unwrap()
            .main
            .as_ref()
            .unwrap()
            .hide
            .last_hide_flags
            .contains(MenuHideFlags::HAS_DIRECT_SELECTION));
    }

    #[test]
    fn grabbing_moves_visible_alternate_menu_to_other_hand() {
        let mut h = Harness::new(&[A, B]);
        h.registry.set_alternate_menu_visibility(A, true);
        h.selection.held.insert(A, 1);
        h.tick(0.0);
        assert!(h.flags(B, MenuKind::Alternate).is_empty());
        assert!(h.flags(A, MenuKind::Alternate).contains(MenuHideFlags::HIDDEN));
    }

    #[test]
    fn exclusive_mode_forces_alternate_menu() {
        let mut h = Harness::new(&[A]);
        h.registry.set_exclusive_mode(A, true).unwrap();
        h.tick(0.0);
        assert!(h.applied(A, MenuKind::Alternate).is_empty());
        assert!(h.flags(A, MenuKind::Alternate).contains(MenuHideFlags::HIDDEN));
        assert!(h.registry.activator(A).unwrap().move_away);
    }

    #[test]
    fn device_without_main_menu_still_resolves_other_menus() {
        let mut registry = MenuRegistry::new();
        registry.register_device(A).unwrap();
        registry.spawn_custom_menu(A, MenuBounds::new(Vec3::ZERO, Vec3::splat(0.1)));
        let mut h = Harness::new(&[]);
        h.registry = registry;
        h.selection.held.insert(A, 1);
        h.tick(0.0);
        assert_eq!(h.applied(A, MenuKind::Custom), MenuHideFlags::HAS_DIRECT_SELECTION);
        assert!(h.registry.activator(A).unwrap().interactable);
    }

    #[test]
    fn pointer_over_main_menu_hides_it_after_delay() {
        let mut h = Harness::new(&[A]);
        h.registry.toggle_main_menu(A);
        h.tick(0.0);
        h.tick(0.5);

        for now in [0.55, 0.6] {
            assert!(h.hover(A, 0.05));
            h.tick(now);
            assert!(h.main_visible(A), "hidden early at {now}");
        }
        assert!(h.hover(A, 0.05));
        h.tick(0.7);
        assert_eq!(h.applied(A, MenuKind::Main), MenuHideFlags::OVER_UI);
    }

    #[test]
    fn pointer_over_focused_main_menu_keeps_it_shown() {
        let mut h = Harness::new(&[A]);
        h.registry.toggle_main_menu(A);
        h.registry.set_menu_focus(A, MenuKind::Main, true).unwrap();
        h.tick(0.0);
        h.tick(0.5);

        for step in 1..10 {
            assert!(h.hover(A, 0.05));
            h.tick(0.5 + step as f32 * 0.1);
            assert!(h.main_visible(A));
        }
        assert_eq!(h.last_flags(A), MenuHideFlags::OVER_UI);
    }

    #[test]
    fn untracked_device_does_not_keep_pointer_flags() {
        let mut h = Harness::new(&[A]);
        h.registry.toggle_main_menu(A);
        h.tick(0.0);

        h.registry.set_tracked(A, false).unwrap();
        assert!(h.hover(A, 0.01));
        for step in 1..6 {
            h.tick(step as f32 * 0.05);
            assert_eq!(h.flags(A, MenuKind::Main), MenuHideFlags::empty());
        }

        h.registry.set_tracked(A, true).unwrap();
        h.tick(0.5);
        assert!(!h.last_flags(A).contains(MenuHideFlags::OVER_UI));
        assert!(h.main_visible(A));
    }
}
