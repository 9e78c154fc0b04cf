//! Manipulator visibility and drag state.
//!
//! Any system may ask for manipulators to be hidden (e.g. while a menu or a
//! workspace takes over the hand). Manipulators are shown only while nobody
//! asks. A manipulator counts as dragging while any of its handles is.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::linear_handle::LinearHandle;

/// A transform manipulator owning one or more [`LinearHandle`]s.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manipulator {
    /// Whether the manipulator is shown; written by the plugin.
    pub visible: bool,
    /// Whether any of its handles is being dragged; written by the plugin.
    pub dragging: bool,
}

impl Default for Manipulator {
    fn default() -> Self {
        Self {
            visible: true,
            dragging: false,
        }
    }
}

/// Hide requests for manipulators and their combined drag state.
#[derive(Resource, Debug, Default, Clone)]
pub struct ManipulatorVisibility {
    hidden_requests: HashSet<Entity>,
    any_dragging: bool,
}

impl ManipulatorVisibility {
    /// Adds or withdraws `requester`'s request to hide manipulators.
    pub fn set_manipulators_visible(&mut self, requester: Entity, visible: bool) {
        if visible {
            self.hidden_requests.remove(&requester);
        } else {
            self.hidden_requests.insert(requester);
        }
    }

    /// Whether manipulators should be shown.
    pub fn manipulators_visible(&self) -> bool {
        self.hidden_requests.is_empty()
    }

    /// Whether any manipulator was being dragged on the last update.
    pub fn any_dragging(&self) -> bool {
        self.any_dragging
    }
}

/// Push visibility to manipulators and collect their drag state.
pub fn update_manipulators(
    mut visibility: ResMut<ManipulatorVisibility>,
    handles: Query<&LinearHandle>,
    mut manipulators: Query<(Entity, &mut Manipulator)>,
) {
    let visible = visibility.manipulators_visible();
    let mut any_dragging = false;

    for (entity, mut manipulator) in manipulators.iter_mut() {
        let dragging = handles
            .iter()
            .any(|handle| handle.manipulator == Some(entity) && handle.is_dragging());
        any_dragging |= dragging;

        manipulator.set_if_neq(Manipulator { visible, dragging });
    }

    visibility.any_dragging = any_dragging;
}
