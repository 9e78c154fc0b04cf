//! Errors returned by menu registry bookkeeping.

use thiserror::Error;

use crate::types::{DeviceId, MenuKind};

/// Misuse of the [`crate::MenuRegistry`] registration API.
///
/// The per-frame visibility pass never fails; these only come from
/// registering or addressing devices and menus that do not line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MenuError {
    /// The device was never registered, or was already removed.
    #[error("{0} is not registered")]
    UnknownDevice(DeviceId),
    /// The device is already registered.
    #[error("{0} is already registered")]
    DeviceAlreadyRegistered(DeviceId),
    /// The device has no menu of this kind.
    #[error("{device} has no {kind} menu")]
    UnknownMenu {
        /// Owning device.
        device: DeviceId,
        /// Missing menu kind.
        kind: MenuKind,
    },
    /// The device already owns a menu of this kind.
    #[error("{device} already has a {kind} menu")]
    MenuAlreadyRegistered {
        /// Owning device.
        device: DeviceId,
        /// Duplicated menu kind.
        kind: MenuKind,
    },
}
