//! In-memory table of interfaces owned by the coordinator.
//!
//! Two tables live here. `active` holds published interfaces keyed by name
//! and is the only one queries read. `staged` holds interfaces whose setup
//! is still running or whose rollback is waiting for its destruction event,
//! keyed by destruction-listener identity. Staged entries are invisible to
//! queries but still count as live for daemon and global lifecycle
//! decisions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::clients::InterfaceCallback;
use crate::events::{ListenerId, ObserverId};
use crate::role::{Band, InterfaceRole, RoleFamily};
use crate::subsystem::SubsystemKind;

/// Capability facts cached when an interface is set up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityFacts {
    /// Vendor feature bits merged with daemon advanced capabilities.
    pub feature_set: u64,
    /// Driver feature bits reported through the station daemon.
    pub driver_features: u64,
    /// Bands with at least one usable channel.
    pub supported_bands: BTreeSet<Band>,
}

/// A fully set up interface.
pub(crate) struct Interface {
    pub(crate) name: String,
    pub(crate) role: InterfaceRole,
    pub(crate) listener: ListenerId,
    pub(crate) observer: ObserverId,
    pub(crate) callback: Box<dyn InterfaceCallback>,
    pub(crate) up: bool,
    pub(crate) capabilities: CapabilityFacts,
    pub(crate) bridged_instances: Vec<String>,
}

impl fmt::Debug for Interface {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Interface")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("listener", &self.listener)
            .field("observer", &self.observer)
            .field("up", &self.up)
            .finish_non_exhaustive()
    }
}

impl Interface {
    /// Returns the entry to the staging table, keeping everything bound.
    pub(crate) fn into_staged(self) -> StagedInterface {
        StagedInterface {
            listener: self.listener,
            role: self.role,
            callback: self.callback,
            name: Some(self.name),
            observer: Some(self.observer),
            up: self.up,
            capabilities: self.capabilities,
            bridged_instances: self.bridged_instances,
        }
    }
}

/// An interface whose setup has not been published.
pub(crate) struct StagedInterface {
    pub(crate) listener: ListenerId,
    pub(crate) role: InterfaceRole,
    pub(crate) callback: Box<dyn InterfaceCallback>,
    pub(crate) name: Option<String>,
    pub(crate) observer: Option<ObserverId>,
    pub(crate) up: bool,
    pub(crate) capabilities: CapabilityFacts,
    pub(crate) bridged_instances: Vec<String>,
}

impl fmt::Debug for StagedInterface {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StagedInterface")
            .field("listener", &self.listener)
            .field("role", &self.role)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl StagedInterface {
    pub(crate) fn new(
        listener: ListenerId,
        role: InterfaceRole,
        callback: Box<dyn InterfaceCallback>,
    ) -> Self {
        Self {
            listener,
            role,
            callback,
            name: None,
            observer: None,
            up: false,
            capabilities: CapabilityFacts::default(),
            bridged_instances: Vec::new(),
        }
    }

    /// Converts into a publishable entry once name and observer are bound.
    pub(crate) fn into_interface(self) -> Result<Interface, Self> {
        match (self.name.clone(), self.observer) {
            (Some(name), Some(observer)) => Ok(Interface {
                name,
                role: self.role,
                listener: self.listener,
                observer,
                callback: self.callback,
                up: self.up,
                capabilities: self.capabilities,
                bridged_instances: self.bridged_instances,
            }),
            _ => Err(self),
        }
    }
}

/// What the teardown path needs from an entry, copied out so subsystem
/// calls can run without holding a borrow on the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TeardownView {
    pub(crate) role: InterfaceRole,
    pub(crate) observer: Option<ObserverId>,
    pub(crate) published: bool,
}

/// An entry removed from either table, ready for its final callback.
pub(crate) struct Removed {
    pub(crate) role: InterfaceRole,
    pub(crate) callback: Box<dyn InterfaceCallback>,
}

#[derive(Default)]
pub(crate) struct InterfaceRegistry {
    active: BTreeMap<String, Interface>,
    staged: BTreeMap<ListenerId, StagedInterface>,
}

impl InterfaceRegistry {
    pub(crate) fn stage(&mut self, entry: StagedInterface) {
        self.staged.insert(entry.listener, entry);
    }

    pub(crate) fn staged_mut(&mut self, listener: ListenerId) -> Option<&mut StagedInterface> {
        self.staged.get_mut(&listener)
    }

    pub(crate) fn is_staged(&self, listener: ListenerId) -> bool {
        self.staged.contains_key(&listener)
    }

    pub(crate) fn unstage(&mut self, listener: ListenerId) -> Option<StagedInterface> {
        self.staged.remove(&listener)
    }

    /// Publishes `interface`, refusing a second entry under the same name.
    pub(crate) fn publish(&mut self, interface: Interface) -> Result<(), Interface> {
        if self.active.contains_key(&interface.name) {
            return Err(interface);
        }
        self.active.insert(interface.name.clone(), interface);
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Interface> {
        self.active.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Interface> {
        self.active.get_mut(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    /// Finds the entry a destruction event refers to.
    ///
    /// A published entry matches only when both the name and the listener
    /// agree, so a late event from a previous holder of a reused name is
    /// not mistaken for the current one.
    pub(crate) fn teardown_view(&self, listener: ListenerId, name: &str) -> Option<TeardownView> {
        if let Some(entry) = self.active.get(name).filter(|entry| entry.listener == listener) {
            return Some(TeardownView {
                role: entry.role,
                observer: Some(entry.observer),
                published: true,
            });
        }
        self.staged.get(&listener).map(|entry| TeardownView {
            role: entry.role,
            observer: entry.observer,
            published: false,
        })
    }

    pub(crate) fn remove(
        &mut self,
        listener: ListenerId,
        name: &str,
        published: bool,
    ) -> Option<Removed> {
        if published {
            let entry = self.active.remove(name)?;
            return Some(Removed {
                role: entry.role,
                callback: entry.callback,
            });
        }
        self.staged.remove(&listener).map(|entry| Removed {
            role: entry.role,
            callback: entry.callback,
        })
    }

    /// Names of published interfaces in `family`.
    pub(crate) fn names(&self, family: RoleFamily) -> BTreeSet<String> {
        self.active
            .values()
            .filter(|entry| entry.role.family() == family)
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Names of every published interface.
    pub(crate) fn all_names(&self) -> Vec<String> {
        self.active.keys().cloned().collect()
    }

    fn live_roles_except(
        &self,
        listener: Option<ListenerId>,
    ) -> impl Iterator<Item = InterfaceRole> + '_ {
        let published = self
            .active
            .values()
            .filter(move |entry| Some(entry.listener) != listener)
            .map(|entry| entry.role);
        let staged = self
            .staged
            .values()
            .filter(move |entry| Some(entry.listener) != listener)
            .map(|entry| entry.role);
        published.chain(staged)
    }

    /// Returns `true` when any live interface other than `listener` is
    /// adopted by `daemon`.
    pub(crate) fn daemon_in_use(
        &self,
        daemon: SubsystemKind,
        listener: Option<ListenerId>,
    ) -> bool {
        self.live_roles_except(listener)
            .any(|role| role.daemon() == Some(daemon))
    }

    /// Returns `true` when any live interface other than `listener` exists.
    pub(crate) fn any_live(&self, listener: Option<ListenerId>) -> bool {
        self.live_roles_except(listener).next().is_some()
    }

    /// Named entries that depend on `kind`, published and staged alike.
    pub(crate) fn dependents_of(
        &self,
        kind: SubsystemKind,
    ) -> Vec<(ListenerId, String, InterfaceRole)> {
        let depends = |role: InterfaceRole| match kind {
            SubsystemKind::ResourceLayer | SubsystemKind::KernelControl => true,
            daemon => role.daemon() == Some(daemon),
        };
        let published = self
            .active
            .values()
            .filter(|entry| depends(entry.role))
            .map(|entry| (entry.listener, entry.name.clone(), entry.role));
        let staged = self.staged.values().filter(|entry| depends(entry.role)).filter_map(|entry| {
            entry
                .name
                .as_ref()
                .map(|name| (entry.listener, name.clone(), entry.role))
        });
        published.chain(staged).collect()
    }
}
