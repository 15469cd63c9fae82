use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::{HostError, Result};
use crate::traits::{DeviceNumber, Host, HostOp};

/// Dynamic major numbers are handed out from the top of this range down.
const DYNAMIC_MAJORS: std::ops::RangeInclusive<u32> = 234..=254;

/// Something the host did, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    DeviceRegistered { name: String, number: DeviceNumber },
    DeviceUnregistered { name: String, number: DeviceNumber },
    StatusNodeCreated { name: String, mode: u32 },
    StatusNodeRemoved { name: String },
    Rejected(HostOp),
}

#[derive(Debug, Default)]
struct State {
    devices: BTreeMap<String, DeviceNumber>,
    status_nodes: BTreeMap<String, u32>,
    events: Vec<HostEvent>,
    fail_next: Vec<HostOp>,
}

impl State {
    fn take_fault(&mut self, op: HostOp) -> Result<()> {
        if let Some(pos) = self.fail_next.iter().position(|o| *o == op) {
            self.fail_next.remove(pos);
            self.events.push(HostEvent::Rejected(op));
            return Err(HostError::Rejected(op));
        }
        Ok(())
    }

    fn free_major(&self) -> Option<u32> {
        DYNAMIC_MAJORS
            .rev()
            .find(|major| !self.devices.values().any(|n| n.major == *major))
    }
}

/// In-process host runtime.
///
/// Cloning yields another handle onto the same node table, so a caller can
/// hand one clone to a module and keep another to inspect what happened.
#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    state: Arc<Mutex<State>>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with [`HostError::Rejected`].
    pub fn fail_next(&self, op: HostOp) {
        self.lock().fail_next.push(op);
    }

    /// Snapshot of every event recorded so far.
    pub fn events(&self) -> Vec<HostEvent> {
        self.lock().events.clone()
    }

    /// Number currently bound to a device node name.
    pub fn device(&self, name: &str) -> Option<DeviceNumber> {
        self.lock().devices.get(name).copied()
    }

    /// Permission bits of a live status node.
    pub fn status_node(&self, name: &str) -> Option<u32> {
        self.lock().status_nodes.get(name).copied()
    }

    /// True when no node of either kind is registered.
    pub fn is_idle(&self) -> bool {
        let state = self.lock();
        state.devices.is_empty() && state.status_nodes.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Host for LocalHost {
    fn register_device(&mut self, name: &str) -> Result<DeviceNumber> {
        let mut state = self.lock();
        state.take_fault(HostOp::RegisterDevice)?;
        if state.devices.contains_key(name) {
            return Err(HostError::NameInUse(name.to_string()));
        }
        let major = state.free_major().ok_or(HostError::NoDeviceNumbers)?;
        let number = DeviceNumber::new(major, 0);

        state.devices.insert(name.to_string(), number);
        state.events.push(HostEvent::DeviceRegistered {
            name: name.to_string(),
            number,
        });
        debug!(name, %number, "registered device node");
        Ok(number)
    }

    fn unregister_device(&mut self, number: DeviceNumber, name: &str) {
        let mut state = self.lock();
        match state.devices.get(name) {
            Some(bound) if *bound == number => {
                state.devices.remove(name);
                state.events.push(HostEvent::DeviceUnregistered {
                    name: name.to_string(),
                    number,
                });
                debug!(name, %number, "unregistered device node");
            }
            _ => warn!(name, %number, "unregister for unknown device node"),
        }
    }

    fn create_status_node(&mut self, name: &str, mode: u32) -> Result<()> {
        let mut state = self.lock();
        state.take_fault(HostOp::CreateStatusNode)?;
        if state.status_nodes.contains_key(name) {
            return Err(HostError::NameInUse(name.to_string()));
        }

        state.status_nodes.insert(name.to_string(), mode);
        state.events.push(HostEvent::StatusNodeCreated {
            name: name.to_string(),
            mode,
        });
        debug!(name, mode = format_args!("{mode:o}"), "created status node");
        Ok(())
    }

    fn remove_status_node(&mut self, name: &str) {
        let mut state = self.lock();
        if state.status_nodes.remove(name).is_some() {
            state.events.push(HostEvent::StatusNodeRemoved {
                name: name.to_string(),
            });
            debug!(name, "removed status node");
        } else {
            warn!(name, "remove for unknown status node");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majors_are_allocated_from_the_top() {
        let mut host = LocalHost::new();
        let first = host.register_device("a").expect("first register");
        let second = host.register_device("b").expect("second register");
        assert_eq!(first, DeviceNumber::new(254, 0));
        assert_eq!(second, DeviceNumber::new(253, 0));
    }

    #[test]
    fn released_major_is_reused() {
        let mut host = LocalHost::new();
        let number = host.register_device("a").unwrap();
        host.unregister_device(number, "a");
        assert_eq!(host.register_device("b").unwrap(), number);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut host = LocalHost::new();
        host.register_device("dev").unwrap();
        assert_eq!(
            host.register_device("dev"),
            Err(HostError::NameInUse("dev".to_string()))
        );

        host.create_status_node("proc", 0o666).unwrap();
        assert_eq!(
            host.create_status_node("proc", 0o644),
            Err(HostError::NameInUse("proc".to_string()))
        );
    }

    #[test]
    fn dynamic_range_exhaustion() {
        let mut host = LocalHost::new();
        for i in DYNAMIC_MAJORS {
            host.register_device(&format!("dev{i}")).unwrap();
        }
        assert_eq!(
            host.register_device("one-too-many"),
            Err(HostError::NoDeviceNumbers)
        );
    }

    #[test]
    fn injected_fault_fires_once() {
        let mut host = LocalHost::new();
        host.fail_next(HostOp::CreateStatusNode);
        assert_eq!(
            host.create_status_node("proc", 0o666),
            Err(HostError::Rejected(HostOp::CreateStatusNode))
        );
        host.create_status_node("proc", 0o666)
            .expect("second attempt should succeed");
        assert_eq!(host.status_node("proc"), Some(0o666));
    }

    #[test]
    fn queued_fault_survives_release_calls() {
        let mut host = LocalHost::new();
        let number = host.register_device("dev").unwrap();
        host.create_status_node("proc", 0o666).unwrap();

        host.fail_next(HostOp::RegisterDevice);
        host.remove_status_node("proc");
        host.unregister_device(number, "dev");
        assert!(host.is_idle());

        assert_eq!(
            host.register_device("dev"),
            Err(HostError::Rejected(HostOp::RegisterDevice))
        );
    }

    #[test]
    fn clones_share_the_node_table() {
        let observer = LocalHost::new();
        let mut host = observer.clone();
        let number = host.register_device("dev").unwrap();
        assert_eq!(observer.device("dev"), Some(number));

        host.unregister_device(number, "dev");
        assert!(observer.is_idle());
        assert_eq!(
            observer.events(),
            vec![
                HostEvent::DeviceRegistered {
                    name: "dev".to_string(),
                    number
                },
                HostEvent::DeviceUnregistered {
                    name: "dev".to_string(),
                    number
                },
            ]
        );
    }

    #[test]
    fn release_of_unknown_node_is_ignored() {
        let mut host = LocalHost::new();
        host.unregister_device(DeviceNumber::new(1, 0), "ghost");
        host.remove_status_node("ghost");
        assert!(host.events().is_empty());
    }
}
