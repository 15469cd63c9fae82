use std::fmt;

use crate::error::Result;

/// Identity assigned to a registered device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceNumber {
    pub major: u32,
    pub minor: u32,
}

impl DeviceNumber {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for DeviceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Host operations that can fail, used for logging and fault injection.
///
/// Release operations are infallible and have no entry here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    RegisterDevice,
    CreateStatusNode,
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostOp::RegisterDevice => "register_device",
            HostOp::CreateStatusNode => "create_status_node",
        };
        f.write_str(name)
    }
}

/// Registration surface provided by the host runtime.
///
/// Acquire operations may fail. Release operations must not: teardown is
/// unconditional, so a host that cannot find the node just logs and moves on.
pub trait Host {
    /// Register a device node and allocate its number.
    fn register_device(&mut self, name: &str) -> Result<DeviceNumber>;

    /// Release a device node registered with [`Host::register_device`].
    fn unregister_device(&mut self, number: DeviceNumber, name: &str);

    /// Create a status node with the given permission bits.
    fn create_status_node(&mut self, name: &str, mode: u32) -> Result<()>;

    /// Remove a status node created with [`Host::create_status_node`].
    fn remove_status_node(&mut self, name: &str);
}
