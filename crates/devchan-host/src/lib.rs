//! Host runtime boundary.
//!
//! Channels do not register themselves. They ask a [`Host`] for a device-node
//! identity and a status-node entry, and hand both back on teardown. This
//! crate defines that contract and ships [`LocalHost`], an in-process host
//! that keeps a node table and an ordered event log.

pub mod error;
pub mod local;
pub mod traits;

pub use error::{HostError, Result};
pub use local::{HostEvent, LocalHost};
pub use traits::{DeviceNumber, Host, HostOp};
