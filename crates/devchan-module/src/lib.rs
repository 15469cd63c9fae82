//! Device and status channels with a host-managed lifecycle.
//!
//! This is the layer callers talk to. A [`Module`] registers a device node
//! and a status node with a [`Host`](devchan_host::Host), owns one buffer per
//! channel, and releases everything when dropped.

pub mod channel;
pub mod config;
pub mod counters;
pub mod device;
pub mod error;
pub mod module;
pub mod status;

pub use channel::{read_to_end, Channel};
pub use config::{
    ModuleConfig, DEFAULT_ADVISORY, DEFAULT_DEVICE_NAME, DEFAULT_STATUS_MODE, DEFAULT_STATUS_NAME,
};
pub use counters::{CallCounters, CallKind, CounterSnapshot};
pub use device::DeviceChannel;
pub use error::{ModuleError, Result};
pub use module::Module;
pub use status::StatusChannel;

pub use devchan_buffer::{Transfer, TransferError, CAPACITY, WRITE_LIMIT};
