use devchan_buffer::{BufferError, HeapBuffer};
use devchan_host::{DeviceNumber, Host};
use tracing::{error, info, warn};

use crate::config::ModuleConfig;
use crate::device::DeviceChannel;
use crate::error::{ModuleError, Result};
use crate::status::StatusChannel;

/// A loaded module: one device channel and one status channel, both
/// registered with `H`.
///
/// Dropping the module tears it down: the status node is removed, the device
/// node is unregistered, then the status buffer is freed.
pub struct Module<H: Host> {
    host: H,
    config: ModuleConfig,
    number: DeviceNumber,
    device: DeviceChannel,
    status: StatusChannel,
}

impl<H: Host> Module<H> {
    /// Register both nodes and allocate the status buffer.
    ///
    /// Steps run in order: device node, status buffer, status node. If one
    /// fails, the steps already done are undone in reverse before the error
    /// is returned, leaving the host as it was.
    pub fn init(host: H, config: ModuleConfig) -> Result<Self> {
        Self::init_with(host, config, HeapBuffer::try_heap)
    }

    pub(crate) fn init_with<F>(mut host: H, config: ModuleConfig, allocate: F) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<HeapBuffer, BufferError>,
    {
        info!(
            device = %config.device_name,
            status = %config.status_name,
            "initializing module"
        );

        let number = host.register_device(&config.device_name).map_err(|source| {
            error!(device = %config.device_name, error = %source, "failed to register device node");
            ModuleError::Registration {
                node: config.device_name.clone(),
                source,
            }
        })?;
        info!(device = %config.device_name, %number, "registered device node");

        let buffer = match allocate() {
            Ok(buffer) => buffer,
            Err(err) => {
                error!(error = %err, "failed to allocate status buffer");
                warn!(device = %config.device_name, "rolling back device registration");
                host.unregister_device(number, &config.device_name);
                return Err(err.into());
            }
        };

        if let Err(source) = host.create_status_node(&config.status_name, config.status_mode) {
            error!(status = %config.status_name, error = %source, "failed to create status node");
            warn!(device = %config.device_name, "rolling back device registration");
            drop(buffer);
            host.unregister_device(number, &config.device_name);
            return Err(ModuleError::Registration {
                node: config.status_name.clone(),
                source,
            });
        }

        let device = DeviceChannel::new(config.device_name.clone());
        let status =
            StatusChannel::with_buffer(config.status_name.clone(), config.advisory.clone(), buffer);

        info!("module initialized");
        Ok(Self {
            host,
            config,
            number,
            device,
            status,
        })
    }

    /// Tear the module down now. Equivalent to dropping it.
    pub fn teardown(self) {
        drop(self);
    }

    pub fn device(&self) -> &DeviceChannel {
        &self.device
    }

    pub fn status(&self) -> &StatusChannel {
        &self.status
    }

    pub fn device_number(&self) -> DeviceNumber {
        self.number
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: Host> Drop for Module<H> {
    fn drop(&mut self) {
        self.host.remove_status_node(&self.config.status_name);
        self.host
            .unregister_device(self.number, &self.config.device_name);
        info!(device = %self.config.device_name, "module unloaded");
    }
}

impl<H: Host> std::fmt::Debug for Module<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("device", &self.config.device_name)
            .field("number", &self.number)
            .field("status", &self.config.status_name)
            .finish()
    }
}
