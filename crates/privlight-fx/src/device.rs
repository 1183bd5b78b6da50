//! Device and DeviceManager traits

use privlight_core::{Result, Rgb};
use serde::Serialize;

/// Lighting effect used to show privilege state.
pub const STATIC_EFFECT: &str = "static";

/// Descriptive fields for listing a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub device_type: String,
    pub serial: String,
    pub firmware_version: String,
    pub driver_version: String,
}

/// A controllable lighting device.
#[async_trait::async_trait]
pub trait Device: Send + Sync {
    fn info(&self) -> &DeviceInfo;

    fn name(&self) -> &str {
        &self.info().name
    }

    fn supports(&self, effect: &str) -> bool;

    /// Set a static colour. `false` means the device rejected the write.
    async fn set_static_color(&self, color: Rgb) -> bool;
}

/// Discovers devices. Called on every actuation so hot-plugged devices are
/// picked up without restarting.
#[async_trait::async_trait]
pub trait DeviceManager: Send + Sync {
    async fn enumerate_devices(&self) -> Result<Vec<Box<dyn Device>>>;
}
