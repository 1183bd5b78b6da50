//! OpenRazer sysfs backend
//!
//! The OpenRazer kernel drivers bind HID devices under
//! `/sys/bus/hid/drivers/razer*/<bus:vendor:product.n>/`. Each bound device
//! exposes plain attribute files:
//!
//! - `device_type`, `device_serial`, `firmware_version`, `version`
//! - `matrix_effect_<name>` per supported lighting effect
//!
//! Writing three raw bytes (R, G, B) to `matrix_effect_static` switches the
//! device to a static colour.

use std::path::{Path, PathBuf};

use privlight_core::{Error, Result, Rgb};
use tracing::debug;

use crate::device::{Device, DeviceInfo, DeviceManager};

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/bus/hid/drivers";

const DRIVER_PREFIX: &str = "razer";
const EFFECT_PREFIX: &str = "matrix_effect_";

pub struct SysfsDeviceManager {
    root: PathBuf,
}

impl SysfsDeviceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for SysfsDeviceManager {
    fn default() -> Self {
        Self::new(DEFAULT_SYSFS_ROOT)
    }
}

#[async_trait::async_trait]
impl DeviceManager for SysfsDeviceManager {
    async fn enumerate_devices(&self) -> Result<Vec<Box<dyn Device>>> {
        let mut drivers = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            Error::actuator_failure("sysfs", format!("{}: {e}", self.root.display()))
        })?;

        let mut driver_dirs = Vec::new();
        while let Some(entry) = drivers.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(DRIVER_PREFIX) {
                driver_dirs.push((name, entry.path()));
            }
        }
        driver_dirs.sort();

        let mut devices: Vec<Box<dyn Device>> = Vec::new();
        for (driver, dir) in driver_dirs {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping driver dir {}: {}", dir.display(), e);
                    continue;
                }
            };
            let mut bound = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                // Bound devices are the only entries carrying a device_type attribute
                if tokio::fs::metadata(path.join("device_type")).await.is_ok() {
                    bound.push(path);
                }
            }
            bound.sort();
            for path in bound {
                devices.push(Box::new(SysfsDevice::load(&driver, path).await));
            }
        }

        debug!("Found {} devices under {}", devices.len(), self.root.display());
        Ok(devices)
    }
}

pub struct SysfsDevice {
    path: PathBuf,
    info: DeviceInfo,
    effects: Vec<String>,
}

impl SysfsDevice {
    async fn load(driver: &str, path: PathBuf) -> Self {
        let info = DeviceInfo {
            name: read_attr(&path, "device_type").await,
            device_type: driver_kind(driver).to_string(),
            serial: read_attr(&path, "device_serial").await,
            firmware_version: read_attr(&path, "firmware_version").await,
            driver_version: read_attr(&path, "version").await,
        };
        let effects = list_effects(&path).await;
        Self { path, info, effects }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn effects(&self) -> &[String] {
        &self.effects
    }
}

#[async_trait::async_trait]
impl Device for SysfsDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn supports(&self, effect: &str) -> bool {
        self.effects.iter().any(|e| e == effect)
    }

    async fn set_static_color(&self, color: Rgb) -> bool {
        let attr = self.path.join(format!("{EFFECT_PREFIX}static"));
        match tokio::fs::write(&attr, color.to_bytes()).await {
            Ok(()) => true,
            Err(e) => {
                debug!("Write to {} failed: {}", attr.display(), e);
                false
            }
        }
    }
}

async fn read_attr(dir: &Path, attr: &str) -> String {
    tokio::fs::read_to_string(dir.join(attr))
        .await
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

async fn list_effects(dir: &Path) -> Vec<String> {
    let mut effects = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return effects;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(effect) = name.strip_prefix(EFFECT_PREFIX) {
            effects.push(effect.to_string());
        }
    }
    effects.sort();
    effects
}

fn driver_kind(driver: &str) -> &str {
    match driver {
        "razerkbd" => "keyboard",
        "razermouse" => "mouse",
        "razerkraken" => "headset",
        "razermousemat" => "mousemat",
        "razeraccessory" => "accessory",
        other => other.strip_prefix(DRIVER_PREFIX).unwrap_or(other),
    }
}
