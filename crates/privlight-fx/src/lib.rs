//! privlight-fx — lighting devices as a privilege indicator
//!
//! - `device`: the Device / DeviceManager seam
//! - `sysfs`: OpenRazer kernel-driver backend
//! - `indicator`: Actuator implementations mapping actions to colours
//! - `listing`: device listing for the `devices` subcommand

pub mod device;
pub mod indicator;
pub mod listing;
pub mod sysfs;

pub use device::{Device, DeviceInfo, DeviceManager, STATIC_EFFECT};
pub use indicator::{DryRunIndicator, StaticColorIndicator};
pub use listing::render_device_list;
pub use sysfs::{SysfsDeviceManager, DEFAULT_SYSFS_ROOT};
