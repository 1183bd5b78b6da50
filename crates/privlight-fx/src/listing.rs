//! Human-readable device listing

use crossterm::style::Stylize;

use crate::device::Device;

/// Render detected devices as bright blue status text.
pub fn render_device_list(devices: &[Box<dyn Device>], effect: &str) -> String {
    let mut out = format!("Found {} devices\n\n", devices.len());
    for device in devices {
        let info = device.info();
        let lines = [
            format!("{}:", info.name),
            format!("   Type: {}", info.device_type),
            format!("   Serial: {}", info.serial),
            format!("   Firmware version: {}", info.firmware_version),
            format!("   Driver version: {}", info.driver_version),
            format!(
                "   Supports {} lighting effect: {}",
                effect,
                device.supports(effect)
            ),
        ];
        for line in lines {
            out.push_str(&format!("{}\n", line.blue().bold()));
        }
        out.push('\n');
    }
    out
}
