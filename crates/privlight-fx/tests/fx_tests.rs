//! Tests for privlight-fx: sysfs discovery, colour indicator, listing

use privlight_core::{Action, Actuator, Error, Rgb};
use privlight_fx::*;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================
// Fixtures
// ============================================================

fn fake_razer_device(root: &Path, driver: &str, id: &str, name: &str, effects: &[&str]) {
    let dir = root.join(driver).join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("device_type"), format!("{name}\n")).unwrap();
    fs::write(dir.join("device_serial"), "XX0000000001\n").unwrap();
    fs::write(dir.join("firmware_version"), "v1.0\n").unwrap();
    fs::write(dir.join("version"), "3.5.1\n").unwrap();
    for effect in effects {
        fs::write(dir.join(format!("matrix_effect_{effect}")), "").unwrap();
    }
}

struct FakeDevice {
    info: DeviceInfo,
    effects: Vec<&'static str>,
    accept: bool,
    writes: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Device for FakeDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn supports(&self, effect: &str) -> bool {
        self.effects.contains(&effect)
    }

    async fn set_static_color(&self, _color: Rgb) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.accept
    }
}

/// (name, supports static, accepts writes)
struct FakeManager {
    specs: Vec<(&'static str, bool, bool)>,
    writes: Arc<AtomicUsize>,
}

impl FakeManager {
    fn new(specs: Vec<(&'static str, bool, bool)>) -> Self {
        Self {
            specs,
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl DeviceManager for FakeManager {
    async fn enumerate_devices(&self) -> privlight_core::Result<Vec<Box<dyn Device>>> {
        Ok(self
            .specs
            .iter()
            .map(|(name, static_ok, accept)| {
                Box::new(FakeDevice {
                    info: DeviceInfo {
                        name: name.to_string(),
                        ..Default::default()
                    },
                    effects: if *static_ok { vec!["static", "wave"] } else { vec!["wave"] },
                    accept: *accept,
                    writes: self.writes.clone(),
                }) as Box<dyn Device>
            })
            .collect())
    }
}

// ============================================================
// SysfsDeviceManager
// ============================================================

#[tokio::test]
async fn sysfs_enumerates_only_razer_drivers() {
    let tmp = TempDir::new().unwrap();
    fake_razer_device(tmp.path(), "razerkbd", "0003:1532:0226.0001", "Razer Huntsman", &["static", "wave"]);
    fake_razer_device(tmp.path(), "razermouse", "0003:1532:0084.0002", "Razer DeathAdder", &["none"]);
    fs::create_dir_all(tmp.path().join("usbhid").join("0003:046D:C52B.0003")).unwrap();

    let manager = SysfsDeviceManager::new(tmp.path());
    let devices = manager.enumerate_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].name(), "Razer Huntsman");
    assert_eq!(devices[0].info().device_type, "keyboard");
    assert_eq!(devices[0].info().serial, "XX0000000001");
    assert_eq!(devices[0].info().driver_version, "3.5.1");
    assert!(devices[0].supports("static"));
    assert!(!devices[1].supports("static"));
}

#[tokio::test]
async fn sysfs_skips_driver_entries_without_device_type() {
    let tmp = TempDir::new().unwrap();
    fake_razer_device(tmp.path(), "razerkbd", "0003:1532:0226.0001", "Razer Huntsman", &["static"]);
    // Driver directories also hold bind/unbind files and module links
    fs::write(tmp.path().join("razerkbd").join("bind"), "").unwrap();
    fs::create_dir_all(tmp.path().join("razerkbd").join("module")).unwrap();

    let devices = SysfsDeviceManager::new(tmp.path()).enumerate_devices().await.unwrap();
    assert_eq!(devices.len(), 1);
}

#[tokio::test]
async fn sysfs_missing_root_is_actuator_failure() {
    let tmp = TempDir::new().unwrap();
    let manager = SysfsDeviceManager::new(tmp.path().join("nope"));
    let err = manager.enumerate_devices().await.err().unwrap();
    assert!(matches!(err, Error::ActuatorFailure { .. }));
}

#[tokio::test]
async fn sysfs_static_write_is_raw_rgb_bytes() {
    let tmp = TempDir::new().unwrap();
    fake_razer_device(tmp.path(), "razerkbd", "0003:1532:0226.0001", "Razer Huntsman", &["static"]);

    let devices = SysfsDeviceManager::new(tmp.path()).enumerate_devices().await.unwrap();
    assert!(devices[0].set_static_color(Rgb(0, 153, 255)).await);

    let written = fs::read(
        tmp.path()
            .join("razerkbd")
            .join("0003:1532:0226.0001")
            .join("matrix_effect_static"),
    )
    .unwrap();
    assert_eq!(written, vec![0, 153, 255]);
}

// ============================================================
// StaticColorIndicator
// ============================================================

#[tokio::test]
async fn indicator_none_touches_nothing() {
    let manager = FakeManager::new(vec![("kbd", true, true)]);
    let writes = manager.writes.clone();
    let indicator = StaticColorIndicator::new(manager, Rgb::RED, Rgb::BLUE);

    assert_eq!(indicator.apply(Action::None).await.unwrap(), 0);
    assert_eq!(writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn indicator_updates_only_capable_devices() {
    let manager = FakeManager::new(vec![("kbd", true, true), ("mouse", false, true), ("mat", true, true)]);
    let writes = manager.writes.clone();
    let indicator = StaticColorIndicator::new(manager, Rgb::RED, Rgb::BLUE);

    assert_eq!(indicator.apply(Action::Elevate).await.unwrap(), 2);
    assert_eq!(writes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn indicator_reports_rejected_writes() {
    let manager = FakeManager::new(vec![("kbd", true, true), ("mat", true, false)]);
    let indicator = StaticColorIndicator::new(manager, Rgb::RED, Rgb::BLUE);

    match indicator.apply(Action::DeEscalate).await {
        Err(Error::ActuatorFailure { device, message }) => {
            assert_eq!(device, "mat");
            assert!(message.contains("1 of 2"));
        }
        other => panic!("expected actuator failure, got {other:?}"),
    }
}

#[tokio::test]
async fn indicator_without_capable_devices_fails() {
    let manager = FakeManager::new(vec![("mouse", false, true)]);
    let indicator = StaticColorIndicator::new(manager, Rgb::RED, Rgb::BLUE);
    assert!(indicator.apply(Action::Elevate).await.is_err());
}

#[test]
fn indicator_colour_mapping() {
    let indicator = StaticColorIndicator::new(FakeManager::new(vec![]), Rgb::RED, Rgb::BLUE);
    assert_eq!(indicator.color_for(Action::Elevate), Some(Rgb::RED));
    assert_eq!(indicator.color_for(Action::DeEscalate), Some(Rgb::BLUE));
    assert_eq!(indicator.color_for(Action::None), None);
}

#[test]
fn indicator_nested_exit_shows_baseline() {
    let indicator = StaticColorIndicator::new(FakeManager::new(vec![]), Rgb::RED, Rgb::BLUE);
    let action = Action::resolve(3, 2);
    assert_eq!(action, Action::DeEscalate);
    assert_eq!(indicator.color_for(action), Some(Rgb::BLUE));
}

#[tokio::test]
async fn indicator_custom_effect() {
    let manager = FakeManager::new(vec![("kbd", true, true)]);
    let indicator = StaticColorIndicator::new(manager, Rgb::RED, Rgb::BLUE).with_effect("wave");
    assert_eq!(indicator.apply(Action::Elevate).await.unwrap(), 1);
}

#[tokio::test]
async fn dry_run_reports_zero_devices() {
    assert_eq!(DryRunIndicator.apply(Action::Elevate).await.unwrap(), 0);
    assert_eq!(DryRunIndicator.name(), "dry-run");
}

// ============================================================
// Listing
// ============================================================

#[tokio::test]
async fn listing_includes_device_fields() {
    let tmp = TempDir::new().unwrap();
    fake_razer_device(tmp.path(), "razerkbd", "0003:1532:0226.0001", "Razer Huntsman", &["static"]);
    let devices = SysfsDeviceManager::new(tmp.path()).enumerate_devices().await.unwrap();

    let out = render_device_list(&devices, STATIC_EFFECT);
    assert!(out.starts_with("Found 1 devices"));
    assert!(out.contains("Razer Huntsman:"));
    assert!(out.contains("Serial: XX0000000001"));
    assert!(out.contains("Supports static lighting effect: true"));
}
