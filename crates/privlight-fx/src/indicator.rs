//! Actuators that render privilege state as device colour

use privlight_core::{Action, Actuator, Error, Result, Rgb};
use tracing::{debug, info};

use crate::device::{Device, DeviceManager, STATIC_EFFECT};

/// Sets every capable device to the elevated colour on [`Action::Elevate`]
/// and back to the baseline colour on [`Action::DeEscalate`].
///
/// Actions carry only the direction of a depth change, so leaving one level
/// of a nested elevation (depth 3 to 2) shows the baseline colour even though
/// the session is still elevated.
pub struct StaticColorIndicator<M> {
    manager: M,
    elevated: Rgb,
    baseline: Rgb,
    effect: String,
}

impl<M: DeviceManager> StaticColorIndicator<M> {
    pub fn new(manager: M, elevated: Rgb, baseline: Rgb) -> Self {
        Self {
            manager,
            elevated,
            baseline,
            effect: STATIC_EFFECT.to_string(),
        }
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = effect.into();
        self
    }

    pub fn color_for(&self, action: Action) -> Option<Rgb> {
        match action {
            Action::None => None,
            Action::Elevate => Some(self.elevated),
            Action::DeEscalate => Some(self.baseline),
        }
    }

    /// Devices that support the configured effect, as a fresh sequence.
    async fn capable_devices(&self) -> Result<Vec<Box<dyn Device>>> {
        let devices = self.manager.enumerate_devices().await?;
        Ok(devices
            .into_iter()
            .filter(|d| {
                let ok = d.supports(&self.effect);
                if !ok {
                    debug!(
                        "Skipping device {} ({}). {} effect not detected.",
                        d.name(),
                        d.info().serial,
                        self.effect
                    );
                }
                ok
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl<M: DeviceManager> Actuator for StaticColorIndicator<M> {
    fn name(&self) -> &str {
        "static-color"
    }

    async fn apply(&self, action: Action) -> Result<usize> {
        let Some(color) = self.color_for(action) else {
            return Ok(0);
        };

        let devices = self.capable_devices().await?;
        if devices.is_empty() {
            return Err(Error::actuator_failure(
                "*",
                format!("no device supports the {} effect", self.effect),
            ));
        }

        let mut updated = 0;
        let mut failed = Vec::new();
        for device in &devices {
            if device.set_static_color(color).await {
                debug!("Successfully set {} to static {}", device.name(), color);
                updated += 1;
            } else {
                failed.push(device.name().to_string());
            }
        }

        if failed.is_empty() {
            Ok(updated)
        } else {
            Err(Error::actuator_failure(
                failed.join(", "),
                format!("failed to set {color} ({updated} of {} updated)", devices.len()),
            ))
        }
    }
}

/// Logs actions without touching hardware.
#[derive(Debug, Default)]
pub struct DryRunIndicator;

#[async_trait::async_trait]
impl Actuator for DryRunIndicator {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn apply(&self, action: Action) -> Result<usize> {
        info!("[dry-run] would apply {}", action);
        Ok(0)
    }
}
