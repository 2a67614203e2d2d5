//! Process-wide configuration, fixed once the core is built.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::host::{Control, VehicleClass};
use crate::logging::Logger;
use crate::metrics::CoreMetrics;
use crate::runtime::audit::{CoreAudit, NullCoreAudit};
use crate::units::DisplayUnit;

/// Configuration knobs for the coordination core.
#[derive(Clone)]
pub struct CoreConfig {
    /// Unit the detection pipeline reports speeds in.
    pub units: DisplayUnit,
    /// Cadence of the radar collaborator's update.
    pub radar_update_cadence: Duration,
    /// Edge-triggered control that toggles the control panel.
    pub toggle_control: Control,
    /// Vehicle classes whose drivers get the radar.
    pub qualifying_classes: Vec<VehicleClass>,
    /// Optional structured logger shared by every component.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<CoreMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
    pub audit: Arc<dyn CoreAudit>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            units: DisplayUnit::Miles,
            radar_update_cadence: Duration::from_millis(10),
            toggle_control: Control::VEHICLE_DUCK,
            qualifying_classes: vec![VehicleClass::EMERGENCY],
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "rs9000::runtime.metrics".to_string(),
            audit: Arc::new(NullCoreAudit),
        }
    }
}

impl CoreConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(CoreMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<CoreMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    /// Overlay `settings` on the defaults.
    pub fn from_settings(settings: &CoreSettings) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(units) = settings.units.as_deref() {
            config.units = units.parse()?;
        }
        if let Some(ms) = settings.radar_update_ms {
            config.radar_update_cadence = Duration::from_millis(ms);
        }
        if let Some(control) = settings.toggle_control {
            config.toggle_control = control;
        }
        if let Some(classes) = settings.qualifying_classes.as_ref() {
            if classes.is_empty() {
                return Err(ConfigError::InvalidSettings(
                    "qualifyingClasses must name at least one class".to_string(),
                ));
            }
            config.qualifying_classes = classes.clone();
        }
        Ok(config)
    }

    pub fn from_settings_json(text: &str) -> Result<Self, ConfigError> {
        let settings: CoreSettings = serde_json::from_str(text)
            .map_err(|err| ConfigError::InvalidSettings(err.to_string()))?;
        Self::from_settings(&settings)
    }
}

/// Settings document read at resource start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CoreSettings {
    pub units: Option<String>,
    pub radar_update_ms: Option<u64>,
    pub toggle_control: Option<Control>,
    pub qualifying_classes: Option<Vec<VehicleClass>>,
}
