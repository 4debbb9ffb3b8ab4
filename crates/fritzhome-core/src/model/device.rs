// ── Device domain types ──

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ain::Ain;

/// Electrical readings of a device with a power meter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerMeter {
    /// Current power draw in watts.
    pub power: f64,
    /// Energy consumed since the meter was reset, in watt-hours.
    pub energy: f64,
    /// Line voltage in volts. Only reported by newer firmware.
    pub voltage: Option<f64>,
}

impl PowerMeter {
    /// All readings are at or below zero while a voltage is reported.
    ///
    /// Some plugs report this right after losing their DECT link while
    /// still claiming to be present.
    pub fn reads_dead(&self) -> bool {
        match self.voltage {
            Some(voltage) => voltage <= 0.0 && self.power <= 0.0 && self.energy <= 0.0,
            None => false,
        }
    }
}

/// A SmartHome device as reported by the hub.
///
/// This is a value copy of the client's data: the coordinator owns it for
/// one poll cycle and may correct `present` without touching the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub ain: Ain,
    pub name: String,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub fw_version: Option<String>,
    pub present: bool,
    pub power_meter: Option<PowerMeter>,
}

impl Device {
    pub fn new(ain: impl Into<Ain>, name: impl Into<String>) -> Self {
        Self {
            ain: ain.into(),
            name: name.into(),
            manufacturer: None,
            product_name: None,
            fw_version: None,
            present: true,
            power_meter: None,
        }
    }

    pub fn has_power_meter(&self) -> bool {
        self.power_meter.is_some()
    }

    /// Present according to the hub, but its power meter reads dead.
    pub fn is_phantom_present(&self) -> bool {
        self.present && self.power_meter.as_ref().is_some_and(PowerMeter::reads_dead)
    }

    /// Clear `present` on phantom-present devices. Returns `true` if the
    /// flag was changed.
    pub(crate) fn apply_availability_heuristic(&mut self) -> bool {
        if !self.is_phantom_present() {
            return false;
        }
        debug!(ain = %self.ain, name = %self.name, "assume device as unavailable");
        self.present = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metered(power: f64, energy: f64, voltage: Option<f64>) -> Device {
        Device {
            power_meter: Some(PowerMeter {
                power,
                energy,
                voltage,
            }),
            ..Device::new("11630 0000001", "Kitchen plug")
        }
    }

    #[test]
    fn all_zero_readings_mark_device_absent() {
        let mut device = metered(0.0, 0.0, Some(0.0));
        assert!(device.apply_availability_heuristic());
        assert!(!device.present);
    }

    #[test]
    fn negative_readings_count_as_dead() {
        let mut device = metered(-1.0, 0.0, Some(-0.5));
        assert!(device.apply_availability_heuristic());
        assert!(!device.present);
    }

    #[test]
    fn any_positive_reading_keeps_device_present() {
        for device in [
            metered(4.2, 0.0, Some(0.0)),
            metered(0.0, 1523.0, Some(0.0)),
            metered(0.0, 0.0, Some(229.8)),
        ] {
            let mut device = device;
            assert!(!device.apply_availability_heuristic());
            assert!(device.present);
        }
    }

    #[test]
    fn missing_voltage_is_not_judged() {
        let mut device = metered(0.0, 0.0, None);
        assert!(!device.apply_availability_heuristic());
        assert!(device.present);
    }

    #[test]
    fn devices_without_meter_are_untouched() {
        let mut device = Device::new("09995 0000002", "Radiator");
        assert!(!device.has_power_meter());
        assert!(!device.apply_availability_heuristic());
        assert!(device.present);
    }

    #[test]
    fn absent_devices_stay_absent() {
        let mut device = Device {
            present: false,
            ..metered(0.0, 0.0, Some(0.0))
        };
        assert!(!device.apply_availability_heuristic());
        assert!(!device.present);
    }
}
