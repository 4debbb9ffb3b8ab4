// Scripted in-memory SmartHome client shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};

use fritzhome_core::{Ain, ClientError, Device, HubConfig, PowerMeter, SmartHomeClient, Template};

/// Fake client whose refresh and login outcomes are queued up front.
///
/// When a queue runs dry the call succeeds. Devices and templates are
/// whatever was last set with `set_devices` / `set_templates`.
#[derive(Default)]
pub struct FakeClient {
    update_results: Mutex<VecDeque<Result<(), ClientError>>>,
    template_results: Mutex<VecDeque<Result<(), ClientError>>>,
    login_results: Mutex<VecDeque<Result<(), ClientError>>>,
    apply_results: Mutex<VecDeque<Result<(), ClientError>>>,
    devices: Mutex<Vec<Device>>,
    templates: Mutex<Vec<Template>>,
    update_calls: AtomicUsize,
    fetch_delay: Mutex<Duration>,
    fetches_in_flight: AtomicUsize,
    max_fetches_in_flight: AtomicUsize,
    login_calls: AtomicUsize,
    applied: Mutex<Vec<Ain>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(devices: Vec<Device>, templates: Vec<Template>) -> Self {
        let client = Self::new();
        client.set_devices(devices);
        client.set_templates(templates);
        client
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock().unwrap() = devices;
    }

    pub fn set_templates(&self, templates: Vec<Template>) {
        *self.templates.lock().unwrap() = templates;
    }

    /// Queue the outcome of the next `update_devices` call.
    pub fn push_update(&self, result: Result<(), ClientError>) {
        self.update_results.lock().unwrap().push_back(result);
    }

    /// Queue the outcome of the next `update_templates` call.
    pub fn push_template_update(&self, result: Result<(), ClientError>) {
        self.template_results.lock().unwrap().push_back(result);
    }

    pub fn push_login(&self, result: Result<(), ClientError>) {
        self.login_results.lock().unwrap().push_back(result);
    }

    pub fn push_apply(&self, result: Result<(), ClientError>) {
        self.apply_results.lock().unwrap().push_back(result);
    }

    /// Number of `update_devices` calls, i.e. fetch attempts.
    pub fn fetch_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Make every `update_devices` call block for `delay`.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    /// Highest number of `update_devices` calls that ran at the same time.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_fetches_in_flight.load(Ordering::SeqCst)
    }

    pub fn login_count(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn applied(&self) -> Vec<Ain> {
        self.applied.lock().unwrap().clone()
    }
}

impl SmartHomeClient for FakeClient {
    fn login(&self) -> Result<(), ClientError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.login_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn update_devices(&self) -> Result<(), ClientError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.fetches_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_fetches_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        self.fetches_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.update_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn update_templates(&self) -> Result<(), ClientError> {
        self.template_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn devices(&self) -> Vec<Device> {
        self.devices.lock().unwrap().clone()
    }

    fn templates(&self) -> Vec<Template> {
        self.templates.lock().unwrap().clone()
    }

    fn apply_template(&self, ain: &Ain) -> Result<(), ClientError> {
        self.applied.lock().unwrap().push(ain.clone());
        self.apply_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn hub_config() -> HubConfig {
    HubConfig {
        name: "test-hub".into(),
        ..HubConfig::default()
    }
}

pub fn forbidden() -> ClientError {
    ClientError::Http {
        status: 403,
        message: "Forbidden".into(),
    }
}

pub fn refused() -> ClientError {
    ClientError::Connection("connection refused".into())
}

pub fn plug(ain: &str, power: f64, energy: f64, voltage: Option<f64>) -> Device {
    Device {
        manufacturer: Some("AVM".into()),
        product_name: Some("FRITZ!DECT 200".into()),
        fw_version: Some("04.25".into()),
        power_meter: Some(PowerMeter {
            power,
            energy,
            voltage,
        }),
        ..Device::new(ain, format!("Plug {ain}"))
    }
}

pub fn thermostat(ain: &str) -> Device {
    Device {
        manufacturer: Some("AVM".into()),
        product_name: Some("FRITZ!DECT 301".into()),
        ..Device::new(ain, format!("Thermostat {ain}"))
    }
}
