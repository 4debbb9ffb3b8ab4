// ── Poll snapshot ──
//
// One complete view of the hub, rebuilt from scratch on every successful
// poll. Maps are private so every key is guaranteed to equal the `ain` of
// the value stored under it.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ain::Ain;
use super::device::Device;
use super::template::Template;

/// Devices and templates indexed by AIN.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    devices: BTreeMap<Ain, Device>,
    templates: BTreeMap<Ain, Template>,
}

impl Snapshot {
    /// An empty snapshot, used before the first successful poll.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index freshly fetched devices and templates.
    ///
    /// The availability heuristic is applied to every device before it is
    /// stored. If the hub reports an AIN twice, the later entry wins.
    pub fn from_poll(
        devices: impl IntoIterator<Item = Device>,
        templates: impl IntoIterator<Item = Template>,
    ) -> Self {
        let devices = devices
            .into_iter()
            .map(|mut device| {
                device.apply_availability_heuristic();
                (device.ain.clone(), device)
            })
            .collect();
        let templates = templates
            .into_iter()
            .map(|template| (template.ain.clone(), template))
            .collect();
        Self { devices, templates }
    }

    pub fn device(&self, ain: &Ain) -> Option<&Device> {
        self.devices.get(ain)
    }

    pub fn template(&self, ain: &Ain) -> Option<&Template> {
        self.templates.get(ain)
    }

    pub fn contains_template(&self, ain: &Ain) -> bool {
        self.templates.contains_key(ain)
    }

    /// Devices in AIN order.
    pub fn devices(&self) -> impl ExactSizeIterator<Item = &Device> {
        self.devices.values()
    }

    /// Templates in AIN order.
    pub fn templates(&self) -> impl ExactSizeIterator<Item = &Template> {
        self.templates.values()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.templates.is_empty()
    }
}
