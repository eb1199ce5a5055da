use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// Scheme used by catalog addresses.
pub const SCHEME: &str = "loopback";

/// Manufacturer shown for every simulated endpoint.
pub const MANUFACTURER: &str = "Simulated";

/// A pseudo-endpoint which can be offered in device pickers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    /// Where to connect, also a valid configuration string.
    pub address: String,

    /// Human readable.
    pub description: String,

    /// Always [`MANUFACTURER`] for catalog entries.
    pub manufacturer: String,
}

impl Device {
    fn simulated(mode: Mode, description: &str) -> Self {
        Self {
            address: format!("{SCHEME}://{mode}"),
            description: description.into(),
            manufacturer: MANUFACTURER.into(),
        }
    }

    /// The configuration string selecting this device.
    pub fn uri(&self) -> &str {
        &self.address
    }
}

impl Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.address, self.description, self.manufacturer
        )
    }
}

/// The simulated endpoints, always the same four in the same order.
///
/// Does not probe anything.
pub fn list_devices() -> Vec<Device> {
    vec![
        Device::simulated(Mode::Echo, "Loopback echo, answers with the command itself"),
        Device::simulated(Mode::Grbl, "Simulated GRBL 1.1 controller"),
        Device::simulated(Mode::TinyG, "Simulated TinyG controller"),
        Device::simulated(Mode::Custom, "Loopback answering with a fixed response"),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mode::parse_uri;

    #[test]
    fn four_in_order() {
        let addresses = list_devices()
            .into_iter()
            .map(|device| device.address)
            .collect::<Vec<_>>();

        assert_eq!(
            addresses,
            [
                "loopback://echo",
                "loopback://grbl",
                "loopback://tinyg",
                "loopback://custom"
            ]
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(list_devices(), list_devices());
    }

    #[test]
    fn all_simulated() {
        assert!(list_devices()
            .iter()
            .all(|device| device.manufacturer == MANUFACTURER && !device.description.is_empty()));
    }

    #[test]
    fn addresses_select_their_mode() {
        let modes = list_devices()
            .iter()
            .map(|device| parse_uri(device.uri()).unwrap().mode)
            .collect::<Vec<_>>();

        assert_eq!(modes, [Mode::Echo, Mode::Grbl, Mode::TinyG, Mode::Custom]);
    }
}
