use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::Error, settings::SimulatorSettings};

/// A simulator as described by a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Selects the mode, e.g. `loopback://grbl`.
    /// See [`crate::mode::parse_uri`].
    pub uri: String,

    /// Emulated latency per command, in milliseconds.
    /// Negative values are treated as zero.
    pub response_delay_ms: i64,

    /// How many responses a slow observer may lag behind before missing some.
    pub observer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uri: "loopback://echo".into(),
            response_delay_ms: 10,
            observer_capacity: 1024,
        }
    }
}

impl Config {
    fn ron() -> ron::Options {
        ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .with_default_extension(ron::extensions::Extensions::UNWRAP_NEWTYPES)
    }

    /// Deserialize a .ron file's contents.
    pub fn deserialize(input: &str) -> Result<Self, Error> {
        Self::ron()
            .from_str::<Config>(input)
            .map_err(|e| Error::BadConfigFile(e.to_string()))
    }

    /// An example configuration with some fields filled in.
    pub fn example() -> Self {
        Self {
            uri: r"loopback://custom?response=CUSTOM_OK\n".into(),
            response_delay_ms: 25,
            ..Default::default()
        }
    }

    /// Serialize the configuration in a "pretty" (i.e. non-compact) fashion.
    pub fn serialize_pretty(&self) -> Result<String, Error> {
        Self::ron()
            .to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::BadConfigFile(e.to_string()))
    }

    /// Setup a new configuration from a RON file.
    pub fn new_from_path<P: AsRef<Path>>(p: P) -> Result<Self, Error> {
        let path = p.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| Error::BadConfigFile(format!("{}: {e}", path.display())))?;

        Self::deserialize(&s)
    }

    /// The simulator settings this configuration describes.
    pub fn to_settings(&self) -> Result<SimulatorSettings, Error> {
        Ok(SimulatorSettings::from_uri(&self.uri)?.with_response_delay_ms(self.response_delay_ms))
    }
}
