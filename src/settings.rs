use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::Error, mode::Mode};

/// What a custom mode simulator answers unless told otherwise.
pub const DEFAULT_CUSTOM_RESPONSE: &str = "ok\n";

/// How long the simulator waits before answering, unless told otherwise.
pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_millis(10);

/// Everything a simulator needs to know in order to answer commands.
///
/// A copy is handed to the background responder when the simulator opens,
/// so changing these afterwards does not affect a running responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorSettings {
    /// The protocol to speak.
    pub mode: Mode,

    /// The literal used by [`Mode::Custom`].
    pub custom_response: String,

    /// Emulated hardware latency per command.
    pub response_delay: Duration,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            custom_response: DEFAULT_CUSTOM_RESPONSE.into(),
            response_delay: DEFAULT_RESPONSE_DELAY,
        }
    }
}

impl SimulatorSettings {
    /// Settings from a configuration string, see [`crate::mode::parse_uri`].
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        let mut settings = Self::default();
        settings.configure(uri)?;

        Ok(settings)
    }

    /// Apply a configuration string.
    ///
    /// Sets the mode, and for [`Mode::Custom`] the response literal if one is given.
    /// Nothing is changed if the string is rejected.
    pub fn configure(&mut self, uri: &str) -> Result<(), Error> {
        let parsed = crate::mode::parse_uri(uri)?;
        debug!(%uri, mode = %parsed.mode, "Configured");

        self.mode = parsed.mode;
        if let Some(response) = parsed.response {
            self.custom_response = response;
        }

        Ok(())
    }

    /// Set the response delay in milliseconds.
    /// Negative values are treated as zero.
    pub fn set_response_delay_ms(&mut self, millis: i64) {
        self.response_delay = Duration::from_millis(millis.max(0) as u64);
    }

    /// Builder style [`Self::set_response_delay_ms`].
    #[must_use]
    pub fn with_response_delay_ms(mut self, millis: i64) -> Self {
        self.set_response_delay_ms(millis);
        self
    }

    /// Builder style mode override.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder style custom response override.
    #[must_use]
    pub fn with_custom_response<S: Into<String>>(mut self, response: S) -> Self {
        self.custom_response = response.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults() {
        let settings = SimulatorSettings::default();

        assert_eq!(settings.mode, Mode::Echo);
        assert_eq!(settings.custom_response, "ok\n");
        assert_eq!(settings.response_delay, Duration::from_millis(10));
    }

    #[test]
    fn negative_delay_clamps() {
        let settings = SimulatorSettings::default().with_response_delay_ms(-5);

        assert_eq!(settings.response_delay, Duration::ZERO);
    }

    #[test]
    fn custom_keeps_default_literal_without_response() {
        let settings = SimulatorSettings::from_uri("loopback://custom").unwrap();

        assert_eq!(settings.mode, Mode::Custom);
        assert_eq!(settings.custom_response, DEFAULT_CUSTOM_RESPONSE);
    }

    #[test]
    fn rejected_uri_leaves_settings_alone() {
        let mut settings = SimulatorSettings::from_uri("loopback://grbl").unwrap();

        assert!(settings.configure("nonsense").is_err());
        assert_eq!(settings.mode, Mode::Grbl);
    }

    #[test]
    fn reconfigure() {
        let mut settings =
            SimulatorSettings::from_uri(r"loopback://custom?response=HELLO\n").unwrap();
        settings.configure("loopback://tinyg").unwrap();

        assert_eq!(settings.mode, Mode::TinyG);
        // The literal stays, it is just not used by this mode.
        assert_eq!(settings.custom_response, "HELLO\n");
    }
}
