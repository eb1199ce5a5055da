//! Which firmware the simulator pretends to be,
//! and how that is picked from a configuration string.
//!
//! Configuration strings look like `scheme://mode[?response=<literal>]`.
//! The scheme is not interpreted.

use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, UriError};

/// The protocol a simulator speaks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Every command is sent back as-is.
    #[default]
    Echo,

    /// GRBL plain text protocol.
    Grbl,

    /// TinyG JSON protocol.
    TinyG,

    /// Every command is answered with the same configured literal.
    Custom,
}

impl Mode {
    /// The mode a name maps to.
    /// Case insensitive, and anything unknown (also the empty string) is [`Mode::Echo`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "grbl" => Self::Grbl,
            "tinyg" => Self::TinyG,
            "custom" => Self::Custom,
            _ => Self::Echo,
        }
    }

    /// The lowercase name used in configuration strings.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Echo => "echo",
            Mode::Grbl => "grbl",
            Mode::TinyG => "tinyg",
            Mode::Custom => "custom",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Mode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// The parts of a configuration string the simulator cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri {
    /// The selected mode.
    pub mode: Mode,

    /// The decoded `response` query value, if present.
    /// Only meaningful for [`Mode::Custom`].
    pub response: Option<String>,
}

/// Parse a configuration string.
///
/// Fails only if the string has no usable `scheme://` prefix.
pub fn parse_uri(uri: &str) -> Result<ParsedUri, Error> {
    let configuration_error = |source| Error::Configuration {
        uri: uri.to_owned(),
        source,
    };

    let (scheme, rest) = uri
        .split_once("://")
        .ok_or_else(|| configuration_error(UriError::MissingSchemeSeparator))?;

    if scheme.trim().is_empty() {
        return Err(configuration_error(UriError::EmptyScheme));
    }

    let (mode, query) = match rest.split_once('?') {
        Some((mode, query)) => (mode, Some(query)),
        None => (rest, None),
    };

    let mode = Mode::from_name(mode.trim().trim_end_matches('/'));

    let response = if mode == Mode::Custom {
        query.and_then(response_value).map(unescape_newlines)
    } else {
        None
    };

    Ok(ParsedUri { mode, response })
}

/// The value of the `response` key, terminated by `&` or end of string.
fn response_value(query: &str) -> Option<&str> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("response="))
}

/// The two characters `\n` become a line break.
fn unescape_newlines(literal: &str) -> String {
    literal.replace("\\n", "\n")
}
