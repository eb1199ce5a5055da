#![deny(missing_docs)]

//! A loopback serial endpoint which pretends to be CNC controller firmware.
//!
//! Useful for exercising software that talks to GRBL or TinyG controllers
//! without having one attached.
//!
//! A [`simulator::Simulator`] is configured by a string such as `loopback://grbl`
//! or `loopback://custom?response=CUSTOM_OK\n`, opened, and then fed commands.
//! Answers arrive at a [`sink::ResponseSink`], in the order the commands were sent.
//!
//! Closing a simulator drops any commands not yet answered.

/// Library errors.
pub mod error;

/// Protocol modes and parsing of configuration strings.
pub mod mode;

/// The per-simulator settings.
pub mod settings;

/// What each emulated firmware answers.
pub mod protocol;

/// The simulator itself: lifecycle and the background responder.
pub mod simulator;

/// Where responses are delivered.
pub mod sink;

/// The catalog of simulated devices.
pub mod device;

/// Message types.
pub mod serial;

/// Codecs for splitting byte streams into commands.
pub mod codec;

/// Relates to config files.
pub mod config;

/// The command line interface.
pub mod cli;

/// Logging/tracing setup.
pub mod logging;
