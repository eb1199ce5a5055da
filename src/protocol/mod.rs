//! Synthesizes the answer a controller would give to a command.
//!
//! Firmware protocols are described as ordered rule tables.
//! The first rule whose [`Matcher`] accepts the (normalized) command decides the [`Reply`].
//! Nothing here fails: unknown input always gets some acknowledgement.

use std::borrow::Cow;

use crate::{mode::Mode, settings::SimulatorSettings};

/// GRBL rules.
pub mod grbl;

/// TinyG rules.
pub mod tinyg;

/// Decides whether a rule applies to a normalized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// The command is exactly this.
    Exact(&'static str),

    /// The command starts with this.
    Prefix(&'static str),

    /// Any command.
    Any,
}

impl Matcher {
    /// Check a normalized command.
    pub fn matches(&self, command: &str) -> bool {
        match self {
            Matcher::Exact(exact) => command == *exact,
            Matcher::Prefix(prefix) => command.starts_with(prefix),
            Matcher::Any => true,
        }
    }
}

/// What to answer when a rule matches.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Literal protocol text, newline terminated.
    Text(&'static str),

    /// A JSON document, written on a single line.
    Json(fn() -> serde_json::Value),

    /// Say nothing at all.
    Nothing,
}

impl Reply {
    fn render(&self) -> String {
        match self {
            Reply::Text(text) => (*text).to_owned(),
            Reply::Json(document) => format!("{}\n", document()),
            Reply::Nothing => String::new(),
        }
    }
}

/// One entry of a rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// When the rule applies.
    pub matcher: Matcher,

    /// What to answer.
    pub reply: Reply,
}

impl Rule {
    const fn new(matcher: Matcher, reply: Reply) -> Self {
        Self { matcher, reply }
    }
}

/// A rule based firmware emulation.
#[derive(Clone, Copy)]
pub struct Protocol {
    /// Cleans up a raw command before matching.
    pub normalize: fn(&str) -> &str,

    /// Evaluated in order, first match wins.
    pub rules: &'static [Rule],

    /// What is said when a connection opens, if anything.
    pub boot: Option<Reply>,

    /// Used when no rule matches.
    pub fallback: Reply,
}

impl Protocol {
    /// The first matching rule, if any.
    pub fn rule_for(&self, command: &str) -> Option<&'static Rule> {
        let command = (self.normalize)(command);
        self.rules.iter().find(|rule| rule.matcher.matches(command))
    }

    /// Answer a raw command.
    pub fn respond(&self, command: &str) -> String {
        self.rule_for(command)
            .map(|rule| &rule.reply)
            .unwrap_or(&self.fallback)
            .render()
    }

    /// Text to emit on open, if any.
    pub fn boot_chatter(&self) -> Option<String> {
        self.boot.as_ref().map(Reply::render)
    }
}

/// The rule table for a mode, if the mode is table driven.
pub fn protocol(mode: Mode) -> Option<&'static Protocol> {
    match mode {
        Mode::Grbl => Some(&grbl::PROTOCOL),
        Mode::TinyG => Some(&tinyg::PROTOCOL),
        Mode::Echo | Mode::Custom => None,
    }
}

/// The answer to a command.
/// An empty answer means nothing should be emitted.
pub fn respond<'a>(settings: &'a SimulatorSettings, command: &'a str) -> Cow<'a, str> {
    match settings.mode {
        Mode::Echo => Cow::Borrowed(command),
        Mode::Custom => Cow::Borrowed(settings.custom_response.as_str()),
        Mode::Grbl | Mode::TinyG => match protocol(settings.mode) {
            Some(protocol) => Cow::Owned(protocol.respond(command)),
            None => Cow::Borrowed(""),
        },
    }
}

/// What a controller says by itself when the connection opens.
pub fn boot_chatter(mode: Mode) -> Option<String> {
    protocol(mode).and_then(Protocol::boot_chatter)
}
