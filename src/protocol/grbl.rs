//! GRBL 1.1 style plain text answers.
//!
//! Real-time bytes (`?`, `~`, `!`, soft-reset) arrive here as ordinary lines.
//! Real firmware acts on them out of band, ahead of anything queued.

use super::{Matcher, Protocol, Reply, Rule};

/// Ctrl-X.
pub const SOFT_RESET: &str = "\u{18}";

/// Blank line, then the welcome banner.
pub const BOOT_BANNER: &str = "\nGrbl 1.1h ['$' for help]\n";

/// Plain acknowledgement.
pub const OK: &str = "ok\n";

/// `$$`
pub const SETTINGS: &str = "\
$0=10
$1=25
$2=0
$3=0
$4=0
$5=0
$6=0
$10=1
$11=0.010
$12=0.002
$13=0
$20=0
$21=0
$22=0
$23=0
$24=25.000
$25=500.000
$26=250
$27=1.000
$30=1000
$31=0
$32=0
$100=250.000
$101=250.000
$102=250.000
$110=500.000
$111=500.000
$112=500.000
$120=10.000
$121=10.000
$122=10.000
$130=200.000
$131=200.000
$132=200.000
ok
";

/// `$#`
pub const COORDINATE_OFFSETS: &str = "\
[G54:0.000,0.000,0.000]
[G55:0.000,0.000,0.000]
[G56:0.000,0.000,0.000]
[G57:0.000,0.000,0.000]
[G58:0.000,0.000,0.000]
[G59:0.000,0.000,0.000]
[G28:0.000,0.000,0.000]
[G30:0.000,0.000,0.000]
[G92:0.000,0.000,0.000]
[TLO:0.000]
[PRB:0.000,0.000,0.000:0]
ok
";

/// `$G`
pub const PARSER_STATE: &str = "[GC:G0 G54 G17 G21 G90 G94 M5 M9 T0 F0 S0]\nok\n";

/// `$I`
pub const BUILD_INFO: &str = "[VER:1.1h.20190825:]\n[OPT:V,15,128]\nok\n";

/// `$N`
pub const STARTUP_LINES: &str = "$N0=\n$N1=\nok\n";

/// `?`
pub const STATUS_REPORT: &str =
    "<Idle|MPos:0.000,0.000,0.000|FS:0,0|WCO:0.000,0.000,0.000>\n";

/// First match wins.
pub static RULES: &[Rule] = &[
    Rule::new(Matcher::Exact("$$"), Reply::Text(SETTINGS)),
    Rule::new(Matcher::Exact("$#"), Reply::Text(COORDINATE_OFFSETS)),
    Rule::new(Matcher::Exact("$G"), Reply::Text(PARSER_STATE)),
    Rule::new(Matcher::Exact("$I"), Reply::Text(BUILD_INFO)),
    Rule::new(Matcher::Exact("$N"), Reply::Text(STARTUP_LINES)),
    // Homing and alarm unlock.
    Rule::new(Matcher::Prefix("$H"), Reply::Text(OK)),
    Rule::new(Matcher::Prefix("$X"), Reply::Text(OK)),
    Rule::new(Matcher::Prefix("$"), Reply::Text(OK)),
    Rule::new(Matcher::Exact("?"), Reply::Text(STATUS_REPORT)),
    // Cycle start, feed hold, soft reset.
    Rule::new(Matcher::Prefix("~"), Reply::Nothing),
    Rule::new(Matcher::Prefix("!"), Reply::Nothing),
    Rule::new(Matcher::Exact(SOFT_RESET), Reply::Nothing),
    Rule::new(Matcher::Exact(""), Reply::Text(OK)),
    Rule::new(Matcher::Any, Reply::Text(OK)),
];

/// The GRBL emulation.
pub static PROTOCOL: Protocol = Protocol {
    normalize,
    rules: RULES,
    boot: Some(Reply::Text(BOOT_BANNER)),
    fallback: Reply::Text(OK),
};

/// Trims, and drops a leading `N<digits>` line number.
pub fn normalize(command: &str) -> &str {
    let command = command.trim();

    let Some(rest) = command.strip_prefix('N') else {
        return command;
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return command;
    }

    rest[digits..].trim_start()
}
