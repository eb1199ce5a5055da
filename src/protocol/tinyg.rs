//! TinyG style JSON answers. Every answer is a single line.

use serde_json::{json, Value};

use super::{Matcher, Protocol, Reply, Rule};

/// Footer of a successful request: revision, status code, rx buffer, checksum.
fn footer() -> Value {
    json!([1, 0, 0, 0])
}

/// Sent once when the connection opens.
pub fn identification() -> Value {
    json!({
        "r": {
            "fv": 0.97,
            "fb": 440.2,
            "hp": 1,
            "hv": 8,
            "id": "loopback-tinyg",
            "msg": "SYSTEM READY"
        },
        "f": footer()
    })
}

/// Generic acknowledgement.
pub fn acknowledgement() -> Value {
    json!({ "r": {}, "f": footer() })
}

/// Answer to `?`.
pub fn status_report() -> Value {
    json!({
        "sr": {
            "stat": 3,
            "momo": 0,
            "coor": 1,
            "posx": 0.0,
            "posy": 0.0,
            "posz": 0.0,
            "posa": 0.0,
            "vel": 0.0
        }
    })
}

/// First match wins.
pub static RULES: &[Rule] = &[
    Rule::new(Matcher::Prefix("{"), Reply::Json(acknowledgement)),
    Rule::new(Matcher::Exact("?"), Reply::Json(status_report)),
    Rule::new(Matcher::Any, Reply::Json(acknowledgement)),
];

/// The TinyG emulation.
pub static PROTOCOL: Protocol = Protocol {
    normalize: str::trim,
    rules: RULES,
    boot: Some(Reply::Json(identification)),
    fallback: Reply::Json(acknowledgement),
};

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn respond(command: &str) -> Value {
        let response = PROTOCOL.respond(command);

        assert!(response.ends_with('\n'));
        assert_eq!(response.lines().count(), 1);

        serde_json::from_str(&response).unwrap()
    }

    #[test]
    fn json_request_acks() {
        let response = respond("{\"xvm\":12000}\n");

        assert_eq!(response["r"], json!({}));
        assert!(response["f"].is_array());
    }

    #[test]
    fn status_poll() {
        let response = respond("?\n");

        assert!(response.get("r").is_none());
        assert_eq!(response["sr"]["stat"], 3);
        assert!(response["sr"]["posx"].is_number());
    }

    #[test]
    fn anything_else_acks() {
        for command in ["$sys", "G0 X1", "", "???"] {
            assert_eq!(respond(command), acknowledgement(), "{command}");
        }
    }

    #[test]
    fn identification_on_boot() {
        let boot = PROTOCOL.boot_chatter().unwrap();
        let boot: Value = serde_json::from_str(&boot).unwrap();

        assert_eq!(boot["r"]["msg"], "SYSTEM READY");
        assert!(boot["f"].is_array());
    }
}
