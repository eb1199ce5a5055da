#![allow(dead_code)]

use std::time::Duration;

use cnc_loopback::{settings::SimulatorSettings, simulator::Simulator, sink::BroadcastSink};
use color_eyre::Result;
use tokio::{sync::broadcast, time::timeout};

pub type Responses = broadcast::Receiver<Vec<u8>>;

/// Build and open a simulator from a configuration string.
/// Subscribes before opening, so boot chatter is observed too.
pub fn open(uri: &str, delay_ms: i64) -> Result<(Simulator, Responses)> {
    let settings = SimulatorSettings::from_uri(uri)?.with_response_delay_ms(delay_ms);

    let sink = BroadcastSink::default();
    let responses = sink.subscribe();

    let mut simulator = Simulator::new(settings, sink);
    simulator.open()?;

    Ok((simulator, responses))
}

/// Same as [`open`], but skips past any boot chatter.
pub async fn open_quiet(uri: &str, delay_ms: i64) -> Result<(Simulator, Responses)> {
    let (simulator, mut responses) = open(uri, delay_ms)?;

    if cnc_loopback::protocol::boot_chatter(simulator.settings().mode).is_some() {
        receive(&mut responses).await?;
    }

    Ok((simulator, responses))
}

pub async fn receive(responses: &mut Responses) -> Result<String> {
    let bytes = timeout(Duration::from_secs(5), responses.recv()).await??;

    Ok(String::from_utf8(bytes)?)
}

/// Nothing arrives within a short while.
pub async fn assert_silent(responses: &mut Responses) {
    let nothing = timeout(Duration::from_millis(100), responses.recv()).await;

    assert!(nothing.is_err(), "Expected silence, got {nothing:?}");
}
