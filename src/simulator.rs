//! A loopback endpoint which answers like CNC controller firmware.
//!
//! Commands are queued by [`Simulator::send`] and answered in order by a single
//! background task owned by the simulator.
//! The task sleeps for the configured response delay before answering each command.
//!
//! Closing the simulator stops that task.
//! Commands still in the queue at that point are dropped without an answer.

use std::{fmt::Display, sync::Arc, time::Duration};

use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    StreamExt,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, trace, warn, Instrument};
use uuid::Uuid;

use crate::{
    error::Error,
    protocol,
    serial::SerialMessage,
    settings::SimulatorSettings,
    sink::{self, ResponseSink},
};

/// How long [`Simulator::close`] waits for the responder before giving up on it.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Identifies a simulator in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimulatorId(Uuid);

impl Display for SimulatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Enqueues commands on an open simulator.
///
/// Cheap to clone, so several producers may send concurrently.
/// Sending fails with [`Error::NotOpen`] once the simulator has closed.
#[derive(Debug, Clone)]
pub struct CommandSender {
    commands: UnboundedSender<SerialMessage>,
}

impl CommandSender {
    /// Put a command at the back of the queue. Does not wait for the answer.
    pub fn send<M: Into<SerialMessage>>(&self, command: M) -> Result<(), Error> {
        self.commands
            .unbounded_send(command.into())
            .map_err(|_| Error::NotOpen)
    }
}

struct Running {
    sender: CommandSender,
    cancel: CancellationToken,
    responder: JoinHandle<()>,
}

/// A simulated controller.
///
/// Starts closed. Configure it, then [`Simulator::open`] it from within a Tokio runtime.
pub struct Simulator {
    id: SimulatorId,
    settings: SimulatorSettings,
    sink: Arc<dyn ResponseSink>,
    running: Option<Running>,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Simulator {
    /// A closed simulator answering into the given sink.
    pub fn new<S: ResponseSink>(settings: SimulatorSettings, sink: S) -> Self {
        Self {
            id: SimulatorId(Uuid::new_v4()),
            settings,
            sink: Arc::new(sink),
            running: None,
        }
    }

    /// A closed simulator configured from a string such as `loopback://grbl`.
    pub fn from_uri<S: ResponseSink>(uri: &str, sink: S) -> Result<Self, Error> {
        Ok(Self::new(SimulatorSettings::from_uri(uri)?, sink))
    }

    /// Apply a configuration string, see [`SimulatorSettings::configure`].
    ///
    /// Only allowed while closed.
    pub fn configure(&mut self, uri: &str) -> Result<(), Error> {
        self.ensure_closed()?;
        self.settings.configure(uri)
    }

    /// Set the emulated latency. Negative values are treated as zero.
    ///
    /// Only allowed while closed.
    pub fn set_response_delay_ms(&mut self, millis: i64) -> Result<(), Error> {
        self.ensure_closed()?;
        self.settings.set_response_delay_ms(millis);

        Ok(())
    }

    /// The current settings.
    pub fn settings(&self) -> &SimulatorSettings {
        &self.settings
    }

    /// This simulator's id.
    pub fn id(&self) -> SimulatorId {
        self.id
    }

    /// Whether the simulator is open.
    pub fn is_open(&self) -> bool {
        self.running.is_some()
    }

    fn ensure_closed(&self) -> Result<(), Error> {
        if self.is_open() {
            Err(Error::AlreadyOpen)
        } else {
            Ok(())
        }
    }

    /// Start answering commands.
    ///
    /// Spawns the responder and emits whatever the firmware says on connect.
    /// Must be called from within a Tokio runtime.
    pub fn open(&mut self) -> Result<(), Error> {
        self.ensure_closed()?;

        let (commands_tx, commands_rx) = mpsc::unbounded();
        let cancel = CancellationToken::new();

        let span = info_span!("simulator", id = %self.id, mode = %self.settings.mode);
        let responder = tokio::spawn(
            respond_until_cancelled(
                self.settings.clone(),
                self.sink.clone(),
                commands_rx,
                cancel.clone(),
            )
            .instrument(span),
        );

        self.running = Some(Running {
            sender: CommandSender {
                commands: commands_tx,
            },
            cancel,
            responder,
        });

        info!(id = %self.id, mode = %self.settings.mode, "Opened");

        if let Some(boot) = protocol::boot_chatter(self.settings.mode) {
            sink::emit(self.sink.as_ref(), &boot);
        }

        Ok(())
    }

    /// Queue a command. Returns immediately, the answer arrives at the sink later.
    pub fn send<M: Into<SerialMessage>>(&self, command: M) -> Result<(), Error> {
        match &self.running {
            Some(running) => running.sender.send(command),
            None => Err(Error::NotOpen),
        }
    }

    /// A handle for queuing commands from elsewhere, see [`CommandSender`].
    pub fn sender(&self) -> Result<CommandSender, Error> {
        self.running
            .as_ref()
            .map(|running| running.sender.clone())
            .ok_or(Error::NotOpen)
    }

    /// Bulk binary transfer. Not something a loopback endpoint can do.
    pub fn upload(&self, data: &[u8]) -> Result<(), Error> {
        debug!(bytes = data.len(), "Refusing bulk upload");

        Err(Error::UnsupportedCapability("bulk binary transfer".into()))
    }

    /// Stop answering commands.
    ///
    /// Waits up to [`CLOSE_TIMEOUT`] for the responder to stop.
    /// Queued commands which have not been answered yet are dropped.
    /// Closing a closed simulator does nothing.
    pub async fn close(&mut self) {
        let Some(Running {
            sender,
            cancel,
            mut responder,
        }) = self.running.take()
        else {
            trace!(id = %self.id, "Already closed");
            return;
        };

        cancel.cancel();
        drop(sender);

        match tokio::time::timeout(CLOSE_TIMEOUT, &mut responder).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(?e, "Responder ended abnormally"),
            Err(_) => {
                warn!("Responder did not stop within {CLOSE_TIMEOUT:?}, aborting it");
                responder.abort();
            }
        }

        info!(id = %self.id, "Closed");
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

/// The responder loop. One per open simulator.
///
/// Both the wait for a command and the response delay end early on cancellation,
/// in which case the command being worked on is not answered.
async fn respond_until_cancelled(
    settings: SimulatorSettings,
    sink: Arc<dyn ResponseSink>,
    mut commands: UnboundedReceiver<SerialMessage>,
    cancel: CancellationToken,
) {
    debug!("Responder started");

    loop {
        let command = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            command = commands.next() => match command {
                Some(command) => command,
                None => break,
            },
        };
        debug!(%command, "Command");

        if !settings.response_delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(settings.response_delay) => {}
            }
        }

        let response = protocol::respond(&settings, command.as_str());
        if response.is_empty() {
            trace!("Nothing to say");
            continue;
        }

        sink::emit(sink.as_ref(), &response);
    }

    commands.close();

    let mut discarded = 0;
    while commands.try_recv().is_ok() {
        discarded += 1;
    }

    debug!(discarded, "Responder stopped");
}
