//! Where simulator responses go.
//!
//! The simulator does not know who listens.
//! It hands encoded responses to a [`ResponseSink`], which fans them out.
//! Whatever goes wrong in there stays in there: the simulator logs it and keeps answering.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{trace, warn};

use crate::serial::{SerialMessage, SerialMessageBytes};

/// Problems delivering a response.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SinkError {
    /// Nobody was listening, the response is gone.
    #[error("No observers")]
    NoObservers,

    /// An observer did not accept the response.
    #[error("Observer failed: {0}")]
    Observer(String),
}

/// Accepts encoded responses and forwards them to observers.
pub trait ResponseSink: Send + Sync + 'static {
    /// Forward a response.
    fn emit(&self, message: SerialMessageBytes) -> Result<(), SinkError>;
}

impl<T> ResponseSink for Arc<T>
where
    T: ResponseSink + ?Sized,
{
    fn emit(&self, message: SerialMessageBytes) -> Result<(), SinkError> {
        (**self).emit(message)
    }
}

/// Fans responses out to any number of subscribers.
///
/// Subscribers only see responses emitted after they subscribed.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<SerialMessageBytes>,
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl BroadcastSink {
    /// A sink keeping at most `capacity` responses for slow subscribers.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));

        Self { sender }
    }

    /// Receive responses emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SerialMessageBytes> {
        self.sender.subscribe()
    }

    /// Same as [`Self::subscribe`], as a stream.
    pub fn stream(&self) -> BroadcastStream<SerialMessageBytes> {
        self.subscribe().into()
    }

    /// How many subscribers there currently are.
    pub fn observers(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ResponseSink for BroadcastSink {
    fn emit(&self, message: SerialMessageBytes) -> Result<(), SinkError> {
        match self.sender.send(message) {
            Ok(listeners) => {
                trace!("Broadcasted response to {listeners} listener(s)");
                Ok(())
            }
            Err(_) => Err(SinkError::NoObservers),
        }
    }
}

/// Encode a response and hand it to the sink.
///
/// Errors and panics from the sink are logged, never propagated.
pub(crate) fn emit(sink: &dyn ResponseSink, response: &str) {
    let message = SerialMessage::from(response);
    trace!(%message, "Emitting");

    match panic::catch_unwind(AssertUnwindSafe(|| sink.emit(message.into_bytes()))) {
        Ok(Ok(())) => {}
        Ok(Err(SinkError::NoObservers)) => {
            trace!("Nobody listening, response dropped");
        }
        Ok(Err(e)) => {
            warn!(%e, "Observer failed, continuing");
        }
        Err(_) => {
            warn!("Observer panicked, continuing");
        }
    }
}
