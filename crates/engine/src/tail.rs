//! Following a test's live log stream.
//!
//! The service closes the stream whenever a run finishes, so the tail
//! reconnects until it has been restarted more than [`MAX_STREAM_RESTARTS`]
//! times. The restart count lives for the whole process.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use taas_api::{LogStreamer, StreamError};
use taas_util::Terminal;
use tracing::{debug, warn};

use crate::CommandError;

pub const MAX_STREAM_RESTARTS: u32 = 20;

/// Process-wide count of log stream restarts.
#[derive(Debug, Clone, Default)]
pub struct RestartCounter(Arc<AtomicU32>);

impl RestartCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    /// Count one more restart and return the new total.
    pub fn increment(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

enum Next {
    Reconnect,
    Stop(CommandError),
}

fn after_attempt(outcome: Result<(), StreamError>) -> Next {
    match outcome {
        Ok(()) => Next::Reconnect,
        Err(StreamError::ConnectionReset) => {
            debug!("log stream reset by peer");
            Next::Reconnect
        }
        Err(error) => Next::Stop(error.into()),
    }
}

/// Stream logs for test `id` to the terminal, reconnecting after each close.
pub async fn tail(
    streamer: &dyn LogStreamer,
    terminal: &dyn Terminal,
    id: &str,
    restarts: &RestartCounter,
) -> Result<(), CommandError> {
    loop {
        if restarts.get() > MAX_STREAM_RESTARTS {
            return Err(CommandError::RetryCeilingExceeded { restarts: restarts.get() });
        }

        terminal.print("^^waiting for logs... ^^");
        let mut sink = terminal.stream();
        match after_attempt(streamer.stream_logs(id, sink.as_mut()).await) {
            Next::Reconnect => {
                let total = restarts.increment();
                warn!(test = %id, restarts = total, "log stream closed, reconnecting");
            }
            Next::Stop(error) => return Err(error),
        }
    }
}
