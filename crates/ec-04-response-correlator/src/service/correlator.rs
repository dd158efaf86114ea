//! # Response Correlator
//!
//! Background reception of responses on the client side.
//!
//! ## Tasks
//!
//! While listening two tasks run:
//! - **listener**: `Transport::receive` → `MessageCodec::decode_response` →
//!   bounded mpsc channel. Undecodable datagrams and recoverable transport
//!   errors are logged and counted; the loop keeps going.
//! - **consumer**: drains the channel into the `ResponseObserver`.
//!
//! With [`ResponseCorrelator::with_expiry_sweep`] a third task removes expired
//! entries from a `PendingRequestStore` on a fixed period, so requests whose
//! response was lost do not stay pending forever.
//!
//! ## Shutdown
//!
//! `stop()` marks the correlator `Stopped`, raises the watch shutdown flag,
//! closes the transport and joins both tasks. Once it returns the observer is
//! never called again. Responses still buffered in the channel are dropped.
//! A response racing with `stop()` is either delivered before it returns or
//! not at all.

use crate::domain::{CorrelatorError, CorrelatorState, CorrelatorStats, PendingRequestStore};
use crate::ports::ResponseObserver;
use ec_02_wire_codec::MessageCodec;
use ec_03_datagram_transport::{Transport, TransportError};
use parking_lot::Mutex;
use shared_types::Response;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Capacity of the listener → consumer channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// State shared between the handle and its tasks.
struct Shared {
    state: Mutex<CorrelatorState>,
    stats: CorrelatorStats,
    shutdown: watch::Sender<bool>,
}

/// Receives responses on a transport and forwards them to an observer.
pub struct ResponseCorrelator<T: Transport + 'static> {
    transport: Arc<T>,
    codec: MessageCodec,
    channel_capacity: usize,
    sweep: Option<(Arc<PendingRequestStore>, Duration)>,
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Transport + 'static> ResponseCorrelator<T> {
    /// Create an idle correlator over `transport`.
    #[must_use]
    pub fn new(transport: Arc<T>, codec: MessageCodec) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            transport,
            codec,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            sweep: None,
            shared: Arc::new(Shared {
                state: Mutex::new(CorrelatorState::Idle),
                stats: CorrelatorStats::default(),
                shutdown,
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Override the listener → consumer channel capacity.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Remove expired entries of `store` every `period` while listening.
    #[must_use]
    pub fn with_expiry_sweep(mut self, store: Arc<PendingRequestStore>, period: Duration) -> Self {
        self.sweep = Some((store, period.max(Duration::from_millis(1))));
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CorrelatorState {
        *self.shared.state.lock()
    }

    /// Running counters.
    #[must_use]
    pub fn stats(&self) -> &CorrelatorStats {
        &self.shared.stats
    }

    /// The transport responses are read from.
    #[must_use]
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Start listening and deliver every decoded response to `observer`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// `AlreadyStarted` while listening, `Stopped` after the correlator has
    /// stopped.
    pub fn start<O>(&self, observer: O) -> Result<(), CorrelatorError>
    where
        O: ResponseObserver + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            match *state {
                CorrelatorState::Idle => *state = CorrelatorState::Listening,
                CorrelatorState::Listening => return Err(CorrelatorError::AlreadyStarted),
                CorrelatorState::Stopped => return Err(CorrelatorError::Stopped),
            }
        }

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let observer: Arc<dyn ResponseObserver> = Arc::new(observer);

        let listener = tokio::spawn(listen(
            Arc::clone(&self.transport),
            self.codec,
            tx,
            Arc::clone(&self.shared),
        ));
        let consumer = tokio::spawn(consume(rx, observer, Arc::clone(&self.shared)));
        let mut tasks = self.tasks.lock();
        tasks.extend([listener, consumer]);
        if let Some((store, period)) = &self.sweep {
            tasks.push(tokio::spawn(sweep_expired(
                Arc::clone(store),
                *period,
                self.shared.shutdown.subscribe(),
            )));
        }
        drop(tasks);

        info!(local_addr = %self.transport.local_addr(), "Response correlator listening");
        Ok(())
    }

    /// Stop listening. Idempotent.
    ///
    /// Closes the transport, so an issuer sharing it can no longer send.
    pub async fn stop(&self) {
        let previous = std::mem::replace(&mut *self.shared.state.lock(), CorrelatorState::Stopped);
        self.shared.shutdown.send_replace(true);
        self.transport.close();

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Correlator task failed");
            }
        }

        if previous != CorrelatorState::Stopped {
            info!(
                previous = %previous,
                stats = ?self.shared.stats.snapshot(),
                "Response correlator stopped"
            );
        }
    }
}

impl<T: Transport + 'static> Drop for ResponseCorrelator<T> {
    fn drop(&mut self) {
        self.shared.shutdown.send_replace(true);
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

impl<T: Transport + 'static> std::fmt::Debug for ResponseCorrelator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCorrelator")
            .field("local_addr", &self.transport.local_addr())
            .field("state", &self.state())
            .finish()
    }
}

/// Resolves once the shutdown flag is raised.
async fn shutdown_signal(mut shutdown: watch::Receiver<bool>) {
    loop {
        let raised = *shutdown.borrow_and_update();
        if raised || shutdown.changed().await.is_err() {
            return;
        }
    }
}

#[instrument(skip_all, fields(local_addr = %transport.local_addr()))]
async fn listen<T: Transport + 'static>(
    transport: Arc<T>,
    codec: MessageCodec,
    tx: mpsc::Sender<Response>,
    shared: Arc<Shared>,
) {
    let stats = &shared.stats;
    loop {
        let received = tokio::select! {
            biased;
            () = shutdown_signal(shared.shutdown.subscribe()) => break,
            received = transport.receive() => received,
        };

        match received {
            Ok((bytes, peer)) => {
                CorrelatorStats::incr(&stats.datagrams_received);
                match codec.decode_response(&bytes) {
                    Ok(response) => {
                        debug!(
                            request_id = %response.id,
                            operation = %response.operation,
                            %peer,
                            "Response received"
                        );
                        if tx.send(response).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        CorrelatorStats::incr(&stats.malformed_datagrams);
                        warn!(%peer, bytes = bytes.len(), error = %e, "Discarding malformed datagram");
                    }
                }
            }
            Err(TransportError::Closed) => {
                debug!("Transport closed, listener exiting");
                break;
            }
            Err(e) if e.is_recoverable() => {
                CorrelatorStats::incr(&stats.transport_errors);
                warn!(error = %e, "Recoverable transport error");
            }
            Err(e) => {
                CorrelatorStats::incr(&stats.transport_errors);
                error!(error = %e, "Transport failed, listener exiting");
                break;
            }
        }
    }

    *shared.state.lock() = CorrelatorState::Stopped;
}

async fn consume(
    mut rx: mpsc::Receiver<Response>,
    observer: Arc<dyn ResponseObserver>,
    shared: Arc<Shared>,
) {
    let mut shutdown = shared.shutdown.subscribe();
    loop {
        let next = tokio::select! {
            biased;
            () = shutdown_signal(shutdown.clone()) => break,
            next = rx.recv() => next,
        };
        let Some(response) = next else { break };

        // stop() may have begun while this response was being dequeued
        let stopping = *shutdown.borrow_and_update();
        if stopping {
            break;
        }
        CorrelatorStats::incr(&shared.stats.responses_delivered);
        observer.on_response(response);
    }
}

async fn sweep_expired(
    store: Arc<PendingRequestStore>,
    period: Duration,
    shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = shutdown_signal(shutdown.clone()) => break,
            _ = interval.tick() => {}
        }
        let removed = store.remove_expired();
        if removed > 0 {
            debug!(removed, "Swept expired pending requests");
        }
    }
}
