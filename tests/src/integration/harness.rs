//! Test wiring: a dispatcher task serving one transport and a client session
//! on another, with an observer that records every response.

use std::sync::Arc;
use std::time::Duration;

use ec_02_wire_codec::{MessageCodec, TextEncoding};
use ec_03_datagram_transport::{Transport, TransportError};
use ec_05_crypto_service::{CryptoService, RequestDispatcher};
use ec_06_crypto_client::ClientSession;
use parking_lot::Mutex;
use shared_types::Response;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

/// Bounded wait for anything a test expects to happen.
pub const WAIT: Duration = Duration::from_secs(5);

/// Running service half.
pub struct ServiceHandle<T: Transport + 'static> {
    pub transport: Arc<T>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), TransportError>>,
}

impl<T: Transport + 'static> ServiceHandle<T> {
    /// Serve `transport` with the built-in methods.
    pub fn spawn(transport: T, encoding: TextEncoding) -> Self {
        Self::spawn_with(transport, encoding, CryptoService::with_defaults())
    }

    /// Serve `transport` with a specific service.
    pub fn spawn_with(transport: T, encoding: TextEncoding, service: CryptoService) -> Self {
        let transport = Arc::new(transport);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let dispatcher = RequestDispatcher::new(
            Arc::clone(&transport),
            MessageCodec::new(encoding),
            Arc::new(service),
        )
        .with_shutdown(shutdown_rx);
        let task = tokio::spawn(async move { dispatcher.run().await });

        Self {
            transport,
            shutdown,
            task,
        }
    }

    /// Signal shutdown and wait for the dispatcher to exit.
    pub async fn shutdown(self) -> Result<(), TransportError> {
        self.shutdown.send_replace(true);
        self.transport.close();
        match timeout(WAIT, self.task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => panic!("dispatcher task panicked: {e}"),
            Err(_) => panic!("dispatcher did not stop"),
        }
    }
}

/// Responses seen by a client observer, in delivery order.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<Response>>>,
}

impl Recorder {
    /// Observer closure appending to this recorder.
    pub fn observer(&self) -> impl Fn(Response) + Send + Sync + 'static {
        let seen = Arc::clone(&self.seen);
        move |response: Response| seen.lock().push(response)
    }

    /// Wait until at least `count` responses arrived and return them all.
    pub async fn wait_for(&self, count: usize) -> Vec<Response> {
        timeout(WAIT, async {
            loop {
                {
                    let seen = self.seen.lock();
                    if seen.len() >= count {
                        return seen.clone();
                    }
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("expected {count} responses, got {:?}", self.snapshot()))
    }

    /// Responses so far.
    pub fn snapshot(&self) -> Vec<Response> {
        self.seen.lock().clone()
    }
}

/// A started client session plus its recorder.
pub struct ClientHandle<T: Transport + 'static> {
    pub session: ClientSession<T>,
    pub recorder: Recorder,
}

impl<T: Transport + 'static> ClientHandle<T> {
    /// Start a session on `transport` talking to `server`.
    pub fn start(transport: T, encoding: TextEncoding, server: std::net::SocketAddr) -> Self {
        let session = ClientSession::new(Arc::new(transport), MessageCodec::new(encoding), server);
        let recorder = Recorder::default();
        session
            .start(recorder.observer())
            .unwrap_or_else(|e| panic!("correlator failed to start: {e}"));
        Self { session, recorder }
    }
}
