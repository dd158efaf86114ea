//! # Client Session
//!
//! One issuer and one correlator sharing a transport. The issuer sends on
//! the foreground task; the correlator receives in the background.

use crate::command::{Command, CommandError, USAGE};
use ec_02_wire_codec::MessageCodec;
use ec_03_datagram_transport::Transport;
use ec_04_response_correlator::{
    CorrelatorError, IssueError, RequestIssuer, ResponseCorrelator, ResponseObserver,
};
use shared_types::{RequestId, Response};
use std::net::SocketAddr;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

/// A running client conversation with one service.
pub struct ClientSession<T: Transport + 'static> {
    issuer: RequestIssuer<T>,
    correlator: ResponseCorrelator<T>,
}

impl<T: Transport + 'static> ClientSession<T> {
    /// Create an idle session sending to `server`.
    #[must_use]
    pub fn new(transport: Arc<T>, codec: MessageCodec, server: SocketAddr) -> Self {
        Self {
            issuer: RequestIssuer::new(Arc::clone(&transport), codec, server),
            correlator: ResponseCorrelator::new(transport, codec),
        }
    }

    /// Start receiving responses into `observer`.
    ///
    /// # Errors
    ///
    /// See [`ResponseCorrelator::start`].
    pub fn start<O>(&self, observer: O) -> Result<(), CorrelatorError>
    where
        O: ResponseObserver + 'static,
    {
        self.correlator.start(observer)
    }

    /// Issue the request for `command`.
    ///
    /// Returns `None` for commands that send nothing (`help`, `quit`).
    ///
    /// # Errors
    ///
    /// See [`RequestIssuer::issue`].
    pub async fn execute(&self, command: &Command) -> Result<Option<RequestId>, IssueError> {
        let id = match command {
            Command::Capabilities => self.issuer.capabilities().await?,
            Command::Encrypt { method, text } => self.issuer.encrypt(method, text).await?,
            Command::Decrypt { method, text } => self.issuer.decrypt(method, text).await?,
            Command::Help | Command::Quit => return Ok(None),
        };
        Ok(Some(id))
    }

    /// Execute one command per input line until `quit` or end of input,
    /// printing feedback to stdout, then stop the session.
    ///
    /// The session is stopped on every exit path, read errors included.
    ///
    /// # Errors
    ///
    /// The I/O error that ended reading.
    pub async fn run_lines<R>(&self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let outcome = loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(CommandError::Empty) => continue,
                Err(e) => {
                    println!("** {e}");
                    continue;
                }
            };

            match command {
                Command::Quit => break Ok(()),
                Command::Help => println!("{USAGE}"),
                other => match self.execute(&other).await {
                    Ok(Some(id)) => println!("Request {id} sent: {other}"),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(error = %e, "Request not sent");
                        println!("** Request not sent: {e}");
                    }
                },
            }
        };

        self.stop().await;
        outcome
    }

    /// Stop receiving and close the transport.
    pub async fn stop(&self) {
        self.correlator.stop().await;
        info!(
            issued = self.issuer.peek_next_id().value(),
            stats = ?self.correlator.stats().snapshot(),
            "Client session closed"
        );
    }

    /// The issuer half.
    #[must_use]
    pub fn issuer(&self) -> &RequestIssuer<T> {
        &self.issuer
    }

    /// The correlator half.
    #[must_use]
    pub fn correlator(&self) -> &ResponseCorrelator<T> {
        &self.correlator
    }
}

/// Human-readable rendering of a response.
#[must_use]
pub fn format_response(response: &Response) -> String {
    format!(
        "Response received\n  Request ID: {}\n  Operation:  {}\n  Result:     {}\n  Data:       {}",
        response.id, response.operation, response.result, response.data
    )
}
