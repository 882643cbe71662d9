//! Owns the transport to the coordinator.
//!
//! One read loop per process: connect, register, then drive the session until
//! the transport drops or shutdown is requested. Reconnects use exponential
//! backoff with jitter. Nothing is queued while disconnected; a response that
//! was in flight when the transport dropped is discarded, since the physical
//! moment it was meant for has passed.

use crate::config::Config;
use crate::dispatch::dispatch;
use crate::registrar;
use crate::session::Session;
use anyhow::Result;
use augur_core::codec::WireCodec;
use augur_core::oracle::Oracle;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const MAX_BACKOFF_JITTER_MS: u64 = 250;

/// Why a session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The transport closed or failed; the caller should reconnect.
    Disconnected,
    /// Local shutdown was requested; no further I/O.
    ShutdownRequested,
}

/// Connects to the coordinator and keeps one session alive until `shutdown`
/// fires.
///
/// Connection loss and registration failure are handled locally: the session
/// drops to `Disconnected` and a single reconnect attempt runs after the
/// current backoff interval. Neither error surfaces past this function.
pub async fn run(config: Config, mut oracle: Oracle, shutdown: CancellationToken) -> Result<()> {
    let mut session = Session::new();
    let mut backoff = INITIAL_BACKOFF;
    info!(
        session_id = %session.id(),
        coordinator = %config.coordinator_addr,
        "starting coordinator client"
    );

    while !shutdown.is_cancelled() {
        session.connect_started();

        let connected = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            connected = TcpStream::connect(config.coordinator_addr) => connected,
        };

        let stream = match connected {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%err, coordinator = %config.coordinator_addr, "connection attempt failed");
                session.disconnected();
                if !sleep_backoff(&mut backoff, &shutdown).await {
                    break;
                }
                continue;
            }
        };

        let mut framed = Framed::new(stream, WireCodec::new());
        match registrar::register(&mut framed, &config, &mut session).await {
            Ok(()) => backoff = INITIAL_BACKOFF,
            Err(err) => {
                warn!(%err, "registration failed, treating as a disconnect");
                session.disconnected();
                if !sleep_backoff(&mut backoff, &shutdown).await {
                    break;
                }
                continue;
            }
        }

        match drive_session(&mut framed, &mut session, &mut oracle, &shutdown).await {
            SessionEnd::ShutdownRequested => break,
            SessionEnd::Disconnected => {
                if session.disconnected() {
                    debug!("discarding the response that was in flight when the transport dropped");
                }
                if !sleep_backoff(&mut backoff, &shutdown).await {
                    break;
                }
            }
        }
    }

    session.shutting_down();
    info!(session_id = %session.id(), "coordinator client stopped");
    Ok(())
}

/// Drives one established, registered session.
///
/// Inbound messages are dispatched one at a time; a produced reply is written
/// before the next message is read, so replies keep the order of the
/// questions that caused them and only one writer touches the wire.
pub async fn drive_session<S>(
    framed: &mut Framed<S, WireCodec>,
    session: &mut Session,
    oracle: &mut Oracle,
    shutdown: &CancellationToken,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                session.shutting_down();
                return SessionEnd::ShutdownRequested;
            }
            frame = framed.next() => frame,
        };

        let message = match frame {
            Some(Ok(message)) => message,
            Some(Err(err)) => {
                warn!(%err, "frame stream became unreliable, dropping the connection");
                return SessionEnd::Disconnected;
            }
            None => {
                info!("coordinator closed the connection");
                return SessionEnd::Disconnected;
            }
        };

        if let Some(reply) = dispatch(message, session, oracle) {
            if let Err(err) = framed.send(reply).await {
                warn!(%err, "failed to send response");
                return SessionEnd::Disconnected;
            }
            session.response_sent();
        }
    }
}

/// Sleeps for the current backoff interval plus jitter, doubling the interval
/// for next time. Returns `false` if shutdown fired during the wait.
async fn sleep_backoff(backoff: &mut Duration, shutdown: &CancellationToken) -> bool {
    let jitter = Duration::from_millis(rand::rng().random_range(0..MAX_BACKOFF_JITTER_MS));
    let wait = *backoff + jitter;
    debug!(?wait, "waiting before the next connection attempt");
    *backoff = (*backoff * 2).min(MAX_BACKOFF);

    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(wait) => true,
    }
}
