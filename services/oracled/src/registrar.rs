//! The one-time handshake that introduces this service to the coordinator.
//!
//! Registration is re-sent unconditionally after every reconnect; it is never
//! cached as "already done" across connections.

use crate::config::Config;
use crate::session::Session;
use augur_core::codec::{WireCodec, WireError};
use augur_core::protocol::{CoordinatorMessage, ServiceMessage};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, info};

/// Command types this service declares during registration.
pub const ACCEPTED_COMMAND_TYPES: &[&str] = &["command"];

/// Errors raised while registering with the coordinator. The connection
/// manager treats all of them like a disconnect.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("coordinator did not acknowledge registration within {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("connection closed before registration was acknowledged")]
    ConnectionClosed,
    #[error("wire error during registration: {0}")]
    Wire(#[from] WireError),
}

/// Sends exactly one registration message and waits for the acknowledgement.
///
/// Messages other than the acknowledgement that arrive while waiting are
/// ignored; the coordinator should not be sending commands to an
/// unregistered service anyway.
pub async fn register<S>(
    framed: &mut Framed<S, WireCodec>,
    config: &Config,
    session: &mut Session,
) -> Result<(), RegistrationError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session.transport_ready();

    let registration = ServiceMessage::Register {
        service_name: config.service_name.clone(),
        accepted_command_types: ACCEPTED_COMMAND_TYPES
            .iter()
            .map(|t| t.to_string())
            .collect(),
    };
    framed.send(registration).await?;
    debug!(service_name = %config.service_name, "registration sent, awaiting acknowledgement");

    let wait_for_ack = async {
        while let Some(frame) = framed.next().await {
            match frame? {
                CoordinatorMessage::RegistrationAck => return Ok::<bool, WireError>(true),
                other => {
                    debug!(message = ?other, "ignoring message while awaiting registration ack")
                }
            }
        }
        Ok(false)
    };

    match tokio::time::timeout(config.registration_timeout, wait_for_ack).await {
        Ok(Ok(true)) => {
            session.registered();
            info!(session_id = %session.id(), "registered with coordinator");
            Ok(())
        }
        Ok(Ok(false)) => Err(RegistrationError::ConnectionClosed),
        Ok(Err(err)) => Err(err.into()),
        Err(_) => Err(RegistrationError::Timeout {
            timeout: config.registration_timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use augur_core::protocol::SessionPhase;
    use serde_json::Value;
    use std::net::SocketAddr;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn test_config(timeout_ms: u64) -> Config {
        Config {
            coordinator_addr: "127.0.0.1:10543".parse::<SocketAddr>().unwrap(),
            service_name: "oracle-under-test".to_string(),
            registration_timeout: Duration::from_millis(timeout_ms),
            answers_path: None,
            answer_seed: None,
            log_level: tracing::Level::INFO,
        }
    }

    fn fresh_session() -> Session {
        let mut session = Session::new();
        session.connect_started();
        session
    }

    #[tokio::test]
    async fn registers_and_waits_for_the_ack() {
        let (local, remote) = tokio::io::duplex(1024);
        let mut framed = Framed::new(local, WireCodec::new());
        let mut session = fresh_session();
        let config = test_config(1000);

        let coordinator = tokio::spawn(async move {
            let (read_half, mut write_half) = tokio::io::split(remote);
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();

            let registration: Value = serde_json::from_str(&line).unwrap();
            assert_eq!(registration["type"], "register");
            assert_eq!(registration["serviceName"], "oracle-under-test");
            assert_eq!(registration["acceptedCommandTypes"][0], "command");

            write_half
                .write_all(b"{\"type\":\"registration-ack\"}\n")
                .await
                .unwrap();
        });

        register(&mut framed, &config, &mut session).await.unwrap();
        assert_eq!(
            session.state(),
            SessionState::Registered(SessionPhase::Asleep)
        );
        coordinator.await.unwrap();
    }

    #[tokio::test]
    async fn unrelated_traffic_before_the_ack_is_ignored() {
        let (local, remote) = tokio::io::duplex(1024);
        let mut framed = Framed::new(local, WireCodec::new());
        let mut session = fresh_session();
        let config = test_config(1000);

        let coordinator = tokio::spawn(async move {
            let (read_half, mut write_half) = tokio::io::split(remote);
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();

            write_half
                .write_all(b"{\"type\":\"state-change\",\"state\":\"idle\"}\n")
                .await
                .unwrap();
            write_half
                .write_all(b"{\"type\":\"registration-ack\"}\n")
                .await
                .unwrap();
        });

        register(&mut framed, &config, &mut session).await.unwrap();
        assert!(session.is_registered());
        coordinator.await.unwrap();
    }

    #[tokio::test]
    async fn times_out_when_no_ack_arrives() {
        let (local, _remote) = tokio::io::duplex(1024);
        let mut framed = Framed::new(local, WireCodec::new());
        let mut session = fresh_session();
        let config = test_config(50);

        let err = register(&mut framed, &config, &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Timeout { .. }));
        assert!(!session.is_registered());
    }

    #[tokio::test]
    async fn a_closed_transport_fails_registration() {
        let (local, remote) = tokio::io::duplex(1024);
        let mut framed = Framed::new(local, WireCodec::new());
        let mut session = fresh_session();
        let config = test_config(1000);

        let coordinator = tokio::spawn(async move {
            let (read_half, _write_half) = tokio::io::split(remote);
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            // Drop both halves without acknowledging.
        });

        let err = register(&mut framed, &config, &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::ConnectionClosed));
        assert!(!session.is_registered());
        coordinator.await.unwrap();
    }
}
