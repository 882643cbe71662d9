//! Augur Oracle Daemon Library
//!
//! This library contains the runtime half of the oracle satellite service:
//! configuration, the session state machine, the registration handshake,
//! command dispatch, and the connection manager that keeps one coordinator
//! session alive. The `oracled` binary is a thin wrapper around this library.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod registrar;
pub mod session;
