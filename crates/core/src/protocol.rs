//! Defines the wire message protocol between the coordinator and this service.
//!
//! Messages travel as newline-delimited JSON objects, each tagged with a
//! `type` field. [`CoordinatorMessage`] covers everything the coordinator can
//! send; [`ServiceMessage`] covers everything this service produces. Message
//! types this build does not recognize decode to
//! [`CoordinatorMessage::Unknown`] so a newer coordinator never crashes an
//! older satellite.

use crate::choreography::ChoreographyPlan;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Device lifecycle phase as declared by the coordinator.
///
/// The coordinator is authoritative: a new phase always replaces the old one,
/// whatever it was.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Asleep,
    Idle,
    Interactive,
    Playing,
}

/// Messages sent by the coordinator to this service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CoordinatorMessage {
    /// Confirms that a `register` message was accepted.
    RegistrationAck,
    /// Declares a new device lifecycle phase.
    StateChange { state: SessionPhase },
    /// A user interaction forwarded to this service.
    #[serde(rename_all = "camelCase")]
    Command {
        /// The question as heard or typed. May be empty; the oracle answers anyway.
        #[serde(default)]
        question_text: String,
        /// Opaque identifier correlating the eventual response.
        request_id: String,
    },
    /// An error report from the coordinator.
    Error { code: String, message: String },
    /// Any message type this build does not recognize.
    #[serde(other)]
    Unknown,
}

/// Messages sent by this service to the coordinator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServiceMessage {
    /// Identifies this service and declares the command types it accepts.
    #[serde(rename_all = "camelCase")]
    Register {
        service_name: String,
        accepted_command_types: Vec<String>,
    },
    /// An oracle response to one `command` message.
    #[serde(rename_all = "camelCase")]
    Response {
        request_id: String,
        text: String,
        choreography: ChoreographyPlan,
    },
}

/// A user question extracted from an inbound `command` message.
///
/// Transient: exists only for the duration of one dispatch cycle.
#[derive(Debug, Clone)]
pub struct QuestionEvent {
    pub text: String,
    pub request_id: String,
    pub received_at: Instant,
}

impl QuestionEvent {
    /// Stamps a question with its arrival time.
    pub fn new(text: String, request_id: String) -> Self {
        Self {
            text,
            request_id,
            received_at: Instant::now(),
        }
    }
}
