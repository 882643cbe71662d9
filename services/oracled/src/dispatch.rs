//! Routes inbound coordinator messages.

use crate::session::Session;
use augur_core::choreography;
use augur_core::oracle::Oracle;
use augur_core::protocol::{CoordinatorMessage, QuestionEvent, ServiceMessage};
use tracing::{debug, warn};

/// Routes one inbound message, returning at most one outbound reply.
///
/// Called only from the session read loop, so dispatch for a session is
/// strictly sequential: no two question events are processed concurrently and
/// at most one response is in flight.
pub fn dispatch(
    message: CoordinatorMessage,
    session: &mut Session,
    oracle: &mut Oracle,
) -> Option<ServiceMessage> {
    match message {
        CoordinatorMessage::StateChange { state } => {
            debug!(?state, "coordinator declared a new phase");
            session.apply_phase(state);
            None
        }
        CoordinatorMessage::Command {
            question_text,
            request_id,
        } => {
            if !session.can_respond() {
                debug!(
                    %request_id,
                    state = ?session.state(),
                    "dropping command outside the interactive phase"
                );
                return None;
            }
            let event = QuestionEvent::new(question_text, request_id);
            let answer = oracle.answer(&event)?;
            let plan = choreography::build(answer);
            session.begin_response();
            debug!(request_id = %event.request_id, answer = %answer.text, "oracle has spoken");
            Some(ServiceMessage::Response {
                request_id: event.request_id,
                text: answer.text.clone(),
                choreography: plan,
            })
        }
        CoordinatorMessage::Error { code, message } => {
            warn!(%code, %message, "coordinator reported an error");
            None
        }
        CoordinatorMessage::RegistrationAck => {
            debug!("ignoring registration ack outside the handshake");
            None
        }
        CoordinatorMessage::Unknown => {
            debug!("ignoring unrecognized message type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use augur_core::answers::AnswerSet;
    use augur_core::protocol::SessionPhase;

    fn interactive_session() -> Session {
        let mut session = Session::new();
        session.connect_started();
        session.transport_ready();
        session.registered();
        session.apply_phase(SessionPhase::Interactive);
        session
    }

    fn oracle() -> Oracle {
        Oracle::new(AnswerSet::classic(), Some(7))
    }

    fn command(question: &str, request_id: &str) -> CoordinatorMessage {
        CoordinatorMessage::Command {
            question_text: question.to_string(),
            request_id: request_id.to_string(),
        }
    }

    #[test]
    fn state_changes_update_the_session_without_a_reply() {
        let mut session = interactive_session();
        let mut oracle = oracle();

        let reply = dispatch(
            CoordinatorMessage::StateChange {
                state: SessionPhase::Playing,
            },
            &mut session,
            &mut oracle,
        );

        assert!(reply.is_none());
        assert_eq!(
            session.state(),
            SessionState::Registered(SessionPhase::Playing)
        );
    }

    #[test]
    fn an_interactive_question_yields_one_well_formed_response() {
        let mut session = interactive_session();
        let mut oracle = oracle();
        let answers = AnswerSet::classic();

        let reply = dispatch(command("will it rain", "42"), &mut session, &mut oracle);

        let Some(ServiceMessage::Response {
            request_id,
            text,
            choreography,
        }) = reply
        else {
            panic!("expected a response message");
        };
        assert_eq!(request_id, "42");
        assert!(answers.iter().any(|a| a.text == text));
        assert!(!choreography.is_empty());
        assert!(session.has_pending_response());
    }

    #[test]
    fn the_same_question_event_is_never_answered_twice() {
        let mut session = interactive_session();
        let mut oracle = oracle();

        assert!(dispatch(command("sure?", "42"), &mut session, &mut oracle).is_some());
        assert!(dispatch(command("sure?", "42"), &mut session, &mut oracle).is_none());
    }

    #[test]
    fn questions_outside_interactive_produce_no_response() {
        let mut oracle = oracle();
        for phase in [
            SessionPhase::Asleep,
            SessionPhase::Idle,
            SessionPhase::Playing,
        ] {
            let mut session = interactive_session();
            session.apply_phase(phase);
            assert!(dispatch(command("x", "7"), &mut session, &mut oracle).is_none());
            assert!(!session.has_pending_response());
        }
    }

    #[test]
    fn questions_before_any_state_change_produce_no_response() {
        let mut session = Session::new();
        session.connect_started();
        session.transport_ready();
        session.registered();
        let mut oracle = oracle();

        assert!(dispatch(command("x", "7"), &mut session, &mut oracle).is_none());
    }

    #[test]
    fn an_empty_question_is_still_answered_in_interactive() {
        let mut session = interactive_session();
        let mut oracle = oracle();

        let reply = dispatch(command("", "silent-1"), &mut session, &mut oracle);
        assert!(reply.is_some());
    }

    #[test]
    fn coordinator_errors_and_unknown_messages_are_dropped() {
        let mut session = interactive_session();
        let mut oracle = oracle();

        let error = CoordinatorMessage::Error {
            code: "EBUSY".to_string(),
            message: "device busy".to_string(),
        };
        assert!(dispatch(error, &mut session, &mut oracle).is_none());
        assert!(dispatch(CoordinatorMessage::Unknown, &mut session, &mut oracle).is_none());
        assert!(
            dispatch(
                CoordinatorMessage::RegistrationAck,
                &mut session,
                &mut oracle
            )
            .is_none()
        );
    }
}
