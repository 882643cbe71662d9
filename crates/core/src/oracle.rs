//! Selects an answer for each question event.

use crate::answers::{Answer, AnswerSet};
use crate::protocol::QuestionEvent;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashSet;
use tracing::debug;

/// The oracle response engine.
///
/// Selection is uniformly random over a fixed answer set, driven by an
/// injected generator so tests can seed it deterministically. Each request id
/// is answered at most once; the question text itself is decorative and never
/// interpreted.
#[derive(Debug)]
pub struct Oracle {
    answers: AnswerSet,
    rng: StdRng,
    answered: HashSet<String>,
}

impl Oracle {
    /// Creates an engine over `answers`.
    ///
    /// A fixed `seed` makes the answer sequence deterministic; without one the
    /// generator is seeded from the operating system.
    pub fn new(answers: AnswerSet, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            answers,
            rng,
            answered: HashSet::new(),
        }
    }

    /// Picks an answer for `event`.
    ///
    /// Returns `None` if the event's request id was already answered, so a
    /// redelivered question never produces a second response.
    pub fn answer(&mut self, event: &QuestionEvent) -> Option<&Answer> {
        if !self.answered.insert(event.request_id.clone()) {
            debug!(request_id = %event.request_id, "request already answered, ignoring");
            return None;
        }
        let index = self.rng.random_range(0..self.answers.len());
        self.answers.get(index)
    }
}
