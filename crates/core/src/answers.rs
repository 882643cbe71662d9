//! The oracle's fixed answer set.
//!
//! Answers are loaded once at startup and never mutated. An empty set is a
//! fatal configuration error, not a per-request failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad sentiment of an answer, used to pick its choreography.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Affirmative,
    Noncommittal,
    Negative,
}

/// One canned oracle response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Answer {
    /// Text displayed and spoken back to the user.
    pub text: String,
    /// Drives the ear/LED choreography for this answer.
    pub mood: Mood,
}

/// Error raised for an unusable answer set.
#[derive(Debug, Error)]
pub enum AnswerSetError {
    #[error("answer set must contain at least one answer")]
    Empty,
}

/// A fixed, ordered, non-empty collection of answers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSet {
    answers: Vec<Answer>,
}

impl AnswerSet {
    /// Validates and wraps a list of answers loaded from configuration.
    pub fn new(answers: Vec<Answer>) -> Result<Self, AnswerSetError> {
        if answers.is_empty() {
            return Err(AnswerSetError::Empty);
        }
        Ok(Self { answers })
    }

    /// The traditional twenty-answer oracle set.
    pub fn classic() -> Self {
        let answer = |text: &str, mood: Mood| Answer {
            text: text.to_string(),
            mood,
        };
        Self {
            answers: vec![
                answer("It is certain", Mood::Affirmative),
                answer("It is decidedly so", Mood::Affirmative),
                answer("Without a doubt", Mood::Affirmative),
                answer("Yes, definitely", Mood::Affirmative),
                answer("You may rely on it", Mood::Affirmative),
                answer("As I see it, yes", Mood::Affirmative),
                answer("Most likely", Mood::Affirmative),
                answer("Outlook good", Mood::Affirmative),
                answer("Yes", Mood::Affirmative),
                answer("Signs point to yes", Mood::Affirmative),
                answer("Reply hazy, try again", Mood::Noncommittal),
                answer("Ask again later", Mood::Noncommittal),
                answer("Better not tell you now", Mood::Noncommittal),
                answer("Cannot predict now", Mood::Noncommittal),
                answer("Concentrate and ask again", Mood::Noncommittal),
                answer("Don't count on it", Mood::Negative),
                answer("My reply is no", Mood::Negative),
                answer("My sources say no", Mood::Negative),
                answer("Outlook not so good", Mood::Negative),
                answer("Very doubtful", Mood::Negative),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter()
    }
}
