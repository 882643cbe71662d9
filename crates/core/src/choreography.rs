//! Builds the physical side of an oracle response.
//!
//! A [`ChoreographyPlan`] is an ordered sequence of actuator directives the
//! coordinator understands: ear positions, LED pulses, and a speech cue. The
//! coordinator executes the plan; this module only describes intent and
//! performs no I/O.

use crate::answers::{Answer, Mood};
use serde::{Deserialize, Serialize};

/// Ear position for a fully raised ear.
pub const EAR_UP: u8 = 0;
/// Ear position for a half-raised ear.
pub const EAR_HALF: u8 = 8;
/// Ear position for a lowered ear.
pub const EAR_DOWN: u8 = 16;

/// Which ear an `ear-move` directive targets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Ear {
    Left,
    Right,
}

/// One low-level actuator directive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "directive", rename_all = "kebab-case")]
pub enum Directive {
    /// Moves one ear to a position over `duration_ms`.
    #[serde(rename_all = "camelCase")]
    EarMove {
        ear: Ear,
        position: u8,
        duration_ms: u64,
    },
    /// Pulses the LEDs in a color, `repeat` times of `duration_ms` each.
    #[serde(rename_all = "camelCase")]
    LedPulse {
        color: String,
        repeat: u8,
        duration_ms: u64,
    },
    /// Speaks the given text through the device speaker.
    Speak { text: String },
}

/// An ordered actuator program for one response. Built fresh per response,
/// never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChoreographyPlan {
    pub directives: Vec<Directive>,
}

impl ChoreographyPlan {
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// Maps an answer to its actuator program.
///
/// Pure and deterministic: the same answer always yields the same plan. Every
/// plan is non-empty and ends with a speech cue carrying the answer text.
pub fn build(answer: &Answer) -> ChoreographyPlan {
    let mut directives = match answer.mood {
        Mood::Affirmative => vec![
            Directive::EarMove {
                ear: Ear::Left,
                position: EAR_UP,
                duration_ms: 500,
            },
            Directive::EarMove {
                ear: Ear::Right,
                position: EAR_UP,
                duration_ms: 500,
            },
            Directive::LedPulse {
                color: "00ff00".to_string(),
                repeat: 2,
                duration_ms: 400,
            },
        ],
        Mood::Noncommittal => vec![
            Directive::EarMove {
                ear: Ear::Left,
                position: EAR_HALF,
                duration_ms: 500,
            },
            Directive::EarMove {
                ear: Ear::Right,
                position: EAR_DOWN,
                duration_ms: 500,
            },
            Directive::LedPulse {
                color: "ff8800".to_string(),
                repeat: 3,
                duration_ms: 300,
            },
        ],
        Mood::Negative => vec![
            Directive::EarMove {
                ear: Ear::Left,
                position: EAR_DOWN,
                duration_ms: 500,
            },
            Directive::EarMove {
                ear: Ear::Right,
                position: EAR_DOWN,
                duration_ms: 500,
            },
            Directive::LedPulse {
                color: "ff0000".to_string(),
                repeat: 2,
                duration_ms: 400,
            },
        ],
    };
    directives.push(Directive::Speak {
        text: answer.text.clone(),
    });
    ChoreographyPlan { directives }
}
