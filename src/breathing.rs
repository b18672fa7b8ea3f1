//! Guided breathing exercises.
//!
//! A fixed table of two scripted exercises served verbatim to the client,
//! which animates the steps. Unknown exercise names fall back to box
//! breathing rather than erroring.

use serde::Serialize;

/// One phase of a breathing exercise.
#[derive(Debug, Clone, Serialize)]
pub struct BreathingStep {
    pub action: &'static str,
    /// Seconds to hold this phase.
    pub duration: u32,
}

/// A named breathing exercise with its phase script.
#[derive(Debug, Clone, Serialize)]
pub struct BreathingExercise {
    pub name: &'static str,
    pub steps: Vec<BreathingStep>,
    pub description: &'static str,
}

fn box_breathing() -> BreathingExercise {
    BreathingExercise {
        name: "Box Breathing",
        steps: vec![
            BreathingStep { action: "inhale", duration: 4 },
            BreathingStep { action: "hold", duration: 4 },
            BreathingStep { action: "exhale", duration: 4 },
            BreathingStep { action: "hold", duration: 4 },
        ],
        description: "A technique used to calm the nervous system",
    }
}

fn four_seven_eight() -> BreathingExercise {
    BreathingExercise {
        name: "4-7-8 Breathing",
        steps: vec![
            BreathingStep { action: "inhale", duration: 4 },
            BreathingStep { action: "hold", duration: 7 },
            BreathingStep { action: "exhale", duration: 8 },
        ],
        description: "Helps reduce anxiety and helps people get to sleep",
    }
}

/// Resolve an exercise by its request name. Unknown names serve `box`.
pub fn exercise_for(kind: &str) -> BreathingExercise {
    match kind {
        "478" => four_seven_eight(),
        _ => box_breathing(),
    }
}
