//! Step diffing between consecutive polls of the same event.

use crate::api::{Step, StepStatus};
use serde::Serialize;

/// A step that appeared or changed status since the previous poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTransition {
    pub index: usize,
    pub name: String,
    pub previous: Option<StepStatus>,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepTransition {
    pub fn is_completion(&self) -> bool {
        self.status.is_finished()
    }
}

/// Remembers the last status reported for every step so each transition is
/// reported at most once. Steps are append-only and keyed by position.
#[derive(Debug, Default)]
pub struct StepTracker {
    seen: Vec<(String, StepStatus)>,
}

impl StepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, steps: &[Step]) -> Vec<StepTransition> {
        let mut transitions = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            let previous = match self.seen.get(index) {
                Some((name, status)) if *name == step.name => {
                    if *status == step.status {
                        continue;
                    }
                    Some(*status)
                }
                _ => None,
            };

            let entry = (step.name.clone(), step.status);
            if index < self.seen.len() {
                self.seen[index] = entry;
            } else {
                self.seen.push(entry);
            }

            transitions.push(StepTransition {
                index,
                name: step.name.clone(),
                previous,
                status: step.status,
                error: step.error.clone(),
            });
        }
        transitions
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
