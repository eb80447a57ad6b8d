//! Interactive selection: "pick one of N" behind a trait so the resolver can
//! run against a terminal prompt, a script, or nothing at all.

use crate::context::Level;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use std::collections::VecDeque;
use std::io::IsTerminal;
use tracing::warn;

/// One entry offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub label: String,
}

/// Result of asking a selector to choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Picked(usize),
    /// The user declined to choose.
    Aborted,
    /// No one can be asked (non-interactive run).
    Unavailable,
}

pub trait Selector {
    fn select(&mut self, level: Level, candidates: &[Candidate]) -> Selection;
}

/// Prompts on the terminal.
pub struct TerminalSelector {
    theme: ColorfulTheme,
}

impl TerminalSelector {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for TerminalSelector {
    fn select(&mut self, level: Level, candidates: &[Candidate]) -> Selection {
        let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
        match Select::with_theme(&self.theme)
            .with_prompt(format!("Select {}", level))
            .items(&labels)
            .default(0)
            .interact_opt()
        {
            Ok(Some(index)) => Selection::Picked(index),
            Ok(None) => Selection::Aborted,
            Err(e) => {
                warn!(%level, error = %e, "interactive selection unavailable");
                Selection::Unavailable
            }
        }
    }
}

/// Never chooses; every gap becomes `SelectionRequired`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Selector for NonInteractive {
    fn select(&mut self, _level: Level, _candidates: &[Candidate]) -> Selection {
        Selection::Unavailable
    }
}

/// Replays a fixed list of answers, recording what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedSelector {
    answers: VecDeque<Selection>,
    asked: Vec<(Level, Vec<Candidate>)>,
}

impl ScriptedSelector {
    pub fn new(answers: impl IntoIterator<Item = Selection>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Levels prompted so far, in order.
    pub fn asked_levels(&self) -> Vec<Level> {
        self.asked.iter().map(|(level, _)| *level).collect()
    }

    pub fn asked(&self) -> &[(Level, Vec<Candidate>)] {
        &self.asked
    }
}

impl Selector for ScriptedSelector {
    fn select(&mut self, level: Level, candidates: &[Candidate]) -> Selection {
        self.asked.push((level, candidates.to_vec()));
        self.answers.pop_front().unwrap_or(Selection::Unavailable)
    }
}

/// Terminal prompts when both stdin and stderr are terminals and the caller
/// allows it; otherwise the non-interactive selector.
pub fn for_session(non_interactive: bool) -> Box<dyn Selector> {
    if !non_interactive && std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
        Box::new(TerminalSelector::new())
    } else {
        Box::new(NonInteractive)
    }
}
