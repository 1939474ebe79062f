//! Linear questionnaire: persona → scenario → risk → holding → industries → review → results.
//!
//! `advance` commits the current step's input and moves forward only when the input
//! validates. `retreat` moves back unconditionally and keeps every collected answer.

pub mod answers;
pub mod results;

pub use answers::{Answers, ReviewSummary};
pub use results::{RecommendationBlock, ResultsView};

use crate::domain::industry::find_industry;
use crate::domain::persona::{PersonaCatalog, RiskLevel};
use crate::domain::profile::HoldingPeriod;
use serde::Serialize;
use std::sync::Arc;

const MAX_SCENARIO_CHARS: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Persona,
    Scenario,
    Risk,
    Holding,
    Industries,
    Review,
    Results,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Persona,
        Step::Scenario,
        Step::Risk,
        Step::Holding,
        Step::Industries,
        Step::Review,
        Step::Results,
    ];

    pub const INITIAL: Step = Step::Persona;

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Option<Step> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn is_initial(self) -> bool {
        self == Self::INITIAL
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// `(index + 1) / total`.
    pub fn progress(self) -> f64 {
        (self.index() + 1) as f64 / Self::ALL.len() as f64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Persona => "persona",
            Step::Scenario => "scenario",
            Step::Risk => "risk",
            Step::Holding => "holding",
            Step::Industries => "industries",
            Step::Review => "review",
            Step::Results => "results",
        }
    }
}

/// Raw input for the step being committed. `None` means the control was left untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    Persona(Option<String>),
    Scenario(String),
    Risk(Option<String>),
    Holding(Option<String>),
    Industries(Vec<String>),
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StepError {
    pub step: Step,
    pub message: String,
}

impl StepError {
    fn new(step: Step, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

/// Claim on one results computation. Goes stale as soon as the wizard moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsTicket(u64);

#[derive(Debug, Clone)]
pub struct Wizard {
    catalog: Arc<PersonaCatalog>,
    step: Step,
    answers: Answers,
    results: Option<ResultsView>,
    /// Bumped on every step change.
    generation: u64,
    generating: bool,
}

impl Wizard {
    pub fn new(catalog: Arc<PersonaCatalog>) -> Self {
        let answers = Answers::new(&catalog);
        Self {
            catalog,
            step: Step::INITIAL,
            answers,
            results: None,
            generation: 0,
            generating: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> f64 {
        self.step.progress()
    }

    pub fn results(&self) -> Option<&ResultsView> {
        self.results.as_ref()
    }

    /// True while a claimed results computation has not been stored or abandoned.
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Claims the results computation for the current answers. `None` when not on the
    /// results step, when results are already shown, or when a computation is in flight.
    pub fn begin_results(&mut self) -> Option<(ResultsTicket, Answers)> {
        if self.step != Step::Results || self.results.is_some() || self.generating {
            return None;
        }
        self.generating = true;
        Some((ResultsTicket(self.generation), self.answers.clone()))
    }

    /// Stores `view` if `ticket` is still current. Returns whether it was stored.
    pub fn finish_results(&mut self, ticket: ResultsTicket, view: ResultsView) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        self.generating = false;
        self.results = Some(view);
        true
    }

    /// Releases a claim whose computation failed, so the next request can retry.
    pub fn abandon_results(&mut self, ticket: ResultsTicket) {
        if ticket.0 == self.generation {
            self.generating = false;
        }
    }

    /// Risk shown pre-selected on the risk step.
    pub fn risk_prefill(&self) -> RiskLevel {
        self.answers.risk_or_default(&self.catalog)
    }

    pub fn holding_prefill(&self) -> HoldingPeriod {
        self.answers.holding_or_default()
    }

    pub fn summary(&self) -> ReviewSummary {
        self.answers.summary(&self.catalog)
    }

    /// Commits `input` for the current step, then moves forward. On error the step is unchanged.
    /// At the terminal step this is a no-op.
    pub fn advance(&mut self, input: StepInput) -> Result<Step, StepError> {
        if self.step.is_terminal() {
            return Ok(self.step);
        }

        self.commit(input)?;
        if let Some(next) = self.step.next() {
            self.move_to(next);
        }
        Ok(self.step)
    }

    /// Moves back one step. No-op on the initial step.
    pub fn retreat(&mut self) -> Step {
        if let Some(prev) = self.step.prev() {
            if self.step == Step::Results {
                self.results = None;
            }
            self.move_to(prev);
        }
        self.step
    }

    /// Fresh answers, back to the first step.
    pub fn reset(&mut self) {
        self.move_to(Step::INITIAL);
        self.answers = Answers::new(&self.catalog);
        self.results = None;
    }

    /// Any step change invalidates outstanding result tickets.
    fn move_to(&mut self, step: Step) {
        self.step = step;
        self.generation += 1;
        self.generating = false;
    }

    fn commit(&mut self, input: StepInput) -> Result<(), StepError> {
        let step = self.step;
        match (step, input) {
            (Step::Persona, StepInput::Persona(key)) => {
                if let Some(key) = key {
                    let key = key.trim();
                    if !self.catalog.contains(key) {
                        return Err(StepError::new(step, format!("Unknown persona: {key}")));
                    }
                    self.answers.persona_key = key.to_string();
                }
            }
            (Step::Scenario, StepInput::Scenario(text)) => {
                let text = text.trim();
                if text.chars().count() > MAX_SCENARIO_CHARS {
                    return Err(StepError::new(
                        step,
                        format!("Please keep the scenario under {MAX_SCENARIO_CHARS} characters."),
                    ));
                }
                self.answers.scenario = text.to_string();
            }
            (Step::Risk, StepInput::Risk(choice)) => {
                let risk = match choice {
                    None => self.risk_prefill(),
                    Some(s) => s
                        .parse::<RiskLevel>()
                        .ok()
                        .filter(|r| r.is_selectable())
                        .ok_or_else(|| {
                            StepError::new(step, "Please pick one of the listed risk levels.")
                        })?,
                };
                self.answers.risk = Some(risk);
            }
            (Step::Holding, StepInput::Holding(choice)) => {
                let holding = match choice {
                    None => self.holding_prefill(),
                    Some(s) => s.parse::<HoldingPeriod>().map_err(|_| {
                        StepError::new(step, "Please pick one of the listed holding periods.")
                    })?,
                };
                self.answers.holding = Some(holding);
            }
            (Step::Industries, StepInput::Industries(selected)) => {
                let mut industries: Vec<String> = Vec::with_capacity(selected.len());
                for label in selected {
                    let label = label.trim();
                    if find_industry(label).is_none() {
                        return Err(StepError::new(step, format!("Unknown industry: {label}")));
                    }
                    if !industries.iter().any(|i| i == label) {
                        industries.push(label.to_string());
                    }
                }
                self.answers.industries = industries;
            }
            (Step::Review, StepInput::Confirm) => {}
            (step, other) => {
                return Err(StepError::new(
                    step,
                    format!("Unexpected input for the {} step: {other:?}", step.as_str()),
                ));
            }
        }
        Ok(())
    }
}
