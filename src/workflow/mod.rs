//! The generate → validate → repair → solve loop.
//!
//! ```text
//! Start → GenerateRules → ValidateRules ─┬─ no errors ──────────────→ Solve → Solved
//!                              ↑         ├─ errors, retries left ──→ RefineRules ─┐
//!                              │         └─ errors, retries spent ─→ Failed       │
//!                              └──────────────────────────────────────────────────┘
//! ```
//!
//! Generation is grounded one of three ways: on the whole knowledge base (`new`), on what a
//! `Retriever` returns (`with_retriever`), or on nothing but the question itself (`from_question`).
//! Only the knowledge-base modes merge its facts into the text the engine solves.
//!
//! Running out of repair attempts is a hard failure: the engine is never run on text that did
//! not validate. Collaborator failures (generation, retrieval, timeouts) abort the run with an
//! `Err`, which keeps them apart from a `Failed` outcome.

mod generator;
pub use generator::*;

pub mod prompt;

use std::fmt;
use chrono::{DateTime, Utc};
use crate::client::Config;
use crate::engine::{DerivedFacts, Solver};
use crate::error::Result;
use crate::validate::{check_logic_validity, ValidationError};

/// How many times we ask for a repair before giving up
pub const MAX_REPAIR_ATTEMPTS: u32 = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum State {
    Start,
    GenerateRules,
    ValidateRules,
    RefineRules,
    Solve,
    Solved,
    Failed,
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Solved | State::Failed)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Counts repair attempts; only ever goes up
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    attempts: u32,
}

impl RetryState {
    pub fn new() -> RetryState {
        RetryState { attempts: 0 }
    }
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
    pub fn increment(&mut self) {
        self.attempts += 1;
    }
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_REPAIR_ATTEMPTS
    }
}

/// One edge taken through the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: State,
    pub to: State,
    pub at: DateTime<Utc>,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// the candidate validated and the engine derived these facts
    Solved(DerivedFacts),
    /// the candidate never validated; the engine was not run
    Failed {
        candidate: String,
        errors: Vec<ValidationError>,
    },
}

pub struct RepairWorkflow<'a, G> {
    generator: G,
    knowledge: Option<&'a KnowledgeBase>,
    retriever: Option<&'a dyn Retriever>,
    description: String,

    state: State,
    retry: RetryState,
    candidate: String,
    errors: Vec<ValidationError>,
    derived: Option<DerivedFacts>,
    transcript: Vec<Transition>,
}

impl<'a, G: TextGenerator> RepairWorkflow<'a, G> {
    /// A workflow that shows the generator the whole knowledge base and asks for `prompt::DEFAULT_TASK`
    pub fn new(generator: G, knowledge: &'a KnowledgeBase) -> RepairWorkflow<'a, G> {
        RepairWorkflow::build(generator, Some(knowledge), prompt::DEFAULT_TASK)
    }
    fn build(generator: G, knowledge: Option<&'a KnowledgeBase>, description: &str) -> RepairWorkflow<'a, G> {
        RepairWorkflow {
            generator,
            knowledge,
            retriever: None,
            description: description.to_string(),
            state: State::Start,
            retry: RetryState::new(),
            candidate: String::new(),
            errors: Vec::new(),
            derived: None,
            transcript: Vec::new(),
        }
    }
    /// Ask for the task named in `config` instead of the default one
    pub fn from_config(generator: G, knowledge: &'a KnowledgeBase, config: &Config) -> RepairWorkflow<'a, G> {
        RepairWorkflow::build(generator, Some(knowledge), &config.task)
    }
    /// A workflow with no knowledge base at all: the generator translates `question`
    /// into facts and rules, and the engine runs on that text alone
    pub fn from_question(generator: G, question: &str) -> RepairWorkflow<'a, G> {
        RepairWorkflow::build(generator, None, question)
    }
    /// Ask for `description` instead of the default task
    pub fn with_description(mut self, description: &str) -> RepairWorkflow<'a, G> {
        self.description = description.to_string();
        self
    }
    /// Condition generation on what `retriever` finds for the description,
    /// rather than on the whole knowledge base
    pub fn with_retriever(mut self, retriever: &'a dyn Retriever) -> RepairWorkflow<'a, G> {
        self.retriever = Some(retriever);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }
    pub fn retry(&self) -> RetryState {
        self.retry
    }
    pub fn candidate(&self) -> &str {
        &self.candidate
    }
    pub fn errors(&self) -> &[ValidationError] {
        self.errors.as_slice()
    }
    pub fn transcript(&self) -> &[Transition] {
        self.transcript.as_slice()
    }
    pub fn into_generator(self) -> G {
        self.generator
    }

    /// Take exactly one transition and return the new state.
    /// Terminal states step to themselves. On a collaborator error the state is left unchanged
    pub fn step(&mut self) -> Result<State> {
        match self.state {
            State::Start => self.advance(State::GenerateRules),
            State::GenerateRules => {
                let prompt = self.generation_prompt()?;
                self.candidate = self.generator.generate(&prompt).map_err(|why| {
                    error!("rule generation failed: {}", why);
                    why
                })?;
                debug!("generated logic:\n{}", self.candidate);
                self.advance(State::ValidateRules);
            }
            State::ValidateRules => {
                self.errors = check_logic_validity(&self.candidate);
                if self.errors.is_empty() {
                    self.advance(State::Solve);
                } else {
                    for why in self.errors.iter() {
                        warn!("{}", why);
                    }
                    if self.retry.is_exhausted() {
                        error!("logic still invalid after {} repair attempts", self.retry.attempts());
                        self.advance(State::Failed);
                    } else {
                        self.advance(State::RefineRules);
                    }
                }
            }
            State::RefineRules => {
                self.candidate = self.generator.refine(&self.candidate, &self.errors).map_err(|why| {
                    error!("rule repair failed: {}", why);
                    why
                })?;
                self.retry.increment();
                debug!("refined logic (attempt {}):\n{}", self.retry.attempts(), self.candidate);
                self.advance(State::ValidateRules);
            }
            State::Solve => {
                let logic = match self.knowledge {
                    Some(knowledge) => format!("{}\n{}", knowledge.facts_text(), self.candidate),
                    None => self.candidate.clone(),
                };
                self.derived = Some(Solver::new().solve_logic(&logic));
                self.advance(State::Solved);
            }
            State::Solved | State::Failed => {}
        }
        Ok(self.state)
    }

    /// Step until `Solved` or `Failed`
    pub fn run(&mut self) -> Result<Outcome> {
        while !self.state.is_terminal() {
            self.step()?;
        }
        let outcome = match self.state {
            State::Solved => Outcome::Solved(self.derived.clone().unwrap_or_default()),
            _ => Outcome::Failed {
                candidate: self.candidate.clone(),
                errors: self.errors.clone(),
            },
        };
        Ok(outcome)
    }

    fn generation_prompt(&self) -> Result<String> {
        match self.retriever {
            Some(retriever) => {
                let snippets = retriever.retrieve(&self.description).map_err(|why| {
                    error!("retrieval failed: {}", why);
                    why
                })?;
                debug!("retrieved {} snippets", snippets.len());
                Ok(prompt::general_rules(&snippets.join("\n"), &self.description))
            }
            None => match self.knowledge {
                Some(knowledge) => Ok(prompt::knowledge_rules(knowledge.text(), &self.description)),
                None => Ok(prompt::question_logic(&self.description)),
            },
        }
    }

    fn advance(&mut self, to: State) {
        info!("{} -> {}", self.state, to);
        self.transcript.push(Transition {
            from: self.state,
            to,
            at: Utc::now(),
        });
        self.state = to;
    }
}
