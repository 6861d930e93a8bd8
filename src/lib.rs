//! A small forward-chaining rule engine over Prolog-style text,
//! plus the bounded generate/validate/repair loop that decides whether it runs.

#[macro_use]
extern crate log;

mod error;
pub use error::{Error, Result};

#[macro_use]
pub mod ast;
pub mod engine;
pub mod validate;
pub mod present;
pub mod workflow;
mod client;
pub use client::{ChatClient, Config};

pub use ast::{Atom, DerivedFact, Fact, Rule, Statement, Term};
pub use engine::{solve_logic, DerivedFacts, FactStore, JoinEvaluator, Solver};
pub use validate::{check_logic_validity, ValidationError, ValidationErrorKind};
pub use workflow::{KnowledgeBase, Outcome, RepairWorkflow, Retriever, State, TextGenerator};

/// Install `pretty_env_logger` as the log backend, filtered by `RUST_LOG`.
/// Safe to call more than once
pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}
