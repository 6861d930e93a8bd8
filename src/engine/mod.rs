mod fact_store;
pub use fact_store::*;

mod join;
pub use join::*;

use crate::ast::{self, Rule};

/// Owns the facts and rules of one evaluation run.
///
/// Every call to `parse_logic` (and so `solve_logic`) throws away what was held before,
/// so one instance can be reused for independent runs one after another.
/// Sharing an instance between overlapping runs is not supported.
#[derive(Debug, Default)]
pub struct Solver {
    store: FactStore,
    rules: Vec<Rule>,
}

impl Solver {
    pub fn new() -> Solver {
        Solver {
            store: FactStore::new(),
            rules: Vec::new(),
        }
    }
    /// Forget every fact and rule
    pub fn reset(&mut self) {
        self.store.clear();
        self.rules.clear();
    }
    /// Replace the current facts and rules with those in `source`,
    /// then apply the symmetric closure once
    pub fn parse_logic(&mut self, source: &str) {
        self.reset();
        let program = ast::parse_program(source);
        self.store.extend(program.facts);
        self.rules = program.rules;
        let added = self.store.close_symmetric();
        debug!("added {} symmetric `{}` facts", added, SYMMETRIC_PREDICATE);
    }
    /// Parse `source` and run every rule once against its facts
    pub fn solve_logic(&mut self, source: &str) -> DerivedFacts {
        self.parse_logic(source);
        debug!("facts:");
        for fact in self.store.iter() {
            debug!("  {}", fact);
        }
        debug!("rules:");
        for rule in self.rules.iter() {
            debug!("  {}", rule);
        }
        let derived = self.evaluate();
        info!("derived {} facts from {} facts and {} rules", derived.len(), self.store.len(), self.rules.len());
        derived
    }
    /// Run the currently held rules against the currently held facts
    pub fn evaluate(&self) -> DerivedFacts {
        JoinEvaluator::new(&self.store).evaluate(&self.rules)
    }
    pub fn facts(&self) -> &FactStore {
        &self.store
    }
    pub fn rules(&self) -> &[Rule] {
        self.rules.as_slice()
    }
}

/// Solve `source` with a fresh `Solver`
pub fn solve_logic(source: &str) -> DerivedFacts {
    Solver::new().solve_logic(source)
}
