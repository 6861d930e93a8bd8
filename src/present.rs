use crate::ast::Atom;
use crate::engine::DerivedFacts;

pub const NO_SOLUTION: &str = "No solution was found.";

/// Facts fit to show: nothing with a placeholder, no duplicates, sorted by predicate then terms
pub fn clean(derived: &DerivedFacts) -> Vec<Atom> {
    let mut facts = derived
        .iter()
        .filter(|fact| !fact.has_placeholder())
        .cloned()
        .collect::<Vec<_>>();
    facts.sort();
    facts.dedup();
    facts
}

/// One `predicate(t1, t2, ...)` line per clean fact, or the no-solution message
pub fn render(derived: &DerivedFacts) -> String {
    let facts = clean(derived);
    if facts.is_empty() {
        return NO_SOLUTION.to_string();
    }
    facts
        .iter()
        .map(Atom::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
