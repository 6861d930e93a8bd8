use indexmap::map::IndexMap;
use indexmap::set::IndexSet;
use crate::ast::{Atom, Term};

/// The one relation we treat as symmetric
pub const SYMMETRIC_PREDICATE: &str = "sibling";

/// Ground facts, indexed by predicate name.
/// Both levels keep insertion order so that evaluation is reproducible
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactStore {
    relations: IndexMap<String, IndexSet<Vec<Term>>>,
}

impl FactStore {
    pub fn new() -> FactStore {
        FactStore { relations: IndexMap::new() }
    }
    /// Insert `fact`, returning `true` if it was not already present
    pub fn insert(&mut self, fact: Atom) -> bool {
        let Atom { predicate, terms } = fact;
        self.relations
            .entry(predicate)
            .or_insert_with(IndexSet::new)
            .insert(terms)
    }
    pub fn contains(&self, fact: &Atom) -> bool {
        self.relations
            .get(&fact.predicate)
            .map_or(false, |rows| rows.contains(&fact.terms))
    }
    /// Every term sequence recorded under `predicate`, or `None` if we have never seen it
    pub fn lookup(&self, predicate: &str) -> Option<&IndexSet<Vec<Term>>> {
        self.relations.get(predicate)
    }
    /// Total number of facts across all predicates
    pub fn len(&self) -> usize {
        self.relations.values().map(IndexSet::len).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn clear(&mut self) {
        self.relations.clear();
    }
    /// Iterate over all facts, grouped by predicate in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = Atom> + '_ {
        self.relations.iter().flat_map(|(predicate, rows)| {
            rows.iter().map(move |terms| Atom::from_terms(predicate, terms.clone()))
        })
    }
    /// For every binary `sibling` fact, add the reversed fact if it is missing.
    /// Runs over the facts present when called; reversing a reversal only gives back an
    /// original, so a single pass is closed and a second call adds nothing.
    /// Returns the number of facts added
    pub fn close_symmetric(&mut self) -> usize {
        let rows = match self.relations.get_mut(SYMMETRIC_PREDICATE) {
            Some(rows) => rows,
            None => return 0,
        };
        let reversed = rows
            .iter()
            .filter(|terms| terms.len() == 2)
            .map(|terms| vec![terms[1].clone(), terms[0].clone()])
            .collect::<Vec<_>>();
        let mut added = 0;
        for terms in reversed {
            if rows.insert(terms) {
                added += 1;
            }
        }
        added
    }
}

impl Extend<Atom> for FactStore {
    fn extend<I: IntoIterator<Item = Atom>>(&mut self, iter: I) {
        for fact in iter {
            self.insert(fact);
        }
    }
}
