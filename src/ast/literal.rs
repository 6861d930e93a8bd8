use std::fmt;
use itertools::Itertools;
use crate::ast::Term;

/// Builds an `Atom` from Prolog-looking tokens, handy in tests:
/// `fact!(parent(bob, alice))`
#[macro_export]
macro_rules! fact {
    ( $pred:ident ( $($term:ident),* ) ) => {
        $crate::ast::Atom::new(stringify!($pred), vec![ $( stringify!($term) ),* ])
    };
}

/// A predicate applied to an ordered list of terms, with no logical connectives.
/// Ground facts, body atoms and derived facts all share this shape.
/// Ordering is by predicate, then term-wise, which is the order results are presented in
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    pub predicate: String,
    pub terms: Vec<Term>,
}

/// A ground tuple read from the knowledge base
pub type Fact = Atom;
/// A tuple produced by projecting a successful join through a rule head
pub type DerivedFact = Atom;

impl Atom {
    pub fn new(predicate: &str, terms: Vec<&str>) -> Atom {
        Atom {
            predicate: predicate.to_string(),
            terms: terms.into_iter().map(Term::new).collect(),
        }
    }
    pub fn from_terms(predicate: &str, terms: Vec<Term>) -> Atom {
        Atom { predicate: predicate.to_string(), terms }
    }
    pub fn arity(&self) -> usize {
        self.terms.len()
    }
    /// true if some position was never bound while deriving this atom
    pub fn has_placeholder(&self) -> bool {
        self.terms.iter().any(Term::is_placeholder)
    }
    /// the same predicate with the terms in reverse order
    pub fn reversed(&self) -> Atom {
        Atom {
            predicate: self.predicate.clone(),
            terms: self.terms.iter().rev().cloned().collect(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.predicate, self.terms.iter().join(", "))
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
