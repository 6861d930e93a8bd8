use std::fmt;
use itertools::Itertools;
use crate::ast::Atom;

/// `head :- body_1, body_2, ...`
/// The head holds the tokens to project, the body the atoms to join
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub head: Atom,
    pub body: Vec<Atom>,
}

/// One meaningful line of logic text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Fact(Atom),
    Rule(Rule),
}

impl Rule {
    pub fn new(head: Atom, body: Vec<Atom>) -> Rule {
        Rule { head, body }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- {}.", self.head, self.body.iter().join(", "))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
