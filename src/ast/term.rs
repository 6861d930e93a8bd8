use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// The token rendered for a head position the body never bound
pub const PLACEHOLDER: &str = "?";

/// An opaque token inside a predicate application.
/// There is no notion of variable or constant here: two terms are the same iff their text is,
/// and during a join every occurrence of the same token must take the same value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term {
    token: Rc<str>,
}

impl Term {
    pub fn new(token: &str) -> Term {
        Term { token: Rc::from(token) }
    }
    /// The value of a head term that received no binding
    pub fn placeholder() -> Term {
        Term::new(PLACEHOLDER)
    }
    pub fn is_placeholder(&self) -> bool {
        &*self.token == PLACEHOLDER
    }
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl Deref for Term {
    type Target = str;
    fn deref(&self) -> &str {
        &self.token
    }
}

impl From<&str> for Term {
    fn from(token: &str) -> Term {
        Term::new(token)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}
