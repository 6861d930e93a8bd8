use std::collections::HashMap;
use indexmap::set::IndexSet;
use itertools::Itertools;
use crate::ast::{Atom, Rule, Term};
use crate::engine::FactStore;

/// The set of facts produced by one pass over the rules
pub type DerivedFacts = IndexSet<Atom>;

/// Maps each token seen in a rule body to the value it took in the current combination
type Bindings<'a> = HashMap<&'a Term, &'a Term>;

/// Joins rule bodies against a fixed fact store and projects through the heads.
/// Rules only ever see the store they were given: nothing derived is fed back,
/// so a rule that depends on another rule's head finds nothing
pub struct JoinEvaluator<'a> {
    store: &'a FactStore,
}

impl<'a> JoinEvaluator<'a> {
    pub fn new(store: &'a FactStore) -> JoinEvaluator<'a> {
        JoinEvaluator { store }
    }
    /// Evaluate each rule once, independently, collecting everything they derive
    pub fn evaluate(&self, rules: &[Rule]) -> DerivedFacts {
        let mut derived = DerivedFacts::new();
        for rule in rules {
            let before = derived.len();
            self.evaluate_rule(rule, &mut derived);
            debug!("{} derived {} new facts", rule, derived.len() - before);
        }
        derived
    }
    /// Enumerate every combination of one fact per body atom,
    /// keep those with consistent bindings and insert their projection into `derived`
    pub fn evaluate_rule(&self, rule: &Rule, derived: &mut DerivedFacts) {
        let mut candidates = Vec::with_capacity(rule.body.len());
        for atom in rule.body.iter() {
            match self.store.lookup(&atom.predicate) {
                Some(rows) if !rows.is_empty() => candidates.push(rows),
                _ => {
                    trace!("no facts for `{}`, {} derives nothing", atom.predicate, rule.head);
                    return;
                }
            }
        }
        if candidates.is_empty() {
            return;
        }
        for combination in candidates.iter().map(|rows| rows.iter()).multi_cartesian_product() {
            let bindings = match bind(&rule.body, &combination) {
                Some(bindings) => bindings,
                None => {
                    trace!("conflicting bindings for {} in {:?}", rule.head, combination);
                    continue;
                }
            };
            let result = project(&rule.head, &bindings);
            if is_reflexive(&result) {
                trace!("discarding reflexive {}", result);
                continue;
            }
            derived.insert(result);
        }
    }
}

/// Walk the body atoms alongside their chosen facts, position by position.
/// Fails as soon as a token would have to take two different values
fn bind<'a>(body: &'a [Atom], combination: &[&'a Vec<Term>]) -> Option<Bindings<'a>> {
    let mut bindings = Bindings::new();
    for (atom, values) in body.iter().zip(combination.iter().copied()) {
        for (token, value) in atom.terms.iter().zip(values.iter()) {
            match bindings.get(token) {
                Some(bound) if *bound != value => return None,
                Some(_) => {}
                None => {
                    bindings.insert(token, value);
                }
            }
        }
    }
    Some(bindings)
}

/// Look up every head token; the ones the body never mentioned become placeholders
fn project(head: &Atom, bindings: &Bindings<'_>) -> Atom {
    let terms = head
        .terms
        .iter()
        .map(|token| match bindings.get(token) {
            Some(value) => (*value).clone(),
            None => Term::placeholder(),
        })
        .collect();
    Atom::from_terms(&head.predicate, terms)
}

/// A result relating something to itself in its first two positions.
/// Heads with fewer than two terms are never reflexive
fn is_reflexive(result: &Atom) -> bool {
    match result.terms.as_slice() {
        [first, second, ..] => first == second,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_statement;
    use crate::ast::Statement;

    fn rule(source: &str) -> Rule {
        match parse_statement(source).expect("should parse") {
            Statement::Rule(rule) => rule,
            Statement::Fact(fact) => panic!("expected a rule, got fact {}", fact),
        }
    }
    fn store_of(facts: Vec<Atom>) -> FactStore {
        let mut store = FactStore::new();
        store.extend(facts);
        store.close_symmetric();
        store
    }

    #[test]
    fn join_simple_0() {
        let store = store_of(vec![fact!(parent(a, b)), fact!(parent(b, c))]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("grandparent(X,Y) :- parent(X,Z), parent(Z,Y).")]);
        let expected = vec![fact!(grandparent(a, c))];
        assert_eq!(derived.into_iter().collect::<Vec<_>>(), expected);
    }
    #[test]
    fn join_three_atoms() {
        let store = store_of(vec![
            fact!(parent(a, b)),
            fact!(parent(b, c)),
            fact!(parent(c, d)),
        ]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("greatgrandparent(X, Y) :- parent(X, Z), parent(Z, W), parent(W, Y).")]);
        assert_eq!(derived.into_iter().collect::<Vec<_>>(), vec![fact!(greatgrandparent(a, d))]);
    }
    #[test]
    fn unknown_predicate_derives_nothing() {
        let store = store_of(vec![fact!(parent(a, b))]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("uncle(X, Y) :- parent(Z, Y), sibling(X, Z).")]);
        assert!(derived.is_empty());
    }
    #[test]
    fn reflexive_results_are_dropped() {
        let store = store_of(vec![fact!(parent(a, b)), fact!(sibling(a, a))]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("uncle(X,Y) :- parent(Z,Y), sibling(X,Z).")]);
        assert!(derived.iter().all(|fact| fact.terms[0] != fact.terms[1]));
        // the only consistent binding is X = a, Y = b
        assert_eq!(derived.into_iter().collect::<Vec<_>>(), vec![fact!(uncle(a, b))]);
    }
    #[test]
    fn reflexive_pairs_filtered() {
        // the lone child shares a parent with itself
        let store = store_of(vec![fact!(parent(p, x)), fact!(sibling(p, p))]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("same(X, Y) :- parent(Z, X), parent(Z, Y).")]);
        assert!(derived.is_empty());
    }
    #[test]
    fn unary_head_skips_reflexive_filter() {
        let store = store_of(vec![fact!(parent(a, b))]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("has_child(X) :- parent(X, Y).")]);
        assert_eq!(derived.into_iter().collect::<Vec<_>>(), vec![fact!(has_child(a))]);
    }
    #[test]
    fn unbound_head_token_is_placeholder() {
        let store = store_of(vec![fact!(parent(a, b))]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("ancestor(X, Q) :- parent(X, Y).")]);
        let fact = derived.into_iter().next().expect("one derivation");
        assert_eq!(fact.terms[0], Term::new("a"));
        assert!(fact.terms[1].is_placeholder());
    }
    #[test]
    fn repeated_tokens_must_agree() {
        // `a` is just another token: it binds to whatever sits in that position first
        let store = store_of(vec![fact!(likes(x, y)), fact!(likes(y, y))]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("self_fan(P, Q) :- likes(a, a), likes(P, Q).")]);
        // only `likes(y, y)` satisfies `likes(a, a)`, and then any `likes` row is fine for (P, Q)
        assert_eq!(derived.into_iter().collect::<Vec<_>>(), vec![fact!(self_fan(x, y))]);
    }
    #[test]
    fn derived_facts_do_not_feed_back() {
        let store = store_of(vec![fact!(parent(a, b)), fact!(parent(b, c))]);
        let rules = vec![
            rule("grandparent(X,Y) :- parent(X,Z), parent(Z,Y)."),
            rule("elder(X, Y) :- grandparent(X, Y)."),
        ];
        let derived = JoinEvaluator::new(&store).evaluate(&rules);
        assert_eq!(derived.into_iter().collect::<Vec<_>>(), vec![fact!(grandparent(a, c))]);
    }
    #[test]
    fn duplicate_derivations_collapse() {
        let store = store_of(vec![
            fact!(parent(a, b)),
            fact!(parent(b, c)),
            fact!(parent(b, d)),
        ]);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("grandchild_of(Y) :- parent(X, Z), parent(Z, Y).")]);
        assert_eq!(derived.len(), 2);
        let derived = JoinEvaluator::new(&store)
            .evaluate(&[rule("is_grandparent(X) :- parent(X, Z), parent(Z, Y).")]);
        assert_eq!(derived.into_iter().collect::<Vec<_>>(), vec![fact!(is_grandparent(a))]);
    }
}
