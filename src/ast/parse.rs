use crate::ast::{Atom, Rule, Statement, Term};
use crate::error::{Error, Result};

/// Separates a rule's head from its body
pub const RULE_SEPARATOR: &str = ":-";
/// Ends every meaningful line
pub const TERMINATOR: char = '.';
/// Starts a comment line
pub const COMMENT: char = '%';

/// Everything read out of a block of logic text, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub facts: Vec<Atom>,
    pub rules: Vec<Rule>,
}

/// true for lines the parser never looks at: blanks and `%` comments
pub fn is_ignorable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with(COMMENT)
}

/// Parse every line of `source`.
/// Lines that can not be read are skipped with a warning, they never abort the batch
pub fn parse_program(source: &str) -> Program {
    let mut program = Program::default();
    for line in source.lines() {
        if is_ignorable(line) {
            continue;
        }
        match parse_statement(line) {
            Ok(Statement::Fact(fact)) => {
                trace!("parsed fact {}", fact);
                program.facts.push(fact);
            }
            Ok(Statement::Rule(rule)) => {
                trace!("parsed rule {}", rule);
                program.rules.push(rule);
            }
            Err(why) => {
                warn!("skipping invalid line: {}", why);
            }
        }
    }
    program
}

/// Parse one non-empty, non-comment line into a fact or a rule
pub fn parse_statement(line: &str) -> Result<Statement> {
    let line = strip_line(line);
    match line.split_once(RULE_SEPARATOR) {
        Some((head, body)) => {
            let head = parse_atom(head)?;
            let body = split_body(strip_outer_parens(body.trim()))
                .into_iter()
                .map(parse_atom)
                .collect::<Result<Vec<_>>>()?;
            Ok(Statement::Rule(Rule::new(head, body)))
        }
        None => Ok(Statement::Fact(parse_atom(line)?)),
    }
}

/// Parse `name(term, term, ...)`.
/// Splits on the first `(`, drops a single trailing `)` and splits what is left on every comma;
/// each piece is trimmed but otherwise kept verbatim
pub fn parse_atom(source: &str) -> Result<Atom> {
    let source = source.trim();
    if !source.contains('(') || !source.contains(')') {
        return Err(Error::parse(source, "missing parentheses"));
    }
    let (name, args) = match source.split_once('(') {
        Some(split) => split,
        None => return Err(Error::parse(source, "missing parentheses")),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::parse(source, "missing predicate name"));
    }
    let args = args.strip_suffix(')').unwrap_or(args);
    let terms = args
        .split(',')
        .map(|arg| Term::new(arg.trim()))
        .collect::<Vec<_>>();
    Ok(Atom::from_terms(name, terms))
}

/// Split a rule body on the commas that separate atoms,
/// leaving alone the commas nested inside an atom's own parentheses
pub fn split_body(body: &str) -> Vec<&str> {
    let mut atoms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                atoms.push(body[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    atoms.push(body[start..].trim());
    atoms
}

/// drop surrounding whitespace, then trailing terminators
fn strip_line(line: &str) -> &str {
    line.trim().trim_end_matches(TERMINATOR).trim_end()
}

/// `(a(X), b(X))` wrapped as a whole is read as `a(X), b(X)`
fn strip_outer_parens(body: &str) -> &str {
    if body.starts_with('(') && body.ends_with(')') {
        &body[1..body.len() - 1]
    } else {
        body
    }
}
