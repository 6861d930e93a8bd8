use crate::ast::{is_ignorable, RULE_SEPARATOR};
use crate::error::Result;
use crate::validate::ValidationError;
use crate::workflow::prompt;

/// Something that turns a prompt into (hopefully) logic text.
/// Nothing about the answer is trusted; it is validated before use
pub trait TextGenerator {
    fn generate(&mut self, prompt: &str) -> Result<String>;

    /// Ask for a syntax-only correction of `candidate`
    fn refine(&mut self, candidate: &str, errors: &[ValidationError]) -> Result<String> {
        let prompt = prompt::repair(candidate, errors);
        self.generate(&prompt)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for &mut G {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }
    fn refine(&mut self, candidate: &str, errors: &[ValidationError]) -> Result<String> {
        (**self).refine(candidate, errors)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }
    fn refine(&mut self, candidate: &str, errors: &[ValidationError]) -> Result<String> {
        (**self).refine(candidate, errors)
    }
}

/// Finds background snippets relevant to a query, most relevant first
pub trait Retriever {
    fn retrieve(&self, query: &str) -> Result<Vec<String>>;
}

/// Knowledge-base text as handed over by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    text: String,
}

impl KnowledgeBase {
    pub fn new(text: &str) -> KnowledgeBase {
        KnowledgeBase { text: text.to_string() }
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    /// The plain fact lines, trimmed: no blanks, comments or rules
    pub fn fact_lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .lines()
            .map(str::trim)
            .filter(|line| !is_ignorable(line) && !line.contains(RULE_SEPARATOR))
    }
    pub fn facts_text(&self) -> String {
        self.fact_lines().collect::<Vec<_>>().join("\n")
    }
}

/// Every fact, in file order. Ranking is left to real retrievers
impl Retriever for KnowledgeBase {
    fn retrieve(&self, _query: &str) -> Result<Vec<String>> {
        Ok(self.fact_lines().map(str::to_string).collect())
    }
}
