use crate::validate::ValidationError;

/// The relations we ask for when nobody says otherwise
pub const DEFAULT_TASK: &str = "Define the following relations:
- Uncle: uncle(X, Y) :- parent(Z, Y), sibling(X, Z).
- Aunt: aunt(X, Y) :- parent(Z, Y), sibling(X, Z).
- Cousin: cousin(X, Y) :- parent(Z, X), parent(W, Y), sibling(Z, W).
- Grandparent: grandparent(X, Y) :- parent(X, Z), parent(Z, Y).
- Great-grandparent: greatgrandparent(X, Y) :- parent(X, Z), parent(Z, W), parent(W, Y).";

/// Ask for rules given the whole knowledge base as context
pub fn knowledge_rules(context: &str, description: &str) -> String {
    format!(
        "You are given some background knowledge in Prolog format:\n\n{}\n\n\
         Translate the following description into Prolog-style logic rules. \
         Only output logic rules. No explanations, no extra text. \
         Each rule must end with a period.\n\n{}",
        context, description
    )
}

/// Ask for entity-independent rules given retrieved snippets as context
pub fn general_rules(context: &str, description: &str) -> String {
    format!(
        "You are given some background knowledge:\n\n{}\n\n\
         Translate the following description into general Prolog-style logic rules. \
         Only output general rules. Do NOT output specific facts, queries, or answers. \
         The rules should work for any entity, not just a particular example. \
         Use the convention that sibling(X, Y) means X is a sibling of Y, and sibling relationships are symmetric. \
         Make sure to define uncle(X, Y) as: uncle(X, Y) :- parent(Z, Y), sibling(X, Z). \
         Ensure each rule ends with a period.\n\n{}",
        context, description
    )
}

/// Ask for facts and rules straight from a question, with no background knowledge
pub fn question_logic(question: &str) -> String {
    format!(
        "Translate the following description into symbolic Prolog-style logic facts and rules. \
         Only output facts and rules. \
         Do NOT include any queries, answers, or explanations. \
         Ensure correct syntax with a period at the end of each fact and rule. \
         Do NOT use markdown formatting or code blocks.\n\n{}",
        question
    )
}

/// Ask for a syntax-only fix of `candidate`
pub fn repair(candidate: &str, errors: &[ValidationError]) -> String {
    let messages = errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "The following Prolog-like logic contains syntax errors:\n{}\n\n\
         Please correct only the syntax errors while keeping ALL the original facts and rules. \
         Do NOT add, remove, or answer anything. \
         Only fix the syntax. Keep facts and rules exactly as they are.\n\n{}",
        messages, candidate
    )
}
