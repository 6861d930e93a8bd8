mod term;
pub use term::*;

#[macro_use]
mod literal;
pub use literal::*;

mod rule;
pub use rule::*;

mod parse;
pub use parse::*;
