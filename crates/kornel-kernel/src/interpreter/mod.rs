//! Variables, scope and the small amount of word handling the kernel needs.

pub mod expand;
pub mod path;
mod scope;
pub mod variable;
pub mod words;

pub use expand::{expand_items, expand_param, expand_word, value_to_string};
pub use path::{VarPath, VarSegment, is_identifier};
pub use scope::Scope;
pub use variable::{Assignment, Discipline, VarAttrs, VarError, Variable, WriteOutcome};
pub use words::{LexError, Statement, Word, WordPart, split_script};
