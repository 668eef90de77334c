//! sdkmig-core: Java syntax tree, span edits and traversal for sdkmig

pub mod ast;
mod edit;
pub mod logging;
mod parser;
pub mod visitor;

pub use edit::{apply_edits, retain_non_conflicting, Edit, EditError, Span};
pub use parser::{parse_java, ParseError};
pub use visitor::{visit, Scope, Visitor};
