//! Pegium: embedded PEG parser combinators with CST construction and AST
//! building.
//!
//! A grammar is a set of named rules built from composable elements. Parsing
//! produces a concrete syntax tree in which every matched byte has a home;
//! *assignments* layered into the grammar then build host-defined AST
//! records from it.
//!
//! Rules come in three kinds with different hidden-token semantics:
//!
//! - **terminal** rules match their body on the raw bytes (lexical);
//! - **data-type** rules match with hidden terminals (whitespace, comments)
//!   interleaved between tokens and fold their subtree into a value;
//! - **parser** rules match like data-type rules and build an AST record.
//!
//! # Example
//!
//! ```
//! use pegium::{Parser, at_least_one, at_least_one_sep, cls, kw, many, s, w};
//!
//! let p = Parser::new();
//! p.terminal("WS", at_least_one(s())).ignore();
//! p.terminal("ID", cls("a-zA-Z_") + many(w()));
//! p.data_rule("QualifiedName", at_least_one_sep(kw("."), p.call("ID")));
//!
//! let result = p.parse("QualifiedName", "foo . bar");
//! assert!(result.ok);
//! assert_eq!(result.into_value::<String>().unwrap(), "foo.bar");
//! ```

pub mod ast;
pub mod cst;
pub mod grammar;

mod context;
mod parser;
mod rules;

pub use ast::{AstNode, FromValue, Reference, Resolver, Value};
pub use context::Context;
pub use cst::CstNode;
pub use grammar::{
    Action, AnyChar, CharClass, D, Element, GrammarElement, Group, Literal, OrderedChoice,
    Repetition, S, UnorderedGroup, W, ahead, append, assign, at_least_one, at_least_one_sep, cls,
    d, dot, eof, eol, kw, many, many_sep, not, opt, rep, s, w,
};
pub use parser::{ParseResult, Parser, TerminalHandle};

/// Errors from the host-facing value extraction on [`ParseResult`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValueError {
    /// The parse did not produce a value (it failed or matched a prefix).
    #[error("the parse did not produce a value")]
    NoValue,

    /// The value does not convert to the requested type.
    #[error("the parse value does not convert to `{requested}`")]
    WrongType { requested: &'static str },
}

#[cfg(test)]
mod tests;
