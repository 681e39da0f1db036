//! End-to-end grammar tests.
//!
//! Each test builds a small parser the way a host would, then drives it over
//! accept/reject tables, CST snapshots, and AST assertions. Rule-mode and
//! terminal-mode variants are exercised side by side throughout: the same
//! body behaves differently as a syntactic rule (hidden tokens interleave)
//! and as a terminal (raw bytes).

mod repetitions;
mod structure;
