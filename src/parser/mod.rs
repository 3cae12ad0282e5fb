//! Jack source code front end
//!
//! This module transforms Jack source text into a Concrete Syntax Tree (CST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parser`]: Parsing (tokens → CST)
//! - [`cst`]: Token and tree node definitions
//!
//! # Tree shape
//!
//! The tree is concrete, not abstract: every keyword, punctuation symbol,
//! and separator a production consumes appears as a terminal leaf in the
//! exact order the grammar matched it, so the token stream of the source
//! can be reconstructed from the leaves alone. Each input unit holds one
//! `class` declaration, the single top-level form of the language.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one token of active lookahead
//! and a non-consuming multi-token peek for the single ambiguous spot in
//! the expression grammar. Binary operators chain left-to-right without
//! precedence. No external parser generator dependencies.

pub mod cst;
pub mod lexer;
pub mod parser;
