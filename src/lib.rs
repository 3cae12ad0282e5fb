//! # Introduction
//!
//! jackc is the front end of a batch compiler for the Jack teaching
//! language.  It turns raw source text into a fully concrete syntax tree
//! that keeps every keyword, symbol, and literal in grammar order, each
//! node annotated with its source position for diagnostics.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Parser → CST → JSON
//! ```
//!
//! 1. [`parser::lexer`] — pull-based scanner producing one token per call,
//!    with non-consuming multi-token lookahead.
//! 2. [`parser::parser`] — recursive descent over the token stream, one
//!    method per grammar production, building a [`parser::cst::TreeNode`]
//!    tree rooted at the unit's single `class` declaration.
//! 3. [`files`] — `.jack` source discovery for the batch driver; the driver
//!    serializes each tree as JSON.
//!
//! Each input unit gets its own independent (lexer, parser) pair; nothing
//! is shared between units. The first lexical or syntax error aborts the
//! unit; there is no recovery or resynchronization.

pub mod files;
pub mod parser;
