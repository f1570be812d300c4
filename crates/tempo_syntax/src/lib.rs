//! Hand-rolled textual front end for the Tempo state-element nodes.
//!
//! This crate provides the parse and print halves of the textual surface.
//! The main entry points are [`parse_fragment`], which parses statements into
//! a seeded [`Block`](tempo_ir::Block), and [`print_block`], which renders a
//! block back to text as the exact inverse of the grammar.
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): Converts statement text to tokens, handling value
//!   handles, symbol names, keywords, and line comments.
//! - **Parser** ([`parser`]): Recursive descent parser with per-kind grammars,
//!   derived operand types, and statement-boundary recovery.
//! - **Names** ([`names`]): Display-name inference and elision, plus the
//!   uniquifying handle table used when printing.
//! - **Printer** ([`printer`]): A pure function from block to text.

#![warn(missing_docs)]

/// Lexical analyzer for statement text.
pub mod lexer;
/// Display-name inference, elision, and printer handle assignment.
pub mod names;
/// Recursive descent parser for state-element statements.
pub mod parser;
/// Printing of blocks back to their textual form.
pub mod printer;
/// Token types for the statement lexer.
pub mod token;

pub use names::{can_elide_name, infer_name, is_positional_handle, NameTable};
pub use parser::{parse_fragment, Parser};
pub use printer::{format_type, print_block, print_node};
pub use token::{TirToken, Token};
