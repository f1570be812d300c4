//! Structural verification of state-element nodes.
//!
//! This crate implements the whole-graph invariants that grammar shape alone
//! cannot enforce: the single-use discipline of memory port handles, and the
//! async-implies-reset rule for transfer registers.
//!
//! # Rule Categories
//!
//! - **S-series (structural):** invariants over a node's own fields and the
//!   block's value use counts. Rules never mutate, so distinct nodes may be
//!   verified concurrently.

#![warn(missing_docs)]

mod engine;
mod rules;

pub use engine::Verifier;
pub use rules::register_builtin_rules;
pub use rules::{AsyncNeedsReset, SingleUsePort};

use tempo_diagnostics::{DiagnosticCode, DiagnosticSink};
use tempo_ir::{Block, Node};

/// A single structural rule checked against every node in a block.
///
/// Each rule has a unique diagnostic code, a human-readable name, and a
/// description. The `check_node` method is called for each node and should
/// emit diagnostics via the provided sink; it reads only the node's fields
/// and the block's use counts.
pub trait VerifyRule: Send + Sync {
    /// Returns the diagnostic code for this rule (e.g., S201).
    fn code(&self) -> DiagnosticCode;

    /// Returns the short kebab-case name of this rule (e.g., "single-use-port").
    fn name(&self) -> &str;

    /// Returns a human-readable description of what this rule checks.
    fn description(&self) -> &str;

    /// Checks a single node and emits diagnostics to the sink.
    fn check_node(&self, node: &Node, block: &Block, sink: &DiagnosticSink);
}
