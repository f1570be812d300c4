//! Verification engine that manages rule registration and execution.

use crate::rules::register_builtin_rules;
use crate::VerifyRule;
use tempo_diagnostics::DiagnosticSink;
use tempo_ir::{Block, NodeId};

/// The engine that runs structural rules over a block.
///
/// Builtin rules are registered at construction time. Verification is
/// read-only: a failing node is reported through the sink and never repaired
/// or removed, matching the terminal nature of structural errors.
pub struct Verifier {
    rules: Vec<Box<dyn VerifyRule>>,
}

impl Verifier {
    /// Creates a verifier with all builtin rules registered.
    pub fn new() -> Self {
        let mut verifier = Self { rules: Vec::new() };
        register_builtin_rules(&mut verifier);
        verifier
    }

    /// Registers an additional rule.
    pub fn register(&mut self, rule: Box<dyn VerifyRule>) {
        self.rules.push(rule);
    }

    /// Returns the number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the names of all registered rules.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Runs every rule over every node in the block.
    ///
    /// Returns `true` if no rule emitted an error.
    pub fn run(&self, block: &Block, sink: &DiagnosticSink) -> bool {
        let before = sink.error_count();
        for node in block.nodes.values() {
            for rule in &self.rules {
                rule.check_node(node, block, sink);
            }
        }
        sink.error_count() == before
    }

    /// Runs every rule over a single node.
    ///
    /// Returns `true` if no rule emitted an error.
    pub fn verify_node(&self, block: &Block, id: NodeId, sink: &DiagnosticSink) -> bool {
        let before = sink.error_count();
        for rule in &self.rules {
            rule.check_node(block.node(id), block, sink);
        }
        sink.error_count() == before
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}
