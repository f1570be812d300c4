//! S201: single-use-port — memory port handles consumed more than once.

use tempo_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tempo_ir::{Block, Node, NodeKind};

use crate::VerifyRule;

/// Detects memory declarations whose port handles have multiple uses.
///
/// A port handle is a single-use capability: routing one handle to two
/// consumers would silently alias two independent hardware port instances.
/// Fan-out must happen through additional accessor nodes at the handle's
/// single use site, never by aliasing the handle itself.
pub struct SingleUsePort;

impl VerifyRule for SingleUsePort {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Structure, 201)
    }

    fn name(&self) -> &str {
        "single-use-port"
    }

    fn description(&self) -> &str {
        "memory port handles may be consumed at most once"
    }

    fn check_node(&self, node: &Node, block: &Block, sink: &DiagnosticSink) {
        if !matches!(node.kind, NodeKind::Memory(_)) {
            return;
        }
        for (i, &result) in node.results.iter().enumerate() {
            let uses = block.use_count(result);
            if uses > 1 {
                sink.emit(
                    Diagnostic::error(
                        self.code(),
                        format!("output port #{i} has multiple uses"),
                        node.span,
                    )
                    .with_note(format!("the handle has {uses} uses"))
                    .with_help("add another accessor node instead of aliasing the handle"),
                );
            }
        }
    }
}
