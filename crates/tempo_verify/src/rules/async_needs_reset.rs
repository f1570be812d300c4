//! S202: async-needs-reset — async marker on a register without a reset.

use tempo_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tempo_ir::{Block, Node, NodeKind};

use crate::VerifyRule;

/// Detects transfer registers carrying the asynchronous marker with no reset.
///
/// The grammar cannot produce this through the `reset async` clause, but the
/// marker can arrive as a unit attribute or through the builder. The
/// complementary "reset without resetValue" shape is unrepresentable (the
/// pair is one field), so this rule is the only runtime half of the invariant.
pub struct AsyncNeedsReset;

impl VerifyRule for AsyncNeedsReset {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Structure, 202)
    }

    fn name(&self) -> &str {
        "async-needs-reset"
    }

    fn description(&self) -> &str {
        "registers without a reset cannot be asynchronous"
    }

    fn check_node(&self, node: &Node, _block: &Block, sink: &DiagnosticSink) {
        if let NodeKind::FirReg(reg) = &node.kind {
            if reg.is_async && reg.reset.is_none() {
                sink.emit(Diagnostic::error(
                    self.code(),
                    "register with no reset cannot be async",
                    node.span,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_ir::{AttrMap, Block, ResetSpec};
    use tempo_source::Span;

    fn reg_block() -> (Block, tempo_ir::ValueId, tempo_ir::ValueId) {
        let mut block = Block::new();
        let i1 = block.types.i1();
        let i8 = block.types.uint(8);
        let clk = block.add_argument("clk", i1);
        let next = block.add_argument("next", i8);
        (block, clk, next)
    }

    #[test]
    fn async_with_reset_passes() {
        let (mut block, clk, next) = reg_block();
        let i1 = block.types.i1();
        let i8 = block.types.uint(8);
        let rst = block.add_argument("rst", i1);
        let rv = block.add_argument("rv", i8);
        let id = block.add_fir_reg(
            next,
            clk,
            Some(ResetSpec {
                reset: rst,
                value: rv,
            }),
            true,
            None,
            "q",
            AttrMap::new(),
            Span::DUMMY,
        );
        let sink = DiagnosticSink::new();
        AsyncNeedsReset.check_node(block.node(id), &block, &sink);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn async_without_reset_fails() {
        let (mut block, clk, next) = reg_block();
        let id = block.add_fir_reg(next, clk, None, true, None, "q", AttrMap::new(), Span::DUMMY);
        let sink = DiagnosticSink::new();
        AsyncNeedsReset.check_node(block.node(id), &block, &sink);
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "register with no reset cannot be async");
        assert_eq!(format!("{}", diags[0].code), "S202");
    }

    #[test]
    fn sync_without_reset_passes() {
        let (mut block, clk, next) = reg_block();
        let id = block.add_fir_reg(next, clk, None, false, None, "q", AttrMap::new(), Span::DUMMY);
        let sink = DiagnosticSink::new();
        AsyncNeedsReset.check_node(block.node(id), &block, &sink);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn comp_reg_ignored() {
        let (mut block, clk, next) = reg_block();
        let id = block.add_comp_reg(next, clk, None, None, "q", AttrMap::new(), Span::DUMMY);
        let sink = DiagnosticSink::new();
        AsyncNeedsReset.check_node(block.node(id), &block, &sink);
        assert!(sink.take_all().is_empty());
    }
}
