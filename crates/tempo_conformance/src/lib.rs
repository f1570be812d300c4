//! Conformance test helpers for the Tempo front end.
//!
//! Provides shared pipeline functions that run statement text through the
//! full pipeline (parse → verify) and return structured results for
//! assertion in integration tests.

#![warn(missing_docs)]

use tempo_common::Interner;
use tempo_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use tempo_ir::{Block, NodeId};
use tempo_source::FileId;
use tempo_syntax::parse_fragment;
use tempo_verify::Verifier;

/// Result of running the full parse → verify pipeline.
pub struct PipelineResult {
    /// The block holding the parsed nodes.
    pub block: Block,
    /// The interner used for symbol names.
    pub interner: Interner,
    /// IDs of the nodes registered by the parser, in statement order.
    pub node_ids: Vec<NodeId>,
    /// All diagnostics emitted during the pipeline.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any errors were emitted.
    pub has_errors: bool,
    /// Number of error-severity diagnostics.
    pub error_count: usize,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

/// Seeds the standard argument environment used across the conformance
/// tests: `%clk: i1`, `%in: i8`, `%rst: i1`, `%rv: i8`, `%addr3: i3`,
/// and `%wdata: i32`.
pub fn standard_block() -> Block {
    let mut block = Block::new();
    let i1 = block.types.i1();
    let i8 = block.types.uint(8);
    let i3 = block.types.uint(3);
    let i32_ty = block.types.uint(32);
    block.add_argument("clk", i1);
    block.add_argument("in", i8);
    block.add_argument("rst", i1);
    block.add_argument("rv", i8);
    block.add_argument("addr3", i3);
    block.add_argument("wdata", i32_ty);
    block
}

/// Runs the full pipeline on statement text with the standard seeds.
pub fn full_pipeline(source: &str) -> PipelineResult {
    full_pipeline_with(standard_block(), source)
}

/// Runs the full pipeline on statement text with a caller-seeded block.
pub fn full_pipeline_with(mut block: Block, source: &str) -> PipelineResult {
    let interner = Interner::new();
    let sink = DiagnosticSink::new();

    let node_ids = parse_fragment(&mut block, source, FileId::from_raw(0), &interner, &sink);

    let verifier = Verifier::new();
    verifier.run(&block, &sink);

    let diagnostics = sink.take_all();
    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    PipelineResult {
        block,
        interner,
        node_ids,
        diagnostics,
        has_errors: error_count > 0,
        error_count,
        warning_count,
    }
}
