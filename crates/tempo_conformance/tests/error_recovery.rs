//! Tests for error recovery — verifying the pipeline handles malformed input
//! gracefully, emits per-statement diagnostics, and never registers a node
//! for a failed statement.

use tempo_conformance::full_pipeline;
use tempo_diagnostics::{DiagnosticRenderer, TerminalRenderer};
use tempo_source::SourceDb;

#[test]
fn bad_statement_then_good_statement_recovers() {
    let result = full_pipeline(
        "%q = compreg %in : i8\n\
         %p = compreg %in, %clk : i8",
    );
    assert!(result.has_errors);
    assert_eq!(result.node_ids.len(), 1);
    assert_eq!(result.block.nodes.len(), 1);
}

#[test]
fn multiple_bad_statements_emit_multiple_diagnostics() {
    let result = full_pipeline(
        "%a = compreg %in : i8\n\
         %b = compreg %in, %clk, %rst : i8\n\
         %c = compreg %in, %clk : i8",
    );
    assert!(result.error_count >= 2);
    assert_eq!(result.node_ids.len(), 1);
}

#[test]
fn failed_statement_binds_no_result_names() {
    // %q never got defined, so the second statement's operand fails to
    // resolve rather than silently referencing a partial node.
    let result = full_pipeline(
        "%q = compreg %in : i8\n\
         %p = compreg %q, %clk : i8",
    );
    assert!(result.has_errors);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.message.contains("use of undefined value '%q'")));
    assert!(result.block.nodes.is_empty());
}

#[test]
fn garbage_input_never_panics() {
    for source in [
        "",
        "   // only a comment",
        "%",
        "= compreg",
        "compreg",
        "%q = ",
        "%q = hlmem",
        "read write hlmem",
        "%q = compreg %in, %clk : ",
        "%q = compreg %in, %clk : array<",
        "{NReadPorts = 1}",
        "%a, = compreg %in, %clk : i8",
    ] {
        let _ = full_pipeline(source);
    }
}

#[test]
fn unterminated_dict_reported() {
    let result = full_pipeline("%q = compreg %in, %clk {name = \"q\" : i8");
    assert!(result.has_errors);
}

#[test]
fn diagnostics_render_with_source_lines() {
    let source = "%q = compreg %in : i8";
    let mut db = SourceDb::new();
    db.add_source("core.tir", source.to_string());
    let result = full_pipeline(source);
    assert!(result.has_errors);
    let renderer = TerminalRenderer::new();
    let rendered = renderer.render(&result.diagnostics[0], &db);
    assert!(rendered.contains("expected clock operand"));
    assert!(rendered.contains("core.tir:1:"));
    assert!(rendered.contains("%q = compreg %in : i8"));
}

#[test]
fn failed_memory_leaves_no_trace() {
    let result = full_pipeline(
        "%r0 = hlmem @m %clk {depth = 4} : array<4 x i8>\n\
         %q = compreg %in, %clk : i8",
    );
    assert!(result.has_errors);
    // Only the register survived, and the clock's use count reflects that.
    assert_eq!(result.block.nodes.len(), 1);
    assert_eq!(result.block.use_count(result.block.args[0]), 1);
}
