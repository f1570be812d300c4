//! Recursive descent parser for state-element statements.
//!
//! The [`Parser`] provides primitive operations (advance, expect, eat) and
//! statement-boundary recovery, while the per-kind methods implement each
//! node's grammar: operand lists with arity dispatch for `compreg`, the
//! keyword-spelled reset clause for `firreg`, the attribute-driven port
//! fan-out for `hlmem`, and the fixed accessor shapes for `read`/`write`.
//! A node is registered into the block only after its statement fully
//! parses and all operands resolve; a failed statement leaves no trace.

use crate::lexer;
use crate::names::infer_name;
use crate::printer::format_type;
use crate::token::{TirToken, Token};
use std::collections::HashMap;
use tempo_common::{Ident, Interner};
use tempo_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tempo_ir::{address_width, AttrMap, AttrValue, Block, NodeId, ResetSpec, Type, TypeId, ValueId};
use tempo_source::{FileId, Span};

/// Parses a textual fragment of statements into `block`.
///
/// The block's seeded arguments form the initial scope for operand
/// resolution. Returns the IDs of the nodes registered in statement order;
/// failed statements are reported to the sink and skipped.
pub fn parse_fragment(
    block: &mut Block,
    source: &str,
    file: FileId,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Vec<NodeId> {
    let tokens = lexer::lex(source, file, sink);
    let mut parser = Parser::new(tokens, source, interner, sink, block);
    parser.parse_statements()
}

/// An operand handle read from source, not yet resolved against a type.
struct UnresolvedOperand {
    /// The handle text without the `%` sigil.
    text: String,
    span: Span,
}

/// A recursive descent parser for state-element statements.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    interner: &'a Interner,
    sink: &'a DiagnosticSink,
    block: &'a mut Block,
    /// SSA scope: handle text to defined value, seeded from block arguments.
    scope: HashMap<String, ValueId>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser over a token stream lexed from `source`.
    pub fn new(
        tokens: Vec<Token>,
        source: &'a str,
        interner: &'a Interner,
        sink: &'a DiagnosticSink,
        block: &'a mut Block,
    ) -> Self {
        let mut scope = HashMap::new();
        for &arg in &block.args {
            if let tempo_ir::ValueDef::Argument { name, .. } = &block.value(arg).def {
                scope.insert(name.clone(), arg);
            }
        }
        Self {
            tokens,
            pos: 0,
            source,
            interner,
            sink,
            block,
            scope,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    fn current(&self) -> TirToken {
        self.tokens[self.pos].kind
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn current_text(&self) -> &'a str {
        let span = self.current_span();
        &self.source[span.start as usize..span.end as usize]
    }

    fn at(&self, kind: TirToken) -> bool {
        self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.current() == TirToken::Eof
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it matches. Returns `true` if consumed.
    fn eat(&mut self, kind: TirToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match. Emits an error and returns `false` if not.
    fn expect(&mut self, kind: TirToken) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.expected(&format!("{kind:?}"));
            false
        }
    }

    fn peek_is(&self, kind: TirToken) -> bool {
        if self.pos + 1 < self.tokens.len() {
            self.tokens[self.pos + 1].kind == kind
        } else {
            false
        }
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    /// Emits a syntax error at the given span.
    fn error_at(&self, span: Span, msg: impl Into<String>) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 101),
            msg,
            span,
        ));
    }

    /// Emits an operand-resolution error at the given span.
    fn resolution_error(&self, span: Span, msg: impl Into<String>) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 102),
            msg,
            span,
        ));
    }

    /// Emits an "expected X" error at the current position.
    fn expected(&self, what: &str) {
        let actual = format!("{:?}", self.current());
        self.error_at(
            self.current_span(),
            format!("expected {what}, found {actual}"),
        );
    }

    /// Skips tokens until a plausible statement start: a value handle opening
    /// a fresh definition, or a result-less `write`. Best-effort only.
    fn synchronize(&mut self) {
        while !self.at_eof() {
            if self.at(TirToken::ValueHandle)
                && (self.peek_is(TirToken::Equals) || self.peek_is(TirToken::Comma))
            {
                return;
            }
            if self.at(TirToken::Write) {
                return;
            }
            self.advance();
        }
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    /// Parses statements until end of input, returning registered node IDs.
    pub fn parse_statements(&mut self) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        while !self.at_eof() {
            match self.parse_statement() {
                Some(id) => nodes.push(id),
                None => self.synchronize(),
            }
        }
        nodes
    }

    fn parse_statement(&mut self) -> Option<NodeId> {
        let results = if self.at(TirToken::ValueHandle) {
            self.parse_result_handles()?
        } else {
            Vec::new()
        };

        match self.current() {
            TirToken::Compreg => self.parse_comp_reg(results),
            TirToken::Firreg => self.parse_fir_reg(results),
            TirToken::Hlmem => self.parse_memory(results),
            TirToken::Read => self.parse_read(results),
            TirToken::Write => self.parse_write(results),
            _ => {
                self.expected("an operation mnemonic");
                None
            }
        }
    }

    /// Parses `%h0, %h1, ... =` and checks the handles are fresh and distinct.
    fn parse_result_handles(&mut self) -> Option<Vec<UnresolvedOperand>> {
        let mut handles = vec![self.parse_operand()?];
        while self.eat(TirToken::Comma) {
            handles.push(self.parse_operand()?);
        }
        if !self.expect(TirToken::Equals) {
            return None;
        }
        for (i, handle) in handles.iter().enumerate() {
            if self.scope.contains_key(&handle.text) {
                self.error_at(
                    handle.span,
                    format!("redefinition of value '%{}'", handle.text),
                );
                return None;
            }
            if handles[..i].iter().any(|prev| prev.text == handle.text) {
                self.error_at(
                    handle.span,
                    format!("result name '%{}' repeated", handle.text),
                );
                return None;
            }
        }
        Some(handles)
    }

    fn parse_operand(&mut self) -> Option<UnresolvedOperand> {
        if !self.at(TirToken::ValueHandle) {
            self.expected("a value operand");
            return None;
        }
        let span = self.current_span();
        let text = self.current_text()[1..].to_string();
        self.advance();
        Some(UnresolvedOperand { text, span })
    }

    /// Parses a possibly empty comma-separated operand list.
    fn parse_operand_list(&mut self) -> Option<Vec<UnresolvedOperand>> {
        let mut operands = Vec::new();
        if self.at(TirToken::ValueHandle) {
            operands.push(self.parse_operand()?);
            while self.eat(TirToken::Comma) {
                operands.push(self.parse_operand()?);
            }
        }
        Some(operands)
    }

    fn parse_symbol(&mut self) -> Option<Ident> {
        if !self.at(TirToken::SymbolName) {
            self.expected("a symbol name");
            return None;
        }
        let text = &self.current_text()[1..];
        let ident = self.interner.get_or_intern(text);
        self.advance();
        Some(ident)
    }

    // ========================================================================
    // Types and attributes
    // ========================================================================

    fn parse_type(&mut self) -> Option<TypeId> {
        let span = self.current_span();
        if !self.at(TirToken::Identifier) {
            self.expected("a type");
            return None;
        }
        let text = self.current_text().to_string();
        self.advance();

        match text.as_str() {
            "array" => {
                if !self.expect(TirToken::Less) {
                    return None;
                }
                let size_span = self.current_span();
                let size = self.parse_int_literal()?;
                if size == 0 {
                    self.error_at(size_span, "array size must be at least 1");
                    return None;
                }
                if !self.eat_x_separator() {
                    return None;
                }
                let element = self.parse_type()?;
                if !self.expect(TirToken::Greater) {
                    return None;
                }
                Some(self.block.types.array(element, size))
            }
            "readport" | "writeport" => {
                let is_read = text == "readport";
                if !self.expect(TirToken::Less) {
                    return None;
                }
                let inner_span = self.current_span();
                let memory = self.parse_type()?;
                if self.block.types.as_array(memory).is_none() {
                    self.error_at(inner_span, "expected array type in port type");
                    return None;
                }
                if !self.expect(TirToken::Greater) {
                    return None;
                }
                let ty = if is_read {
                    Type::ReadPort { memory }
                } else {
                    Type::WritePort { memory }
                };
                Some(self.block.types.intern(ty))
            }
            _ => {
                if let Some(width_text) = text.strip_prefix('i') {
                    if let Ok(width) = width_text.parse::<u32>() {
                        if width >= 1 {
                            return Some(self.block.types.uint(width));
                        }
                        self.error_at(span, "integer type must have a positive width");
                        return None;
                    }
                }
                self.error_at(span, format!("unknown type '{text}'"));
                None
            }
        }
    }

    fn eat_x_separator(&mut self) -> bool {
        if self.at(TirToken::Identifier) && self.current_text() == "x" {
            self.advance();
            true
        } else {
            self.expected("'x'");
            false
        }
    }

    fn parse_int_literal(&mut self) -> Option<u32> {
        if !self.at(TirToken::Integer) {
            self.expected("an integer");
            return None;
        }
        let span = self.current_span();
        let value = match self.current_text().parse::<u32>() {
            Ok(value) => value,
            Err(_) => {
                self.error_at(span, "integer literal too large");
                return None;
            }
        };
        self.advance();
        Some(value)
    }

    /// Parses an optional `{key = value, flag, ...}` attribute dictionary.
    fn parse_attr_dict(&mut self) -> Option<AttrMap> {
        let mut attrs = AttrMap::new();
        if !self.eat(TirToken::LBrace) {
            return Some(attrs);
        }
        if self.eat(TirToken::RBrace) {
            return Some(attrs);
        }
        loop {
            if !self.at(TirToken::Identifier) {
                self.expected("an attribute name");
                return None;
            }
            let key_span = self.current_span();
            let key = self.current_text().to_string();
            self.advance();

            let value = if self.eat(TirToken::Equals) {
                self.parse_attr_value()?
            } else {
                AttrValue::Unit
            };

            if !attrs.insert(key.clone(), value) {
                self.error_at(key_span, format!("duplicate attribute '{key}'"));
                return None;
            }

            if !self.eat(TirToken::Comma) {
                break;
            }
        }
        if !self.expect(TirToken::RBrace) {
            return None;
        }
        Some(attrs)
    }

    fn parse_attr_value(&mut self) -> Option<AttrValue> {
        match self.current() {
            TirToken::Integer | TirToken::Minus => {
                let negative = self.eat(TirToken::Minus);
                if !self.at(TirToken::Integer) {
                    self.expected("an integer");
                    return None;
                }
                let span = self.current_span();
                let magnitude = match self.current_text().parse::<i64>() {
                    Ok(value) => value,
                    Err(_) => {
                        self.error_at(span, "integer attribute out of range");
                        return None;
                    }
                };
                self.advance();
                Some(AttrValue::Int(if negative { -magnitude } else { magnitude }))
            }
            TirToken::StringLit => {
                let value = unescape_string(self.current_text());
                self.advance();
                Some(AttrValue::Str(value))
            }
            _ => {
                self.expected("an attribute value");
                None
            }
        }
    }

    /// Removes and returns the explicit `name` attribute, if any.
    fn take_name_attr(&mut self, attrs: &mut AttrMap, op_span: Span) -> Option<Option<String>> {
        match attrs.remove("name") {
            None => Some(None),
            Some(AttrValue::Str(name)) => Some(Some(name)),
            Some(_) => {
                self.error_at(op_span, "'name' attribute must be a string");
                None
            }
        }
    }

    // ========================================================================
    // Operand resolution
    // ========================================================================

    /// Resolves a handle against the SSA scope and its expected type.
    fn resolve_operand(&mut self, operand: &UnresolvedOperand, expected: TypeId) -> Option<ValueId> {
        let Some(&id) = self.scope.get(&operand.text) else {
            self.resolution_error(
                operand.span,
                format!("use of undefined value '%{}'", operand.text),
            );
            return None;
        };
        let actual = self.block.value_type(id);
        if actual != expected {
            self.resolution_error(
                operand.span,
                format!(
                    "operand '%{}' has type {}, expected {}",
                    operand.text,
                    format_type(&self.block.types, actual),
                    format_type(&self.block.types, expected)
                ),
            );
            return None;
        }
        Some(id)
    }

    fn resolve_operands(
        &mut self,
        operands: &[UnresolvedOperand],
        expected: &[TypeId],
    ) -> Option<Vec<ValueId>> {
        debug_assert_eq!(operands.len(), expected.len());
        operands
            .iter()
            .zip(expected)
            .map(|(op, &ty)| self.resolve_operand(op, ty))
            .collect()
    }

    fn check_result_count(
        &mut self,
        results: &[UnresolvedOperand],
        expected: usize,
        op_span: Span,
    ) -> bool {
        if results.len() == expected {
            return true;
        }
        let msg = match expected {
            0 => "operation produces no results".to_string(),
            1 => format!("expected a single result name, found {}", results.len()),
            n => format!("expected {n} result names, found {}", results.len()),
        };
        self.error_at(op_span, msg);
        false
    }

    fn bind_results(&mut self, handles: &[UnresolvedOperand], node: NodeId) {
        let results = self.block.node(node).results.clone();
        for (handle, value) in handles.iter().zip(results) {
            self.scope.insert(handle.text.clone(), value);
        }
    }

    // ========================================================================
    // Node kinds
    // ========================================================================

    /// `compreg [sym @s] %input, %clk[, %reset, %resetValue] [{attrs}] : type`
    ///
    /// Operand-count dispatch: 2 operands means no reset, 4 means reset and
    /// reset value; every other count gets a role-specific error.
    fn parse_comp_reg(&mut self, results: Vec<UnresolvedOperand>) -> Option<NodeId> {
        let op_span = self.current_span();
        self.advance();

        let sym = if self.eat(TirToken::Sym) {
            Some(self.parse_symbol()?)
        } else {
            None
        };

        let operands = self.parse_operand_list()?;
        match operands.len() {
            0 => {
                self.error_at(op_span, "expected operands");
                return None;
            }
            1 => {
                self.error_at(op_span, "expected clock operand");
                return None;
            }
            2 | 4 => {}
            3 => {
                self.error_at(op_span, "expected resetValue operand");
                return None;
            }
            _ => {
                self.error_at(op_span, "too many operands");
                return None;
            }
        }

        let mut attrs = self.parse_attr_dict()?;
        if !self.expect(TirToken::Colon) {
            return None;
        }
        let ty = self.parse_type()?;

        if !self.check_result_count(&results, 1, op_span) {
            return None;
        }
        let explicit = self.take_name_attr(&mut attrs, op_span)?;
        let name = infer_name(explicit, &results[0].text);

        let i1 = self.block.types.i1();
        let expected: Vec<TypeId> = if operands.len() == 2 {
            vec![ty, i1]
        } else {
            vec![ty, i1, i1, ty]
        };
        let resolved = self.resolve_operands(&operands, &expected)?;

        let reset = (resolved.len() == 4).then(|| ResetSpec {
            reset: resolved[2],
            value: resolved[3],
        });
        let span = op_span.merge(self.prev_span());
        let node = self
            .block
            .add_comp_reg(resolved[0], resolved[1], reset, sym, name, attrs, span);
        self.bind_results(&results, node);
        Some(node)
    }

    /// `firreg %next clock %clk [sym @s] [reset (sync|async) %r, %v] [{attrs}] : type`
    fn parse_fir_reg(&mut self, results: Vec<UnresolvedOperand>) -> Option<NodeId> {
        let op_span = self.current_span();
        self.advance();

        let next = self.parse_operand()?;
        if !self.expect(TirToken::Clock) {
            return None;
        }
        let clk = self.parse_operand()?;

        let inner_sym = if self.eat(TirToken::Sym) {
            Some(self.parse_symbol()?)
        } else {
            None
        };

        let mut is_async = false;
        let mut reset_pair = None;
        if self.eat(TirToken::Reset) {
            if self.eat(TirToken::Async) {
                is_async = true;
            } else if !self.eat(TirToken::Sync) {
                self.error_at(op_span, "invalid reset, expected 'sync' or 'async'");
                return None;
            }
            let reset = self.parse_operand()?;
            if !self.expect(TirToken::Comma) {
                return None;
            }
            let value = self.parse_operand()?;
            reset_pair = Some((reset, value));
        }

        let mut attrs = self.parse_attr_dict()?;
        // The async marker may also arrive as a unit attribute; the grammar
        // cannot pair it with a reset clause it doesn't have, so verification
        // owns that check.
        match attrs.remove("isAsync") {
            None => {}
            Some(AttrValue::Unit) => is_async = true,
            Some(_) => {
                self.error_at(op_span, "'isAsync' attribute must be a unit attribute");
                return None;
            }
        }

        if !self.expect(TirToken::Colon) {
            return None;
        }
        let ty = self.parse_type()?;

        if !self.check_result_count(&results, 1, op_span) {
            return None;
        }
        let explicit = self.take_name_attr(&mut attrs, op_span)?;
        let name = infer_name(explicit, &results[0].text);

        let i1 = self.block.types.i1();
        let mut operands = vec![next, clk];
        let mut expected = vec![ty, i1];
        if let Some((reset, value)) = reset_pair {
            operands.push(reset);
            operands.push(value);
            expected.push(i1);
            expected.push(ty);
        }
        let has_reset = operands.len() == 4;
        let resolved = self.resolve_operands(&operands, &expected)?;

        let reset = has_reset.then(|| ResetSpec {
            reset: resolved[2],
            value: resolved[3],
        });
        let span = op_span.merge(self.prev_span());
        let node = self.block.add_fir_reg(
            resolved[0],
            resolved[1],
            reset,
            is_async,
            inner_sym,
            name,
            attrs,
            span,
        );
        self.bind_results(&results, node);
        Some(node)
    }

    /// `hlmem @sym %clk [{attrs}] : array<N x T>`
    ///
    /// The result list is driven by the `NReadPorts`/`NWritePorts` integer
    /// attributes: that many read capabilities followed by that many write
    /// capabilities. At least one of the two keys must be present.
    fn parse_memory(&mut self, results: Vec<UnresolvedOperand>) -> Option<NodeId> {
        let op_span = self.current_span();
        self.advance();

        if !self.at(TirToken::SymbolName) {
            self.error_at(op_span, "expected memory name");
            return None;
        }
        let sym = self.parse_symbol()?;

        if !self.at(TirToken::ValueHandle) {
            self.error_at(op_span, "expected clock operand");
            return None;
        }
        let clk = self.parse_operand()?;

        let mut attrs = self.parse_attr_dict()?;
        if !self.expect(TirToken::Colon) {
            return None;
        }
        let ty_span = self.current_span();
        let ty = self.parse_type()?;
        if self.block.types.as_array(ty).is_none() {
            self.error_at(ty_span, "expected array type");
            return None;
        }

        let read_ports = self.take_port_count(&mut attrs, "NReadPorts", op_span)?;
        let write_ports = self.take_port_count(&mut attrs, "NWritePorts", op_span)?;
        if read_ports.is_none() && write_ports.is_none() {
            self.error_at(
                op_span,
                "missing 'NReadPorts' and 'NWritePorts' in attribute dict",
            );
            return None;
        }
        let read_ports = read_ports.unwrap_or(0);
        let write_ports = write_ports.unwrap_or(0);

        let i1 = self.block.types.i1();
        let clk = self.resolve_operand(&clk, i1)?;

        if !self.check_result_count(&results, (read_ports + write_ports) as usize, op_span) {
            return None;
        }

        let span = op_span.merge(self.prev_span());
        let node = self
            .block
            .add_memory(sym, clk, read_ports, write_ports, ty, attrs, span);
        self.bind_results(&results, node);
        Some(node)
    }

    fn take_port_count(
        &mut self,
        attrs: &mut AttrMap,
        key: &str,
        op_span: Span,
    ) -> Option<Option<u32>> {
        match attrs.remove(key) {
            None => Some(None),
            Some(AttrValue::Int(value)) => {
                if value < 0 {
                    self.error_at(op_span, format!("'{key}' must be non-negative"));
                    return None;
                }
                match u32::try_from(value) {
                    Ok(count) => Some(Some(count)),
                    Err(_) => {
                        self.error_at(op_span, format!("'{key}' is too large"));
                        None
                    }
                }
            }
            Some(_) => {
                self.error_at(op_span, format!("'{key}' must be an integer attribute"));
                None
            }
        }
    }

    /// `read %port[%addr] : readport<array<N x T>>`
    ///
    /// The address operand's type is never written; it is derived from the
    /// port type's array size. The result takes the element type.
    fn parse_read(&mut self, results: Vec<UnresolvedOperand>) -> Option<NodeId> {
        let op_span = self.current_span();
        self.advance();

        let port = self.parse_operand()?;
        if !self.expect(TirToken::LBracket) {
            return None;
        }
        let address = self.parse_operand()?;
        if !self.expect(TirToken::RBracket) {
            return None;
        }
        if !self.expect(TirToken::Colon) {
            return None;
        }
        let ty_span = self.current_span();
        let ty = self.parse_type()?;

        let memory = match self.block.types.get(ty) {
            Type::ReadPort { memory } => Some(*memory),
            _ => None,
        };
        let Some((_, size)) = memory.and_then(|m| self.block.types.as_array(m)) else {
            self.error_at(ty_span, "expected read-port type");
            return None;
        };

        let addr_ty = self.block.types.uint(address_width(size));
        let resolved = self.resolve_operands(&[port, address], &[ty, addr_ty])?;

        if !self.check_result_count(&results, 1, op_span) {
            return None;
        }

        let span = op_span.merge(self.prev_span());
        let node = self.block.add_read_port(resolved[0], resolved[1], span);
        self.bind_results(&results, node);
        Some(node)
    }

    /// `write %port[%addr] %data : writeport<array<N x T>>`
    ///
    /// Address and data operand types are both derived from the port type.
    /// Produces no results.
    fn parse_write(&mut self, results: Vec<UnresolvedOperand>) -> Option<NodeId> {
        let op_span = self.current_span();
        self.advance();

        let port = self.parse_operand()?;
        if !self.expect(TirToken::LBracket) {
            return None;
        }
        let address = self.parse_operand()?;
        if !self.expect(TirToken::RBracket) {
            return None;
        }
        let data = self.parse_operand()?;
        if !self.expect(TirToken::Colon) {
            return None;
        }
        let ty_span = self.current_span();
        let ty = self.parse_type()?;

        let memory = match self.block.types.get(ty) {
            Type::WritePort { memory } => Some(*memory),
            _ => None,
        };
        let Some((element, size)) = memory.and_then(|m| self.block.types.as_array(m)) else {
            self.error_at(ty_span, "expected write-port type");
            return None;
        };

        let addr_ty = self.block.types.uint(address_width(size));
        let resolved = self.resolve_operands(&[port, address, data], &[ty, addr_ty, element])?;

        if !self.check_result_count(&results, 0, op_span) {
            return None;
        }

        let span = op_span.merge(self.prev_span());
        let node = self
            .block
            .add_write_port(resolved[0], resolved[1], resolved[2], span);
        Some(node)
    }
}

/// Strips the quotes from a lexed string literal and processes escapes.
fn unescape_string(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_diagnostics::Diagnostic;
    use tempo_ir::NodeKind;

    /// Parses `source` into a block seeded with `%clk: i1`, `%in: i8`,
    /// `%rst: i1`, `%rv: i8`, and `%addr3: i3`.
    fn parse(source: &str) -> (Block, Vec<NodeId>, Vec<Diagnostic>) {
        let mut block = Block::new();
        let i1 = block.types.i1();
        let i8 = block.types.uint(8);
        let i3 = block.types.uint(3);
        block.add_argument("clk", i1);
        block.add_argument("in", i8);
        block.add_argument("rst", i1);
        block.add_argument("rv", i8);
        block.add_argument("addr3", i3);
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let ids = parse_fragment(&mut block, source, FileId::from_raw(0), &interner, &sink);
        (block, ids, sink.take_all())
    }

    fn parse_ok(source: &str) -> (Block, Vec<NodeId>) {
        let (block, ids, errors) = parse(source);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
        (block, ids)
    }

    fn parse_err(source: &str) -> Vec<Diagnostic> {
        let (_, _, errors) = parse(source);
        assert!(!errors.is_empty(), "expected errors for {source:?}");
        errors
    }

    #[test]
    fn comp_reg_without_reset() {
        let (block, ids) = parse_ok("%q = compreg %in, %clk : i8");
        assert_eq!(ids.len(), 1);
        let node = block.node(ids[0]);
        let NodeKind::CompReg(reg) = &node.kind else {
            panic!("expected compreg");
        };
        assert!(reg.reset.is_none());
        assert_eq!(reg.name, "q");
        assert_eq!(node.operands().len(), 2);
    }

    #[test]
    fn comp_reg_with_reset() {
        let (block, ids) = parse_ok("%q = compreg %in, %clk, %rst, %rv : i8");
        let NodeKind::CompReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected compreg");
        };
        assert!(reg.reset.is_some());
    }

    #[test]
    fn comp_reg_with_sym() {
        let (block, ids) = parse_ok("%q = compreg sym @q_reg %in, %clk : i8");
        let NodeKind::CompReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected compreg");
        };
        assert!(reg.sym.is_some());
    }

    #[test]
    fn comp_reg_numeric_handle_infers_empty_name() {
        let (block, ids) = parse_ok("%7 = compreg %in, %clk : i8");
        let NodeKind::CompReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected compreg");
        };
        assert_eq!(reg.name, "");
    }

    #[test]
    fn comp_reg_explicit_name_wins() {
        let (block, ids) = parse_ok("%bar2 = compreg %in, %clk {name = \"bar\"} : i8");
        let NodeKind::CompReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected compreg");
        };
        assert_eq!(reg.name, "bar");
        // The name attribute is lifted out of the pass-through map.
        assert!(reg.attrs.is_empty());
    }

    #[test]
    fn comp_reg_arity_errors_are_role_specific() {
        let cases = [
            ("%q = compreg : i8", "expected operands"),
            ("%q = compreg %in : i8", "expected clock operand"),
            (
                "%q = compreg %in, %clk, %rst : i8",
                "expected resetValue operand",
            ),
            (
                "%q = compreg %in, %clk, %rst, %rv, %in : i8",
                "too many operands",
            ),
        ];
        for (source, expected_msg) in cases {
            let errors = parse_err(source);
            assert_eq!(
                errors[0].message, expected_msg,
                "wrong message for {source:?}"
            );
        }
    }

    #[test]
    fn comp_reg_failed_statement_registers_nothing() {
        let (block, ids, errors) = parse("%q = compreg %in : i8");
        assert!(!errors.is_empty());
        assert!(ids.is_empty());
        assert_eq!(block.nodes.len(), 0);
        // No use count was bumped for the operand of the failed statement.
        assert_eq!(block.use_count(block.args[1]), 0);
    }

    #[test]
    fn comp_reg_type_mismatch_is_resolution_error() {
        let errors = parse_err("%q = compreg %in, %in : i8");
        assert!(errors[0].message.contains("'%in' has type i8, expected i1"));
        assert_eq!(format!("{}", errors[0].code), "E102");
    }

    #[test]
    fn undefined_operand_reported() {
        let errors = parse_err("%q = compreg %nope, %clk : i8");
        assert!(errors[0].message.contains("use of undefined value '%nope'"));
    }

    #[test]
    fn redefinition_rejected() {
        let errors = parse_err("%in = compreg %in, %clk : i8");
        assert!(errors[0].message.contains("redefinition of value '%in'"));
    }

    #[test]
    fn fir_reg_no_reset() {
        let (block, ids) = parse_ok("%q = firreg %in clock %clk : i8");
        let NodeKind::FirReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected firreg");
        };
        assert!(reg.reset.is_none());
        assert!(!reg.is_async);
        assert_eq!(reg.name, "q");
    }

    #[test]
    fn fir_reg_sync_reset() {
        let (block, ids) = parse_ok("%q = firreg %in clock %clk reset sync %rst, %rv : i8");
        let NodeKind::FirReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected firreg");
        };
        assert!(reg.reset.is_some());
        assert!(!reg.is_async);
    }

    #[test]
    fn fir_reg_async_reset() {
        let (block, ids) =
            parse_ok("%q = firreg %in clock %clk sym @q reset async %rst, %rv : i8");
        let NodeKind::FirReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected firreg");
        };
        assert!(reg.reset.is_some());
        assert!(reg.is_async);
        assert!(reg.inner_sym.is_some());
    }

    #[test]
    fn fir_reg_reset_requires_flavor_keyword() {
        let errors = parse_err("%q = firreg %in clock %clk reset %rst, %rv : i8");
        assert_eq!(errors[0].message, "invalid reset, expected 'sync' or 'async'");
    }

    #[test]
    fn fir_reg_missing_clock_keyword() {
        let errors = parse_err("%q = firreg %in %clk : i8");
        assert!(errors[0].message.contains("expected Clock"));
    }

    #[test]
    fn fir_reg_async_attr_sets_marker() {
        let (block, ids) = parse_ok("%q = firreg %in clock %clk {isAsync} : i8");
        let NodeKind::FirReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected firreg");
        };
        assert!(reg.is_async);
        assert!(reg.reset.is_none());
        assert!(reg.attrs.is_empty());
    }

    #[test]
    fn memory_fan_out() {
        let (block, ids) = parse_ok(
            "%r0, %r1, %w0 = hlmem @ram0 %clk {NReadPorts = 2, NWritePorts = 1} : array<8 x i32>",
        );
        let node = block.node(ids[0]);
        let NodeKind::Memory(mem) = &node.kind else {
            panic!("expected memory");
        };
        assert_eq!(mem.read_ports, 2);
        assert_eq!(mem.write_ports, 1);
        assert_eq!(node.results.len(), 3);
        assert!(matches!(
            block.types.get(block.value_type(node.results[0])),
            Type::ReadPort { .. }
        ));
        assert!(matches!(
            block.types.get(block.value_type(node.results[1])),
            Type::ReadPort { .. }
        ));
        assert!(matches!(
            block.types.get(block.value_type(node.results[2])),
            Type::WritePort { .. }
        ));
        assert_eq!(
            block.types.port_address_width(block.value_type(node.results[0])),
            Some(3)
        );
    }

    #[test]
    fn memory_single_count_defaults_other_to_zero() {
        let (block, ids) = parse_ok("%w0 = hlmem @m %clk {NWritePorts = 1} : array<4 x i8>");
        let NodeKind::Memory(mem) = &block.node(ids[0]).kind else {
            panic!("expected memory");
        };
        assert_eq!(mem.read_ports, 0);
        assert_eq!(mem.write_ports, 1);
    }

    #[test]
    fn memory_missing_both_counts() {
        let errors = parse_err("%r = hlmem @m %clk {depth = 4} : array<4 x i8>");
        assert_eq!(
            errors[0].message,
            "missing 'NReadPorts' and 'NWritePorts' in attribute dict"
        );
    }

    #[test]
    fn memory_negative_count_rejected() {
        let errors = parse_err("hlmem @m %clk {NReadPorts = -1} : array<4 x i8>");
        assert!(errors[0].message.contains("'NReadPorts' must be non-negative"));
    }

    #[test]
    fn memory_missing_name() {
        let errors = parse_err("%r = hlmem %clk {NReadPorts = 1} : array<4 x i8>");
        assert_eq!(errors[0].message, "expected memory name");
    }

    #[test]
    fn memory_missing_clock() {
        let errors = parse_err("%r = hlmem @m {NReadPorts = 1} : array<4 x i8>");
        assert_eq!(errors[0].message, "expected clock operand");
    }

    #[test]
    fn memory_requires_array_type() {
        let errors = parse_err("%r = hlmem @m %clk {NReadPorts = 1} : i8");
        assert_eq!(errors[0].message, "expected array type");
    }

    #[test]
    fn memory_wrong_result_count() {
        let errors =
            parse_err("%r0 = hlmem @m %clk {NReadPorts = 2, NWritePorts = 1} : array<4 x i8>");
        assert!(errors[0].message.contains("expected 3 result names, found 1"));
    }

    #[test]
    fn memory_extra_attrs_pass_through() {
        let (block, ids) =
            parse_ok("%r = hlmem @m %clk {NReadPorts = 1, init = \"zeros\"} : array<4 x i8>");
        let NodeKind::Memory(mem) = &block.node(ids[0]).kind else {
            panic!("expected memory");
        };
        assert_eq!(mem.attrs.get("init"), Some(&AttrValue::Str("zeros".into())));
        assert!(!mem.attrs.contains("NReadPorts"));
    }

    #[test]
    fn read_accessor_derives_address_and_element() {
        let (block, ids) = parse_ok(
            "%r0 = hlmem @m %clk {NReadPorts = 1} : array<8 x i8>\n\
             %data = read %r0[%addr3] : readport<array<8 x i8>>",
        );
        assert_eq!(ids.len(), 2);
        let read = block.node(ids[1]);
        assert!(matches!(read.kind, NodeKind::ReadPort { .. }));
        let i8 = tempo_ir::Type::UInt { width: 8 };
        assert_eq!(*block.types.get(block.value_type(read.results[0])), i8);
    }

    #[test]
    fn read_accessor_address_width_checked() {
        // array<4 x i8> wants a 2-bit address; %addr3 is 3 bits wide.
        let errors = parse_err(
            "%r0 = hlmem @m %clk {NReadPorts = 1} : array<4 x i8>\n\
             %data = read %r0[%addr3] : readport<array<4 x i8>>",
        );
        assert!(errors[0].message.contains("has type i3, expected i2"));
    }

    #[test]
    fn read_requires_read_port_type() {
        let errors = parse_err("%data = read %in[%addr3] : writeport<array<8 x i8>>");
        assert_eq!(errors[0].message, "expected read-port type");
    }

    #[test]
    fn write_accessor_resolves_data_type() {
        let (block, ids) = parse_ok(
            "%w0 = hlmem @m %clk {NWritePorts = 1} : array<8 x i8>\n\
             write %w0[%addr3] %in : writeport<array<8 x i8>>",
        );
        let write = block.node(ids[1]);
        assert!(matches!(write.kind, NodeKind::WritePort { .. }));
        assert!(write.results.is_empty());
    }

    #[test]
    fn write_with_result_handle_rejected() {
        let errors = parse_err(
            "%w0 = hlmem @m %clk {NWritePorts = 1} : array<8 x i8>\n\
             %x = write %w0[%addr3] %in : writeport<array<8 x i8>>",
        );
        assert!(errors[0].message.contains("operation produces no results"));
    }

    #[test]
    fn write_data_type_mismatch() {
        let errors = parse_err(
            "%w0 = hlmem @m %clk {NWritePorts = 1} : array<8 x i16>\n\
             write %w0[%addr3] %in : writeport<array<8 x i16>>",
        );
        assert!(errors[0].message.contains("'%in' has type i8, expected i16"));
    }

    #[test]
    fn duplicate_attr_key_rejected() {
        let errors = parse_err("%q = compreg %in, %clk {a = 1, a = 2} : i8");
        assert!(errors[0].message.contains("duplicate attribute 'a'"));
    }

    #[test]
    fn recovery_continues_after_bad_statement() {
        let (block, ids, errors) = parse(
            "%q = compreg %in : i8\n\
             %p = compreg %in, %clk : i8",
        );
        assert!(!errors.is_empty());
        assert_eq!(ids.len(), 1);
        let NodeKind::CompReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected compreg");
        };
        assert_eq!(reg.name, "p");
    }

    #[test]
    fn negative_attr_value_parsed() {
        let (block, ids) = parse_ok("%q = compreg %in, %clk {offset = -3} : i8");
        let NodeKind::CompReg(reg) = &block.node(ids[0]).kind else {
            panic!("expected compreg");
        };
        assert_eq!(reg.attrs.get("offset"), Some(&AttrValue::Int(-3)));
    }

    #[test]
    fn unknown_type_reported() {
        let errors = parse_err("%q = compreg %in, %clk : float");
        assert!(errors[0].message.contains("unknown type 'float'"));
    }
}
