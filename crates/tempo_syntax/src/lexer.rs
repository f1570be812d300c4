//! Lexical analyzer for state-element statement text.
//!
//! Converts source text into a sequence of [`Token`]s, handling value handles
//! (`%q`), global symbols (`@ram0`), keywords, decimal integers, string
//! literals with C-style escapes, and `//` line comments. Errors are reported
//! to the [`DiagnosticSink`] and produce [`TirToken::Error`] tokens.

use crate::token::{lookup_keyword, Token, TirToken};
use tempo_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tempo_source::{FileId, Span};

/// Lexes the given source text into a vector of tokens.
///
/// Whitespace and comments are skipped. The returned vector always ends with
/// a [`TirToken::Eof`] token. Lexer errors are reported via the diagnostic
/// sink and produce [`TirToken::Error`] tokens in the output.
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: TirToken::Eof,
                    span: Span::new(self.file, self.pos as u32, self.pos as u32),
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        if self.pos < self.source.len() {
            self.source[self.pos]
        } else {
            0
        }
    }

    fn peek_at(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.source.len() {
            self.source[idx]
        } else {
            0
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Error, 100),
            msg,
            span,
        ));
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            // Line comment: //
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                self.pos += 2;
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        // Value handle: %name or %0
        if b == b'%' {
            return self.lex_value_handle(start);
        }

        // Global symbol: @name
        if b == b'@' {
            return self.lex_symbol_name(start);
        }

        // Identifiers and keywords
        if is_ident_start(b) {
            return self.lex_identifier_or_keyword(start);
        }

        // Decimal integer
        if b.is_ascii_digit() {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            return Token {
                kind: TirToken::Integer,
                span: self.span_from(start),
            };
        }

        // String literal
        if b == b'"' {
            return self.lex_string(start);
        }

        self.lex_punct(start)
    }

    fn lex_value_handle(&mut self, start: usize) -> Token {
        self.pos += 1; // skip %
        while self.pos < self.source.len() && is_handle_char(self.source[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start + 1 {
            self.error("expected a name after '%'", self.span_from(start));
            return Token {
                kind: TirToken::Error,
                span: self.span_from(start),
            };
        }
        Token {
            kind: TirToken::ValueHandle,
            span: self.span_from(start),
        }
    }

    fn lex_symbol_name(&mut self, start: usize) -> Token {
        self.pos += 1; // skip @
        if self.pos < self.source.len() && is_ident_start(self.source[self.pos]) {
            while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
                self.pos += 1;
            }
            Token {
                kind: TirToken::SymbolName,
                span: self.span_from(start),
            }
        } else {
            self.error("expected a name after '@'", self.span_from(start));
            Token {
                kind: TirToken::Error,
                span: self.span_from(start),
            }
        }
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
            self.pos += 1;
        }

        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        let kind = lookup_keyword(text).unwrap_or(TirToken::Identifier);

        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn lex_string(&mut self, start: usize) -> Token {
        self.pos += 1; // skip opening quote
        loop {
            if self.pos >= self.source.len() || self.source[self.pos] == b'\n' {
                self.error("unterminated string literal", self.span_from(start));
                return Token {
                    kind: TirToken::Error,
                    span: self.span_from(start),
                };
            }
            match self.source[self.pos] {
                b'"' => {
                    self.pos += 1;
                    return Token {
                        kind: TirToken::StringLit,
                        span: self.span_from(start),
                    };
                }
                b'\\' => {
                    // Escape consumes the next byte as well
                    self.pos += 2;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn lex_punct(&mut self, start: usize) -> Token {
        let b = self.source[self.pos];
        self.pos += 1;
        let kind = match b {
            b'[' => TirToken::LBracket,
            b']' => TirToken::RBracket,
            b'{' => TirToken::LBrace,
            b'}' => TirToken::RBrace,
            b'<' => TirToken::Less,
            b'>' => TirToken::Greater,
            b':' => TirToken::Colon,
            b',' => TirToken::Comma,
            b'=' => TirToken::Equals,
            b'-' => TirToken::Minus,
            _ => {
                self.error(
                    &format!("unexpected character '{}'", b as char),
                    self.span_from(start),
                );
                TirToken::Error
            }
        };
        Token {
            kind,
            span: self.span_from(start),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Value handles may be purely numeric (`%0`) in addition to named (`%state`).
fn is_handle_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
