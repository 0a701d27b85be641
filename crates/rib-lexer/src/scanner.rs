//! Octet-stream scanner: the single-pass character scanner described in
//! spec §4.2, generalized to also decode the binary encoding of §4.2/§6.2.

use crate::token::{Comment, Spanned, Token};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use std::collections::HashMap;

pub struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    source_name: String,
    encoded_requests: HashMap<u32, String>,
    encoded_strings: HashMap<u32, String>,
    pending_comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    pub fn new(bytes: &'a [u8], source_name: impl Into<String>) -> Self {
        Self {
            bytes,
            pos: 0,
            line: 1,
            source_name: source_name.into(),
            encoded_requests: HashMap::new(),
            encoded_strings: HashMap::new(),
            pending_comments: Vec::new(),
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Drain comments queued since the last call (spec §4.2 "deferred").
    pub fn take_pending_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.pending_comments)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return None;
        }
        let s = &self.bytes[self.pos..self.pos + n];
        for &b in s {
            if b == b'\n' {
                self.line += 1;
            }
        }
        self.pos += n;
        Some(s)
    }

    fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\r' | b'\n')
    }

    fn is_plausible_token_start(b: u8) -> bool {
        b == b'#'
            || b == b'"'
            || b == b'['
            || b == b']'
            || b == b'-'
            || b == b'+'
            || b == b'.'
            || b.is_ascii_digit()
            || b.is_ascii_alphabetic()
            || b >= 0x80
    }

    /// Skip forward one byte at a time until a plausible token boundary is
    /// found, per `SPEC_FULL.md`'s binary-resync supplement. Returns the
    /// number of bytes skipped (for the diagnostic message).
    fn resync(&mut self) -> usize {
        let start = self.pos;
        // Always consume at least the offending byte.
        self.bump();
        while let Some(b) = self.peek() {
            if Self::is_plausible_token_start(b) {
                break;
            }
            self.bump();
        }
        self.pos - start
    }

    /// Produce the next logical token, transparently consuming comments
    /// (queued) and binary define-opcodes (consumed, no token emitted).
    /// Returns `None` at end of input.
    pub fn next_token(&mut self, reporter: &mut dyn ErrorReporter) -> Option<Spanned<Token>> {
        loop {
            while let Some(b) = self.peek() {
                if Self::is_whitespace(b) {
                    self.bump();
                } else {
                    break;
                }
            }
            let b = self.peek()?;
            let line = self.line;

            if b == b'#' {
                self.read_comment();
                continue;
            }
            if b == b'"' {
                return Some(Spanned::new(self.read_ascii_string(reporter), line));
            }
            if b == b'[' {
                self.bump();
                return Some(Spanned::new(Token::ArrayOpen, line));
            }
            if b == b']' {
                self.bump();
                return Some(Spanned::new(Token::ArrayClose, line));
            }
            if b.is_ascii_alphabetic() {
                return Some(Spanned::new(self.read_identifier(), line));
            }
            if b.is_ascii_digit() || b == b'-' || b == b'+' || b == b'.' {
                match self.read_number() {
                    Some(tok) => return Some(Spanned::new(tok, line)),
                    None => {
                        let skipped = self.resync();
                        reporter.report(Diagnostic::new(
                            ErrorCode::BadToken,
                            Severity::Error,
                            line,
                            &self.source_name,
                            format!("malformed number literal, resynced over {skipped} byte(s)"),
                        ));
                        continue;
                    }
                }
            }
            if b >= 0x80 {
                match self.read_binary(reporter, line) {
                    BinaryOutcome::Token(tok) => return Some(Spanned::new(tok, line)),
                    BinaryOutcome::Defined => continue,
                    BinaryOutcome::Unknown => {
                        let skipped = self.resync();
                        reporter.report(Diagnostic::new(
                            ErrorCode::ProtocolBotch,
                            Severity::Error,
                            line,
                            &self.source_name,
                            format!("unknown encoded-binary opcode 0{b:o}, resynced over {skipped} byte(s)"),
                        ));
                        continue;
                    }
                }
            }

            let skipped = self.resync();
            reporter.report(Diagnostic::new(
                ErrorCode::BadToken,
                Severity::Error,
                line,
                &self.source_name,
                format!("unexpected byte 0x{b:02x}, resynced over {skipped} byte(s)"),
            ));
        }
    }

    fn read_comment(&mut self) {
        let line = self.line;
        self.bump(); // first '#'
        let structured = self.peek() == Some(b'#');
        if structured {
            self.bump();
        }
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.bump();
        }
        let text = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
        self.pending_comments.push(Comment {
            text,
            structured,
            line,
        });
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphabetic() {
                self.bump();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .unwrap_or("")
            .to_string();
        Token::Identifier(text)
    }

    fn read_number(&mut self) -> Option<Token> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            self.bump();
        }
        let mut saw_digit = false;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.bump();
            saw_digit = true;
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') {
            is_float = true;
            self.bump();
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.bump();
                saw_digit = true;
            }
        }
        if !saw_digit {
            self.pos = start;
            return None;
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let mark = self.pos;
            self.bump();
            if matches!(self.peek(), Some(b'-') | Some(b'+')) {
                self.bump();
            }
            let mut saw_exp_digit = false;
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.bump();
                saw_exp_digit = true;
            }
            if saw_exp_digit {
                is_float = true;
            } else {
                self.pos = mark;
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        if is_float {
            text.parse::<f32>().ok().map(Token::Float)
        } else {
            text.parse::<i32>().ok().map(Token::Int)
        }
    }

    fn read_ascii_string(&mut self, reporter: &mut dyn ErrorReporter) -> Token {
        let line = self.line;
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    reporter.report(Diagnostic::new(
                        ErrorCode::EofInString,
                        Severity::Error,
                        line,
                        &self.source_name,
                        "end of input inside quoted string",
                    ));
                    break;
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    if let Some(c) = self.read_escape() {
                        out.push(c);
                    }
                }
                Some(b) => out.push(b as char),
            }
        }
        Token::Str(out)
    }

    fn read_escape(&mut self) -> Option<char> {
        match self.bump()? {
            b'n' => Some('\n'),
            b'r' => Some('\r'),
            b't' => Some('\t'),
            b'b' => Some('\u{8}'),
            b'f' => Some('\u{c}'),
            b'\\' => Some('\\'),
            b'"' => Some('"'),
            d @ b'0'..=b'7' => {
                let mut value = (d - b'0') as u32;
                for _ in 0..2 {
                    match self.peek() {
                        Some(o @ b'0'..=b'7') => {
                            value = value * 8 + (o - b'0') as u32;
                            self.bump();
                        }
                        _ => break,
                    }
                }
                char::from_u32(value)
            }
            other => Some(other as char),
        }
    }

    fn read_binary(&mut self, reporter: &mut dyn ErrorReporter, line: u32) -> BinaryOutcome {
        let b = self.bump().expect("caller checked peek");
        match b {
            0o200..=0o217 => {
                let off = (b - 0o200) as u32;
                let d = off / 4;
                let w = (off % 4) as usize;
                match self.take(w + 1) {
                    Some(bytes) => {
                        let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
                        for &byte in bytes {
                            value = (value << 8) | byte as i64;
                        }
                        let scale = (1u64 << (8 * d)) as f64;
                        BinaryOutcome::Token(Token::Float((value as f64 / scale) as f32))
                    }
                    None => BinaryOutcome::Unknown,
                }
            }
            0o220..=0o237 => {
                let len = (b & 0x0F) as usize;
                match self.take(len) {
                    Some(bytes) => BinaryOutcome::Token(Token::Str(lossy_string(bytes))),
                    None => BinaryOutcome::Unknown,
                }
            }
            0o240..=0o243 => {
                let len_bytes = (b - 0o240 + 1) as usize;
                match self.read_be_len(len_bytes) {
                    Some(n) => match self.take(n) {
                        Some(bytes) => BinaryOutcome::Token(Token::Str(lossy_string(bytes))),
                        None => BinaryOutcome::Unknown,
                    },
                    None => BinaryOutcome::Unknown,
                }
            }
            0o244 => match self.take(4) {
                Some(bytes) => {
                    let arr: [u8; 4] = bytes.try_into().unwrap();
                    BinaryOutcome::Token(Token::Float(f32::from_be_bytes(arr)))
                }
                None => BinaryOutcome::Unknown,
            },
            0o245 => match self.take(8) {
                Some(bytes) => {
                    let arr: [u8; 8] = bytes.try_into().unwrap();
                    BinaryOutcome::Token(Token::Float(f64::from_be_bytes(arr) as f32))
                }
                None => BinaryOutcome::Unknown,
            },
            0o246 => match self.bump() {
                Some(idx) => match self.encoded_requests.get(&(idx as u32)) {
                    Some(name) => BinaryOutcome::Token(Token::Identifier(name.clone())),
                    None => {
                        reporter.report(Diagnostic::new(
                            ErrorCode::ProtocolBotch,
                            Severity::Error,
                            line,
                            &self.source_name,
                            format!("encoded request index {idx} was never defined"),
                        ));
                        BinaryOutcome::Defined
                    }
                },
                None => BinaryOutcome::Unknown,
            },
            0o310..=0o313 => {
                let len_bytes = (b - 0o310 + 1) as usize;
                match self.read_be_len(len_bytes) {
                    Some(n) => match self.take(n * 4) {
                        Some(bytes) => {
                            let floats = bytes
                                .chunks_exact(4)
                                .map(|c| f32::from_be_bytes(c.try_into().unwrap()))
                                .collect();
                            BinaryOutcome::Token(Token::FloatArray(floats))
                        }
                        None => BinaryOutcome::Unknown,
                    },
                    None => BinaryOutcome::Unknown,
                }
            }
            0o314 => match self.bump() {
                Some(idx) => match self.next_token(reporter) {
                    Some(Spanned {
                        value: Token::Str(name),
                        ..
                    }) => {
                        self.encoded_requests.insert(idx as u32, name);
                        BinaryOutcome::Defined
                    }
                    _ => {
                        reporter.report(Diagnostic::new(
                            ErrorCode::ProtocolBotch,
                            Severity::Error,
                            line,
                            &self.source_name,
                            "define-encoded-request must be followed by a string token",
                        ));
                        BinaryOutcome::Defined
                    }
                },
                None => BinaryOutcome::Unknown,
            },
            0o315..=0o316 => {
                let idx_bytes = (b - 0o314) as usize;
                match self.read_be_len(idx_bytes) {
                    Some(idx) => match self.next_token(reporter) {
                        Some(Spanned {
                            value: Token::Str(name),
                            ..
                        }) => {
                            self.encoded_strings.insert(idx as u32, name);
                            BinaryOutcome::Defined
                        }
                        _ => {
                            reporter.report(Diagnostic::new(
                                ErrorCode::ProtocolBotch,
                                Severity::Error,
                                line,
                                &self.source_name,
                                "define-encoded-string must be followed by a string token",
                            ));
                            BinaryOutcome::Defined
                        }
                    },
                    None => BinaryOutcome::Unknown,
                }
            }
            0o317..=0o320 => {
                let idx_bytes = (b - 0o316) as usize;
                match self.read_be_len(idx_bytes) {
                    Some(idx) => match self.encoded_strings.get(&(idx as u32)) {
                        Some(s) => BinaryOutcome::Token(Token::Str(s.clone())),
                        None => {
                            reporter.report(Diagnostic::new(
                                ErrorCode::ProtocolBotch,
                                Severity::Error,
                                line,
                                &self.source_name,
                                format!("encoded string index {idx} was never defined"),
                            ));
                            BinaryOutcome::Defined
                        }
                    },
                    None => BinaryOutcome::Unknown,
                }
            }
            _ => BinaryOutcome::Unknown,
        }
    }

    fn read_be_len(&mut self, n: usize) -> Option<usize> {
        let bytes = self.take(n)?;
        let mut value: usize = 0;
        for &b in bytes {
            value = (value << 8) | b as usize;
        }
        Some(value)
    }
}

enum BinaryOutcome {
    Token(Token),
    /// A define opcode consumed bytes but has no token of its own.
    Defined,
    Unknown,
}

fn lossy_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rib_errors::CollectingReporter;

    fn tokens(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(src.as_bytes(), "test.rib");
        let mut r = CollectingReporter::default();
        let mut out = Vec::new();
        while let Some(t) = lexer.next_token(&mut r) {
            out.push(t.value);
        }
        assert!(r.diagnostics.is_empty(), "unexpected diagnostics: {:?}", r.diagnostics);
        out
    }

    #[test]
    fn scans_format_request() {
        let toks = tokens("Format 640 480 1");
        assert_eq!(
            toks,
            vec![
                Token::Identifier("Format".into()),
                Token::Int(640),
                Token::Int(480),
                Token::Int(1),
            ]
        );
    }

    #[test]
    fn scans_float_array() {
        let toks = tokens("Color [0.25 0.5 0.75]");
        assert_eq!(
            toks,
            vec![
                Token::Identifier("Color".into()),
                Token::ArrayOpen,
                Token::Float(0.25),
                Token::Float(0.5),
                Token::Float(0.75),
                Token::ArrayClose,
            ]
        );
    }

    #[test]
    fn scans_quoted_string_with_escapes() {
        let toks = tokens(r#""line\n\"quoted\"\101""#);
        assert_eq!(toks, vec![Token::Str("line\n\"quoted\"A".into())]);
    }

    #[test]
    fn line_comment_is_queued_not_emitted() {
        let mut lexer = Lexer::new(b"Sphere 1 # a comment\n-1 1 360", "t.rib");
        let mut r = CollectingReporter::default();
        let mut toks = Vec::new();
        while let Some(t) = lexer.next_token(&mut r) {
            toks.push(t.value);
        }
        assert_eq!(
            toks,
            vec![
                Token::Identifier("Sphere".into()),
                Token::Int(1),
                Token::Int(-1),
                Token::Int(1),
                Token::Int(360),
            ]
        );
    }

    #[test]
    fn structured_comment_is_flagged() {
        let mut lexer = Lexer::new(b"## scene.rib\nWorldBegin", "t.rib");
        let mut r = CollectingReporter::default();
        let _ = lexer.next_token(&mut r);
        let comments = lexer.take_pending_comments();
        assert_eq!(comments.len(), 1);
        assert!(comments[0].structured);
        assert_eq!(comments[0].text.trim(), "scene.rib");
    }

    #[test]
    fn decodes_fixed_point_number() {
        // 0204 = 0o200 + 4*1 + 0 -> d=1, w=0: one byte, divided by 2^8.
        // byte 128 (0x80) interpreted signed is -128; -128/256 = -0.5
        let mut lexer = Lexer::new(&[0o204u8, 0x80], "t.rib");
        let mut r = CollectingReporter::default();
        let tok = lexer.next_token(&mut r).unwrap();
        assert_eq!(tok.value, Token::Float(-0.5));
    }

    #[test]
    fn decodes_encoded_request_roundtrip() {
        // 0314 <idx=5> "Sphere" defines index 5 as "Sphere"; 0246 <5> emits it.
        let mut bytes = vec![0o314u8, 5, b'"'];
        bytes.extend_from_slice(b"Sphere");
        bytes.push(b'"');
        bytes.push(0o246);
        bytes.push(5);
        let mut lexer = Lexer::new(&bytes, "t.rib");
        let mut r = CollectingReporter::default();
        let tok = lexer.next_token(&mut r).unwrap();
        assert_eq!(tok.value, Token::Identifier("Sphere".into()));
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn unknown_opcode_resyncs_and_reports() {
        // 0377 is not a recognized opcode; 'A' should resume scanning as an identifier.
        let mut lexer = Lexer::new(&[0o377u8, b'A'], "t.rib");
        let mut r = CollectingReporter::default();
        let tok = lexer.next_token(&mut r).unwrap();
        assert_eq!(tok.value, Token::Identifier("A".into()));
        assert!(r.has_severity(rib_errors::Severity::Error));
    }
}
