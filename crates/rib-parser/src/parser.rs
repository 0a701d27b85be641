//! Token stream -> (request-name, argument-list) framing (spec §4.3).

use crate::request::ParsedRequest;
use rib_config::VariableTable;
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_lexer::{Lexer, Spanned, Token};
use rib_model::Value;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source_name: String,
    lookahead: Option<Spanned<Token>>,
}

impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8], source_name: impl Into<String>) -> Self {
        let source_name = source_name.into();
        Self {
            lexer: Lexer::new(bytes, source_name.clone()),
            source_name,
            lookahead: None,
        }
    }

    fn advance(&mut self, reporter: &mut dyn ErrorReporter) -> Option<Spanned<Token>> {
        if let Some(tok) = self.lookahead.take() {
            return Some(tok);
        }
        self.lexer.next_token(reporter)
    }

    fn peek(&mut self, reporter: &mut dyn ErrorReporter) -> Option<&Spanned<Token>> {
        if self.lookahead.is_none() {
            self.lookahead = self.lexer.next_token(reporter);
        }
        self.lookahead.as_ref()
    }

    /// Scan forward to the next request, accumulate its loose/bracketed
    /// arguments, and return it with the comments queued while doing so.
    /// Returns `None` at end of input.
    pub fn next_request(
        &mut self,
        reporter: &mut dyn ErrorReporter,
        variables: Option<&VariableTable>,
    ) -> Option<ParsedRequest> {
        let (name, line) = loop {
            let tok = self.advance(reporter)?;
            match tok.value {
                Token::Identifier(name) => break (name, tok.line),
                other => {
                    reporter.report(Diagnostic::new(
                        ErrorCode::BadToken,
                        Severity::Error,
                        tok.line,
                        &self.source_name,
                        format!("expected a request name, found {other:?}"),
                    ));
                }
            }
        };

        let mut args = Vec::new();
        loop {
            match self.peek(reporter) {
                None => break,
                Some(Spanned {
                    value: Token::Identifier(_),
                    ..
                }) => break,
                _ => {}
            }
            let tok = self.advance(reporter).expect("peek confirmed Some");
            match tok.value {
                Token::Int(i) => args.push(Value::scalar_int(i, tok.line)),
                Token::Float(f) => args.push(Value::scalar_float(f, tok.line)),
                Token::Str(s) => {
                    let s = match variables {
                        Some(vars) => vars.substitute(&s),
                        None => s,
                    };
                    args.push(Value::scalar_string(s, tok.line));
                }
                Token::FloatArray(floats) => args.push(Value::array_float(floats, tok.line)),
                Token::ArrayOpen => args.push(self.read_array(reporter, variables, tok.line)),
                Token::ArrayClose => {
                    reporter.report(Diagnostic::new(
                        ErrorCode::UnbalancedBracket,
                        Severity::Error,
                        tok.line,
                        &self.source_name,
                        "stray ']' with no matching '['",
                    ));
                }
                Token::Identifier(_) => unreachable!("peek guarded against this"),
            }
        }

        let comments = self.lexer.take_pending_comments();
        Some(ParsedRequest {
            name,
            line,
            args,
            comments,
        })
    }

    fn read_array(
        &mut self,
        reporter: &mut dyn ErrorReporter,
        variables: Option<&VariableTable>,
        open_line: u32,
    ) -> Value {
        let mut elems = Elems::Empty;
        loop {
            match self.advance(reporter) {
                None => {
                    reporter.report(Diagnostic::new(
                        ErrorCode::UnbalancedBracket,
                        Severity::Error,
                        open_line,
                        &self.source_name,
                        "end of input before closing ']'",
                    ));
                    break;
                }
                Some(Spanned {
                    value: Token::ArrayClose,
                    ..
                }) => break,
                Some(Spanned {
                    value: Token::Int(i),
                    ..
                }) => elems.push_int(i),
                Some(Spanned {
                    value: Token::Float(f),
                    ..
                }) => elems.push_float(f),
                Some(Spanned {
                    value: Token::Str(s),
                    line,
                }) => {
                    let s = match variables {
                        Some(vars) => vars.substitute(&s),
                        None => s,
                    };
                    if !elems.push_string(s) {
                        reporter.report(Diagnostic::new(
                            ErrorCode::BadArray,
                            Severity::Error,
                            line,
                            &self.source_name,
                            "string element inside a numeric array",
                        ));
                    }
                }
                Some(Spanned { value: other, line }) => {
                    reporter.report(Diagnostic::new(
                        ErrorCode::BadArray,
                        Severity::Error,
                        line,
                        &self.source_name,
                        format!("unexpected {other:?} inside array"),
                    ));
                }
            }
        }
        elems.into_value(open_line)
    }
}

enum Elems {
    Empty,
    Ints(Vec<i32>),
    Floats(Vec<f32>),
    Strings(Vec<String>),
}

impl Elems {
    fn push_int(&mut self, i: i32) {
        match self {
            Elems::Empty => *self = Elems::Ints(vec![i]),
            Elems::Ints(v) => v.push(i),
            Elems::Floats(v) => v.push(i as f32),
            Elems::Strings(_) => {}
        }
    }

    fn push_float(&mut self, f: f32) {
        match self {
            Elems::Empty => *self = Elems::Floats(vec![f]),
            Elems::Floats(v) => v.push(f),
            Elems::Ints(v) => {
                let mut widened: Vec<f32> = v.iter().map(|&i| i as f32).collect();
                widened.push(f);
                *self = Elems::Floats(widened);
            }
            Elems::Strings(_) => {}
        }
    }

    /// Returns `false` if a string was rejected due to a type clash.
    fn push_string(&mut self, s: String) -> bool {
        match self {
            Elems::Empty => {
                *self = Elems::Strings(vec![s]);
                true
            }
            Elems::Strings(v) => {
                v.push(s);
                true
            }
            _ => false,
        }
    }

    fn into_value(self, line: u32) -> Value {
        match self {
            Elems::Empty => Value::array_float(Vec::new(), line),
            Elems::Ints(v) => Value::array_int(v, line),
            Elems::Floats(v) => Value::array_float(v, line),
            Elems::Strings(v) => Value::array_string(v, line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rib_errors::CollectingReporter;

    fn parse_all(src: &str) -> Vec<ParsedRequest> {
        let mut p = Parser::new(src.as_bytes(), "t.rib");
        let mut r = CollectingReporter::default();
        let mut out = Vec::new();
        while let Some(req) = p.next_request(&mut r, None) {
            out.push(req);
        }
        assert!(r.diagnostics.is_empty(), "unexpected: {:?}", r.diagnostics);
        out
    }

    #[test]
    fn frames_loose_scalar_args() {
        let reqs = parse_all("Format 640 480 1");
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].name, "Format");
        assert_eq!(reqs[0].args.len(), 3);
    }

    #[test]
    fn frames_bracketed_float_array() {
        let reqs = parse_all("Color [0.25 0.5 0.75]");
        assert_eq!(reqs[0].args.len(), 1);
        assert_eq!(reqs[0].args[0].get_floats(), Some(vec![0.25, 0.5, 0.75]));
        assert!(reqs[0].args[0].is_array());
    }

    #[test]
    fn array_mixing_ints_and_floats_widens() {
        let reqs = parse_all("Translate [1 2.5 3]");
        assert_eq!(reqs[0].args[0].get_floats(), Some(vec![1.0, 2.5, 3.0]));
    }

    #[test]
    fn two_requests_in_sequence() {
        let reqs = parse_all("WorldBegin\nSphere 1 -1 1 360\nWorldEnd");
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[1].name, "Sphere");
        assert_eq!(reqs[1].args.len(), 4);
    }

    #[test]
    fn deferred_comment_attaches_to_its_request() {
        let reqs = parse_all("Sphere 1 # radius note\n-1 1 360");
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].comments.len(), 1);
        assert_eq!(reqs[0].comments[0].text.trim(), "radius note");
    }

    #[test]
    fn variable_substitution_applies_inside_strings() {
        let mut vars = VariableTable::new();
        vars.set("NAME", "scene01");
        let mut p = Parser::new(br#"Option "user" "string tag" ["$NAME"]"#, "t.rib");
        let mut r = CollectingReporter::default();
        let req = p.next_request(&mut r, Some(&vars)).unwrap();
        assert_eq!(req.args[2].get_strings().unwrap()[0], "scene01");
    }

    #[test]
    fn unbalanced_bracket_is_reported() {
        let mut p = Parser::new(b"Color [0.1 0.2", "t.rib");
        let mut r = CollectingReporter::default();
        let req = p.next_request(&mut r, None).unwrap();
        assert_eq!(req.args[0].get_floats(), Some(vec![0.1, 0.2]));
        assert!(r.has_severity(rib_errors::Severity::Error));
    }
}
