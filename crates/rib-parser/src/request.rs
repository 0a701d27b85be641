//! The parser's output shape: a request name plus its accumulated argument
//! values (spec §4.3). Binding those values against declarations into a
//! `rib_model::ParameterList` is the dispatcher's job (spec §4.4), not the
//! parser's — the parser only frames tokens into requests.

use rib_lexer::Comment;
use rib_model::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub name: String,
    pub line: u32,
    pub args: Vec<Value>,
    /// Comments queued by the lexer while this request's arguments were
    /// being scanned, released immediately after the request (spec §4.2,
    /// §5 ordering guarantee).
    pub comments: Vec<Comment>,
}
