//! C2: the octet-stream scanner. Turns an ASCII or binary-encoded RIB byte
//! buffer into a stream of [`Token`]s, transparently resolving the binary
//! encoded-request/encoded-string define tables and queuing `#`/`##`
//! comments for the parser to release at request boundaries.

mod scanner;
mod token;

pub use scanner::Lexer;
pub use token::{Comment, Spanned, Token};
