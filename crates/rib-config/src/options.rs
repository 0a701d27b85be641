//! Process-wide options that are not geometry: color-sample count and the
//! error-handler selection (spec §4.1, §5, §7; `ErrorHandler` request is a
//! supplemented feature, see `SPEC_FULL.md`).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHandlerKind {
    Abort,
    Print,
    Ignore,
}

impl ErrorHandlerKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "abort" => Some(Self::Abort),
            "print" => Some(Self::Print),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }
}

impl Default for ErrorHandlerKind {
    fn default() -> Self {
        ErrorHandlerKind::Print
    }
}

/// Mutable, per-context render options. Distinct from `DeclarationTable`
/// because these are scalar knobs rather than name resolution state, but
/// both live behind the same `rib-config` crate since both are "ambient
/// configuration" in the sense spec §4.1 describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub color_samples: usize,
    pub error_handler: ErrorHandlerKind,
}

impl Options {
    pub fn new(color_samples: usize, error_handler: ErrorHandlerKind) -> Self {
        Self {
            color_samples,
            error_handler,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            color_samples: 3,
            error_handler: ErrorHandlerKind::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_color_samples_is_three() {
        assert_eq!(Options::default().color_samples, 3);
    }

    #[test]
    fn error_handler_parses_known_kinds() {
        assert_eq!(ErrorHandlerKind::parse("abort"), Some(ErrorHandlerKind::Abort));
        assert_eq!(ErrorHandlerKind::parse("bogus"), None);
    }
}
