//! Positional-argument extraction shared by every request handler (spec
//! §4.4): pulls typed scalars out of a request's leading argument list,
//! reporting and degrading on shape problems rather than ever panicking or
//! propagating an error up through dispatch.

use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_model::Value;

/// A read-only cursor over one request's positional arguments (the part of
/// `args` before the trailing name/value parameter-list pairs begin).
pub struct Args<'a> {
    values: &'a [Value],
    name: &'a str,
    line: u32,
    source_name: &'a str,
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value], name: &'a str, line: u32, source_name: &'a str) -> Self {
        Self {
            values,
            name,
            line,
            source_name,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    fn missing(&self, index: usize, reporter: &mut dyn ErrorReporter) {
        reporter.report(Diagnostic::new(
            ErrorCode::WrongArity,
            Severity::Error,
            self.line,
            self.source_name,
            format!(
                "{} expects an argument at position {} but only {} were given",
                self.name,
                index,
                self.values.len()
            ),
        ));
    }

    fn not_numeric(&self, index: usize, reporter: &mut dyn ErrorReporter) {
        reporter.report(Diagnostic::new(
            ErrorCode::TypeMismatch,
            Severity::Error,
            self.line,
            self.source_name,
            format!("{} argument {} is not numeric", self.name, index),
        ));
    }

    /// A single float, widening from int. Missing or non-numeric args
    /// report and degrade to `0.0` so the backend call still happens with a
    /// best-effort value (spec §4.4: validation never blocks dispatch of an
    /// otherwise well-formed request outright; it degrades the offending
    /// value).
    pub fn float(&self, index: usize, reporter: &mut dyn ErrorReporter) -> f32 {
        let Some(value) = self.values.get(index) else {
            self.missing(index, reporter);
            return 0.0;
        };
        match value.get_floats() {
            Some(v) if !v.is_empty() => v[0],
            _ => {
                self.not_numeric(index, reporter);
                0.0
            }
        }
    }

    pub fn int(&self, index: usize, reporter: &mut dyn ErrorReporter) -> i32 {
        match self.values.get(index) {
            None => {
                self.missing(index, reporter);
                0
            }
            Some(v) => v.get_ints(reporter, self.source_name).and_then(|v| v.first().copied()).unwrap_or_else(|| {
                self.not_numeric(index, reporter);
                0
            }),
        }
    }

    pub fn string(&self, index: usize, reporter: &mut dyn ErrorReporter) -> String {
        match self.values.get(index).and_then(Value::get_strings) {
            Some(s) if !s.is_empty() => s[0].clone(),
            _ => {
                if self.values.get(index).is_none() {
                    self.missing(index, reporter);
                } else {
                    reporter.report(Diagnostic::new(
                        ErrorCode::TypeMismatch,
                        Severity::Error,
                        self.line,
                        self.source_name,
                        format!("{} argument {} is not a string", self.name, index),
                    ));
                }
                String::new()
            }
        }
    }

    /// The full float array at `index` (e.g. `ConcatTransform`'s 16-element
    /// matrix, `MotionBegin`'s time list, `Color`'s sample list).
    pub fn floats(&self, index: usize, reporter: &mut dyn ErrorReporter) -> Vec<f32> {
        match self.values.get(index).and_then(Value::get_floats) {
            Some(v) => v,
            None => {
                if self.values.get(index).is_none() {
                    self.missing(index, reporter);
                } else {
                    self.not_numeric(index, reporter);
                }
                Vec::new()
            }
        }
    }

    pub fn ints(&self, index: usize, reporter: &mut dyn ErrorReporter) -> Vec<i32> {
        match self.values.get(index) {
            Some(v) => v.get_ints(reporter, self.source_name).unwrap_or_default(),
            None => {
                self.missing(index, reporter);
                Vec::new()
            }
        }
    }

    pub fn strings(&self, index: usize, reporter: &mut dyn ErrorReporter) -> Vec<String> {
        match self.values.get(index).and_then(Value::get_strings) {
            Some(v) => v.to_vec(),
            None => {
                self.missing(index, reporter);
                Vec::new()
            }
        }
    }
}
