//! Parameter values: a tagged union over {integer, float, string}, scalar or
//! one-dimensional sequence (spec §3 "Parameter value").

use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Integer,
    Float,
    String,
}

#[derive(Debug, Clone, PartialEq)]
enum Data {
    Ints(Vec<i32>),
    Floats(Vec<f32>),
    Strings(Vec<String>),
}

/// A single parameter value as captured off the wire: its data, whether it
/// arrived as a bracketed array or a loose token, and the source line it was
/// read from (for diagnostics).
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    data: Data,
    is_array: bool,
    line: u32,
}

impl Value {
    pub fn scalar_int(v: i32, line: u32) -> Self {
        Self {
            data: Data::Ints(vec![v]),
            is_array: false,
            line,
        }
    }

    pub fn scalar_float(v: f32, line: u32) -> Self {
        Self {
            data: Data::Floats(vec![v]),
            is_array: false,
            line,
        }
    }

    pub fn scalar_string(v: String, line: u32) -> Self {
        Self {
            data: Data::Strings(vec![v]),
            is_array: false,
            line,
        }
    }

    pub fn array_int(v: Vec<i32>, line: u32) -> Self {
        Self {
            data: Data::Ints(v),
            is_array: true,
            line,
        }
    }

    pub fn array_float(v: Vec<f32>, line: u32) -> Self {
        Self {
            data: Data::Floats(v),
            is_array: true,
            line,
        }
    }

    /// Strings never contain null entries (invariant, spec §3); callers that
    /// build string arrays from untrusted input should filter beforehand.
    pub fn array_string(v: Vec<String>, line: u32) -> Self {
        debug_assert!(
            v.iter().all(|s| !s.contains('\0')),
            "string sequence must not contain null entries"
        );
        Self {
            data: Data::Strings(v),
            is_array: true,
            line,
        }
    }

    pub fn basic_type(&self) -> BasicType {
        match self.data {
            Data::Ints(_) => BasicType::Integer,
            Data::Floats(_) => BasicType::Float,
            Data::Strings(_) => BasicType::String,
        }
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Number of scalar elements in the sequence (1 for a bare scalar).
    pub fn cardinality(&self) -> usize {
        match &self.data {
            Data::Ints(v) => v.len(),
            Data::Floats(v) => v.len(),
            Data::Strings(v) => v.len(),
        }
    }

    /// Widen to floats. Integer→float is free (no diagnostic); strings have
    /// no numeric interpretation and yield `None`.
    pub fn get_floats(&self) -> Option<Vec<f32>> {
        match &self.data {
            Data::Floats(v) => Some(v.clone()),
            Data::Ints(v) => Some(v.iter().map(|&i| i as f32).collect()),
            Data::Strings(_) => None,
        }
    }

    /// Narrow to ints. Float→int is permitted but emits a warning-level
    /// diagnostic per value coerced (spec §4.1 "explicit and recorded as a
    /// conversion event"); strings yield `None`.
    pub fn get_ints(
        &self,
        reporter: &mut dyn ErrorReporter,
        source_name: &str,
    ) -> Option<Vec<i32>> {
        match &self.data {
            Data::Ints(v) => Some(v.clone()),
            Data::Floats(v) => {
                reporter.report(Diagnostic::new(
                    ErrorCode::TypeMismatch,
                    Severity::Warning,
                    self.line,
                    source_name,
                    "implicit float-to-int conversion truncates fractional part",
                ));
                Some(v.iter().map(|&f| f as i32).collect())
            }
            Data::Strings(_) => None,
        }
    }

    pub fn get_strings(&self) -> Option<&[String]> {
        match &self.data {
            Data::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// Rewrite this value from integer to float in place, preserving
    /// cardinality. No-op (and no diagnostic) if already float or string.
    pub fn convert_int_to_float(&mut self) {
        if let Data::Ints(v) = &self.data {
            self.data = Data::Floats(v.iter().map(|&i| i as f32).collect());
        }
    }

    /// Rewrite this value from float to integer in place, preserving
    /// cardinality, emitting one warning diagnostic for the conversion event.
    pub fn convert_float_to_int(&mut self, reporter: &mut dyn ErrorReporter, source_name: &str) {
        if let Data::Floats(v) = &self.data {
            reporter.report(Diagnostic::new(
                ErrorCode::TypeMismatch,
                Severity::Warning,
                self.line,
                source_name,
                "float value truncated to integer",
            ));
            self.data = Data::Ints(v.iter().map(|&f| f as i32).collect());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rib_errors::CollectingReporter;

    #[test]
    fn int_to_float_widening_is_free() {
        let v = Value::array_int(vec![1, 2, 3], 1);
        assert_eq!(v.get_floats(), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn float_to_int_warns_once_per_call() {
        let v = Value::array_float(vec![1.9, 2.1], 4);
        let mut r = CollectingReporter::default();
        let ints = v.get_ints(&mut r, "a.rib");
        assert_eq!(ints, Some(vec![1, 2]));
        assert_eq!(r.diagnostics.len(), 1);
        assert_eq!(r.diagnostics[0].severity, rib_errors::Severity::Warning);
    }

    #[test]
    fn strings_have_no_numeric_widening() {
        let v = Value::scalar_string("hi".into(), 0);
        assert_eq!(v.get_floats(), None);
        let mut r = CollectingReporter::default();
        assert_eq!(v.get_ints(&mut r, "a.rib"), None);
    }

    #[test]
    fn convert_in_place_preserves_cardinality() {
        let mut v = Value::array_int(vec![1, 2, 3, 4], 0);
        let card = v.cardinality();
        v.convert_int_to_float();
        assert_eq!(v.cardinality(), card);
        assert_eq!(v.basic_type(), BasicType::Float);
    }
}
