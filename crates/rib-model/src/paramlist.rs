//! Parameter lists: ordered `(Declaration, Value)` pairs with lookup by name
//! and by position (spec §3 "Parameter list").

use crate::declaration::{Declaration, ValueCounts};
use crate::value::{BasicType, Value};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterList {
    entries: Vec<(Declaration, Value)>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(decl, _)| decl.name == name)
            .map(|(_, v)| v)
    }

    pub fn get_position(&self, index: usize) -> Option<&(Declaration, Value)> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Declaration, Value)> {
        self.entries.iter()
    }

    /// Bind one `(name, value)` pair against its resolved declaration,
    /// applying spec §4.1's cardinality rules. Type/arity mismatches are
    /// surfaced here, at bind time, never deferred to dispatch.
    ///
    /// - Too few elements: an `Error` diagnostic is reported and the entry is
    ///   dropped (not appended).
    /// - Too many elements: a `Warning` diagnostic is reported and the value
    ///   is truncated to the expected length before being appended.
    /// - Type mismatch that can be coerced (`int`<->`float`) is coerced with
    ///   the corresponding diagnostic from `Value::get_ints`/`convert_*`.
    /// - Type mismatch that cannot be coerced (anything involving `String`)
    ///   is an `Error` and the entry is dropped.
    pub fn bind(
        &mut self,
        decl: Declaration,
        mut value: Value,
        counts: &ValueCounts,
        components_per_element: usize,
        reporter: &mut dyn ErrorReporter,
        source_name: &str,
    ) {
        if decl.basic_type != value.basic_type() {
            match (decl.basic_type, value.basic_type()) {
                (BasicType::Float, BasicType::Integer) => value.convert_int_to_float(),
                (BasicType::Integer, BasicType::Float) => {
                    value.convert_float_to_int(reporter, source_name)
                }
                _ => {
                    reporter.report(Diagnostic::new(
                        ErrorCode::TypeMismatch,
                        Severity::Error,
                        value.line(),
                        source_name,
                        format!(
                            "parameter \"{}\" expected {:?}, got {:?}",
                            decl.name,
                            decl.basic_type,
                            value.basic_type()
                        ),
                    ));
                    return;
                }
            }
        }

        let expected = decl.expected_cardinality(counts, components_per_element);
        let actual = value.cardinality();
        if actual < expected {
            reporter.report(Diagnostic::new(
                ErrorCode::WrongArity,
                Severity::Error,
                value.line(),
                source_name,
                format!(
                    "parameter \"{}\" expected {} values ({} class), got {}",
                    decl.name,
                    expected,
                    decl.storage_class.as_str(),
                    actual
                ),
            ));
            return;
        }
        if actual > expected {
            reporter.report(Diagnostic::new(
                ErrorCode::WrongArity,
                Severity::Warning,
                value.line(),
                source_name,
                format!(
                    "parameter \"{}\" expected {} values, got {}; excess ignored",
                    decl.name, expected, actual
                ),
            ));
            value = truncate(value, expected);
        }

        self.entries.push((decl, value));
    }
}

impl Default for ParameterList {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(value: Value, expected: usize) -> Value {
    let line = value.line();
    match value.basic_type() {
        BasicType::Integer => value_truncate_ints(value, expected, line),
        BasicType::Float => value_truncate_floats(value, expected, line),
        BasicType::String => value_truncate_strings(value, expected, line),
    }
}

// Small helpers kept free functions (rather than methods on `Value`) because
// truncation is a binding-time concern, not a property of the value type
// itself.
fn value_truncate_ints(value: Value, expected: usize, line: u32) -> Value {
    let mut dummy_reporter = rib_errors::IgnoreReporter;
    let v = value
        .get_ints(&mut dummy_reporter, "")
        .expect("basic_type checked by caller");
    Value::array_int(v.into_iter().take(expected).collect(), line)
}

fn value_truncate_floats(value: Value, expected: usize, line: u32) -> Value {
    let v = value.get_floats().expect("basic_type checked by caller");
    Value::array_float(v.into_iter().take(expected).collect(), line)
}

fn value_truncate_strings(value: Value, expected: usize, line: u32) -> Value {
    let v = value
        .get_strings()
        .expect("basic_type checked by caller")
        .to_vec();
    Value::array_string(v.into_iter().take(expected).collect(), line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::StorageClass;
    use rib_errors::CollectingReporter;

    fn counts() -> ValueCounts {
        ValueCounts::uniform(4, 1)
    }

    #[test]
    fn exact_cardinality_binds_without_warnings() {
        let mut pl = ParameterList::new();
        let decl = Declaration::new("P", StorageClass::Vertex, BasicType::Float, 3);
        let value = Value::array_float(vec![0.0; 12], 1);
        let mut r = CollectingReporter::default();
        pl.bind(decl, value, &counts(), 3, &mut r, "a.rib");
        assert_eq!(pl.len(), 1);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn too_few_drops_entry_with_error() {
        let mut pl = ParameterList::new();
        let decl = Declaration::new("P", StorageClass::Vertex, BasicType::Float, 3);
        let value = Value::array_float(vec![0.0; 6], 1);
        let mut r = CollectingReporter::default();
        pl.bind(decl, value, &counts(), 3, &mut r, "a.rib");
        assert_eq!(pl.len(), 0);
        assert!(r.has_severity(rib_errors::Severity::Error));
    }

    #[test]
    fn too_many_truncates_with_warning() {
        let mut pl = ParameterList::new();
        let decl = Declaration::new("P", StorageClass::Vertex, BasicType::Float, 3);
        let value = Value::array_float(vec![1.0; 15], 1);
        let mut r = CollectingReporter::default();
        pl.bind(decl, value, &counts(), 3, &mut r, "a.rib");
        assert_eq!(pl.len(), 1);
        assert_eq!(pl.get("P").unwrap().cardinality(), 12);
        assert!(r.has_severity(rib_errors::Severity::Warning));
    }

    #[test]
    fn int_array_against_float_declaration_coerces() {
        let mut pl = ParameterList::new();
        let decl = Declaration::new("amplitude", StorageClass::Constant, BasicType::Float, 1);
        let value = Value::scalar_int(4, 1);
        let mut r = CollectingReporter::default();
        pl.bind(decl, value, &counts(), 1, &mut r, "a.rib");
        assert_eq!(pl.get("amplitude").unwrap().basic_type(), BasicType::Float);
    }
}
