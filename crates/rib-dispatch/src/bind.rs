//! Splits a request's raw argument list into its fixed leading positional
//! arguments and trailing `(name, value)` parameter-list pairs, then binds
//! the latter against the declaration table (spec §4.1, §4.4).

use rib_config::DeclarationTable;
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_model::{Declaration, ParameterList, Value, ValueCounts};

/// Split `args` at the first string-valued token, which per the RIB grammar
/// begins the trailing parameter-list (spec §6.1: positional arguments are
/// never strings for any request this dispatcher handles, except where the
/// request's own positional arity already accounts for its string
/// arguments — callers pass that fixed arity explicitly).
pub fn split_positional(args: &[Value], positional_arity: usize) -> (&[Value], &[Value]) {
    let cut = positional_arity.min(args.len());
    args.split_at(cut)
}

/// Walk `trailing` as `(name: Value::String, value: Value)` pairs,
/// resolving each name against `declarations` and binding the value into a
/// fresh `ParameterList` (spec §4.1).
pub fn bind_paramlist(
    trailing: &[Value],
    declarations: &DeclarationTable,
    counts: &ValueCounts,
    color_samples: usize,
    reporter: &mut dyn ErrorReporter,
    source_name: &str,
    request_name: &str,
    line: u32,
) -> ParameterList {
    let mut params = ParameterList::new();
    let mut i = 0;
    while i < trailing.len() {
        let Some(name) = trailing[i].get_strings().and_then(|s| s.first().cloned()) else {
            reporter.report(Diagnostic::new(
                ErrorCode::BadParameterList,
                Severity::Error,
                line,
                source_name,
                format!("{request_name}: expected a parameter name, found a non-string token"),
            ));
            i += 1;
            continue;
        };
        let Some(value) = trailing.get(i + 1) else {
            reporter.report(Diagnostic::new(
                ErrorCode::BadParameterList,
                Severity::Error,
                line,
                source_name,
                format!("{request_name}: parameter \"{name}\" has no value"),
            ));
            break;
        };
        match declarations.resolve(&name) {
            Some(decl) => bind_one(&mut params, decl, value.clone(), counts, color_samples, reporter, source_name),
            None => reporter.report(Diagnostic::new(
                ErrorCode::UnknownDeclaration,
                Severity::Error,
                line,
                source_name,
                format!("{request_name}: unknown parameter \"{name}\""),
            )),
        }
        i += 2;
    }
    params
}

fn bind_one(
    params: &mut ParameterList,
    decl: Declaration,
    value: Value,
    counts: &ValueCounts,
    color_samples: usize,
    reporter: &mut dyn ErrorReporter,
    source_name: &str,
) {
    let components = decl.components_per_element(color_samples);
    params.bind(decl, value, counts, components, reporter, source_name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rib_model::{BasicType, StorageClass};

    #[test]
    fn splits_positional_from_trailing() {
        let args = vec![
            Value::scalar_float(1.0, 1),
            Value::scalar_string("roughness".into(), 1),
            Value::scalar_float(0.5, 1),
        ];
        let (pos, trailing) = split_positional(&args, 1);
        assert_eq!(pos.len(), 1);
        assert_eq!(trailing.len(), 2);
    }

    #[test]
    fn binds_known_parameter() {
        let mut decls = DeclarationTable::new();
        decls.declare("roughness", StorageClass::Constant, BasicType::Float, 1);
        let trailing = vec![
            Value::scalar_string("roughness".into(), 1),
            Value::scalar_float(0.25, 1),
        ];
        let mut r = rib_errors::CollectingReporter::default();
        let params = bind_paramlist(&trailing, &decls, &ValueCounts::uniform(1, 1), 3, &mut r, "a.rib", "Surface", 1);
        assert_eq!(params.len(), 1);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn unknown_parameter_name_is_reported() {
        let decls = DeclarationTable::new();
        let trailing = vec![
            Value::scalar_string("bogus".into(), 1),
            Value::scalar_float(0.25, 1),
        ];
        let mut r = rib_errors::CollectingReporter::default();
        let params = bind_paramlist(&trailing, &decls, &ValueCounts::uniform(1, 1), 3, &mut r, "a.rib", "Surface", 1);
        assert_eq!(params.len(), 0);
        assert!(!r.diagnostics.is_empty());
    }
}
