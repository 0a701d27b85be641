//! `Format`, `Option`, `Declare`, `ErrorHandler` (spec §4.1, §4.4; the
//! latter two are supplemented features, see `SPEC_FULL.md`).

use crate::args::Args;
use crate::context::Context;
use rib_backend::{Backend, BackendResult};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_model::{BasicType, ParameterList, StorageClass};

pub fn format(backend: &mut dyn Backend, positional: &[rib_model::Value], reporter: &mut dyn ErrorReporter, source_name: &str, line: u32) -> BackendResult<()> {
    let args = Args::new(positional, "Format", line, source_name);
    backend.format(args.int(0, reporter), args.int(1, reporter), args.float(2, reporter))
}

pub fn option(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[rib_model::Value],
    params: &ParameterList,
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    let args = Args::new(positional, "Option", line, ctx.source_name());
    let name = args.string(0, reporter);
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Option", line, positional.to_vec(), params.clone()));
        return Ok(());
    }
    backend.option(&name, params)
}

/// Supplemented feature (spec `SPEC_FULL.md`): registers a user declaration
/// so later parameter-list names resolve against it (spec §4.1).
pub fn declare(ctx: &mut Context, positional: &[rib_model::Value], reporter: &mut dyn ErrorReporter, line: u32) {
    let args = Args::new(positional, "Declare", line, ctx.source_name());
    let name = args.string(0, reporter);
    let spec = args.string(1, reporter);
    match parse_declare_spec(&spec) {
        Some((class, BasicType::Float, n, true)) => {
            let _ = n;
            ctx.config.declarations.declare_color(&name, class);
        }
        Some((class, ty, n, false)) => ctx.config.declarations.declare(&name, class, ty, n),
        _ => reporter.report(Diagnostic::new(
            ErrorCode::BadParameterList,
            Severity::Error,
            line,
            ctx.source_name(),
            format!("Declare: unrecognized type expression \"{spec}\""),
        )),
    }
}

fn parse_declare_spec(spec: &str) -> Option<(StorageClass, BasicType, usize, bool)> {
    let tokens: Vec<&str> = spec.split_whitespace().collect();
    let (class_tok, type_tok) = match tokens.as_slice() {
        [class, ty] => (*class, *ty),
        [ty] => ("uniform", *ty),
        _ => return None,
    };
    let class = StorageClass::parse(class_tok).unwrap_or(StorageClass::Uniform);
    let (ty, n, is_color) = match type_tok {
        "float" => (BasicType::Float, 1, false),
        "integer" | "int" => (BasicType::Integer, 1, false),
        "string" => (BasicType::String, 1, false),
        "point" | "vector" | "normal" => (BasicType::Float, 3, false),
        "hpoint" => (BasicType::Float, 4, false),
        "matrix" => (BasicType::Float, 16, false),
        "color" => (BasicType::Float, 3, true),
        _ => return None,
    };
    Some((class, ty, n, is_color))
}

/// Supplemented feature: sets the process-wide error-handler kind (spec
/// §5, §7).
pub fn error_handler(ctx: &mut Context, positional: &[rib_model::Value], reporter: &mut dyn ErrorReporter, line: u32) {
    let args = Args::new(positional, "ErrorHandler", line, ctx.source_name());
    let name = args.string(0, reporter);
    match rib_config::ErrorHandlerKind::parse(&name) {
        Some(kind) => ctx.config.options.error_handler = kind,
        None => reporter.report(Diagnostic::new(
            ErrorCode::BadParameterList,
            Severity::Warning,
            line,
            ctx.source_name(),
            format!("ErrorHandler: unrecognized handler \"{name}\", keeping the current one"),
        )),
    }
}
