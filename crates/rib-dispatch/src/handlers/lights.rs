//! Light requests (spec §4.4 "lights" group; §4.6 handle-emitting /
//! handle-consuming). Lights may only be created where `ModeStack::allow_light`
//! permits (spec §4.7).

use crate::args::Args;
use crate::context::Context;
use rib_backend::{Backend, BackendResult};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_handles::HandleKey;
use rib_model::{ParameterList, Value};

fn handle_key(value: &Value) -> HandleKey {
    if let Some(s) = value.get_strings() {
        if let Some(first) = s.first() {
            return HandleKey::Str(first.clone());
        }
    }
    if let Some(ints) = value.get_floats() {
        if let Some(&first) = ints.first() {
            return HandleKey::Int(first as i64);
        }
    }
    HandleKey::Int(0)
}

fn check_allowed(ctx: &Context, reporter: &mut dyn ErrorReporter, name: &str, line: u32) -> bool {
    if ctx.modes.allow_light() {
        return true;
    }
    reporter.report(Diagnostic::new(
        ErrorCode::InvalidNesting,
        Severity::Error,
        line,
        ctx.source_name(),
        format!("{name} is not legal in the current block"),
    ));
    false
}

pub fn light_source(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    params: &ParameterList,
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    if !check_allowed(ctx, reporter, "LightSource", line) {
        return Ok(());
    }
    let args = Args::new(positional, "LightSource", line, ctx.source_name());
    let name = args.string(0, reporter);
    let key = positional.get(1).map(handle_key).unwrap_or(HandleKey::Int(0));
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("LightSource", line, positional.to_vec(), params.clone()));
        return Ok(());
    }
    let handle = backend.light_source(&name, params)?;
    ctx.handles.bind_light(key, handle);
    Ok(())
}

pub fn area_light_source(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    params: &ParameterList,
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    if !check_allowed(ctx, reporter, "AreaLightSource", line) {
        return Ok(());
    }
    let args = Args::new(positional, "AreaLightSource", line, ctx.source_name());
    let name = args.string(0, reporter);
    let key = positional.get(1).map(handle_key).unwrap_or(HandleKey::Int(0));
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("AreaLightSource", line, positional.to_vec(), params.clone()));
        return Ok(());
    }
    let handle = backend.area_light_source(&name, params)?;
    ctx.handles.bind_light(key, handle);
    Ok(())
}

pub fn illuminate(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let args = Args::new(positional, "Illuminate", line, ctx.source_name());
    let key = positional.first().map(handle_key).unwrap_or(HandleKey::Int(0));
    let on = args.int(1, reporter) != 0;
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new(
            "Illuminate",
            line,
            positional.to_vec(),
            ParameterList::new(),
        ));
        return Ok(());
    }
    match ctx.handles.lookup_light(key) {
        Some(handle) => backend.illuminate(handle, on),
        None => {
            reporter.report(Diagnostic::new(
                ErrorCode::UnknownHandle,
                Severity::Error,
                line,
                ctx.source_name(),
                "Illuminate: unknown light handle",
            ));
            Ok(())
        }
    }
}
