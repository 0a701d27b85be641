//! Object definition and instancing (spec §4.5.1, §4.6): `ObjectBegin` and
//! `ObjectEnd` always call through to the backend to obtain/close a handle,
//! regardless of any enclosing capture; everything recorded strictly
//! between them is captured into the new object's macro instead of
//! dispatched. `ObjectInstance` replays a closed object's captured requests.

use crate::args::Args;
use crate::context::Context;
use crate::replay::Replayer;
use rib_backend::{Backend, BackendResult};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_handles::HandleKey;
use rib_model::Value;
use rib_state::ModeKind;

fn handle_key(value: &Value) -> HandleKey {
    if let Some(s) = value.get_strings() {
        if let Some(first) = s.first() {
            return HandleKey::Str(first.clone());
        }
    }
    if let Some(floats) = value.get_floats() {
        if let Some(&first) = floats.first() {
            return HandleKey::Int(first as i64);
        }
    }
    HandleKey::Int(0)
}

pub fn object_begin(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();
    if let Err(diagnostic) = ctx.modes.push(ModeKind::Object, line, &source_name) {
        reporter.report(diagnostic);
        return Ok(());
    }
    let key = positional.first().map(handle_key).unwrap_or(HandleKey::Int(0));
    let handle = backend.object_begin()?;
    ctx.handles.bind_object(key, handle);
    ctx.begin_capture("object", true, handle);
    Ok(())
}

pub fn object_end(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();
    if let Err(diagnostic) = ctx.modes.pop(ModeKind::Object, line, &source_name) {
        reporter.report(diagnostic);
        return Ok(());
    }
    if !ctx.end_capture(true) {
        reporter.report(Diagnostic::new(
            ErrorCode::InvalidNesting,
            Severity::Error,
            line,
            ctx.source_name(),
            "ObjectEnd with no open ObjectBegin",
        ));
        return Ok(());
    }
    backend.object_end()
}

pub fn object_instance(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    let args = Args::new(positional, "ObjectInstance", line, ctx.source_name());
    let key = positional.first().map(handle_key).unwrap_or(HandleKey::Int(0));
    let _ = &args;
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new(
            "ObjectInstance",
            line,
            positional.to_vec(),
            rib_model::ParameterList::new(),
        ));
        return Ok(());
    }
    let Some(handle) = ctx.handles.lookup_object(key) else {
        reporter.report(Diagnostic::new(
            ErrorCode::UnknownHandle,
            Severity::Error,
            line,
            ctx.source_name(),
            "ObjectInstance: unknown object handle",
        ));
        return Ok(());
    };
    let Some(object) = ctx.object(handle).cloned() else {
        reporter.report(Diagnostic::new(
            ErrorCode::UnknownHandle,
            Severity::Error,
            line,
            ctx.source_name(),
            "ObjectInstance: object handle has no recorded definition",
        ));
        return Ok(());
    };
    backend.object_instance(handle)?;
    let mut replayer = Replayer::new(ctx);
    let result = object.replay_object(&mut replayer, backend, reporter);
    for diagnostic in replayer.into_diagnostics() {
        reporter.report(diagnostic);
    }
    result
}
