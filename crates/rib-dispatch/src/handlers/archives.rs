//! Archive definition, instancing, and external loading (spec §4.5.2,
//! §4.6). `ArchiveBegin`/`ArchiveEnd` always call through to the backend
//! (mirroring objects.rs); `ReadArchive` first looks for a matching
//! in-memory archive and only falls back to `Context::archive_loader` for
//! names it doesn't recognize. `ArchiveRecord` is the comment/structure
//! request (spec §4.5.2 "comments propagate through chained archives").

use crate::args::Args;
use crate::context::Context;
use crate::replay::Replayer;
use rib_backend::{Backend, BackendResult};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_model::{ParameterList, Value};
use rib_state::ModeKind;

pub fn archive_begin(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    params: &ParameterList,
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();
    if let Err(diagnostic) = ctx.modes.push(ModeKind::Object, line, &source_name) {
        reporter.report(diagnostic);
        return Ok(());
    }
    let name = Args::new(positional, "ArchiveBegin", line, ctx.source_name()).string(0, reporter);
    let handle = backend.archive_begin(&name, params)?;
    ctx.handles.bind_archive(name.as_str(), handle);
    ctx.begin_capture(name, false, handle);
    Ok(())
}

pub fn archive_end(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();
    if let Err(diagnostic) = ctx.modes.pop(ModeKind::Object, line, &source_name) {
        reporter.report(diagnostic);
        return Ok(());
    }
    if !ctx.end_capture(false) {
        reporter.report(Diagnostic::new(
            ErrorCode::InvalidNesting,
            Severity::Error,
            line,
            ctx.source_name(),
            "ArchiveEnd with no open ArchiveBegin",
        ));
        return Ok(());
    }
    backend.archive_end()
}

pub fn read_archive(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    params: &ParameterList,
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    let name = Args::new(positional, "ReadArchive", line, ctx.source_name()).string(0, reporter);
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("ReadArchive", line, positional.to_vec(), params.clone()));
        return Ok(());
    }
    backend.read_archive(&name, params)?;
    if let Some(handle) = ctx.handles.lookup_archive(name.as_str()) {
        if let Some(archive) = ctx.archive(handle).cloned() {
            let mut replayer = Replayer::new(ctx);
            let result = archive.replay_archive(&mut replayer, backend, reporter, |_recorded| {});
            for diagnostic in replayer.into_diagnostics() {
                reporter.report(diagnostic);
            }
            return result;
        }
    }
    let mut loader = std::mem::replace(&mut ctx.archive_loader, Box::new(crate::context::NullArchiveLoader));
    let result = loader.read_archive(ctx, backend, reporter, &name, params);
    ctx.archive_loader = loader;
    result
}

pub fn archive_record(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    let args = Args::new(positional, "ArchiveRecord", line, ctx.source_name());
    let kind = args.string(0, reporter);
    let text = args.string(1, reporter);
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new(
            "ArchiveRecord",
            line,
            positional.to_vec(),
            ParameterList::new(),
        ));
        return Ok(());
    }
    backend.archive_record(&kind, &text)
}
