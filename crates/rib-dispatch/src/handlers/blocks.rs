//! Mode-nesting block requests (spec §4.7): validate against the mode
//! stack unconditionally (nesting must be legal whether a block's content
//! is being captured into a macro or dispatched live), then either record
//! or call through to the backend.

use crate::args::Args;
use crate::context::Context;
use rib_backend::{Backend, BackendResult};
use rib_errors::ErrorReporter;
use rib_model::{ParameterList, Value};
use rib_state::ModeKind;

fn push_mode(ctx: &mut Context, kind: ModeKind, reporter: &mut dyn ErrorReporter, line: u32) -> bool {
    let source_name = ctx.source_name().to_string();
    match ctx.modes.push(kind, line, &source_name) {
        Ok(()) => true,
        Err(diagnostic) => {
            reporter.report(diagnostic);
            false
        }
    }
}

fn pop_mode(ctx: &mut Context, kind: ModeKind, reporter: &mut dyn ErrorReporter, line: u32) -> bool {
    let source_name = ctx.source_name().to_string();
    match ctx.modes.pop(kind, line, &source_name) {
        Ok(()) => true,
        Err(diagnostic) => {
            reporter.report(diagnostic);
            false
        }
    }
}

fn record_or_call(
    ctx: &mut Context,
    name: &str,
    line: u32,
    positional: &[Value],
    call: impl FnOnce(&mut dyn Backend) -> BackendResult<()>,
    backend: &mut dyn Backend,
) -> BackendResult<()> {
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new(name, line, positional.to_vec(), ParameterList::new()));
        Ok(())
    } else {
        call(backend)
    }
}

pub fn frame_begin(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !push_mode(ctx, ModeKind::Frame, reporter, line) {
        return Ok(());
    }
    let number = Args::new(positional, "FrameBegin", line, ctx.source_name()).int(0, reporter);
    record_or_call(ctx, "FrameBegin", line, positional, |b| b.frame_begin(number), backend)
}

pub fn frame_end(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !pop_mode(ctx, ModeKind::Frame, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "FrameEnd", line, &[], |b| b.frame_end(), backend)
}

pub fn world_begin(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !push_mode(ctx, ModeKind::World, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "WorldBegin", line, &[], |b| b.world_begin(), backend)
}

pub fn world_end(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !pop_mode(ctx, ModeKind::World, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "WorldEnd", line, &[], |b| b.world_end(), backend)
}

pub fn attribute_begin(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !push_mode(ctx, ModeKind::Attribute, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "AttributeBegin", line, &[], |b| b.attribute_begin(), backend)
}

pub fn attribute_end(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !pop_mode(ctx, ModeKind::Attribute, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "AttributeEnd", line, &[], |b| b.attribute_end(), backend)
}

pub fn transform_begin(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !push_mode(ctx, ModeKind::Transform, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "TransformBegin", line, &[], |b| b.transform_begin(), backend)
}

pub fn transform_end(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !pop_mode(ctx, ModeKind::Transform, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "TransformEnd", line, &[], |b| b.transform_end(), backend)
}

pub fn solid_begin(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !push_mode(ctx, ModeKind::Solid, reporter, line) {
        return Ok(());
    }
    let operation = Args::new(positional, "SolidBegin", line, ctx.source_name()).string(0, reporter);
    record_or_call(ctx, "SolidBegin", line, positional, |b| b.solid_begin(&operation), backend)
}

pub fn solid_end(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !pop_mode(ctx, ModeKind::Solid, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "SolidEnd", line, &[], |b| b.solid_end(), backend)
}

pub fn motion_begin(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !push_mode(ctx, ModeKind::Motion, reporter, line) {
        return Ok(());
    }
    let times = Args::new(positional, "MotionBegin", line, ctx.source_name()).floats(0, reporter);
    ctx.begin_motion(&times);
    record_or_call(ctx, "MotionBegin", line, positional, |b| b.motion_begin(&times), backend)
}

pub fn motion_end(ctx: &mut Context, backend: &mut dyn Backend, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if let Err(diagnostic) = ctx.end_motion(line) {
        reporter.report(diagnostic);
    }
    if !pop_mode(ctx, ModeKind::Motion, reporter, line) {
        return Ok(());
    }
    record_or_call(ctx, "MotionEnd", line, &[], |b| b.motion_end(), backend)
}
