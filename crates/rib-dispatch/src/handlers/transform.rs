//! The transform-stack requests (spec §4.4 "transform stack" group): these
//! always pass straight through to capture/backend uniformly, with no
//! mode-stack interaction of their own.

use crate::args::Args;
use crate::context::Context;
use rib_backend::{Backend, BackendResult};
use rib_errors::ErrorReporter;
use rib_model::Value;

pub fn identity(ctx: &mut Context, backend: &mut dyn Backend) -> BackendResult<()> {
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Identity", 0, vec![], rib_model::ParameterList::new()));
        return Ok(());
    }
    backend.identity()
}

pub fn translate(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let args = Args::new(positional, "Translate", line, ctx.source_name());
    let (dx, dy, dz) = (args.float(0, reporter), args.float(1, reporter), args.float(2, reporter));
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Translate", line, positional.to_vec(), rib_model::ParameterList::new()));
        return Ok(());
    }
    backend.translate(dx, dy, dz)
}

pub fn rotate(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let args = Args::new(positional, "Rotate", line, ctx.source_name());
    let (angle, dx, dy, dz) = (
        args.float(0, reporter),
        args.float(1, reporter),
        args.float(2, reporter),
        args.float(3, reporter),
    );
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Rotate", line, positional.to_vec(), rib_model::ParameterList::new()));
        return Ok(());
    }
    backend.rotate(angle, dx, dy, dz)
}

pub fn scale(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let args = Args::new(positional, "Scale", line, ctx.source_name());
    let (sx, sy, sz) = (args.float(0, reporter), args.float(1, reporter), args.float(2, reporter));
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Scale", line, positional.to_vec(), rib_model::ParameterList::new()));
        return Ok(());
    }
    backend.scale(sx, sy, sz)
}

pub fn concat_transform(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let args = Args::new(positional, "ConcatTransform", line, ctx.source_name());
    let flat = args.floats(0, reporter);
    let mut matrix = [0.0f32; 16];
    for (slot, value) in matrix.iter_mut().zip(flat.iter()) {
        *slot = *value;
    }
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new(
            "ConcatTransform",
            line,
            positional.to_vec(),
            rib_model::ParameterList::new(),
        ));
        return Ok(());
    }
    backend.concat_transform(&matrix)
}
