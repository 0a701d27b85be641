//! Shading-attribute requests (spec §4.4 "shading attributes" group).

use crate::args::Args;
use crate::context::Context;
use crate::shape::color_vector;
use rib_backend::{Backend, BackendResult};
use rib_errors::ErrorReporter;
use rib_model::{ParameterList, Value};

fn record_named_or_call(
    ctx: &mut Context,
    name: &str,
    line: u32,
    positional: &[Value],
    params: &ParameterList,
    call: impl FnOnce(&mut dyn Backend) -> BackendResult<()>,
    backend: &mut dyn Backend,
) -> BackendResult<()> {
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new(name, line, positional.to_vec(), params.clone()));
        Ok(())
    } else {
        call(backend)
    }
}

macro_rules! named_shader_handler {
    ($fn_name:ident, $request:literal, $method:ident) => {
        pub fn $fn_name(
            ctx: &mut Context,
            backend: &mut dyn Backend,
            positional: &[Value],
            params: &ParameterList,
            reporter: &mut dyn ErrorReporter,
            line: u32,
        ) -> BackendResult<()> {
            let name = Args::new(positional, $request, line, ctx.source_name()).string(0, reporter);
            record_named_or_call(ctx, $request, line, positional, params, |b| b.$method(&name, params), backend)
        }
    };
}

named_shader_handler!(surface, "Surface", surface);
named_shader_handler!(displacement, "Displacement", displacement);
named_shader_handler!(atmosphere, "Atmosphere", atmosphere);
named_shader_handler!(imager, "Imager", imager);

pub fn color(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();
    let samples = color_vector("Color", positional, ctx.config.options.color_samples, reporter, &source_name, line);
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Color", line, positional.to_vec(), ParameterList::new()));
        return Ok(());
    }
    backend.color(&samples)
}

pub fn opacity(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();
    let samples = color_vector("Opacity", positional, ctx.config.options.color_samples, reporter, &source_name, line);
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Opacity", line, positional.to_vec(), ParameterList::new()));
        return Ok(());
    }
    backend.opacity(&samples)
}

pub fn orientation(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let orientation = Args::new(positional, "Orientation", line, ctx.source_name()).string(0, reporter);
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Orientation", line, positional.to_vec(), ParameterList::new()));
        return Ok(());
    }
    backend.orientation(&orientation)
}

pub fn sides(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let n = Args::new(positional, "Sides", line, ctx.source_name()).int(0, reporter);
    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("Sides", line, positional.to_vec(), ParameterList::new()));
        return Ok(());
    }
    backend.sides(n)
}
