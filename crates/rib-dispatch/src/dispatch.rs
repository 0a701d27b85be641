//! C4: the request-dispatch table (spec §4.4, §6.3). `dispatch` is the
//! entry point the host drives per parsed request: it splits raw wire args
//! into positional/trailing halves, binds the trailing half into a
//! `ParameterList`, applies the `If` conditional gate and motion-signature
//! check, then hands off to `dispatch_bound`. `dispatch_bound` is the part
//! that actually knows, per request name, which backend method to call (or
//! which macro to capture into) — both live dispatch and macro replay
//! (`crate::replay::Replayer`) funnel through it so there is exactly one
//! implementation of each request's behavior (spec §9).

use crate::bind::{bind_paramlist, split_positional};
use crate::context::Context;
use crate::handlers::{archives, attributes, blocks, conditionals, geometry, lights, objects, options, transform};
use crate::shape::{self, positional_arity};
use rib_backend::{Backend, BackendResult};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_model::{ParameterList, Value, ValueCounts};

/// Requests whose nesting must always be tracked, even from inside a
/// suppressed `If`/`ElseIf`/`Else` branch (spec §4.7: the chain itself
/// must stay balanced regardless of which branch is taken).
fn is_conditional_control(name: &str) -> bool {
    matches!(name, "IfBegin" | "ElseIf" | "Else" | "IfEnd")
}

fn resolve_counts(name: &str, positional: &[Value], reporter: &mut dyn ErrorReporter, source_name: &str, line: u32) -> ValueCounts {
    match name {
        "PointsPolygons" => {
            let nvertices = positional.first().and_then(|v| v.get_ints(reporter, source_name)).unwrap_or_default();
            let vertices = positional.get(1).and_then(|v| v.get_ints(reporter, source_name)).unwrap_or_default();
            shape::indexed_mesh_counts(&nvertices, &vertices)
        }
        "SubdivisionMesh" => {
            let nvertices = positional.get(1).and_then(|v| v.get_ints(reporter, source_name)).unwrap_or_default();
            let vertices = positional.get(2).and_then(|v| v.get_ints(reporter, source_name)).unwrap_or_default();
            shape::indexed_mesh_counts(&nvertices, &vertices)
        }
        _ => {
            let _ = line;
            ValueCounts::uniform(1, 1)
        }
    }
}

/// The host-facing entry point: one raw, unsplit argument list per parsed
/// request.
pub fn dispatch(ctx: &mut Context, backend: &mut dyn Backend, name: &str, args: Vec<Value>, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();

    if name == "Declare" {
        options::declare(ctx, &args, reporter, line);
        return Ok(());
    }
    if name == "ErrorHandler" {
        options::error_handler(ctx, &args, reporter, line);
        return Ok(());
    }

    if !is_conditional_control(name) && !ctx.conditionals.dispatch_active() {
        return Ok(());
    }

    if ctx.in_motion() && !matches!(name, "MotionBegin" | "MotionEnd") {
        if let Err(diagnostic) = ctx.record_motion_sample(name, &args, line) {
            reporter.report(diagnostic);
        }
    }

    let arity = if name == "Polygon" {
        0
    } else if shape::is_color_vector(name) {
        // No trailing parameter list at all (spec §4.4): every argument,
        // loose floats or one array, is positional.
        args.len()
    } else {
        positional_arity(name)
    };
    let (positional, trailing) = split_positional(&args, arity);

    let counts = if name == "Polygon" {
        shape::polygon_counts(trailing)
    } else {
        resolve_counts(name, positional, reporter, &source_name, line)
    };

    let params = if trailing.is_empty() {
        ParameterList::new()
    } else {
        bind_paramlist(trailing, &ctx.config.declarations, &counts, ctx.config.options.color_samples, reporter, &source_name, name, line)
    };

    if name == "Polygon" {
        return geometry::polygon(ctx, backend, positional, &params, reporter, line, counts.vertices as i32);
    }

    dispatch_bound(ctx, backend, name, positional, &params, reporter, line)
}

/// The shared per-request switch: `args` here are already split to
/// positional-only (no trailing name/value pairs) and `params` is already
/// bound. Both live `dispatch` and `crate::replay::Replayer` call this.
pub fn dispatch_bound(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    name: &str,
    args: &[Value],
    params: &ParameterList,
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    match name {
        "Format" => options::format(backend, args, reporter, ctx.source_name(), line),
        "Option" => options::option(ctx, backend, args, params, reporter, line),

        "Identity" => transform::identity(ctx, backend),
        "Translate" => transform::translate(ctx, backend, args, reporter, line),
        "Rotate" => transform::rotate(ctx, backend, args, reporter, line),
        "Scale" => transform::scale(ctx, backend, args, reporter, line),
        "ConcatTransform" => transform::concat_transform(ctx, backend, args, reporter, line),

        "FrameBegin" => blocks::frame_begin(ctx, backend, args, reporter, line),
        "FrameEnd" => blocks::frame_end(ctx, backend, reporter, line),
        "WorldBegin" => blocks::world_begin(ctx, backend, reporter, line),
        "WorldEnd" => blocks::world_end(ctx, backend, reporter, line),
        "AttributeBegin" => blocks::attribute_begin(ctx, backend, reporter, line),
        "AttributeEnd" => blocks::attribute_end(ctx, backend, reporter, line),
        "TransformBegin" => blocks::transform_begin(ctx, backend, reporter, line),
        "TransformEnd" => blocks::transform_end(ctx, backend, reporter, line),
        "SolidBegin" => blocks::solid_begin(ctx, backend, args, reporter, line),
        "SolidEnd" => blocks::solid_end(ctx, backend, reporter, line),
        "MotionBegin" => blocks::motion_begin(ctx, backend, args, reporter, line),
        "MotionEnd" => blocks::motion_end(ctx, backend, reporter, line),

        "Surface" => attributes::surface(ctx, backend, args, params, reporter, line),
        "Displacement" => attributes::displacement(ctx, backend, args, params, reporter, line),
        "Atmosphere" => attributes::atmosphere(ctx, backend, args, params, reporter, line),
        "Imager" => attributes::imager(ctx, backend, args, params, reporter, line),
        "Color" => attributes::color(ctx, backend, args, reporter, line),
        "Opacity" => attributes::opacity(ctx, backend, args, reporter, line),
        "Orientation" => attributes::orientation(ctx, backend, args, reporter, line),
        "Sides" => attributes::sides(ctx, backend, args, reporter, line),

        "Sphere" => geometry::sphere(ctx, backend, args, params, reporter, line),
        "Cone" => geometry::cone(ctx, backend, args, params, reporter, line),
        "Cylinder" => geometry::cylinder(ctx, backend, args, params, reporter, line),
        "Disk" => geometry::disk(ctx, backend, args, params, reporter, line),
        "Torus" => geometry::torus(ctx, backend, args, params, reporter, line),
        "Polygon" => {
            let nvertices = polygon_count_from_bound_params(params) as i32;
            geometry::polygon(ctx, backend, args, params, reporter, line, nvertices)
        }
        "PointsPolygons" => geometry::points_polygons(ctx, backend, args, params, reporter, line),
        "SubdivisionMesh" => geometry::subdivision_mesh(ctx, backend, args, params, reporter, line),

        "LightSource" => lights::light_source(ctx, backend, args, params, reporter, line),
        "AreaLightSource" => lights::area_light_source(ctx, backend, args, params, reporter, line),
        "Illuminate" => lights::illuminate(ctx, backend, args, reporter, line),

        "ObjectBegin" => objects::object_begin(ctx, backend, args, reporter, line),
        "ObjectEnd" => objects::object_end(ctx, backend, reporter, line),
        "ObjectInstance" => objects::object_instance(ctx, backend, args, reporter, line),

        "ArchiveBegin" => archives::archive_begin(ctx, backend, args, params, reporter, line),
        "ArchiveEnd" => archives::archive_end(ctx, backend, reporter, line),
        "ReadArchive" => archives::read_archive(ctx, backend, args, params, reporter, line),
        "ArchiveRecord" => archives::archive_record(ctx, backend, args, reporter, line),

        "IfBegin" => conditionals::if_begin(ctx, args, reporter, line),
        "ElseIf" => conditionals::else_if(ctx, args, reporter, line),
        "Else" => conditionals::else_branch(ctx),
        "IfEnd" => conditionals::if_end(ctx, reporter, line),

        "Declare" => {
            options::declare(ctx, args, reporter, line);
            Ok(())
        }
        "ErrorHandler" => {
            options::error_handler(ctx, args, reporter, line);
            Ok(())
        }

        other => {
            reporter.report(Diagnostic::new(
                ErrorCode::BadToken,
                Severity::Warning,
                line,
                ctx.source_name(),
                format!("unrecognized request \"{other}\", ignored"),
            ));
            Ok(())
        }
    }
}

/// `Polygon`'s replay path reaches `dispatch_bound` with its paramlist
/// already bound (the recorded request never carries the original trailing
/// token pairs), so the vertex count is re-derived from the bound `P`/`Pz`/
/// `Pw` entry directly rather than from `shape::polygon_counts`, which
/// expects the raw pre-binding token stream.
fn polygon_count_from_bound_params(params: &ParameterList) -> usize {
    for (name, divisor) in [("P", 3), ("Pz", 1), ("Pw", 4)] {
        if let Some(value) = params.get(name) {
            return value.cardinality() / divisor;
        }
    }
    0
}
