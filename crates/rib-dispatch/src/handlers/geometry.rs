//! Quadric and polygon/subdivision-mesh geometry requests (spec §4.4;
//! `SubdivisionMesh` additionally fans out through C8, spec §4.8.3).

use crate::args::Args;
use crate::context::Context;
use rib_backend::{Backend, BackendResult, TriangleMesh};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_model::{ParameterList, Value};
use rib_subdiv::{ControlMesh, Scheme, SubdivisionSurface};

/// Tessellation depth used for every `SubdivisionMesh` (spec §4.8.2:
/// `ceil(log2(max(u, v)))` for a requested display tessellation `(u, v)`).
/// This core has no display/camera pipeline to source `(u, v)` from, so it
/// uses the depth that formula gives for the smallest non-trivial
/// tessellation, `(2, 2)` → 1, matching spec §8 scenario 6's one
/// refinement step exactly.
const DEFAULT_TESSELLATION_DEPTH: usize = 1;

fn check_geometry_allowed(ctx: &Context, reporter: &mut dyn ErrorReporter, name: &str, line: u32) -> bool {
    if ctx.modes.allow_geometry() {
        return true;
    }
    reporter.report(Diagnostic::new(
        ErrorCode::InvalidNesting,
        Severity::Error,
        line,
        ctx.source_name(),
        format!("{name} is not legal outside a world block"),
    ));
    false
}

fn record_or_call(
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

pub fn sphere(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], params: &ParameterList, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !check_geometry_allowed(ctx, reporter, "Sphere", line) {
        return Ok(());
    }
    let args = Args::new(positional, "Sphere", line, ctx.source_name());
    let (r, zmin, zmax, thetamax) = (args.float(0, reporter), args.float(1, reporter), args.float(2, reporter), args.float(3, reporter));
    record_or_call(ctx, "Sphere", line, positional, params, |b| b.sphere(r, zmin, zmax, thetamax, params), backend)
}

pub fn cone(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], params: &ParameterList, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !check_geometry_allowed(ctx, reporter, "Cone", line) {
        return Ok(());
    }
    let args = Args::new(positional, "Cone", line, ctx.source_name());
    let (height, radius, thetamax) = (args.float(0, reporter), args.float(1, reporter), args.float(2, reporter));
    record_or_call(ctx, "Cone", line, positional, params, |b| b.cone(height, radius, thetamax, params), backend)
}

pub fn cylinder(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], params: &ParameterList, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !check_geometry_allowed(ctx, reporter, "Cylinder", line) {
        return Ok(());
    }
    let args = Args::new(positional, "Cylinder", line, ctx.source_name());
    let (r, zmin, zmax, thetamax) = (args.float(0, reporter), args.float(1, reporter), args.float(2, reporter), args.float(3, reporter));
    record_or_call(ctx, "Cylinder", line, positional, params, |b| b.cylinder(r, zmin, zmax, thetamax, params), backend)
}

pub fn disk(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], params: &ParameterList, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !check_geometry_allowed(ctx, reporter, "Disk", line) {
        return Ok(());
    }
    let args = Args::new(positional, "Disk", line, ctx.source_name());
    let (height, radius, thetamax) = (args.float(0, reporter), args.float(1, reporter), args.float(2, reporter));
    record_or_call(ctx, "Disk", line, positional, params, |b| b.disk(height, radius, thetamax, params), backend)
}

pub fn torus(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], params: &ParameterList, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    if !check_geometry_allowed(ctx, reporter, "Torus", line) {
        return Ok(());
    }
    let args = Args::new(positional, "Torus", line, ctx.source_name());
    let (majorr, minorr, phimin, phimax, thetamax) = (
        args.float(0, reporter),
        args.float(1, reporter),
        args.float(2, reporter),
        args.float(3, reporter),
        args.float(4, reporter),
    );
    record_or_call(ctx, "Torus", line, positional, params, |b| b.torus(majorr, minorr, phimin, phimax, thetamax, params), backend)
}

pub fn polygon(ctx: &mut Context, backend: &mut dyn Backend, positional: &[Value], params: &ParameterList, reporter: &mut dyn ErrorReporter, line: u32, nvertices: i32) -> BackendResult<()> {
    if !check_geometry_allowed(ctx, reporter, "Polygon", line) {
        return Ok(());
    }
    record_or_call(ctx, "Polygon", line, positional, params, |b| b.polygon(nvertices, params), backend)
}

pub fn points_polygons(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    params: &ParameterList,
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    if !check_geometry_allowed(ctx, reporter, "PointsPolygons", line) {
        return Ok(());
    }
    let args = Args::new(positional, "PointsPolygons", line, ctx.source_name());
    let nvertices = args.ints(0, reporter);
    let vertices = args.ints(1, reporter);
    record_or_call(ctx, "PointsPolygons", line, positional, params, |b| b.points_polygons(&nvertices, &vertices, params), backend)
}

pub fn subdivision_mesh(
    ctx: &mut Context,
    backend: &mut dyn Backend,
    positional: &[Value],
    params: &ParameterList,
    reporter: &mut dyn ErrorReporter,
    line: u32,
) -> BackendResult<()> {
    if !check_geometry_allowed(ctx, reporter, "SubdivisionMesh", line) {
        return Ok(());
    }
    let args = Args::new(positional, "SubdivisionMesh", line, ctx.source_name());
    let scheme = args.string(0, reporter);
    let nvertices = args.ints(1, reporter);
    let vertices = args.ints(2, reporter);
    let tags = args.strings(3, reporter);
    let nargs = args.ints(4, reporter);
    let intargs = args.ints(5, reporter);
    let floatargs = args.floats(6, reporter);

    if ctx.is_capturing() {
        ctx.record(rib_macro::RecordedRequest::new("SubdivisionMesh", line, positional.to_vec(), params.clone()));
        return Ok(());
    }

    backend.subdivision_mesh(&scheme, &nvertices, &vertices, &tags, &nargs, &intargs, &floatargs, params)?;

    if Scheme::parse(&scheme) != Scheme::CatmullClark {
        return Ok(());
    }
    let Some(positions) = params.get("P").and_then(|v| v.get_floats()) else {
        return Ok(());
    };
    let positions: Vec<[f32; 3]> = positions.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
    let st = params.get("st").and_then(|v| v.get_floats()).map(|flat| flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect::<Vec<_>>());

    let mut control = ControlMesh::new(Scheme::CatmullClark, &nvertices, &vertices, positions);
    if let Some(st) = st {
        control = control.with_st(st);
    }
    apply_subdivision_tags(&mut control, &tags, &nargs, &intargs, &floatargs, reporter, ctx.source_name(), line);

    let mut surface = SubdivisionSurface::new(control);
    let faces = surface.tessellate(DEFAULT_TESSELLATION_DEPTH);

    let mut mesh = TriangleMesh {
        positions: Vec::new(),
        normals: Some(Vec::new()),
        st: if faces.iter().any(|f| f.st.is_some()) { Some(Vec::new()) } else { None },
        indices: Vec::new(),
    };
    for face in faces {
        let base = mesh.positions.len() as u32;
        mesh.positions.extend(face.positions);
        if let Some(normals) = mesh.normals.as_mut() {
            normals.extend(face.normals);
        }
        if let (Some(mesh_st), Some(face_st)) = (mesh.st.as_mut(), face.st) {
            mesh_st.extend(face_st);
        }
        mesh.indices.extend(face.indices.into_iter().map(|[a, b, c]| [a + base, b + base, c + base]));
    }
    backend.triangle_mesh(&mesh)
}

/// Walk the flattened tag arrays (spec §4.8.1 wire layout: `tags[i]` names
/// the tag, `nargs[2*i]`/`nargs[2*i+1]` give its int/float argument counts)
/// and apply each to the control mesh before tessellation.
fn apply_subdivision_tags(
    control: &mut ControlMesh,
    tags: &[String],
    nargs: &[i32],
    intargs: &[i32],
    floatargs: &[f32],
    reporter: &mut dyn ErrorReporter,
    source_name: &str,
    line: u32,
) {
    let (mut int_off, mut float_off) = (0usize, 0usize);
    for (i, tag) in tags.iter().enumerate() {
        let n_ints = nargs.get(2 * i).copied().unwrap_or(0).max(0) as usize;
        let n_floats = nargs.get(2 * i + 1).copied().unwrap_or(0).max(0) as usize;
        let ints = &intargs[int_off.min(intargs.len())..(int_off + n_ints).min(intargs.len())];
        let floats = &floatargs[float_off.min(floatargs.len())..(float_off + n_floats).min(floatargs.len())];
        int_off += n_ints;
        float_off += n_floats;

        match tag.as_str() {
            "hole" => control.apply_hole(&ints.iter().map(|&i| i as u32).collect::<Vec<_>>()),
            "crease" => control.apply_crease(&ints.iter().map(|&i| i as u32).collect::<Vec<_>>(), floats, reporter, source_name, line),
            "corner" => control.apply_corner(&ints.iter().map(|&i| i as u32).collect::<Vec<_>>(), floats, reporter, source_name, line),
            "interpolateboundary" => control.apply_interpolate_boundary(),
            other => reporter.report(Diagnostic::new(
                ErrorCode::BadParameterList,
                Severity::Warning,
                line,
                source_name,
                format!("unrecognized subdivision tag \"{other}\", ignored"),
            )),
        }
    }
}
