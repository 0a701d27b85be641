//! Per-request positional arity and geometric-count derivation (spec §4.1,
//! §4.4): how many scalars a request reads before its trailing parameter
//! list starts, and what `ValueCounts` its paramlist should bind against.

use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};
use rib_model::{Value, ValueCounts};

/// `Color` and `Opacity` take no trailing parameter list; their entire
/// argument list is positional, in either of two shapes (spec §4.4).
pub fn is_color_vector(name: &str) -> bool {
    matches!(name, "Color" | "Opacity")
}

/// Normalize `Color`/`Opacity`'s two accepted shapes — N loose floats, or a
/// single N-array — to one flat slice, and check N against the process-wide
/// color-sample count (spec §4.4: "mismatched N is an error").
pub fn color_vector(name: &str, args: &[Value], color_samples: usize, reporter: &mut dyn ErrorReporter, source_name: &str, line: u32) -> Vec<f32> {
    let flat: Vec<f32> = if args.len() == 1 {
        args[0].get_floats().unwrap_or_default()
    } else {
        args.iter().flat_map(|v| v.get_floats().unwrap_or_default()).collect()
    };
    if flat.len() != color_samples {
        reporter.report(Diagnostic::new(
            ErrorCode::WrongArity,
            Severity::Error,
            line,
            source_name,
            format!("{name} expects {color_samples} samples but got {}", flat.len()),
        ));
    }
    flat
}

/// Number of positional (non-paramlist) argument slots a request consumes.
/// Requests not listed take no positional arguments (paramlist only, or
/// none at all).
pub fn positional_arity(name: &str) -> usize {
    match name {
        "Format" => 3,
        "Option" | "Surface" | "Displacement" | "Atmosphere" | "Imager" => 1,
        "Declare" | "ErrorHandler" => 2,
        "Identity" => 0,
        "Translate" | "Scale" => 3,
        "Rotate" => 4,
        "ConcatTransform" => 1,
        "FrameBegin" => 1,
        "SolidBegin" => 1,
        "MotionBegin" => 1,
        // Color/Opacity carry no trailing parameter list at all (spec
        // §4.4): every argument is positional, whether given as loose
        // floats or as one array. `dispatch` special-cases their arity to
        // "all of it" rather than using this table (see `is_color_vector`).
        "Orientation" => 1,
        "Sides" => 1,
        "Sphere" => 4,
        "Cone" | "Disk" => 3,
        "Cylinder" => 4,
        "Torus" => 5,
        "Polygon" => 0,
        "PointsPolygons" => 2,
        "SubdivisionMesh" => 7,
        "LightSource" | "AreaLightSource" => 2,
        "Illuminate" => 2,
        "ObjectBegin" => 1,
        "ObjectInstance" => 1,
        "ArchiveBegin" => 1,
        "ReadArchive" => 1,
        "ArchiveRecord" => 2,
        "IfBegin" | "ElseIf" => 1,
        _ => 0,
    }
}

/// `ValueCounts` for a Polygon request's paramlist, inferred from whichever
/// position attribute (`P`, `Pz`, `Pw`) appears first in the trailing
/// pairs — Polygon carries no explicit vertex count of its own.
pub fn polygon_counts(trailing: &[Value]) -> ValueCounts {
    let mut i = 0;
    while i + 1 < trailing.len() {
        if let Some(name) = trailing[i].get_strings().and_then(|s| s.first().cloned()) {
            let divisor = match name.as_str() {
                "P" => Some(3),
                "Pz" => Some(1),
                "Pw" => Some(4),
                _ => None,
            };
            if let Some(d) = divisor {
                let n = trailing[i + 1].cardinality() / d;
                return ValueCounts::uniform(n, 1);
            }
        }
        i += 2;
    }
    ValueCounts::uniform(0, 1)
}

/// `ValueCounts` for `PointsPolygons`/`SubdivisionMesh`: `facets` from the
/// per-face vertex-count list, `vertices` from the distinct point count the
/// index list references, `face_vertices`/`face_corners` from the total
/// index count (spec §4.1 storage-class table).
pub fn indexed_mesh_counts(nvertices: &[i32], vertex_indices: &[i32]) -> ValueCounts {
    let vertex_count = vertex_indices.iter().copied().max().map(|m| m as usize + 1).unwrap_or(0);
    ValueCounts {
        vertices: vertex_count,
        corners: vertex_count,
        facets: nvertices.len(),
        face_vertices: vertex_indices.len(),
        face_corners: vertex_indices.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_counts_reads_p_array_length() {
        let trailing = vec![
            Value::scalar_string("P".into(), 1),
            Value::array_float(vec![0.0; 12], 1),
        ];
        let counts = polygon_counts(&trailing);
        assert_eq!(counts.vertices, 4);
    }

    #[test]
    fn color_vector_accepts_loose_floats() {
        let args = vec![Value::scalar_float(1.0, 1), Value::scalar_float(0.0, 1), Value::scalar_float(0.0, 1)];
        let mut r = rib_errors::CollectingReporter::default();
        let v = color_vector("Color", &args, 3, &mut r, "a.rib", 1);
        assert_eq!(v, vec![1.0, 0.0, 0.0]);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn color_vector_accepts_a_single_array() {
        let args = vec![Value::array_float(vec![0.25, 0.5, 0.75], 1)];
        let mut r = rib_errors::CollectingReporter::default();
        let v = color_vector("Color", &args, 3, &mut r, "a.rib", 1);
        assert_eq!(v, vec![0.25, 0.5, 0.75]);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn color_vector_mismatched_count_is_an_error() {
        let args = vec![Value::scalar_float(1.0, 1), Value::scalar_float(0.0, 1)];
        let mut r = rib_errors::CollectingReporter::default();
        let v = color_vector("Color", &args, 3, &mut r, "a.rib", 1);
        assert_eq!(v, vec![1.0, 0.0]);
        assert!(!r.diagnostics.is_empty());
    }

    #[test]
    fn indexed_mesh_counts_uses_max_index_plus_one() {
        let counts = indexed_mesh_counts(&[4, 4], &[0, 1, 2, 3, 1, 4, 5, 2]);
        assert_eq!(counts.vertices, 6);
        assert_eq!(counts.facets, 2);
        assert_eq!(counts.face_vertices, 8);
    }
}
