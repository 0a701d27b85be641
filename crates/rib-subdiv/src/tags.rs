//! Tag application (spec §4.8.1): hole, crease, corner,
//! interpolateboundary.

use crate::mesh::{FacetKind, Topology, VertexKind};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};

/// `blend = 1 - 1/(s+1)`, clamped to `[0, 1]`; `s = ∞` maps to `1.0` exactly
/// (glossary "Blend (sharpness)").
pub fn sharpness_to_blend(sharpness: f32) -> f32 {
    if sharpness.is_infinite() && sharpness > 0.0 {
        return 1.0;
    }
    (1.0 - 1.0 / (sharpness + 1.0)).clamp(0.0, 1.0)
}

pub fn apply_hole(topology: &mut Topology, faces: &[u32]) {
    for &f in faces {
        if let Some(facet) = topology.facets.get_mut(f as usize) {
            facet.kind = FacetKind::Hole;
        }
    }
}

/// `sharpnesses` is expected to carry one value per edge in `chain`'s walk
/// (i.e. `chain.len() - 1` entries). Fewer sharpnesses than edges is
/// underspecified upstream (spec §9 open question): this implementation
/// repeats the last supplied sharpness and warns.
pub fn apply_crease(
    topology: &mut Topology,
    chain: &[u32],
    sharpnesses: &[f32],
    reporter: &mut dyn ErrorReporter,
    source_name: &str,
    line: u32,
) {
    if chain.len() < 2 {
        return;
    }
    let edge_count = chain.len() - 1;
    if sharpnesses.len() < edge_count && !sharpnesses.is_empty() {
        reporter.report(Diagnostic::new(
            ErrorCode::BadParameterList,
            Severity::Warning,
            line,
            source_name,
            format!(
                "crease chain has {} edges but only {} sharpness value(s); repeating the last",
                edge_count,
                sharpnesses.len()
            ),
        ));
    }
    for i in 0..edge_count {
        let a = chain[i];
        let b = chain[i + 1];
        let s = sharpnesses
            .get(i)
            .or_else(|| sharpnesses.last())
            .copied()
            .unwrap_or(0.0);
        let blend = sharpness_to_blend(s);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        if let Some(edge) = topology.edges.iter_mut().find(|e| e.v1 == lo && e.v2 == hi) {
            edge.blend = edge.blend.max(blend);
        }
    }
}

/// `sharpnesses` is either one value (applied to every vertex) or one value
/// per vertex in `verts`. Fewer-than-full is the same underspecified case
/// as `crease` (spec §9): repeat the last and warn.
pub fn apply_corner(
    topology: &mut Topology,
    verts: &[u32],
    sharpnesses: &[f32],
    reporter: &mut dyn ErrorReporter,
    source_name: &str,
    line: u32,
) {
    if sharpnesses.len() < verts.len() && sharpnesses.len() > 1 {
        reporter.report(Diagnostic::new(
            ErrorCode::BadParameterList,
            Severity::Warning,
            line,
            source_name,
            format!(
                "corner tag names {} vertices but only {} sharpness value(s); repeating the last",
                verts.len(),
                sharpnesses.len()
            ),
        ));
    }
    for (i, &v) in verts.iter().enumerate() {
        let s = if sharpnesses.len() == 1 {
            sharpnesses[0]
        } else {
            sharpnesses
                .get(i)
                .or_else(|| sharpnesses.last())
                .copied()
                .unwrap_or(0.0)
        };
        if let Some(vertex) = topology.vertices.get_mut(v as usize) {
            vertex.kind = VertexKind::Corner;
            vertex.blend = sharpness_to_blend(s).max(vertex.blend);
        }
    }
}

pub fn apply_interpolate_boundary(topology: &mut Topology) {
    for edge in topology.edges.iter_mut().filter(|e| e.is_boundary()) {
        edge.blend = 1.0;
    }
    let boundary_counts: Vec<usize> = (0..topology.vertices.len())
        .map(|v| {
            topology.vertices[v]
                .incident_edges
                .iter()
                .filter(|&&e| topology.edges[e as usize].is_boundary())
                .count()
        })
        .collect();
    for (v, count) in boundary_counts.into_iter().enumerate() {
        if count >= 2 {
            topology.vertices[v].kind = VertexKind::Corner;
            topology.vertices[v].blend = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rib_errors::CollectingReporter;

    #[test]
    fn infinite_sharpness_is_fully_sharp() {
        assert_eq!(sharpness_to_blend(f32::INFINITY), 1.0);
    }

    #[test]
    fn zero_sharpness_is_smooth() {
        assert_eq!(sharpness_to_blend(0.0), 0.0);
    }

    #[test]
    fn sharpness_one_gives_half_blend() {
        assert!((sharpness_to_blend(1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hole_marks_facet() {
        let mut topo = crate::mesh::Topology::build(&[4], &[0, 1, 2, 3], 4);
        apply_hole(&mut topo, &[0]);
        assert_eq!(topo.facets[0].kind, FacetKind::Hole);
    }

    #[test]
    fn interpolateboundary_makes_every_quad_vertex_a_corner() {
        let mut topo = crate::mesh::Topology::build(&[4], &[0, 1, 2, 3], 4);
        apply_interpolate_boundary(&mut topo);
        assert!(topo.vertices.iter().all(|v| v.kind == VertexKind::Corner));
        assert!(topo.edges.iter().all(|e| e.blend == 1.0));
    }

    #[test]
    fn short_crease_sharpness_list_repeats_last_and_warns() {
        let mut topo = crate::mesh::Topology::build(&[4, 4], &[0, 1, 2, 3, 1, 4, 5, 2], 6);
        let mut r = CollectingReporter::default();
        apply_crease(&mut topo, &[1, 2], &[10.0], &mut r, "a.rib", 1);
        assert!(r.diagnostics.is_empty());
        apply_crease(&mut topo, &[0, 1, 2], &[10.0], &mut r, "a.rib", 1);
        assert!(!r.diagnostics.is_empty());
    }
}
