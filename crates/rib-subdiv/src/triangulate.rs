//! Triangulation of a refined quad mesh into flat triangle-fan output (spec
//! §4.8.3). Kept free of `rib_backend::TriangleMesh` since this crate does
//! not depend on rib-backend; callers convert.

use crate::mesh::FacetKind;
use crate::refine::Level;
use crate::vecmath::{cross3, normalize3, sub3};

/// A single tessellated output face: one triangle fan per refined quad,
/// grouped back to the control-mesh face it descended from so callers can
/// re-attach per-face primitive variables (spec §4.8.3 "grouped per
/// original control-mesh face").
#[derive(Debug, Clone)]
pub struct TessellatedFace {
    pub original_face: u32,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub st: Option<Vec<[f32; 2]>>,
    /// Indices into this face's own `positions`/`normals`/`st`, triangle fans
    /// flattened to triples.
    pub indices: Vec<[u32; 3]>,
}

fn face_normal(positions: &[[f32; 3]], verts: &[u32]) -> [f32; 3] {
    if verts.len() < 3 {
        return [0.0, 0.0, 1.0];
    }
    let a = positions[verts[0] as usize];
    let b = positions[verts[1] as usize];
    let c = positions[verts[2] as usize];
    normalize3(cross3(sub3(b, a), sub3(c, a)))
}

/// Triangulate a refined `Level` into per-control-face triangle fans.
/// Holes (spec §4.8.1 `hole`) are omitted entirely; faces with no
/// pre-supplied normals get one computed from their own positions (spec
/// §4.8.3 "normals computed when absent").
///
/// `st` is optional face-varying texture data already refined to this
/// level's vertex count (spec §4.8.2 "simplified face-varying (ST)
/// refinement"); when present it is grouped per face the same way as
/// positions.
pub fn triangulate(level: &Level, st: Option<&[[f32; 2]]>) -> Vec<TessellatedFace> {
    let mut out = Vec::new();
    for facet in &level.topology.facets {
        if facet.kind == FacetKind::Hole {
            continue;
        }
        let positions: Vec<[f32; 3]> = facet.verts.iter().map(|&v| level.positions[v as usize]).collect();
        let local_normal = face_normal(&positions, &(0..positions.len() as u32).collect::<Vec<_>>());
        let normals = vec![local_normal; positions.len()];
        let face_st = st.map(|buf| facet.verts.iter().map(|&v| buf[v as usize]).collect());

        // Spec §4.8.3: for each quad facet `(start, a, b, end)`, emit the
        // fan `(end, a, start)` and advance — the reverse of the more
        // common start-anchored winding.
        let n = positions.len();
        let mut indices = Vec::with_capacity(n.saturating_sub(2));
        for i in 1..n.saturating_sub(1) {
            indices.push([(i + 1) as u32, i as u32, 0u32]);
        }

        out.push(TessellatedFace {
            original_face: facet.original_face,
            positions,
            normals,
            st: face_st,
            indices,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Topology;

    fn unit_quad_level() -> Level {
        Level {
            topology: Topology::build(&[4], &[0, 1, 2, 3], 4),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    #[test]
    fn quad_triangulates_into_two_triangles() {
        let faces = triangulate(&unit_quad_level(), None);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].indices.len(), 2);
        assert_eq!(faces[0].normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn hole_faces_are_omitted() {
        let mut level = unit_quad_level();
        level.topology.facets[0].kind = FacetKind::Hole;
        let faces = triangulate(&level, None);
        assert!(faces.is_empty());
    }

    #[test]
    fn face_varying_st_is_grouped_per_face() {
        let level = unit_quad_level();
        let st = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let faces = triangulate(&level, Some(&st));
        assert_eq!(faces[0].st.as_ref().unwrap().len(), 4);
    }
}
