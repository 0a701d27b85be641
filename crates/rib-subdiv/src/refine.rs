//! Catmull–Clark refinement step (spec §4.8.2): one level of topology plus
//! position refinement, built from the previous level.

use crate::mesh::{Topology, VertexKind};
use crate::vecmath::{add3, avg3, lerp3, scale3, zero3};

/// One refinement level: topology plus the vertex positions living at that
/// topology's vertex indices (spec §3 "Subdivision mesh (one per
/// refinement step)").
#[derive(Debug, Clone)]
pub struct Level {
    pub topology: Topology,
    pub positions: Vec<[f32; 3]>,
}

/// Smooth-vertex Catmull–Clark position, ignoring any corner/crease
/// override — used both directly (plain smooth vertices) and as the
/// blend target for partially-sharp corners and 2-crease vertices (spec
/// §4.8.2 vertex-point table).
fn smooth_vertex_point(topology: &Topology, positions: &[[f32; 3]], face_points: &[[f32; 3]], v: u32) -> [f32; 3] {
    let vertex = &topology.vertices[v as usize];
    let n = vertex.valence().max(1) as f32;
    let v_pos = positions[v as usize];

    let neighbour_sum = vertex
        .incident_edges
        .iter()
        .fold(zero3(), |acc, &e| add3(acc, positions[topology.edges[e as usize].other(v) as usize]));
    let face_sum = vertex
        .adjacent_faces
        .iter()
        .fold(zero3(), |acc, &f| add3(acc, face_points[f as usize]));

    let term_v = scale3(v_pos, (n - 2.0) / n);
    let term_edges = scale3(neighbour_sum, 1.0 / (n * n));
    let term_faces = scale3(face_sum, 1.0 / (n * n));
    add3(add3(term_v, term_edges), term_faces)
}

/// Boundary-vertex rule: `(6V + Σ boundary-neighbours) / (6 + k)` (spec
/// §4.8.2 vertex-point table).
fn boundary_vertex_point(topology: &Topology, positions: &[[f32; 3]], v: u32) -> [f32; 3] {
    let vertex = &topology.vertices[v as usize];
    let v_pos = positions[v as usize];
    let boundary_neighbours: Vec<[f32; 3]> = vertex
        .incident_edges
        .iter()
        .filter(|&&e| topology.edges[e as usize].is_boundary())
        .map(|&e| positions[topology.edges[e as usize].other(v) as usize])
        .collect();
    let k = boundary_neighbours.len() as f32;
    let sum = boundary_neighbours.into_iter().fold(zero3(), add3);
    scale3(add3(scale3(v_pos, 6.0), sum), 1.0 / (6.0 + k))
}

fn new_vertex_point(topology: &Topology, positions: &[[f32; 3]], face_points: &[[f32; 3]], v: u32) -> [f32; 3] {
    let vertex = &topology.vertices[v as usize];
    let v_pos = positions[v as usize];
    let crease_edges: Vec<u32> = vertex
        .incident_edges
        .iter()
        .copied()
        .filter(|&e| topology.edges[e as usize].blend > 0.0)
        .collect();
    let is_boundary = vertex.incident_edges.iter().any(|&e| topology.edges[e as usize].is_boundary());

    if vertex.kind == VertexKind::Corner {
        if vertex.blend >= 1.0 {
            return v_pos;
        }
        let smooth = smooth_vertex_point(topology, positions, face_points, v);
        return lerp3(smooth, v_pos, vertex.blend);
    }

    if crease_edges.len() > 2 {
        return v_pos;
    }

    if crease_edges.len() == 2 {
        let a = topology.edges[crease_edges[0] as usize].other(v);
        let b = topology.edges[crease_edges[1] as usize].other(v);
        let blend_avg = (topology.edges[crease_edges[0] as usize].blend + topology.edges[crease_edges[1] as usize].blend) / 2.0;
        let crease_target = scale3(
            add3(add3(scale3(v_pos, 6.0), positions[a as usize]), positions[b as usize]),
            1.0 / 8.0,
        );
        let smooth = smooth_vertex_point(topology, positions, face_points, v);
        return lerp3(smooth, crease_target, blend_avg);
    }

    if is_boundary {
        return boundary_vertex_point(topology, positions, v);
    }

    smooth_vertex_point(topology, positions, face_points, v)
}

fn edge_point(topology: &Topology, positions: &[[f32; 3]], face_points: &[[f32; 3]], edge_idx: usize) -> [f32; 3] {
    let edge = &topology.edges[edge_idx];
    let a = positions[edge.v1 as usize];
    let b = positions[edge.v2 as usize];
    if edge.is_boundary() {
        return lerp3(a, b, 0.5);
    }
    let smooth = scale3(
        add3(add3(a, b), add3(face_points[edge.faces[0].unwrap() as usize], face_points[edge.faces[1].unwrap() as usize])),
        0.25,
    );
    if edge.blend >= 1.0 {
        return lerp3(a, b, 0.5);
    }
    if edge.blend <= 0.0 {
        return smooth;
    }
    lerp3(smooth, lerp3(a, b, 0.5), edge.blend)
}

/// Generic linear refinement for "varying" attributes (spec §4.8.2): copy
/// at old vertices, average at edge midpoints, centroid at face centers.
/// Works for any fixed-width scalar attribute (colors, texture
/// coordinates...) since the rule itself does not depend on the attribute's
/// meaning.
pub fn refine_linear_attr<const K: usize>(topology: &Topology, attr: &[[f32; K]]) -> Vec<[f32; K]> {
    let face_points: Vec<[f32; K]> = topology
        .facets
        .iter()
        .map(|f| centroid(&f.verts.iter().map(|&v| attr[v as usize]).collect::<Vec<_>>()))
        .collect();
    let edge_points: Vec<[f32; K]> = topology
        .edges
        .iter()
        .map(|e| lerp_k(attr[e.v1 as usize], attr[e.v2 as usize], 0.5))
        .collect();
    let mut out = Vec::with_capacity(topology.facets.len() + topology.edges.len() + topology.vertices.len());
    out.extend(face_points);
    out.extend(edge_points);
    out.extend(attr.iter().copied());
    out
}

fn centroid<const K: usize>(points: &[[f32; K]]) -> [f32; K] {
    let mut sum = [0.0f32; K];
    for p in points {
        for i in 0..K {
            sum[i] += p[i];
        }
    }
    let n = points.len().max(1) as f32;
    for v in sum.iter_mut() {
        *v /= n;
    }
    sum
}

fn lerp_k<const K: usize>(a: [f32; K], b: [f32; K], t: f32) -> [f32; K] {
    let mut out = [0.0f32; K];
    for i in 0..K {
        out[i] = a[i] * (1.0 - t) + b[i] * t;
    }
    out
}

/// Build the new quad topology and its vertex positions from `prev` (spec
/// §4.8.2). Returns the new level; the new index scheme concatenates
/// `[face_points, edge_points, vertex_points]`, matching the canonical
/// Catmull–Clark layout.
pub fn refine_step(prev: &Level) -> Level {
    let topo = &prev.topology;
    let num_faces = topo.facets.len();
    let num_edges = topo.edges.len();
    let num_verts = topo.vertices.len();

    let face_points: Vec<[f32; 3]> = topo
        .facets
        .iter()
        .map(|f| avg3(&f.verts.iter().map(|&v| prev.positions[v as usize]).collect::<Vec<_>>()))
        .collect();
    let edge_points: Vec<[f32; 3]> = (0..num_edges).map(|e| edge_point(topo, &prev.positions, &face_points, e)).collect();
    let vertex_points: Vec<[f32; 3]> = (0..num_verts as u32).map(|v| new_vertex_point(topo, &prev.positions, &face_points, v)).collect();

    let face_point_idx = |f: u32| f;
    let edge_point_idx = |e: u32| num_faces as u32 + e;
    let vertex_point_idx = |v: u32| (num_faces + num_edges) as u32 + v;

    let mut new_nvertices: Vec<i32> = Vec::new();
    let mut new_vertex_indices: Vec<i32> = Vec::new();
    let mut source_face: Vec<u32> = Vec::new();

    for (f_idx, facet) in topo.facets.iter().enumerate() {
        let n = facet.verts.len();
        for i in 0..n {
            let v_i = facet.verts[i];
            let edge_after = facet.edges[i];
            let edge_before = facet.edges[(i + n - 1) % n];
            new_nvertices.push(4);
            new_vertex_indices.extend_from_slice(&[
                vertex_point_idx(v_i) as i32,
                edge_point_idx(edge_after) as i32,
                face_point_idx(f_idx as u32) as i32,
                edge_point_idx(edge_before) as i32,
            ]);
            source_face.push(f_idx as u32);
        }
    }

    let total_new_vertices = num_faces + num_edges + num_verts;
    let mut new_topology = Topology::build(&new_nvertices, &new_vertex_indices, total_new_vertices);

    for (new_idx, facet) in new_topology.facets.iter_mut().enumerate() {
        let old = &topo.facets[source_face[new_idx] as usize];
        facet.kind = old.kind;
        facet.original_face = old.original_face;
    }

    // Propagate crease blend onto the "radial" edges that split an old
    // edge in half (vertex-point <-> edge-point); interior face-point <->
    // edge-point edges are always new and never creased (spec §4.8.2: the
    // two endpoints' positions at a fully-sharp crease remain exact at
    // every level, which requires this inheritance).
    let vp_start = (num_faces + num_edges) as u32;
    for edge in new_topology.edges.iter_mut() {
        let (v1, v2) = (edge.v1, edge.v2);
        let (vp, ep) = if v1 >= vp_start {
            (v1, v2)
        } else if v2 >= vp_start {
            (v2, v1)
        } else {
            continue;
        };
        if ep < num_faces as u32 {
            continue; // face-point <-> vertex-point never occurs in this scheme
        }
        let old_edge = ep - num_faces as u32;
        edge.blend = topo.edges[old_edge as usize].blend;
        let _ = vp;
    }

    // New vertices that are copies of old vertices inherit corner
    // kind/blend; face points and edge points start out rounded/smooth (any
    // sharpness they carry shows up through the inherited edge blends
    // above, which the next level's vertex rule reads back out).
    for (v, vertex) in topo.vertices.iter().enumerate() {
        let new_idx = vertex_point_idx(v as u32) as usize;
        new_topology.vertices[new_idx].kind = vertex.kind;
        new_topology.vertices[new_idx].blend = vertex.blend;
    }

    let mut positions = Vec::with_capacity(total_new_vertices);
    positions.extend(face_points);
    positions.extend(edge_points);
    positions.extend(vertex_points);

    Level {
        topology: new_topology,
        positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Topology;

    fn unit_quad() -> Level {
        Level {
            topology: Topology::build(&[4], &[0, 1, 2, 3], 4),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    #[test]
    fn single_quad_refines_into_four_quads_with_centroid_vertex() {
        let base = unit_quad();
        let next = refine_step(&base);
        assert_eq!(next.topology.facets.len(), 4);
        assert!(next.topology.facets.iter().all(|f| f.verts.len() == 4));
        // The face point (index 0) sits at the centroid of the original quad.
        assert!((next.positions[0][0] - 0.5).abs() < 1e-6);
        assert!((next.positions[0][1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn topological_invariants_hold_after_a_refinement_step() {
        let base = unit_quad();
        let next = refine_step(&base);
        next.topology.check_invariants();
        for edge in &next.topology.edges {
            assert!(edge.v1 < edge.v2);
        }
    }

    #[test]
    fn fully_sharp_crease_is_preserved_through_refinement() {
        let mut base = unit_quad();
        base.topology.edges[0].blend = 1.0;
        let (a, b) = (base.topology.edges[0].v1, base.topology.edges[0].v2);
        let expected = lerp3(base.positions[a as usize], base.positions[b as usize], 0.5);
        let next = refine_step(&base);
        let new_edge = next
            .topology
            .edges
            .iter()
            .find(|e| e.blend >= 1.0)
            .expect("crease blend propagated to a child edge");
        let midpoint = lerp3(next.positions[new_edge.v1 as usize], next.positions[new_edge.v2 as usize], 0.5);
        assert!((midpoint[0] - expected[0]).abs() < 1e-5);
        assert!((midpoint[1] - expected[1]).abs() < 1e-5);
    }
}
