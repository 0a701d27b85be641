//! Subdivision mesh topology: vertices, edges, facets, and the index
//! buffers tying them together (spec §3 "Subdivision mesh").

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    Rounded,
    Corner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    Filled,
    Hole,
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub incident_edges: Vec<u32>,
    pub adjacent_faces: Vec<u32>,
    pub kind: VertexKind,
    pub blend: f32,
}

impl Vertex {
    fn new() -> Self {
        Self {
            incident_edges: Vec::new(),
            adjacent_faces: Vec::new(),
            kind: VertexKind::Rounded,
            blend: 0.0,
        }
    }

    pub fn valence(&self) -> usize {
        self.incident_edges.len()
    }
}

/// `v1 < v2` always (spec §3 invariant); `faces` holds up to two adjacent
/// facet indices in insertion order, a boundary edge has only one.
#[derive(Debug, Clone)]
pub struct Edge {
    pub v1: u32,
    pub v2: u32,
    pub faces: [Option<u32>; 2],
    pub blend: f32,
}

impl Edge {
    pub fn is_boundary(&self) -> bool {
        self.faces[1].is_none()
    }

    pub fn other(&self, v: u32) -> u32 {
        if self.v1 == v {
            self.v2
        } else {
            self.v1
        }
    }
}

#[derive(Debug, Clone)]
pub struct Facet {
    pub verts: Vec<u32>,
    pub edges: Vec<u32>,
    pub kind: FacetKind,
    pub boundary: bool,
    pub original_face: u32,
}

/// One level of subdivision mesh topology (no attribute data — those live
/// alongside in `Level`).
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub facets: Vec<Facet>,
}

impl Topology {
    /// Build from a flattened polygonal control mesh: `nvertices[f]` is the
    /// vertex count of face `f`; `vertex_indices` is the concatenation of
    /// each face's vertex indices (spec §4.8.1).
    pub fn build(nvertices: &[i32], vertex_indices: &[i32], vertex_count: usize) -> Self {
        let mut vertices: Vec<Vertex> = (0..vertex_count).map(|_| Vertex::new()).collect();
        let mut edges: Vec<Edge> = Vec::new();
        let mut edge_lookup: HashMap<(u32, u32), usize> = HashMap::new();
        let mut facets: Vec<Facet> = Vec::with_capacity(nvertices.len());

        let mut offset = 0usize;
        for (face_idx, &n) in nvertices.iter().enumerate() {
            let n = n as usize;
            let verts: Vec<u32> = vertex_indices[offset..offset + n]
                .iter()
                .map(|&i| i as u32)
                .collect();
            offset += n;

            let mut face_edges = Vec::with_capacity(n);
            for i in 0..n {
                let a = verts[i];
                let b = verts[(i + 1) % n];
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                let edge_idx = *edge_lookup.entry((lo, hi)).or_insert_with(|| {
                    edges.push(Edge {
                        v1: lo,
                        v2: hi,
                        faces: [None, None],
                        blend: 0.0,
                    });
                    edges.len() - 1
                });
                let edge = &mut edges[edge_idx];
                if edge.faces[0].is_none() {
                    edge.faces[0] = Some(face_idx as u32);
                } else if edge.faces[1].is_none() {
                    edge.faces[1] = Some(face_idx as u32);
                }
                face_edges.push(edge_idx as u32);
                vertices[a as usize].adjacent_faces.push(face_idx as u32);
            }

            facets.push(Facet {
                verts,
                edges: face_edges,
                kind: FacetKind::Filled,
                boundary: false,
                original_face: face_idx as u32,
            });
        }

        for (edge_idx, edge) in edges.iter().enumerate() {
            vertices[edge.v1 as usize].incident_edges.push(edge_idx as u32);
            vertices[edge.v2 as usize].incident_edges.push(edge_idx as u32);
        }

        for facet in &mut facets {
            facet.boundary = facet
                .edges
                .iter()
                .any(|&e| edges[e as usize].is_boundary());
        }

        Self {
            vertices,
            edges,
            facets,
        }
    }

    pub fn check_invariants(&self) {
        for edge in &self.edges {
            debug_assert!(edge.v1 < edge.v2);
        }
        let sum_facet_verts: usize = self.facets.iter().map(|f| f.verts.len()).sum();
        debug_assert!(sum_facet_verts > 0 || self.facets.is_empty());
        for (idx, edge) in self.edges.iter().enumerate() {
            let count_at_v1 = self.vertices[edge.v1 as usize]
                .incident_edges
                .iter()
                .filter(|&&e| e as usize == idx)
                .count();
            let count_at_v2 = self.vertices[edge.v2 as usize]
                .incident_edges
                .iter()
                .filter(|&&e| e as usize == idx)
                .count();
            debug_assert_eq!(count_at_v1, 1);
            debug_assert_eq!(count_at_v2, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_quad_has_four_edges_and_one_boundary_free_loop() {
        let topo = Topology::build(&[4], &[0, 1, 2, 3], 4);
        assert_eq!(topo.edges.len(), 4);
        assert!(topo.edges.iter().all(|e| e.is_boundary()));
        assert_eq!(topo.facets.len(), 1);
        assert_eq!(topo.facets[0].verts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn shared_edge_between_two_quads_has_two_faces() {
        // two quads sharing the edge (1,2)
        let topo = Topology::build(&[4, 4], &[0, 1, 2, 3, 1, 4, 5, 2], 6);
        let shared = topo
            .edges
            .iter()
            .find(|e| (e.v1, e.v2) == (1, 2))
            .expect("shared edge exists");
        assert!(!shared.is_boundary());
    }

    #[test]
    fn invariants_hold_after_build() {
        let topo = Topology::build(&[4], &[0, 1, 2, 3], 4);
        topo.check_invariants();
    }
}
