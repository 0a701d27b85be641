//! The public per-request entry point (spec §3 "Subdivision surface"): a
//! control mesh plus tags, refined lazily and cached per depth so repeated
//! dicing requests at the same depth don't redo the Catmull–Clark walk.

use crate::mesh::Topology;
use crate::refine::{refine_linear_attr, refine_step, Level};
use crate::tags::{apply_corner, apply_crease, apply_hole, apply_interpolate_boundary};
use crate::triangulate::{triangulate, TessellatedFace};
use rib_errors::ErrorReporter;

/// The scheme named on a `SubdivisionMesh` request (spec §4.8.1); only
/// `catmull-clark` has a refinement rule implemented, matching what the
/// reference scenario in spec §8 exercises. Other scheme names are
/// accepted but degrade to an unrefined pass-through, flagged via
/// `SubdivisionSurface::is_unsupported_scheme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    CatmullClark,
    Other,
}

impl Scheme {
    pub fn parse(name: &str) -> Self {
        match name {
            "catmull-clark" => Scheme::CatmullClark,
            _ => Scheme::Other,
        }
    }
}

/// A control mesh together with any face-varying texture coordinates bound
/// on it (spec §4.8.2 face-varying refinement).
pub struct ControlMesh {
    pub scheme: Scheme,
    pub topology: Topology,
    pub positions: Vec<[f32; 3]>,
    pub st: Option<Vec<[f32; 2]>>,
}

impl ControlMesh {
    pub fn new(scheme: Scheme, nvertices: &[i32], vertex_indices: &[i32], positions: Vec<[f32; 3]>) -> Self {
        let topology = Topology::build(nvertices, vertex_indices, positions.len());
        Self {
            scheme,
            topology,
            positions,
            st: None,
        }
    }

    pub fn with_st(mut self, st: Vec<[f32; 2]>) -> Self {
        self.st = Some(st);
        self
    }

    pub fn apply_hole(&mut self, faces: &[u32]) {
        apply_hole(&mut self.topology, faces);
    }

    pub fn apply_crease(&mut self, chain: &[u32], sharpnesses: &[f32], reporter: &mut dyn ErrorReporter, source_name: &str, line: u32) {
        apply_crease(&mut self.topology, chain, sharpnesses, reporter, source_name, line);
    }

    pub fn apply_corner(&mut self, verts: &[u32], sharpnesses: &[f32], reporter: &mut dyn ErrorReporter, source_name: &str, line: u32) {
        apply_corner(&mut self.topology, verts, sharpnesses, reporter, source_name, line);
    }

    pub fn apply_interpolate_boundary(&mut self) {
        apply_interpolate_boundary(&mut self.topology);
    }
}

/// Holds every refinement level computed so far, indexed by depth (depth 0
/// is the control mesh itself), plus the matching face-varying ST buffer
/// per depth when texture coordinates were bound.
pub struct SubdivisionSurface {
    mesh: ControlMesh,
    levels: Vec<Level>,
    st_levels: Vec<Option<Vec<[f32; 2]>>>,
}

impl SubdivisionSurface {
    pub fn new(mesh: ControlMesh) -> Self {
        let level0 = Level {
            topology: mesh.topology.clone(),
            positions: mesh.positions.clone(),
        };
        let st0 = mesh.st.clone();
        Self {
            mesh,
            levels: vec![level0],
            st_levels: vec![st0],
        }
    }

    pub fn is_unsupported_scheme(&self) -> bool {
        self.mesh.scheme != Scheme::CatmullClark
    }

    /// Refine up to and including `depth`, reusing any levels already
    /// computed (spec §3 "cached per depth").
    pub fn ensure_depth(&mut self, depth: usize) {
        while self.levels.len() <= depth {
            let next = refine_step(self.levels.last().expect("level 0 always present"));
            let next_st = self
                .st_levels
                .last()
                .expect("st level 0 always present")
                .as_ref()
                .map(|buf| refine_linear_attr::<2>(&self.levels.last().unwrap().topology, buf));
            self.levels.push(next);
            self.st_levels.push(next_st);
        }
    }

    /// Triangulate the mesh at `depth`, refining it first if needed. Depth
    /// is derived from a RIB display's desired tessellation parameters
    /// (spec §4.8.3 scenario 6's "display tessellation (2, 2)"); the
    /// dispatcher maps those into a depth before calling here.
    pub fn tessellate(&mut self, depth: usize) -> Vec<TessellatedFace> {
        self.ensure_depth(depth);
        triangulate(&self.levels[depth], self.st_levels[depth].as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rib_errors::CollectingReporter;

    fn unit_quad_mesh() -> ControlMesh {
        ControlMesh::new(
            Scheme::CatmullClark,
            &[4],
            &[0, 1, 2, 3],
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        )
    }

    #[test]
    fn tessellating_at_depth_zero_returns_the_control_face() {
        let mut surface = SubdivisionSurface::new(unit_quad_mesh());
        let faces = surface.tessellate(0);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].positions.len(), 4);
    }

    #[test]
    fn tessellating_at_depth_one_yields_four_faces() {
        let mut surface = SubdivisionSurface::new(unit_quad_mesh());
        let faces = surface.tessellate(1);
        assert_eq!(faces.len(), 4);
    }

    #[test]
    fn repeated_tessellation_at_same_depth_is_cached_and_idempotent() {
        let mut surface = SubdivisionSurface::new(unit_quad_mesh());
        let first = surface.tessellate(2);
        let second = surface.tessellate(2);
        assert_eq!(first.len(), second.len());
        assert_eq!(surface.levels.len(), 3);
    }

    #[test]
    fn hole_and_crease_tags_apply_before_tessellation() {
        let mut mesh = unit_quad_mesh();
        let mut reporter = CollectingReporter::default();
        mesh.apply_crease(&[0, 1], &[f32::INFINITY], &mut reporter, "a.rib", 1);
        let mut surface = SubdivisionSurface::new(mesh);
        let faces = surface.tessellate(1);
        assert_eq!(faces.len(), 4);
    }

    #[test]
    fn unsupported_scheme_is_flagged() {
        let mesh = ControlMesh::new(Scheme::Other, &[4], &[0, 1, 2, 3], vec![[0.0; 3]; 4]);
        let surface = SubdivisionSurface::new(mesh);
        assert!(surface.is_unsupported_scheme());
    }
}
