//! C8: Catmull–Clark subdivision tessellator (spec §4.8). Builds topology
//! from a control mesh, applies hole/crease/corner/interpolateboundary
//! tags, refines to a requested depth, and triangulates the result into
//! per-face output independent of any particular renderer backend.

mod mesh;
mod refine;
mod surface;
mod tags;
mod triangulate;
mod vecmath;

pub use mesh::{Edge, Facet, FacetKind, Topology, Vertex, VertexKind};
pub use refine::{refine_linear_attr, Level};
pub use surface::{ControlMesh, Scheme, SubdivisionSurface};
pub use tags::sharpness_to_blend;
pub use triangulate::{triangulate, TessellatedFace};
