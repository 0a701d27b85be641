//! The request-dispatch boundary (spec §6.3): one method per RIB request,
//! named identically to the request, taking its parsed scalar arguments
//! followed by a parameter-list. Implementors are the actual renderer; this
//! crate only fixes the shape of the seam.
//!
//! `Backend` methods return [`rib_errors::CoreError`] rather than an RI
//! diagnostic — argument-shape problems are caught and reported before a
//! backend call is ever made (spec §4.4), so a backend-level error here
//! means something genuinely broke downstream (I/O, an internal invariant),
//! not a malformed scene.

mod handle;
mod recording;

pub use handle::HandleId;
pub use recording::{Call, RecordingBackend};

use rib_errors::CoreError;
use rib_model::ParameterList;

pub type BackendResult<T> = Result<T, CoreError>;

/// The boundary the core drives (spec §6.3). Grouped by spec §4.4's
/// request-shape patterns for readability; the trait itself is flat.
pub trait Backend {
    /// Called by macro replay (spec §4.5) before each recorded request, so
    /// diagnostics and any backend-side bookkeeping can attribute
    /// themselves to the replaying archive/object and its original line.
    /// Most backends have nothing to do here.
    fn set_context(&mut self, _source_name: &str, _line: u32) -> BackendResult<()> {
        Ok(())
    }

    // -- Options (constant-class paramlist only) --
    fn format(&mut self, xres: i32, yres: i32, pixelaspect: f32) -> BackendResult<()>;
    fn option(&mut self, name: &str, params: &ParameterList) -> BackendResult<()>;

    // -- Transform stack --
    fn identity(&mut self) -> BackendResult<()>;
    fn translate(&mut self, dx: f32, dy: f32, dz: f32) -> BackendResult<()>;
    fn rotate(&mut self, angle: f32, dx: f32, dy: f32, dz: f32) -> BackendResult<()>;
    fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> BackendResult<()>;
    fn concat_transform(&mut self, matrix: &[f32; 16]) -> BackendResult<()>;

    // -- Mode blocks --
    fn frame_begin(&mut self, number: i32) -> BackendResult<()>;
    fn frame_end(&mut self) -> BackendResult<()>;
    fn world_begin(&mut self) -> BackendResult<()>;
    fn world_end(&mut self) -> BackendResult<()>;
    fn attribute_begin(&mut self) -> BackendResult<()>;
    fn attribute_end(&mut self) -> BackendResult<()>;
    fn transform_begin(&mut self) -> BackendResult<()>;
    fn transform_end(&mut self) -> BackendResult<()>;
    fn solid_begin(&mut self, operation: &str) -> BackendResult<()>;
    fn solid_end(&mut self) -> BackendResult<()>;
    fn motion_begin(&mut self, times: &[f32]) -> BackendResult<()>;
    fn motion_end(&mut self) -> BackendResult<()>;

    // -- Shading attributes --
    fn surface(&mut self, name: &str, params: &ParameterList) -> BackendResult<()>;
    fn displacement(&mut self, name: &str, params: &ParameterList) -> BackendResult<()>;
    fn atmosphere(&mut self, name: &str, params: &ParameterList) -> BackendResult<()>;
    fn imager(&mut self, name: &str, params: &ParameterList) -> BackendResult<()>;
    fn color(&mut self, samples: &[f32]) -> BackendResult<()>;
    fn opacity(&mut self, samples: &[f32]) -> BackendResult<()>;
    fn orientation(&mut self, orientation: &str) -> BackendResult<()>;
    fn sides(&mut self, n: i32) -> BackendResult<()>;

    // -- Quadric geometry (spec §8 scenarios 4-5; Cone/Cylinder/Disk/Torus
    // are the same shape pattern as Sphere, included for C4 completeness;
    // their tessellation is out of scope, spec §1 Non-goals) --
    fn sphere(
        &mut self,
        radius: f32,
        zmin: f32,
        zmax: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()>;
    fn cone(
        &mut self,
        height: f32,
        radius: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()>;
    fn cylinder(
        &mut self,
        radius: f32,
        zmin: f32,
        zmax: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()>;
    fn disk(
        &mut self,
        height: f32,
        radius: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()>;
    fn torus(
        &mut self,
        majorradius: f32,
        minorradius: f32,
        phimin: f32,
        phimax: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()>;

    // -- Polygon / subdivision control meshes --
    fn polygon(&mut self, nvertices: i32, params: &ParameterList) -> BackendResult<()>;
    fn points_polygons(
        &mut self,
        nvertices: &[i32],
        vertices: &[i32],
        params: &ParameterList,
    ) -> BackendResult<()>;
    fn subdivision_mesh(
        &mut self,
        scheme: &str,
        nvertices: &[i32],
        vertices: &[i32],
        tags: &[String],
        nargs: &[i32],
        intargs: &[i32],
        floatargs: &[f32],
        params: &ParameterList,
    ) -> BackendResult<()>;

    /// Post-tessellation hand-off (spec §4.8.3): the triangle stream the
    /// subdivision tessellator produced for one `SubdivisionMesh` request.
    fn triangle_mesh(&mut self, mesh: &TriangleMesh) -> BackendResult<()>;

    // -- Lights --
    fn light_source(&mut self, name: &str, params: &ParameterList) -> BackendResult<HandleId>;
    fn area_light_source(&mut self, name: &str, params: &ParameterList)
        -> BackendResult<HandleId>;
    fn illuminate(&mut self, light: HandleId, on: bool) -> BackendResult<()>;

    // -- Objects & archives (handle-emitting / handle-consuming) --
    fn object_begin(&mut self) -> BackendResult<HandleId>;
    fn object_end(&mut self) -> BackendResult<()>;
    fn object_instance(&mut self, object: HandleId) -> BackendResult<()>;
    fn archive_begin(&mut self, name: &str, params: &ParameterList) -> BackendResult<HandleId>;
    fn archive_end(&mut self) -> BackendResult<()>;
    fn read_archive(&mut self, name: &str, params: &ParameterList) -> BackendResult<()>;
    fn archive_record(&mut self, kind: &str, text: &str) -> BackendResult<()>;
}

/// A flattened, renderer-agnostic triangle buffer: one entry per original
/// subdivided face, each owning a compact local vertex numbering (spec
/// §4.8.3 "remapped to a per-face local numbering").
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub st: Option<Vec<[f32; 2]>>,
    /// Triangle vertex index triples, into `positions`.
    pub indices: Vec<[u32; 3]>,
}

impl<T: Backend + ?Sized> Backend for &mut T {
    fn set_context(&mut self, source_name: &str, line: u32) -> BackendResult<()> {
        (**self).set_context(source_name, line)
    }
    fn format(&mut self, xres: i32, yres: i32, pixelaspect: f32) -> BackendResult<()> {
        (**self).format(xres, yres, pixelaspect)
    }
    fn option(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        (**self).option(name, params)
    }
    fn identity(&mut self) -> BackendResult<()> {
        (**self).identity()
    }
    fn translate(&mut self, dx: f32, dy: f32, dz: f32) -> BackendResult<()> {
        (**self).translate(dx, dy, dz)
    }
    fn rotate(&mut self, angle: f32, dx: f32, dy: f32, dz: f32) -> BackendResult<()> {
        (**self).rotate(angle, dx, dy, dz)
    }
    fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> BackendResult<()> {
        (**self).scale(sx, sy, sz)
    }
    fn concat_transform(&mut self, matrix: &[f32; 16]) -> BackendResult<()> {
        (**self).concat_transform(matrix)
    }
    fn frame_begin(&mut self, number: i32) -> BackendResult<()> {
        (**self).frame_begin(number)
    }
    fn frame_end(&mut self) -> BackendResult<()> {
        (**self).frame_end()
    }
    fn world_begin(&mut self) -> BackendResult<()> {
        (**self).world_begin()
    }
    fn world_end(&mut self) -> BackendResult<()> {
        (**self).world_end()
    }
    fn attribute_begin(&mut self) -> BackendResult<()> {
        (**self).attribute_begin()
    }
    fn attribute_end(&mut self) -> BackendResult<()> {
        (**self).attribute_end()
    }
    fn transform_begin(&mut self) -> BackendResult<()> {
        (**self).transform_begin()
    }
    fn transform_end(&mut self) -> BackendResult<()> {
        (**self).transform_end()
    }
    fn solid_begin(&mut self, operation: &str) -> BackendResult<()> {
        (**self).solid_begin(operation)
    }
    fn solid_end(&mut self) -> BackendResult<()> {
        (**self).solid_end()
    }
    fn motion_begin(&mut self, times: &[f32]) -> BackendResult<()> {
        (**self).motion_begin(times)
    }
    fn motion_end(&mut self) -> BackendResult<()> {
        (**self).motion_end()
    }
    fn surface(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        (**self).surface(name, params)
    }
    fn displacement(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        (**self).displacement(name, params)
    }
    fn atmosphere(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        (**self).atmosphere(name, params)
    }
    fn imager(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        (**self).imager(name, params)
    }
    fn color(&mut self, samples: &[f32]) -> BackendResult<()> {
        (**self).color(samples)
    }
    fn opacity(&mut self, samples: &[f32]) -> BackendResult<()> {
        (**self).opacity(samples)
    }
    fn orientation(&mut self, orientation: &str) -> BackendResult<()> {
        (**self).orientation(orientation)
    }
    fn sides(&mut self, n: i32) -> BackendResult<()> {
        (**self).sides(n)
    }
    fn sphere(
        &mut self,
        radius: f32,
        zmin: f32,
        zmax: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        (**self).sphere(radius, zmin, zmax, thetamax, params)
    }
    fn cone(
        &mut self,
        height: f32,
        radius: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        (**self).cone(height, radius, thetamax, params)
    }
    fn cylinder(
        &mut self,
        radius: f32,
        zmin: f32,
        zmax: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        (**self).cylinder(radius, zmin, zmax, thetamax, params)
    }
    fn disk(
        &mut self,
        height: f32,
        radius: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        (**self).disk(height, radius, thetamax, params)
    }
    fn torus(
        &mut self,
        majorradius: f32,
        minorradius: f32,
        phimin: f32,
        phimax: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        (**self).torus(majorradius, minorradius, phimin, phimax, thetamax, params)
    }
    fn polygon(&mut self, nvertices: i32, params: &ParameterList) -> BackendResult<()> {
        (**self).polygon(nvertices, params)
    }
    fn points_polygons(
        &mut self,
        nvertices: &[i32],
        vertices: &[i32],
        params: &ParameterList,
    ) -> BackendResult<()> {
        (**self).points_polygons(nvertices, vertices, params)
    }
    fn subdivision_mesh(
        &mut self,
        scheme: &str,
        nvertices: &[i32],
        vertices: &[i32],
        tags: &[String],
        nargs: &[i32],
        intargs: &[i32],
        floatargs: &[f32],
        params: &ParameterList,
    ) -> BackendResult<()> {
        (**self).subdivision_mesh(
            scheme, nvertices, vertices, tags, nargs, intargs, floatargs, params,
        )
    }
    fn triangle_mesh(&mut self, mesh: &TriangleMesh) -> BackendResult<()> {
        (**self).triangle_mesh(mesh)
    }
    fn light_source(&mut self, name: &str, params: &ParameterList) -> BackendResult<HandleId> {
        (**self).light_source(name, params)
    }
    fn area_light_source(
        &mut self,
        name: &str,
        params: &ParameterList,
    ) -> BackendResult<HandleId> {
        (**self).area_light_source(name, params)
    }
    fn illuminate(&mut self, light: HandleId, on: bool) -> BackendResult<()> {
        (**self).illuminate(light, on)
    }
    fn object_begin(&mut self) -> BackendResult<HandleId> {
        (**self).object_begin()
    }
    fn object_end(&mut self) -> BackendResult<()> {
        (**self).object_end()
    }
    fn object_instance(&mut self, object: HandleId) -> BackendResult<()> {
        (**self).object_instance(object)
    }
    fn archive_begin(&mut self, name: &str, params: &ParameterList) -> BackendResult<HandleId> {
        (**self).archive_begin(name, params)
    }
    fn archive_end(&mut self) -> BackendResult<()> {
        (**self).archive_end()
    }
    fn read_archive(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        (**self).read_archive(name, params)
    }
    fn archive_record(&mut self, kind: &str, text: &str) -> BackendResult<()> {
        (**self).archive_record(kind, text)
    }
}
