//! A `Backend` that only records what it was called with, used by the
//! parser/dispatcher test suites to assert on request-sequence equality
//! (spec §8: "lex+parse+emit-to-a-recording-backend produces the same
//! request sequence as the input").

use crate::{Backend, BackendResult, HandleId, TriangleMesh};
use rib_model::ParameterList;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i32),
    Float(f32),
    Str(String),
    Floats(Vec<f32>),
    Ints(Vec<i32>),
    Strs(Vec<String>),
}

/// One logged backend call: the request name, its scalar arguments in
/// order, and the parameter names bound in its trailing paramlist (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub scalars: Vec<Scalar>,
    pub param_names: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    next_handle: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&mut self, name: &str, scalars: Vec<Scalar>, params: &ParameterList) {
        self.calls.push(Call {
            name: name.to_string(),
            scalars,
            param_names: params.iter().map(|(d, _)| d.name.clone()).collect(),
        });
    }

    fn log_bare(&mut self, name: &str, scalars: Vec<Scalar>) {
        self.calls.push(Call {
            name: name.to_string(),
            scalars,
            param_names: Vec::new(),
        });
    }

    fn next_handle(&mut self) -> HandleId {
        self.next_handle += 1;
        HandleId(self.next_handle)
    }
}

impl Backend for RecordingBackend {
    fn format(&mut self, xres: i32, yres: i32, pixelaspect: f32) -> BackendResult<()> {
        self.log_bare(
            "Format",
            vec![Scalar::Int(xres), Scalar::Int(yres), Scalar::Float(pixelaspect)],
        );
        Ok(())
    }

    fn option(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        self.log("Option", vec![Scalar::Str(name.to_string())], params);
        Ok(())
    }

    fn identity(&mut self) -> BackendResult<()> {
        self.log_bare("Identity", vec![]);
        Ok(())
    }

    fn translate(&mut self, dx: f32, dy: f32, dz: f32) -> BackendResult<()> {
        self.log_bare(
            "Translate",
            vec![Scalar::Float(dx), Scalar::Float(dy), Scalar::Float(dz)],
        );
        Ok(())
    }

    fn rotate(&mut self, angle: f32, dx: f32, dy: f32, dz: f32) -> BackendResult<()> {
        self.log_bare(
            "Rotate",
            vec![
                Scalar::Float(angle),
                Scalar::Float(dx),
                Scalar::Float(dy),
                Scalar::Float(dz),
            ],
        );
        Ok(())
    }

    fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> BackendResult<()> {
        self.log_bare(
            "Scale",
            vec![Scalar::Float(sx), Scalar::Float(sy), Scalar::Float(sz)],
        );
        Ok(())
    }

    fn concat_transform(&mut self, matrix: &[f32; 16]) -> BackendResult<()> {
        self.log_bare("ConcatTransform", vec![Scalar::Floats(matrix.to_vec())]);
        Ok(())
    }

    fn frame_begin(&mut self, number: i32) -> BackendResult<()> {
        self.log_bare("FrameBegin", vec![Scalar::Int(number)]);
        Ok(())
    }

    fn frame_end(&mut self) -> BackendResult<()> {
        self.log_bare("FrameEnd", vec![]);
        Ok(())
    }

    fn world_begin(&mut self) -> BackendResult<()> {
        self.log_bare("WorldBegin", vec![]);
        Ok(())
    }

    fn world_end(&mut self) -> BackendResult<()> {
        self.log_bare("WorldEnd", vec![]);
        Ok(())
    }

    fn attribute_begin(&mut self) -> BackendResult<()> {
        self.log_bare("AttributeBegin", vec![]);
        Ok(())
    }

    fn attribute_end(&mut self) -> BackendResult<()> {
        self.log_bare("AttributeEnd", vec![]);
        Ok(())
    }

    fn transform_begin(&mut self) -> BackendResult<()> {
        self.log_bare("TransformBegin", vec![]);
        Ok(())
    }

    fn transform_end(&mut self) -> BackendResult<()> {
        self.log_bare("TransformEnd", vec![]);
        Ok(())
    }

    fn solid_begin(&mut self, operation: &str) -> BackendResult<()> {
        self.log_bare("SolidBegin", vec![Scalar::Str(operation.to_string())]);
        Ok(())
    }

    fn solid_end(&mut self) -> BackendResult<()> {
        self.log_bare("SolidEnd", vec![]);
        Ok(())
    }

    fn motion_begin(&mut self, times: &[f32]) -> BackendResult<()> {
        self.log_bare("MotionBegin", vec![Scalar::Floats(times.to_vec())]);
        Ok(())
    }

    fn motion_end(&mut self) -> BackendResult<()> {
        self.log_bare("MotionEnd", vec![]);
        Ok(())
    }

    fn surface(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        self.log("Surface", vec![Scalar::Str(name.to_string())], params);
        Ok(())
    }

    fn displacement(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        self.log("Displacement", vec![Scalar::Str(name.to_string())], params);
        Ok(())
    }

    fn atmosphere(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        self.log("Atmosphere", vec![Scalar::Str(name.to_string())], params);
        Ok(())
    }

    fn imager(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        self.log("Imager", vec![Scalar::Str(name.to_string())], params);
        Ok(())
    }

    fn color(&mut self, samples: &[f32]) -> BackendResult<()> {
        self.log_bare("Color", vec![Scalar::Floats(samples.to_vec())]);
        Ok(())
    }

    fn opacity(&mut self, samples: &[f32]) -> BackendResult<()> {
        self.log_bare("Opacity", vec![Scalar::Floats(samples.to_vec())]);
        Ok(())
    }

    fn orientation(&mut self, orientation: &str) -> BackendResult<()> {
        self.log_bare("Orientation", vec![Scalar::Str(orientation.to_string())]);
        Ok(())
    }

    fn sides(&mut self, n: i32) -> BackendResult<()> {
        self.log_bare("Sides", vec![Scalar::Int(n)]);
        Ok(())
    }

    fn sphere(
        &mut self,
        radius: f32,
        zmin: f32,
        zmax: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        self.log(
            "Sphere",
            vec![
                Scalar::Float(radius),
                Scalar::Float(zmin),
                Scalar::Float(zmax),
                Scalar::Float(thetamax),
            ],
            params,
        );
        Ok(())
    }

    fn cone(
        &mut self,
        height: f32,
        radius: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        self.log(
            "Cone",
            vec![
                Scalar::Float(height),
                Scalar::Float(radius),
                Scalar::Float(thetamax),
            ],
            params,
        );
        Ok(())
    }

    fn cylinder(
        &mut self,
        radius: f32,
        zmin: f32,
        zmax: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        self.log(
            "Cylinder",
            vec![
                Scalar::Float(radius),
                Scalar::Float(zmin),
                Scalar::Float(zmax),
                Scalar::Float(thetamax),
            ],
            params,
        );
        Ok(())
    }

    fn disk(
        &mut self,
        height: f32,
        radius: f32,
        thetamax: f32,
        params: &ParameterList,
    ) -> BackendResult<()> {
        self.log(
            "Disk",
            vec![
                Scalar::Float(height),
                Scalar::Float(radius),
                Scalar::Float(thetamax),
            ],
            params,
        );
        Ok(())
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
        self.log(
            "Torus",
            vec![
                Scalar::Float(majorradius),
                Scalar::Float(minorradius),
                Scalar::Float(phimin),
                Scalar::Float(phimax),
                Scalar::Float(thetamax),
            ],
            params,
        );
        Ok(())
    }

    fn polygon(&mut self, nvertices: i32, params: &ParameterList) -> BackendResult<()> {
        self.log("Polygon", vec![Scalar::Int(nvertices)], params);
        Ok(())
    }

    fn points_polygons(
        &mut self,
        nvertices: &[i32],
        vertices: &[i32],
        params: &ParameterList,
    ) -> BackendResult<()> {
        self.log(
            "PointsPolygons",
            vec![Scalar::Ints(nvertices.to_vec()), Scalar::Ints(vertices.to_vec())],
            params,
        );
        Ok(())
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
        self.log(
            "SubdivisionMesh",
            vec![
                Scalar::Str(scheme.to_string()),
                Scalar::Ints(nvertices.to_vec()),
                Scalar::Ints(vertices.to_vec()),
                Scalar::Strs(tags.to_vec()),
                Scalar::Ints(nargs.to_vec()),
                Scalar::Ints(intargs.to_vec()),
                Scalar::Floats(floatargs.to_vec()),
            ],
            params,
        );
        Ok(())
    }

    fn triangle_mesh(&mut self, mesh: &TriangleMesh) -> BackendResult<()> {
        let positions: Vec<f32> = mesh.positions.iter().flat_map(|p| p.to_vec()).collect();
        let indices: Vec<i32> = mesh
            .indices
            .iter()
            .flat_map(|tri| tri.iter().map(|&i| i as i32))
            .collect();
        self.log_bare(
            "TriangleMesh",
            vec![Scalar::Floats(positions), Scalar::Ints(indices)],
        );
        Ok(())
    }

    fn light_source(&mut self, name: &str, params: &ParameterList) -> BackendResult<HandleId> {
        self.log("LightSource", vec![Scalar::Str(name.to_string())], params);
        Ok(self.next_handle())
    }

    fn area_light_source(
        &mut self,
        name: &str,
        params: &ParameterList,
    ) -> BackendResult<HandleId> {
        self.log("AreaLightSource", vec![Scalar::Str(name.to_string())], params);
        Ok(self.next_handle())
    }

    fn illuminate(&mut self, light: HandleId, on: bool) -> BackendResult<()> {
        self.log_bare(
            "Illuminate",
            vec![Scalar::Int(light.0 as i32), Scalar::Int(on as i32)],
        );
        Ok(())
    }

    fn object_begin(&mut self) -> BackendResult<HandleId> {
        self.log_bare("ObjectBegin", vec![]);
        Ok(self.next_handle())
    }

    fn object_end(&mut self) -> BackendResult<()> {
        self.log_bare("ObjectEnd", vec![]);
        Ok(())
    }

    fn object_instance(&mut self, object: HandleId) -> BackendResult<()> {
        self.log_bare("ObjectInstance", vec![Scalar::Int(object.0 as i32)]);
        Ok(())
    }

    fn archive_begin(&mut self, name: &str, params: &ParameterList) -> BackendResult<HandleId> {
        self.log("ArchiveBegin", vec![Scalar::Str(name.to_string())], params);
        Ok(self.next_handle())
    }

    fn archive_end(&mut self) -> BackendResult<()> {
        self.log_bare("ArchiveEnd", vec![]);
        Ok(())
    }

    fn read_archive(&mut self, name: &str, params: &ParameterList) -> BackendResult<()> {
        self.log("ReadArchive", vec![Scalar::Str(name.to_string())], params);
        Ok(())
    }

    fn archive_record(&mut self, kind: &str, text: &str) -> BackendResult<()> {
        self.log_bare(
            "ArchiveRecord",
            vec![Scalar::Str(kind.to_string()), Scalar::Str(text.to_string())],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_call_sequence_in_order() {
        let mut backend = RecordingBackend::new();
        backend.format(640, 480, 1.0).unwrap();
        backend.world_begin().unwrap();
        backend
            .sphere(1.0, -1.0, 1.0, 360.0, &ParameterList::new())
            .unwrap();
        backend.world_end().unwrap();
        let names: Vec<&str> = backend.calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Format", "WorldBegin", "Sphere", "WorldEnd"]);
    }

    #[test]
    fn handles_increment_and_never_repeat() {
        let mut backend = RecordingBackend::new();
        let a = backend.object_begin().unwrap();
        let b = backend.object_begin().unwrap();
        assert_ne!(a, b);
    }
}
